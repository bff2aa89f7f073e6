//! Reading and writing rig documents.

mod data;
mod document;
pub mod json;
mod validate;

pub use data::SkeleData;
pub use document::{parse_document, stringify_document, ParseError, ParseResult, SkeleDocument};
pub use validate::{validate_document, ValidationIssue};
