pub mod formats;
pub mod history;
pub mod math;
pub mod node;
pub mod render;
pub mod skeleton;
pub mod storage;

pub use indextree::NodeId;
