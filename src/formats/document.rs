use json::JsonValue;

use crate::skeleton::Skeleton;

use super::data::SkeleData;
use super::json::{optional, JsonObject};

pub type ParseResult<T> = Result<T, ParseError>;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
	#[error("Could not parse JSON: {0}")]
	Json(#[from] json::Error),
	#[error("Document is not a JSON object")]
	NotAnObject,
	#[error("Document has no \"skele\" object")]
	MissingSkele,
}

/// A saved rig: optional metadata around the node tree description.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SkeleDocument {
	pub name: Option<String>,
	pub description: Option<String>,
	pub skele: SkeleData,
}

impl SkeleDocument {
	pub fn new(skele: SkeleData) -> Self {
		Self {
			name: None,
			description: None,
			skele,
		}
	}

	/// Snapshot of `skeleton`'s main tree with the root normalized for saving.
	pub fn from_skeleton(skeleton: &Skeleton) -> Self {
		Self::new(skeleton.to_data())
	}

	pub fn with_name(mut self, name: impl Into<String>) -> Self {
		self.name = Some(name.into());
		self
	}

	pub fn with_description(mut self, description: impl Into<String>) -> Self {
		self.description = Some(description.into());
		self
	}

	pub fn to_skeleton(&self) -> Skeleton {
		Skeleton::from_data(&self.skele)
	}

	/// Reads a parsed document. Only the outer shape is strict, see [`SkeleData::from_json`].
	pub fn from_json(val: &JsonValue) -> ParseResult<Self> {
		let obj = JsonObject::from_value("(document)", val).map_err(|_| ParseError::NotAnObject)?;
		let skele = obj.get_value("skele").map_err(|_| ParseError::MissingSkele)?;
		if !skele.is_object() {
			return Err(ParseError::MissingSkele);
		}

		let text = |key: &str| match optional(obj.get_str(key)) {
			Ok(val) => val.map(str::to_owned),
			Err(err) => {
				tracing::warn!("Ignoring document field: {err}");
				None
			}
		};

		Ok(Self {
			name: text("name"),
			description: text("description"),
			skele: SkeleData::from_json(skele),
		})
	}

	/// The saved form. The root always rests at angle 0 and mag 1, whatever pose it was given.
	pub fn to_json(&self) -> JsonValue {
		let mut skele = self.skele.to_json();
		skele["angle"] = 0f64.into();
		skele["mag"] = 1f64.into();

		let mut obj = JsonValue::new_object();
		if let Some(name) = &self.name {
			obj["name"] = name.as_str().into();
		}
		if let Some(description) = &self.description {
			obj["description"] = description.as_str().into();
		}
		obj["skele"] = skele;
		obj
	}
}

pub fn parse_document(text: &str) -> ParseResult<SkeleDocument> {
	SkeleDocument::from_json(&json::parse(text)?)
}

/// Pretty printed with two space indents.
pub fn stringify_document(doc: &SkeleDocument) -> String {
	json::stringify_pretty(doc.to_json(), 2)
}
