use std::fmt;

use json::JsonValue;

use super::json::{optional, JsonError, JsonObject, JsonResult};

/// One violation of the document format, located by a path like `skele.children[0].mag`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
	pub path: String,
	pub message: String,
}

impl fmt::Display for ValidationIssue {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}: {}", self.path, self.message)
	}
}

#[derive(Default)]
struct Issues(Vec<ValidationIssue>);

impl Issues {
	fn push(&mut self, path: String, message: impl Into<String>) {
		self.0.push(ValidationIssue {
			path,
			message: message.into(),
		});
	}

	/// Records `res`'s error under `path.key`, if any.
	fn check<T>(&mut self, path: &str, key: &str, res: JsonResult<T>) -> Option<T> {
		match res {
			Ok(val) => Some(val),
			Err(err) => {
				self.push(field(path, key), describe(&err));
				None
			}
		}
	}
}

fn field(path: &str, key: &str) -> String {
	if path.is_empty() {
		key.to_owned()
	} else {
		format!("{path}.{key}")
	}
}

fn describe(err: &JsonError) -> &'static str {
	match err {
		JsonError::KeyDoesNotExist(_) => "is required",
		JsonError::ValueIsNotObject(_) => "must be an object",
		JsonError::ValueIsNotList(_) => "must be a list",
		JsonError::ValueIsNotString(_) => "must be a string",
		JsonError::ValueIsNotNumber(_) => "must be a number",
		JsonError::ValueIsNotFinite(_) => "must be a finite number",
		JsonError::ValueIsNotBool(_) => "must be a bool",
	}
}

/// Checks a document against the save format, collecting every issue instead of stopping at
/// the first one.
pub fn validate_document(val: &JsonValue) -> Result<(), Vec<ValidationIssue>> {
	let mut issues = Issues::default();

	match JsonObject::from_value("(document)", val) {
		Ok(obj) => {
			issues.check("", "name", optional(obj.get_str("name")));
			issues.check("", "description", optional(obj.get_str("description")));
			if let Some(skele) = issues.check("", "skele", obj.get_object("skele")) {
				validate_node(&mut issues, "skele", skele);
			}
		}
		Err(_) => issues.push("(document)".to_owned(), "must be an object"),
	}

	if issues.0.is_empty() {
		Ok(())
	} else {
		Err(issues.0)
	}
}

fn validate_node(issues: &mut Issues, path: &str, obj: JsonObject) {
	issues.check(path, "angle", obj.get_f32("angle"));
	issues.check(path, "mag", obj.get_f32("mag"));
	issues.check(path, "id", optional(obj.get_str("id")));
	issues.check(path, "uri", optional(obj.get_str("uri")));
	issues.check(path, "sort", optional(obj.get_f32("sort")));
	issues.check(path, "hidden", optional(obj.get_bool("hidden")));
	issues.check(path, "props", optional(obj.get_object("props")));

	let Some(Some(children)) = issues.check(path, "children", optional(obj.get_list("children"))) else {
		return;
	};
	for (i, child) in children.iter().enumerate() {
		let child_path = format!("{path}.children[{i}]");
		match JsonObject::from_value(&child_path, child) {
			Ok(child) => validate_node(issues, &child_path, child),
			Err(_) => issues.push(child_path, "must be an object"),
		}
	}
}
