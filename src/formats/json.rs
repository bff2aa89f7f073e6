//! Thin accessor layer over `json::JsonValue` objects.

use json::JsonValue;

pub type JsonResult<T> = Result<T, JsonError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum JsonError {
	#[error("Key {0:?} does not exist")]
	KeyDoesNotExist(String),
	#[error("Value at {0:?} is not an object")]
	ValueIsNotObject(String),
	#[error("Value at {0:?} is not a list")]
	ValueIsNotList(String),
	#[error("Value at {0:?} is not a string")]
	ValueIsNotString(String),
	#[error("Value at {0:?} is not a number")]
	ValueIsNotNumber(String),
	#[error("Value at {0:?} is not a finite number")]
	ValueIsNotFinite(String),
	#[error("Value at {0:?} is not a bool")]
	ValueIsNotBool(String),
}

impl JsonError {
	pub fn is_missing(&self) -> bool {
		matches!(self, JsonError::KeyDoesNotExist(_))
	}
}

/// Turns a missing key into `None`, keeping every other error.
pub fn optional<T>(res: JsonResult<T>) -> JsonResult<Option<T>> {
	match res {
		Ok(val) => Ok(Some(val)),
		Err(err) if err.is_missing() => Ok(None),
		Err(err) => Err(err),
	}
}

#[derive(Clone, Copy)]
pub struct JsonObject<'a>(pub &'a json::object::Object);

impl<'a> JsonObject<'a> {
	pub fn from_value(msg: &str, val: &'a JsonValue) -> JsonResult<Self> {
		match val {
			JsonValue::Object(obj) => Ok(JsonObject(obj)),
			_ => Err(JsonError::ValueIsNotObject(msg.to_owned())),
		}
	}

	fn get(&self, key: &str) -> JsonResult<&'a JsonValue> {
		match self.0.get(key) {
			Some(value) => Ok(value),
			None => Err(JsonError::KeyDoesNotExist(key.to_owned())),
		}
	}

	pub fn get_value(&self, key: &str) -> JsonResult<&'a JsonValue> {
		self.get(key)
	}

	pub fn get_object(&self, key: &str) -> JsonResult<JsonObject<'a>> {
		Self::from_value(key, self.get(key)?)
	}

	pub fn get_list(&self, key: &str) -> JsonResult<&'a [JsonValue]> {
		match self.get(key)? {
			JsonValue::Array(arr) => Ok(arr),
			_ => Err(JsonError::ValueIsNotList(key.to_owned())),
		}
	}

	pub fn get_str(&self, key: &str) -> JsonResult<&'a str> {
		match self.get(key)?.as_str() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotString(key.to_owned())),
		}
	}

	fn get_number(&self, key: &str) -> JsonResult<json::number::Number> {
		match self.get(key)?.as_number() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotNumber(key.to_owned())),
		}
	}

	pub fn get_f64(&self, key: &str) -> JsonResult<f64> {
		let val: f64 = self.get_number(key)?.into();
		if val.is_finite() {
			Ok(val)
		} else {
			Err(JsonError::ValueIsNotFinite(key.to_owned()))
		}
	}

	pub fn get_f32(&self, key: &str) -> JsonResult<f32> {
		let val = self.get_f64(key)? as f32;
		if val.is_finite() {
			Ok(val)
		} else {
			Err(JsonError::ValueIsNotFinite(key.to_owned()))
		}
	}

	pub fn get_bool(&self, key: &str) -> JsonResult<bool> {
		match self.get(key)?.as_bool() {
			Some(val) => Ok(val),
			None => Err(JsonError::ValueIsNotBool(key.to_owned())),
		}
	}
}
