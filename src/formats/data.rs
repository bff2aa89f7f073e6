use std::sync::Arc;

use indextree::NodeId;
use json::JsonValue;

use crate::math::transform::{deg_to_rad, rad_to_deg};
use crate::node::SkeleNode;
use crate::skeleton::Skeleton;

use super::json::{optional, JsonObject, JsonResult};

/// Plain nested description of a node tree, as stored in documents. Angles are in degrees.
#[derive(Debug, Clone, PartialEq)]
pub struct SkeleData {
	pub angle: f32,
	pub mag: f32,
	pub id: Option<String>,
	pub uri: Option<String>,
	pub props: Option<JsonValue>,
	pub sort: Option<f32>,
	pub hidden: bool,
	pub children: Vec<SkeleData>,
}

impl Default for SkeleData {
	fn default() -> Self {
		Self {
			angle: 0.,
			mag: 1.,
			id: None,
			uri: None,
			props: None,
			sort: None,
			hidden: false,
			children: Vec::new(),
		}
	}
}

/// Value of an optional field. A malformed one is logged and dropped.
fn lenient<T>(path: &str, res: JsonResult<T>) -> Option<T> {
	match optional(res) {
		Ok(val) => val,
		Err(err) => {
			tracing::warn!("Ignoring field of node at {path}: {err}");
			None
		}
	}
}

impl SkeleData {
	/// Reads a node description, replacing every malformed field by its default.
	pub fn from_json(val: &JsonValue) -> Self {
		Self::from_json_at("skele", val)
	}

	fn from_json_at(path: &str, val: &JsonValue) -> Self {
		let obj = match JsonObject::from_value(path, val) {
			Ok(obj) => obj,
			Err(err) => {
				tracing::warn!("Using a default node: {err}");
				return Self::default();
			}
		};

		let angle = obj.get_f32("angle").unwrap_or_else(|err| {
			tracing::warn!("Node at {path} has no usable angle, using 0: {err}");
			0.
		});
		let mag = obj.get_f32("mag").unwrap_or_else(|err| {
			tracing::warn!("Node at {path} has no usable mag, using 1: {err}");
			1.
		});

		let props = lenient(path, obj.get_object("props").and(obj.get_value("props")));

		let children = match lenient(path, obj.get_list("children")) {
			Some(children) => children
				.iter()
				.enumerate()
				.map(|(i, child)| Self::from_json_at(&format!("{path}.children[{i}]"), child))
				.collect(),
			None => Vec::new(),
		};

		Self {
			angle,
			mag,
			id: lenient(path, obj.get_str("id")).map(str::to_owned),
			uri: lenient(path, obj.get_str("uri")).map(str::to_owned),
			props: props.cloned(),
			sort: lenient(path, obj.get_f32("sort")),
			hidden: lenient(path, obj.get_bool("hidden")).unwrap_or(false),
			children,
		}
	}

	/// Serializes the description. Unset optional fields are omitted.
	pub fn to_json(&self) -> JsonValue {
		let mut obj = json::object! {
			angle: tidy(self.angle),
			mag: tidy(self.mag),
		};
		if let Some(id) = &self.id {
			obj["id"] = id.as_str().into();
		}
		if let Some(uri) = &self.uri {
			obj["uri"] = uri.as_str().into();
		}
		if let Some(props) = &self.props {
			obj["props"] = props.clone();
		}
		if let Some(sort) = self.sort {
			obj["sort"] = tidy(sort).into();
		}
		if self.hidden {
			obj["hidden"] = true.into();
		}
		if !self.children.is_empty() {
			obj["children"] = JsonValue::Array(self.children.iter().map(Self::to_json).collect());
		}
		obj
	}

	/// Node of this description alone, with the angle converted to radians.
	fn to_node(&self) -> SkeleNode {
		let mut node = SkeleNode::new(deg_to_rad(self.angle), self.mag);
		node.id = self.id.clone();
		node.uri = self.uri.clone();
		node.props = self.props.clone().map(Arc::new);
		node.sort = self.sort;
		node.hidden = self.hidden;
		node
	}
}

/// Rounds away the noise of f32 storage and degree conversion before writing.
///
/// Snaps to 5 decimals only within f32 precision of `val`; anything else keeps its shortest
/// f32 spelling, so tiny magnitudes survive.
fn tidy(val: f32) -> f64 {
	let wide = f64::from(val);
	let snapped = (wide * 1e5).round() / 1e5;
	if (snapped - wide).abs() <= wide.abs() * f64::from(f32::EPSILON) * 2. {
		return snapped;
	}
	val.to_string().parse().unwrap_or(wide)
}

impl Skeleton {
	/// Builds a skeleton whose main root is `data`'s top node.
	///
	/// Children without an id receive a fresh one; the root keeps its id, possibly none.
	pub fn from_data(data: &SkeleData) -> Self {
		let mut skele = Skeleton::new_with_root(data.to_node());
		let root = skele.root();

		let mut stack = vec![(root, data)];
		while let Some((parent, data)) = stack.pop() {
			for child in &data.children {
				let handle = skele.spawn(parent, child.to_node());
				stack.push((handle, child));
			}
		}
		skele
	}

	/// Description of the main tree, ready for saving: the root's angle and mag become 0 and 1.
	pub fn to_data(&self) -> SkeleData {
		let mut data = self.node_data(self.root()).unwrap_or_default();
		data.angle = 0.;
		data.mag = 1.;
		data
	}

	/// Description of the subtree at `id` as it is, `None` for stale handles.
	pub fn node_data(&self, id: NodeId) -> Option<SkeleData> {
		let node = self.get(id)?;
		Some(SkeleData {
			angle: rad_to_deg(node.angle()),
			mag: node.mag(),
			id: node.id().map(str::to_owned),
			uri: node.uri.clone(),
			props: node.props.as_deref().cloned(),
			sort: node.sort,
			hidden: node.hidden,
			children: self
				.children(id)
				.into_iter()
				.filter_map(|child| self.node_data(child))
				.collect(),
		})
	}
}
