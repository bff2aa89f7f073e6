use std::sync::Arc;

use glam::Vec2;
use indextree::NodeId;

use crate::math::interp::InterpRange;
use crate::math::transform::{polar, Pose};

/// Opaque rendering modifiers attached to a sprite node.
pub type Props = Arc<json::JsonValue>;

/// Length of generated node ids.
pub const ID_LEN: usize = 8;

/// Random alphanumeric id. Uniqueness within a tree is checked by the caller.
pub(crate) fn random_id() -> String {
	let mut id = uuid::Uuid::new_v4().simple().to_string();
	id.truncate(ID_LEN);
	id
}

/// One joint of a skeleton: a parent-relative offset, optionally carrying a sprite.
#[derive(Debug, Clone)]
pub struct SkeleNode {
	pub(crate) id: Option<String>,
	angle: f32,
	mag: f32,
	transform: Vec2,
	pub uri: Option<String>,
	pub props: Option<Props>,
	pub sort: Option<f32>,
	pub hidden: bool,
	pub(crate) state: Option<Pose>,
	pub(crate) last_state: Option<Pose>,
	pub(crate) root: Option<NodeId>,
}

impl Default for SkeleNode {
	fn default() -> Self {
		Self::new(0., 1.)
	}
}

impl SkeleNode {
	/// `angle` is in radians.
	pub fn new(angle: f32, mag: f32) -> Self {
		Self {
			id: None,
			angle,
			mag,
			transform: polar(angle, mag),
			uri: None,
			props: None,
			sort: None,
			hidden: false,
			state: None,
			last_state: None,
			root: None,
		}
	}

	pub fn with_id(mut self, id: impl Into<String>) -> Self {
		self.id = Some(id.into());
		self
	}

	pub fn with_uri(mut self, uri: impl Into<String>) -> Self {
		self.uri = Some(uri.into());
		self
	}

	pub fn with_props(mut self, props: Props) -> Self {
		self.props = Some(props);
		self
	}

	pub fn with_sort(mut self, sort: f32) -> Self {
		self.sort = Some(sort);
		self
	}

	pub fn with_hidden(mut self, hidden: bool) -> Self {
		self.hidden = hidden;
		self
	}

	/// Unique within the owning tree. Changed through [`crate::skeleton::Skeleton::set_id`].
	pub fn id(&self) -> Option<&str> {
		self.id.as_deref()
	}

	pub fn angle(&self) -> f32 {
		self.angle
	}

	pub fn mag(&self) -> f32 {
		self.mag
	}

	/// Static local offset, `mag` along `angle`. A root placed with [`Self::place`] holds its position here.
	pub fn transform(&self) -> Vec2 {
		self.transform
	}

	pub fn set_angle(&mut self, angle: f32) {
		self.angle = angle;
		self.transform = polar(self.angle, self.mag);
	}

	pub fn set_mag(&mut self, mag: f32) {
		self.mag = mag;
		self.transform = polar(self.angle, self.mag);
	}

	/// Sets position, size and direction at once, as when moving a root with the view.
	pub fn place(&mut self, position: Vec2, mag: f32, angle: f32) {
		self.angle = angle;
		self.mag = mag;
		self.transform = position;
	}

	/// Draw order key, `0` when unset. `-0` sorts as `0`.
	pub fn sort_key(&self) -> f32 {
		self.sort.unwrap_or_default() + 0.
	}

	/// Pose from the latest tick, `None` before the first one.
	pub fn state(&self) -> Option<&Pose> {
		self.state.as_ref()
	}

	/// Pose from the tick before the latest one.
	pub fn last_state(&self) -> Option<&Pose> {
		self.last_state.as_ref()
	}

	/// Handle of the root of the tree this node belongs to.
	pub fn root(&self) -> Option<NodeId> {
		self.root
	}

	/// Blend of the last two ticks. Before any tick, the default pose.
	pub fn state_at(&self, t: f32) -> Pose {
		match (self.last_state, self.state) {
			(Some(beg), Some(end)) => InterpRange::new(beg, end).at(t),
			_ => Pose::default(),
		}
	}

	/// Slides the current pose into the last one and installs `pose` as current.
	///
	/// The first pose seeds both slots.
	pub(crate) fn push_state(&mut self, pose: Pose) {
		self.last_state = Some(self.state.unwrap_or(pose));
		self.state = Some(pose);
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::FRAC_PI_2;

	use glam::vec2;

	use super::*;

	#[test]
	fn test_setters_refresh_transform() {
		let mut node = SkeleNode::new(0., 2.);
		assert!(node.transform().abs_diff_eq(vec2(2., 0.), 1e-6));

		node.set_angle(FRAC_PI_2);
		assert!(node.transform().abs_diff_eq(vec2(0., 2.), 1e-6));

		node.set_mag(0.5);
		assert!(node.transform().abs_diff_eq(vec2(0., 0.5), 1e-6));
	}

	#[test]
	fn test_first_push_seeds_last_state() {
		let mut node = SkeleNode::default();
		assert!(node.state().is_none());

		let pose = Pose::new().with_transform(vec2(3., 4.));
		node.push_state(pose);
		assert_eq!(node.last_state(), Some(&pose));
		assert_eq!(node.state(), Some(&pose));

		let next = Pose::new().with_transform(vec2(5., 4.));
		node.push_state(next);
		assert_eq!(node.last_state(), Some(&pose));
		assert_eq!(node.state_at(0.5).transform, vec2(4., 4.));
	}

	#[test]
	fn test_random_ids() {
		let a = random_id();
		assert_eq!(a.len(), ID_LEN);
		assert!(a.chars().all(|c| c.is_ascii_alphanumeric()));
		assert_ne!(a, random_id());
	}
}
