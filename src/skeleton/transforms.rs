use glam::vec2;
use indextree::NodeId;

use crate::math::transform::{deg_to_rad, polar, Pose};

use super::Skeleton;

impl Skeleton {
	/// Recomputes the absolute poses of the subtree at `id`, combining each node's offset with
	/// its parent's fresh pose in a pre-order traversal.
	///
	/// Every node's previous pose slides into its last state first.
	pub fn tick(&mut self, id: NodeId) {
		// Collected up front: poses are written while walking.
		let order = self.walk(id).collect::<Vec<_>>();

		for handle in order {
			let parent_pose = self.arena[handle]
				.parent()
				.map(|parent| self.arena[parent].get().state.unwrap_or_default());

			let node = self.arena[handle].get_mut();
			let pose = match parent_pose {
				// A root's pose is its own static placement.
				None => Pose {
					rotation: node.angle(),
					scale: node.mag(),
					transform: node.transform(),
				},
				Some(parent) => {
					let rotation = parent.rotation + node.angle();
					Pose {
						rotation,
						scale: parent.scale,
						transform: parent.transform + polar(rotation, node.mag() * parent.scale),
					}
				}
			};
			node.push_state(pose);
		}
	}

	/// Ticks the main tree.
	pub fn tick_root(&mut self) {
		self.tick(self.root);
	}

	/// Moves the main root to `(x, y)` with the given size and direction, then ticks the tree.
	pub fn tick_move(&mut self, x: f32, y: f32, size: f32, direction: f32) {
		if let Some(root) = self.get_mut(self.root) {
			root.place(vec2(x, y), size, deg_to_rad(direction));
		}
		self.tick_root();
	}

	/// Pose of `id` blended between its last two ticks, `t = 0` being the older one.
	pub fn state_at(&self, id: NodeId, t: f32) -> Option<Pose> {
		Some(self.get(id)?.state_at(t))
	}
}

#[cfg(test)]
mod tests {
	use std::f32::consts::{FRAC_PI_2, PI};

	use glam::vec2;

	use crate::node::SkeleNode;

	use super::*;

	fn arm() -> (Skeleton, NodeId, NodeId) {
		let mut skele = Skeleton::new_with_root(SkeleNode::new(0., 1.));
		let leaf = skele.new_node(SkeleNode::new(0., 0.3).with_id("leaf"));
		let root = skele.root();
		skele.add(root, leaf).unwrap();
		(skele, root, leaf)
	}

	#[test]
	fn test_tick_composes_offsets() {
		let mut skele = Skeleton::new_with_root(SkeleNode::new(0., 2.));
		let root = skele.root();
		let upper = skele.new_node(SkeleNode::new(FRAC_PI_2, 1.));
		let lower = skele.new_node(SkeleNode::new(FRAC_PI_2, 0.5));
		skele.add(root, upper).unwrap();
		skele.add(upper, lower).unwrap();
		skele.tick_root();

		let root_pose = skele.get(root).unwrap().state().copied().unwrap();
		assert_eq!(root_pose.scale, 2.);
		assert!(root_pose.transform.abs_diff_eq(vec2(2., 0.), 1e-6));

		// scale is inherited, rotation accumulates
		let upper_pose = skele.get(upper).unwrap().state().copied().unwrap();
		assert!((upper_pose.rotation - FRAC_PI_2).abs() < 1e-6);
		assert!(upper_pose.transform.abs_diff_eq(vec2(2., 2.), 1e-5));

		let lower_pose = skele.get(lower).unwrap().state().copied().unwrap();
		assert!((lower_pose.rotation - PI).abs() < 1e-6);
		assert!(lower_pose.transform.abs_diff_eq(vec2(1., 2.), 1e-5));
	}

	#[test]
	fn test_tick_is_idempotent() {
		let (mut skele, _, leaf) = arm();
		skele.tick_move(3., 4., 1.5, 30.);
		let first = skele.get(leaf).unwrap().state().copied().unwrap();

		skele.tick_root();
		let node = skele.get(leaf).unwrap();
		assert_eq!(node.state(), Some(&first));
		assert_eq!(node.last_state(), Some(&first));
	}

	#[test]
	fn test_state_at_endpoints() {
		let (mut skele, _, leaf) = arm();
		skele.tick_root();
		let before = skele.get(leaf).unwrap().state().copied().unwrap();

		skele.tick_move(5., -2., 1., 180.);
		let after = skele.get(leaf).unwrap().state().copied().unwrap();

		assert_eq!(skele.state_at(leaf, 0.), Some(before));
		assert_eq!(skele.state_at(leaf, 1.), Some(after));

		// 0° -> 180° goes through a quarter turn, never through 0 or 270
		let mid = skele.state_at(leaf, 0.5).unwrap();
		assert!((mid.rotation.abs() - FRAC_PI_2).abs() < 1e-5, "{}", mid.rotation);
		// state_at never writes back
		assert_eq!(skele.get(leaf).unwrap().state(), Some(&after));
	}

	#[test]
	fn test_tick_move_rotates_children() {
		let (mut skele, _, _) = arm();
		skele.tick_root();
		skele.tick_move(10., 20., 2., 90.);

		let leaf = skele.find_id("leaf").unwrap();
		let pose = skele.state_at(leaf, 1.).unwrap();
		assert!(pose.transform.abs_diff_eq(vec2(10., 20.6), 1e-5), "{}", pose.transform);
		assert!((pose.rotation - FRAC_PI_2).abs() < 1e-6);
		assert_eq!(pose.scale, 2.);
	}

	#[test]
	fn test_tick_subtree_uses_parent_state() {
		let (mut skele, root, leaf) = arm();
		skele.tick_root();
		skele.get_mut(leaf).unwrap().set_angle(FRAC_PI_2);
		skele.tick(leaf);

		let pose = skele.state_at(leaf, 1.).unwrap();
		assert!(pose.transform.abs_diff_eq(vec2(1., 0.3), 1e-6));
		// the parent was left alone
		let root = skele.get(root).unwrap();
		assert_eq!(root.state(), root.last_state());
	}

	#[test]
	fn test_state_before_tick() {
		let (skele, _, leaf) = arm();
		assert_eq!(skele.state_at(leaf, 0.5), Some(Pose::default()));
	}
}
