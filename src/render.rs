use std::sync::Arc;

use glam::Vec2;
use indextree::NodeId;

use crate::node::Props;
use crate::skeleton::Skeleton;

/// One visible sprite of a ticked skeleton, ready for painting.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderInfo {
	/// Node the sprite belongs to.
	pub node: NodeId,
	pub uri: String,
	pub props: Option<Props>,
	/// Anchor of the sprite: the interpolated position of the parent joint.
	pub center: Vec2,
	/// Square size, `mag * scale` on both axes.
	pub transform: Vec2,
	/// Degrees.
	pub direction: f32,
	pub sort: f32,
}

/// Maps structurally equal props to one shared instance.
#[derive(Debug, Default)]
pub struct PropsInterner {
	seen: Vec<Props>,
}

impl PropsInterner {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn intern(&mut self, props: &Props) -> Props {
		if let Some(found) = self.seen.iter().find(|seen| **seen == *props) {
			return Arc::clone(found);
		}
		self.seen.push(Arc::clone(props));
		Arc::clone(props)
	}

	pub fn len(&self) -> usize {
		self.seen.len()
	}

	pub fn is_empty(&self) -> bool {
		self.seen.is_empty()
	}
}

impl Skeleton {
	/// Render records of the main tree at blend factor `t`. See [`Self::render_from`].
	pub fn render(&self, t: f32, dedupe: &mut impl FnMut(&Props) -> Props) -> Vec<RenderInfo> {
		self.render_from(self.root(), t, dedupe)
	}

	/// Render records for every visible node of the subtree at `id` that carries a sprite,
	/// sorted by sort key. Equal keys keep walk order.
	pub fn render_from(
		&self,
		id: NodeId,
		t: f32,
		dedupe: &mut impl FnMut(&Props) -> Props,
	) -> Vec<RenderInfo> {
		let mut infos = Vec::new();

		for (handle, node) in self.walk_nodes(id) {
			let Some(uri) = &node.uri else {
				continue;
			};
			if node.hidden {
				continue;
			}

			let pose = node.state_at(t);
			let center = match self.parent(handle).and_then(|parent| self.state_at(parent, t)) {
				Some(parent_pose) => parent_pose.transform,
				None => pose.transform,
			};

			infos.push(RenderInfo {
				node: handle,
				uri: uri.clone(),
				props: node.props.as_ref().map(|props| dedupe(props)),
				center,
				transform: Vec2::splat(node.mag() * pose.scale),
				direction: pose.direction(),
				sort: node.sort_key(),
			});
		}

		// stable: ties keep walk order
		infos.sort_by(|a, b| a.sort.total_cmp(&b.sort));
		infos
	}
}

#[cfg(test)]
mod tests {
	use glam::vec2;

	use crate::node::SkeleNode;

	use super::*;

	fn identity(props: &Props) -> Props {
		Arc::clone(props)
	}

	#[test]
	fn test_single_leaf() {
		let mut skele = Skeleton::new_with_root(SkeleNode::new(0., 1.));
		let leaf = skele.new_node(SkeleNode::new(0., 0.3).with_id("leaf").with_uri("sprite:x"));
		let root = skele.root();
		skele.add(root, leaf).unwrap();
		skele.tick_root();

		let infos = skele.render(1., &mut identity);
		assert_eq!(infos.len(), 1);
		let info = &infos[0];
		assert_eq!(info.uri, "sprite:x");
		assert_eq!(info.direction, 0.);
		assert!(info.transform.abs_diff_eq(vec2(0.3, 0.3), 1e-6));
		assert_eq!(info.center, skele.get(root).unwrap().state().unwrap().transform);
		assert_eq!(info.node, leaf);
	}

	#[test]
	fn test_sorted_and_stable() {
		let mut skele = Skeleton::new_with_root(SkeleNode::default());
		let root = skele.root();
		for (uri, sort) in [("a", 2.), ("b", 1.), ("c", 2.), ("d", -1.), ("e", 1.)] {
			let node = skele.new_node(SkeleNode::new(0., 1.).with_uri(uri).with_sort(sort));
			skele.add(root, node).unwrap();
		}
		let unsorted = skele.new_node(SkeleNode::new(0., 1.).with_uri("f"));
		skele.add(root, unsorted).unwrap();
		skele.tick_root();

		let uris = skele
			.render(1., &mut identity)
			.into_iter()
			.map(|info| info.uri)
			.collect::<Vec<_>>();
		assert_eq!(uris, ["d", "f", "b", "e", "a", "c"]);
	}

	#[test]
	fn test_negative_zero_sorts_as_unsorted() {
		let mut skele = Skeleton::new_with_root(SkeleNode::default());
		let root = skele.root();
		for (uri, sort) in [("a", None), ("b", Some(-0.)), ("c", Some(0.))] {
			let mut node = SkeleNode::default().with_uri(uri);
			node.sort = sort;
			let node = skele.new_node(node);
			skele.add(root, node).unwrap();
		}
		skele.tick_root();

		let uris = skele
			.render(1., &mut identity)
			.into_iter()
			.map(|info| info.uri)
			.collect::<Vec<_>>();
		assert_eq!(uris, ["a", "b", "c"]);
	}

	#[test]
	fn test_hidden_and_bare_nodes_skipped() {
		let mut skele = Skeleton::new_with_root(SkeleNode::default());
		let root = skele.root();
		let hidden = skele.new_node(SkeleNode::default().with_uri("sprite:hidden").with_hidden(true));
		let joint = skele.new_node(SkeleNode::default());
		let shown = skele.new_node(SkeleNode::default().with_uri("sprite:shown"));
		skele.add(root, hidden).unwrap();
		skele.add(root, joint).unwrap();
		skele.add(hidden, shown).unwrap();
		skele.tick_root();

		let infos = skele.render(1., &mut identity);
		assert_eq!(infos.len(), 1);
		assert_eq!(infos[0].uri, "sprite:shown");
	}

	#[test]
	fn test_center_follows_interpolated_parent() {
		let mut skele = Skeleton::new_with_root(SkeleNode::new(0., 1.));
		let leaf = skele.new_node(SkeleNode::new(0., 1.).with_uri("sprite:x"));
		let root = skele.root();
		skele.add(root, leaf).unwrap();
		skele.tick_move(0., 0., 1., 0.);
		skele.tick_move(10., 0., 1., 0.);

		let infos = skele.render(0.5, &mut identity);
		assert!(infos[0].center.abs_diff_eq(vec2(5., 0.), 1e-6));
	}

	#[test]
	fn test_props_interned() {
		let mut skele = Skeleton::new_with_root(SkeleNode::default());
		let root = skele.root();
		for _ in 0..3 {
			let props = Arc::new(json::object! { tint: "red" });
			let node = skele.new_node(SkeleNode::default().with_uri("sprite:x").with_props(props));
			skele.add(root, node).unwrap();
		}
		skele.tick_root();

		let mut interner = PropsInterner::new();
		let infos = skele.render(1., &mut |props| interner.intern(props));
		assert_eq!(interner.len(), 1);
		let first = infos[0].props.as_ref().unwrap();
		assert!(infos
			.iter()
			.all(|info| Arc::ptr_eq(info.props.as_ref().unwrap(), first)));
	}
}
