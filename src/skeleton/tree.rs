use std::collections::HashMap;
use std::fmt::Display;

use indextree::{Arena, NodeId};

use crate::math::transform::rad_to_deg;
use crate::node::{random_id, SkeleNode};

use super::{graft, SkeleError, SkeleResult, Skeleton, SubtreeItems};

impl Skeleton {
	/// Reparents `child` under `parent`, after its existing children.
	///
	/// The child gets a fresh id if it has none, and its whole subtree moves to `parent`'s tree.
	pub fn add(&mut self, parent: NodeId, child: NodeId) -> SkeleResult<()> {
		if parent == child {
			return Err(SkeleError::SelfParent);
		}
		let (Some(old_root), Some(new_root)) = (self.root_of(child), self.root_of(parent)) else {
			return Err(SkeleError::Removed);
		};

		parent.checked_append(child, &mut self.arena)?;
		self.set_root_rec(child, new_root);
		self.invalidate(old_root);
		self.invalidate(new_root);

		if self.arena[child].get().id.is_none() {
			let id = self.unused_id(new_root);
			tracing::trace!("Assigned id {id:?} to node {child:?}");
			self.arena[child].get_mut().id = Some(id);
		}

		Ok(())
	}

	/// Allocates `node` as the last child of the live node `parent`, assigning an id if needed.
	pub(crate) fn spawn(&mut self, parent: NodeId, node: SkeleNode) -> NodeId {
		let root = self.root_of(parent).unwrap_or(parent);
		let child = self.arena.new_node(node);
		parent.append(child, &mut self.arena);
		self.invalidate(root);

		let child_node = self.arena[child].get_mut();
		child_node.root = Some(root);
		if child_node.id.is_none() {
			let id = self.unused_id(root);
			self.arena[child].get_mut().id = Some(id);
		}
		child
	}

	/// Detaches `id` from its parent, making it the root of its own tree. No-op on roots.
	pub fn remove(&mut self, id: NodeId) {
		let Some(old_root) = self.root_of(id) else {
			return;
		};
		if self.parent(id).is_none() {
			return;
		}

		id.detach(&mut self.arena);
		self.set_root_rec(id, id);
		self.invalidate(old_root);
		self.invalidate(id);
	}

	/// Removes the subtree at `id` from the arena. Its handles become stale.
	pub fn delete(&mut self, id: NodeId) -> SkeleResult<()> {
		if id == self.root {
			return Err(SkeleError::DeleteMainRoot);
		}
		let root = self.root_of(id).ok_or(SkeleError::Removed)?;

		id.remove_subtree(&mut self.arena);
		self.invalidate(root);
		self.invalidate(id);
		Ok(())
	}

	/// Renames a node. The new id must not be used elsewhere in its tree.
	pub fn set_id(&mut self, id: NodeId, new_id: Option<String>) -> SkeleResult<()> {
		let root = self.root_of(id).ok_or(SkeleError::Removed)?;
		if let Some(new_id) = &new_id {
			if self.find_id_from(root, new_id).is_some_and(|found| found != id) {
				return Err(SkeleError::DuplicateId(new_id.clone()));
			}
		}

		self.arena[id].get_mut().id = new_id;
		self.invalidate(root);
		Ok(())
	}

	/// Looks `id` up in the main tree.
	pub fn find_id(&self, id: &str) -> Option<NodeId> {
		self.find_id_from(self.root, id)
	}

	/// Looks `id` up in whichever tree `node` belongs to.
	///
	/// The first lookup after a structural change walks the whole tree; later ones hit the cache.
	pub fn find_id_from(&self, node: NodeId, id: &str) -> Option<NodeId> {
		let root = self.root_of(node)?;
		let mut lookup = self.lookup.borrow_mut();
		let ids = lookup.entry(root).or_insert_with(|| {
			tracing::trace!("Rebuilding id lookup for root {root:?}");
			let mut ids = HashMap::new();
			for (handle, node) in self.walk_nodes(root) {
				if let Some(id) = &node.id {
					ids.entry(id.clone()).or_insert(handle);
				}
			}
			ids
		});
		ids.get(id).copied()
	}

	/// Pre-order handles of the subtree at `id`: parents before children, siblings in order.
	///
	/// Each call starts a fresh walk. Stale handles yield nothing.
	pub fn walk(&self, id: NodeId) -> impl Iterator<Item = NodeId> + '_ {
		self.contains(id)
			.then(|| id.descendants(&self.arena))
			.into_iter()
			.flatten()
	}

	/// Same order as [`Self::walk`], paired with node data.
	pub fn walk_nodes(&self, id: NodeId) -> impl Iterator<Item = (NodeId, &SkeleNode)> + '_ {
		self.walk(id).map(|handle| (handle, self.arena[handle].get()))
	}

	/// Deep-copies the subtree at `id`, below `parent` or as a new detached root.
	///
	/// Ids are copied verbatim, so a copy placed inside its source tree shares them.
	pub fn clone_subtree(&mut self, id: NodeId, parent: Option<NodeId>) -> SkeleResult<NodeId> {
		if !self.contains(id) {
			return Err(SkeleError::Removed);
		}
		let parent_root = match parent {
			Some(parent) => Some(self.root_of(parent).ok_or(SkeleError::Removed)?),
			None => None,
		};

		let items = self.collect_subtree(id);
		let copy = graft(&mut self.arena, items, parent).ok_or(SkeleError::Removed)?;
		if let Some(root) = parent_root {
			self.invalidate(root);
		}
		Ok(copy)
	}

	/// Copies the subtree at `id` into a new skeleton whose main root is the copy of `id`.
	pub fn extract(&self, id: NodeId) -> Option<Skeleton> {
		if !self.contains(id) {
			return None;
		}
		let mut arena = Arena::new();
		let root = graft(&mut arena, self.collect_subtree(id), None)?;

		Some(Skeleton {
			arena,
			root,
			lookup: Default::default(),
		})
	}

	pub(super) fn collect_subtree(&self, id: NodeId) -> SubtreeItems {
		self.walk(id)
			.map(|handle| {
				let node = &self.arena[handle];
				(handle, node.parent(), node.get().clone())
			})
			.collect()
	}

	fn set_root_rec(&mut self, id: NodeId, root: NodeId) {
		let subtree = self.walk(id).collect::<Vec<_>>();
		for handle in subtree {
			self.arena[handle].get_mut().root = Some(root);
		}
	}

	fn unused_id(&self, root: NodeId) -> String {
		loop {
			let id = random_id();
			if !self.walk_nodes(root).any(|(_, node)| node.id() == Some(id.as_str())) {
				return id;
			}
		}
	}
}

fn rec_fmt(
	indent: usize,
	f: &mut std::fmt::Formatter<'_>,
	node_id: NodeId,
	arena: &Arena<SkeleNode>,
) -> std::fmt::Result {
	let Some(node) = arena.get(node_id) else {
		return Ok(());
	};
	let node = node.get();

	let id = node.id().unwrap_or("(anonymous)");
	#[cfg(feature = "owo")]
	let id = {
		use owo_colors::OwoColorize;
		id.magenta()
	};

	write!(
		f,
		"{}- [{}] {:.1}° x{:.3}",
		"  ".repeat(indent),
		id,
		rad_to_deg(node.angle()),
		node.mag()
	)?;
	if let Some(uri) = &node.uri {
		#[cfg(feature = "owo")]
		let uri = {
			use owo_colors::OwoColorize;
			uri.green()
		};
		write!(f, " {uri}")?;
	}
	if node.hidden {
		write!(f, " (hidden)")?;
	}
	writeln!(f)?;

	for child in node_id.children(arena) {
		rec_fmt(indent + 1, f, child, arena)?;
	}

	Ok(())
}

impl Display for Skeleton {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if !self.contains(self.root) {
			return write!(f, "(empty)");
		}
		rec_fmt(0, f, self.root, &self.arena)
	}
}
