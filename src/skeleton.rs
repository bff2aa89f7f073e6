mod transforms;
mod tree;

use std::cell::RefCell;
use std::collections::HashMap;

use indextree::{Arena, NodeId};

use crate::node::SkeleNode;

pub type SkeleResult<T> = Result<T, SkeleError>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SkeleError {
	#[error("A node cannot be added to itself")]
	SelfParent,
	#[error("A node cannot be added below one of its own descendants")]
	Cycle,
	#[error("Node handle refers to a removed or foreign node")]
	Removed,
	#[error("The main root of a skeleton cannot be deleted")]
	DeleteMainRoot,
	#[error("Id {0:?} is already used in this tree")]
	DuplicateId(String),
}

impl From<indextree::NodeError> for SkeleError {
	fn from(err: indextree::NodeError) -> Self {
		match err {
			indextree::NodeError::AppendSelf => SkeleError::SelfParent,
			indextree::NodeError::AppendAncestor => SkeleError::Cycle,
			indextree::NodeError::Removed => SkeleError::Removed,
			_ => SkeleError::Cycle,
		}
	}
}

/// Per-root `id -> node` tables, filled on demand and dropped wholesale on structural change.
type LookupCache = HashMap<NodeId, HashMap<String, NodeId>>;

/// A sprite rig: an arena of [`SkeleNode`]s with one main tree.
///
/// Nodes detached with [`Skeleton::remove`] stay in the arena as roots of their own trees until
/// deleted. Snapshots (`clone`) copy only the main tree.
pub struct Skeleton {
	arena: Arena<SkeleNode>,
	root: NodeId,
	lookup: RefCell<LookupCache>,
}

impl Skeleton {
	pub fn new_with_root(node: SkeleNode) -> Self {
		let mut arena = Arena::new();
		let root = arena.new_node(node);
		arena[root].get_mut().root = Some(root);

		Self {
			root,
			arena,
			lookup: RefCell::new(HashMap::new()),
		}
	}

	/// Allocates a detached node, the root of its own single-node tree.
	pub fn new_node(&mut self, node: SkeleNode) -> NodeId {
		let id = self.arena.new_node(node);
		self.arena[id].get_mut().root = Some(id);
		id
	}

	/// Handle of the main tree's root.
	pub fn root(&self) -> NodeId {
		self.root
	}

	pub fn contains(&self, id: NodeId) -> bool {
		self.arena.get(id).is_some_and(|node| !node.is_removed())
	}

	fn get_internal_node(&self, id: NodeId) -> Option<&indextree::Node<SkeleNode>> {
		self.arena.get(id).filter(|node| !node.is_removed())
	}

	pub fn get(&self, id: NodeId) -> Option<&SkeleNode> {
		Some(self.get_internal_node(id)?.get())
	}

	pub fn get_mut(&mut self, id: NodeId) -> Option<&mut SkeleNode> {
		self.arena
			.get_mut(id)
			.filter(|node| !node.is_removed())
			.map(|node| node.get_mut())
	}

	pub fn parent(&self, id: NodeId) -> Option<NodeId> {
		self.get_internal_node(id)?.parent()
	}

	/// Children in draw-priority order.
	pub fn children(&self, id: NodeId) -> Vec<NodeId> {
		if !self.contains(id) {
			return Vec::new();
		}
		id.children(&self.arena).collect()
	}

	/// Root of the tree `id` currently belongs to.
	pub fn root_of(&self, id: NodeId) -> Option<NodeId> {
		self.get(id)?.root
	}

	pub fn is_root(&self, id: NodeId) -> bool {
		self.contains(id) && self.parent(id).is_none()
	}

	/// Number of live nodes in the arena, detached trees included.
	pub fn len(&self) -> usize {
		self.arena.iter().filter(|node| !node.is_removed()).count()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn invalidate(&self, root: NodeId) {
		self.lookup.borrow_mut().remove(&root);
	}
}

impl Clone for Skeleton {
	/// Copies the main tree into a fresh arena. Ids are preserved, handles are not.
	fn clone(&self) -> Self {
		let items = self.collect_subtree(self.root);
		let mut arena = Arena::new();
		let root = graft(&mut arena, items, None).unwrap_or_else(|| arena.new_node(SkeleNode::default()));

		Self {
			arena,
			root,
			lookup: RefCell::new(HashMap::new()),
		}
	}
}

impl std::fmt::Debug for Skeleton {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("Skeleton")
			.field("root", &self.root)
			.field("nodes", &self.len())
			.field("cached_roots", &self.lookup.borrow().len())
			.finish()
	}
}

/// Subtree flattened in pre-order: (old handle, old parent, node data).
type SubtreeItems = Vec<(NodeId, Option<NodeId>, SkeleNode)>;

/// Inserts flattened subtree `items` into `dest`, below `parent` if given.
///
/// Returns the handle of the copied subtree's top node, `None` if `items` is empty.
fn graft(dest: &mut Arena<SkeleNode>, items: SubtreeItems, parent: Option<NodeId>) -> Option<NodeId> {
	let mut remap: HashMap<NodeId, NodeId> = HashMap::with_capacity(items.len());
	let mut top = None;

	for (old, old_parent, data) in items {
		let new = dest.new_node(data);
		if top.is_none() {
			top = Some(new);
			if let Some(parent) = parent {
				parent.append(new, dest);
			}
		} else if let Some(&new_parent) = old_parent.and_then(|p| remap.get(&p)) {
			new_parent.append(new, dest);
		}
		remap.insert(old, new);
	}

	let top = top?;
	let root = parent.and_then(|p| dest[p].get().root).unwrap_or(top);
	for new in remap.into_values() {
		dest[new].get_mut().root = Some(root);
	}

	Some(top)
}
