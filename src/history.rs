//! Linear undo/redo history of immutable document snapshots.

use std::collections::VecDeque;

/// Default number of undo entries kept per document.
pub const DEFAULT_CAPACITY: usize = 100;

/// A snapshot together with a human readable description of the edit that produced it.
#[derive(Clone, Debug)]
pub struct HistoryEntry<T> {
	pub state: T,
	pub description: String,
}

/// Undo/redo stacks for one open document.
///
/// The oldest undo entry is the floor: [`History::undo`] never pops it. Concatenating the undo
/// and redo stacks always gives the full history in chronological order.
#[derive(Clone, Debug)]
pub struct History<T> {
	/// Oldest first, the current state last.
	undo: VecDeque<HistoryEntry<T>>,
	/// Next entry to redo first.
	redo: VecDeque<HistoryEntry<T>>,
	capacity: usize,
	/// Key of the latest push, if it may be coalesced with.
	continuity: Option<String>,
}

impl<T> Default for History<T> {
	fn default() -> Self {
		Self::new()
	}
}

impl<T> History<T> {
	pub fn new() -> Self {
		Self::with_capacity(DEFAULT_CAPACITY)
	}

	/// A capacity of `0` is treated as `1`, so the floor always survives.
	pub fn with_capacity(capacity: usize) -> Self {
		Self {
			undo: VecDeque::new(),
			redo: VecDeque::new(),
			capacity: capacity.max(1),
			continuity: None,
		}
	}

	/// Records a new state.
	///
	/// A push carrying the same continuity key as the previous one replaces the top entry
	/// instead of adding a step, so a whole drag undoes at once. Any other push drops the redo
	/// stack and evicts the oldest entries beyond capacity.
	pub fn push(&mut self, state: T, description: impl Into<String>, continuity: Option<&str>) {
		let entry = HistoryEntry {
			state,
			description: description.into(),
		};

		let coalesce = continuity.is_some() && continuity == self.continuity.as_deref();
		if coalesce {
			if let Some(top) = self.undo.back_mut() {
				*top = entry;
				return;
			}
		}

		tracing::debug!("History push {:?}", entry.description);
		self.undo.push_back(entry);
		self.redo.clear();
		while self.undo.len() > self.capacity {
			self.undo.pop_front();
		}
		self.continuity = continuity.map(str::to_owned);
	}

	/// Steps back one entry and returns the new current one.
	///
	/// At the floor this is a no-op returning the floor. `None` only on an empty history.
	pub fn undo(&mut self) -> Option<&HistoryEntry<T>> {
		self.continuity = None;
		if self.undo.len() > 1 {
			if let Some(top) = self.undo.pop_back() {
				tracing::debug!("History undo {:?}", top.description);
				self.redo.push_front(top);
			}
		}
		self.undo.back()
	}

	/// Re-applies the next undone entry and returns it, `None` if there is nothing to redo.
	///
	/// Only a redo with nothing to redo resets the continuity key.
	pub fn redo(&mut self) -> Option<&HistoryEntry<T>> {
		let Some(entry) = self.redo.pop_front() else {
			self.continuity = None;
			return None;
		};

		tracing::debug!("History redo {:?}", entry.description);
		self.undo.push_back(entry);
		self.undo.back()
	}

	/// Makes the entry at `index` of [`Self::entries`] current: it and everything before it
	/// become undoable, everything after it redoable. Out of range indices select the last entry.
	pub fn jump_to_state(&mut self, index: usize) -> Option<&HistoryEntry<T>> {
		self.continuity = None;

		let mut all = std::mem::take(&mut self.undo);
		all.append(&mut self.redo);
		if all.is_empty() {
			return None;
		}

		let split = index.min(all.len() - 1) + 1;
		self.redo = all.split_off(split);
		self.undo = all;
		self.undo.back()
	}

	pub fn can_undo(&self) -> bool {
		self.undo.len() > 1
	}

	pub fn can_redo(&self) -> bool {
		!self.redo.is_empty()
	}

	/// The entry the document currently shows.
	pub fn current(&self) -> Option<&HistoryEntry<T>> {
		self.undo.back()
	}

	/// Position of [`Self::current`] within [`Self::entries`].
	pub fn current_index(&self) -> Option<usize> {
		self.undo.len().checked_sub(1)
	}

	/// Every entry, oldest first, undone ones included.
	pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry<T>> + '_ {
		self.undo.iter().chain(self.redo.iter())
	}

	pub fn len(&self) -> usize {
		self.undo.len() + self.redo.len()
	}

	pub fn is_empty(&self) -> bool {
		self.undo.is_empty() && self.redo.is_empty()
	}

	pub fn capacity(&self) -> usize {
		self.capacity
	}

	/// Forgets everything, e.g. when the document is reloaded from disk.
	pub fn clear(&mut self) {
		self.undo.clear();
		self.redo.clear();
		self.continuity = None;
	}
}
