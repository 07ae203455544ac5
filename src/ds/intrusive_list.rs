//! Recency chain backed by [`SlotArena`].
//!
//! The arena owns every node. Nodes reference their neighbours only by
//! [`SlotId`], in two directions: `older` towards the eviction end and
//! `newer` towards the most recent end. The list keeps one id for each end.
//!
//! ```text
//!   oldest                                   newest
//!     │                                        │
//!     ▼                                        ▼
//!   [id_4] ──newer──► [id_0] ──newer──► [id_2]
//!          ◄──older──        ◄──older──
//! ```
//!
//! `push_newest`, `promote`, `pop_oldest` and `remove` are O(1).
//! `rank_from_newest` walks only the entries that are more recent than the
//! one asked about.

use rustc_hash::FxHashSet;

use crate::ds::slot_arena::{SlotArena, SlotId};
use crate::error::InvariantError;

#[derive(Debug)]
struct Node<T> {
    value: T,
    older: Option<SlotId>,
    newer: Option<SlotId>,
}

/// Doubly linked recency chain whose nodes are arena slots.
#[derive(Debug)]
pub struct IntrusiveList<T> {
    arena: SlotArena<Node<T>>,
    oldest: Option<SlotId>,
    newest: Option<SlotId>,
}

impl<T> IntrusiveList<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            arena: SlotArena::with_capacity(capacity),
            oldest: None,
            newest: None,
        }
    }

    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        self.arena.get(id).map(|node| &node.value)
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        self.arena.get_mut(id).map(|node| &mut node.value)
    }

    /// The next entry to evict.
    pub fn oldest(&self) -> Option<(SlotId, &T)> {
        let id = self.oldest?;
        self.get(id).map(|value| (id, value))
    }

    /// Appends `value` as the most recent entry.
    pub fn push_newest(&mut self, value: T) -> SlotId {
        let id = self.arena.insert(Node {
            value,
            older: None,
            newer: None,
        });
        self.link_newest(id);
        id
    }

    pub fn pop_oldest(&mut self) -> Option<T> {
        let id = self.oldest?;
        self.remove(id)
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        self.unlink(id)?;
        self.arena.remove(id).map(|node| node.value)
    }

    /// Makes `id` the most recent entry. Returns `false` if it is not linked.
    pub fn promote(&mut self, id: SlotId) -> bool {
        if self.newest == Some(id) {
            return true;
        }
        if self.unlink(id).is_none() {
            return false;
        }
        self.link_newest(id);
        true
    }

    /// Number of entries more recent than `id`; 0 for the newest.
    pub fn rank_from_newest(&self, id: SlotId) -> Option<usize> {
        self.arena.get(id)?;
        let mut rank = 0;
        let mut cursor = self.newest;
        while let Some(current) = cursor {
            if current == id {
                return Some(rank);
            }
            rank += 1;
            cursor = self.arena.get(current)?.older;
        }
        None
    }

    /// Iterates `(SlotId, &T)` from oldest to newest.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            list: self,
            cursor: self.oldest,
        }
    }

    pub fn clear(&mut self) {
        self.arena.clear();
        self.oldest = None;
        self.newest = None;
    }

    /// Splices `id` out and leaves it dangling in the arena.
    fn unlink(&mut self, id: SlotId) -> Option<()> {
        let node = self.arena.get_mut(id)?;
        let older = node.older.take();
        let newer = node.newer.take();

        match older.and_then(|o| self.arena.get_mut(o)) {
            Some(node) => node.newer = newer,
            None => self.oldest = newer,
        }
        match newer.and_then(|n| self.arena.get_mut(n)) {
            Some(node) => node.older = older,
            None => self.newest = older,
        }
        Some(())
    }

    fn link_newest(&mut self, id: SlotId) {
        let previous = self.newest.replace(id);
        if let Some(node) = self.arena.get_mut(id) {
            node.older = previous;
        }
        match previous.and_then(|p| self.arena.get_mut(p)) {
            Some(node) => node.newer = Some(id),
            None => self.oldest = Some(id),
        }
    }

    /// Walks the chain and checks link symmetry, both ends and the node count.
    pub fn validate(&self) -> Result<(), InvariantError> {
        let mut seen = FxHashSet::default();
        let mut cursor = self.oldest;
        let mut older = None;

        while let Some(id) = cursor {
            if !seen.insert(id) {
                return Err(InvariantError::new(format!("cycle at slot {}", id.index())));
            }
            let node = self
                .arena
                .get(id)
                .ok_or_else(|| InvariantError::new(format!("dangling link to slot {}", id.index())))?;
            if node.older != older {
                return Err(InvariantError::new(format!(
                    "slot {} has a broken older link",
                    id.index()
                )));
            }
            older = Some(id);
            cursor = node.newer;
        }

        if self.newest != older {
            return Err(InvariantError::new("newest end does not match the last linked node"));
        }
        if seen.len() != self.len() {
            return Err(InvariantError::new(format!(
                "{} nodes linked but arena holds {}",
                seen.len(),
                self.len()
            )));
        }
        Ok(())
    }
}

impl<T> Default for IntrusiveList<T> {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Iter<'a, T> {
    list: &'a IntrusiveList<T>,
    cursor: Option<SlotId>,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = (SlotId, &'a T);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        let node = self.list.arena.get(id)?;
        self.cursor = node.newer;
        Some((id, &node.value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn values(list: &IntrusiveList<u32>) -> Vec<u32> {
        list.iter().map(|(_, v)| *v).collect()
    }

    #[test]
    fn push_newest_orders_oldest_first() {
        let mut list = IntrusiveList::new();
        let a = list.push_newest(1);
        list.push_newest(2);
        list.push_newest(3);

        assert_eq!(values(&list), vec![1, 2, 3]);
        assert_eq!(list.oldest(), Some((a, &1)));
        list.validate().unwrap();
    }

    #[test]
    fn promote_from_each_position() {
        let mut list = IntrusiveList::new();
        let a = list.push_newest(1);
        let b = list.push_newest(2);
        let c = list.push_newest(3);

        assert!(list.promote(a));
        assert_eq!(values(&list), vec![2, 3, 1]);
        assert!(list.promote(c));
        assert_eq!(values(&list), vec![2, 1, 3]);
        assert!(list.promote(c));
        assert_eq!(values(&list), vec![2, 1, 3]);
        assert!(list.promote(b));
        assert_eq!(values(&list), vec![1, 3, 2]);
        list.validate().unwrap();
    }

    #[test]
    fn remove_middle_and_ends() {
        let mut list = IntrusiveList::new();
        let a = list.push_newest(1);
        let b = list.push_newest(2);
        let c = list.push_newest(3);

        assert_eq!(list.remove(b), Some(2));
        assert_eq!(values(&list), vec![1, 3]);
        list.validate().unwrap();
        assert_eq!(list.remove(c), Some(3));
        assert_eq!(list.remove(a), Some(1));
        assert!(list.is_empty());
        assert_eq!(list.oldest(), None);
        assert_eq!(list.remove(c), None);
        assert!(!list.promote(c));
        list.validate().unwrap();
    }

    #[test]
    fn pop_oldest_drains_in_order() {
        let mut list = IntrusiveList::new();
        for i in 0..4 {
            list.push_newest(i);
        }
        let drained: Vec<_> = std::iter::from_fn(|| list.pop_oldest()).collect();
        assert_eq!(drained, vec![0, 1, 2, 3]);
        list.validate().unwrap();
    }

    #[test]
    fn rank_counts_newer_entries() {
        let mut list = IntrusiveList::new();
        let a = list.push_newest(1);
        let b = list.push_newest(2);
        let c = list.push_newest(3);
        assert_eq!(list.rank_from_newest(c), Some(0));
        assert_eq!(list.rank_from_newest(b), Some(1));
        assert_eq!(list.rank_from_newest(a), Some(2));

        list.remove(b);
        assert_eq!(list.rank_from_newest(a), Some(1));
        assert_eq!(list.rank_from_newest(b), None);
    }

    #[test]
    fn slots_recycle_after_removal() {
        let mut list = IntrusiveList::with_capacity(2);
        let a = list.push_newest(10);
        let b = list.push_newest(20);
        list.pop_oldest();
        let c = list.push_newest(30);
        assert_eq!(c, a);
        if let Some(v) = list.get_mut(b) {
            *v = 25;
        }
        let entries: Vec<_> = list.iter().map(|(id, v)| (id, *v)).collect();
        assert_eq!(entries, vec![(b, 25), (c, 30)]);
        list.validate().unwrap();
    }

    #[test]
    fn clear_resets_both_ends() {
        let mut list = IntrusiveList::new();
        list.push_newest(1);
        list.push_newest(2);
        list.clear();
        assert!(list.is_empty());
        assert_eq!(list.oldest(), None);
        list.validate().unwrap();
        list.push_newest(3);
        assert_eq!(values(&list), vec![3]);
    }
}
