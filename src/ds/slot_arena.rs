//! Index-addressed node storage for the ledgers.
//!
//! A ledger never holds pointers to its nodes. Each node sits in a
//! `SlotArena` slot and is addressed by a [`SlotId`]. Vacated slots are
//! chained through the slots themselves, so an eviction followed by an
//! admission reuses the slot it just freed without allocating.
//!
//! ```text
//!   slots:  [ Live(A) | Vacant(→3) | Live(B) | Vacant(end) ]
//!   vacant: 1
//! ```

/// Stable handle to an occupied arena slot.
///
/// A `SlotId` stays valid until the slot is vacated. The index is handed out
/// again afterwards, so holders drop their copy on removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotId(pub(crate) usize);

impl SlotId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug)]
enum Slot<T> {
    Live(T),
    Vacant { next: Option<usize> },
}

#[derive(Debug)]
pub struct SlotArena<T> {
    slots: Vec<Slot<T>>,
    vacant: Option<usize>,
    live: usize,
}

impl<T> SlotArena<T> {
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Reserves room for `capacity` nodes, typically the ledger capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: Vec::with_capacity(capacity),
            vacant: None,
            live: 0,
        }
    }

    /// Stores `value`, reusing the most recently vacated slot if there is one.
    pub fn insert(&mut self, value: T) -> SlotId {
        self.live += 1;
        match self.vacant {
            Some(index) => {
                if let Slot::Vacant { next } = self.slots[index] {
                    self.vacant = next;
                }
                self.slots[index] = Slot::Live(value);
                SlotId(index)
            },
            None => {
                self.slots.push(Slot::Live(value));
                SlotId(self.slots.len() - 1)
            },
        }
    }

    pub fn remove(&mut self, id: SlotId) -> Option<T> {
        let slot = self.slots.get_mut(id.0)?;
        if matches!(slot, Slot::Vacant { .. }) {
            return None;
        }
        let vacated = std::mem::replace(slot, Slot::Vacant { next: self.vacant });
        self.vacant = Some(id.0);
        self.live -= 1;
        match vacated {
            Slot::Live(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get(&self, id: SlotId) -> Option<&T> {
        match self.slots.get(id.0)? {
            Slot::Live(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn get_mut(&mut self, id: SlotId) -> Option<&mut T> {
        match self.slots.get_mut(id.0)? {
            Slot::Live(value) => Some(value),
            Slot::Vacant { .. } => None,
        }
    }

    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.vacant = None;
        self.live = 0;
    }
}

impl<T> Default for SlotArena<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vacated_slot_is_reused_first() {
        let mut arena = SlotArena::new();
        let a = arena.insert("a");
        let b = arena.insert("b");
        assert_eq!(arena.get(a), Some(&"a"));
        assert_eq!(arena.get(b), Some(&"b"));

        assert_eq!(arena.remove(a), Some("a"));
        assert_eq!(arena.get(a), None);
        assert_eq!(arena.len(), 1);

        let c = arena.insert("c");
        assert_eq!(c, a);
        assert_eq!(arena.get(c), Some(&"c"));
    }

    #[test]
    fn vacancies_are_reused_newest_first() {
        let mut arena = SlotArena::with_capacity(4);
        let ids: Vec<_> = (0..4u32).map(|i| arena.insert(i)).collect();
        arena.remove(ids[1]);
        arena.remove(ids[3]);

        assert_eq!(arena.insert(30), ids[3]);
        assert_eq!(arena.insert(10), ids[1]);
        // Chain exhausted, grows again.
        assert_eq!(arena.insert(40).index(), 4);
        assert_eq!(arena.len(), 5);
    }

    #[test]
    fn double_remove_is_none() {
        let mut arena = SlotArena::new();
        let id = arena.insert(7u32);
        assert_eq!(arena.remove(id), Some(7));
        assert_eq!(arena.remove(id), None);
        assert!(arena.is_empty());
        // The second remove must not have pushed the slot twice.
        let first = arena.insert(1);
        let second = arena.insert(2);
        assert_ne!(first, second);
    }

    #[test]
    fn clear_forgets_vacancies() {
        let mut arena = SlotArena::new();
        let a = arena.insert(1u8);
        arena.insert(2u8);
        arena.remove(a);
        arena.clear();
        assert!(arena.is_empty());
        assert_eq!(arena.insert(3).index(), 0);
    }
}
