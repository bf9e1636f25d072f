//! The ordered per-kind entity container.
//!
//! Insertion order is render order, and render order is hit-test priority
//! for the following frame. The frame loop snapshots the store, empties it,
//! and lets each render call append its entity back; membership for the next
//! frame is therefore decided by what actually rendered during this one.

use crate::id::EntityId;

/// Anything an [`EntityStore`] can hold.
pub trait Entity {
    fn id(&self) -> EntityId;
}

/// An ordered collection of one entity kind, keyed by id.
#[derive(Debug, Clone)]
pub struct EntityStore<T> {
    label: &'static str,
    items: Vec<T>,
}

impl<T: Entity + Clone> EntityStore<T> {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            items: Vec::new(),
        }
    }

    /// Append an entity. A duplicate id is rejected with a warning and the
    /// original entry is kept.
    pub fn add(&mut self, item: T) {
        if self.contains(item.id()) {
            log::warn!(
                "entity {} already exists in {} store; keeping the original",
                item.id(),
                self.label
            );
            return;
        }
        self.items.push(item);
    }

    /// Remove by id, returning the removed entity so the caller can detach
    /// whatever still references it (event listeners in particular).
    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let pos = self.items.iter().position(|item| item.id() == id)?;
        Some(self.items.remove(pos))
    }

    /// Remove by id, running `detach` on the removed entity. Returns whether
    /// anything was removed.
    pub fn remove_with(&mut self, id: EntityId, detach: impl FnOnce(&T)) -> bool {
        match self.remove(id) {
            Some(removed) => {
                detach(&removed);
                true
            }
            None => false,
        }
    }

    /// Replace the entity with `id` in place. Warns and leaves the store
    /// untouched when the id is not present.
    pub fn update(&mut self, id: EntityId, item: T) -> bool {
        match self.items.iter_mut().find(|existing| existing.id() == id) {
            Some(slot) => {
                *slot = item;
                true
            }
            None => {
                log::warn!("no entity {} in {} store to update", id, self.label);
                false
            }
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// An independently mutable copy of the current contents. Safe to iterate
    /// while the live store is truncated and rebuilt.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Empty the store.
    pub fn truncate(&mut self) {
        self.items.clear();
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.items.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut T> {
        self.items.iter_mut()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Probe {
        id: EntityId,
        tag: &'static str,
    }

    impl Entity for Probe {
        fn id(&self) -> EntityId {
            self.id
        }
    }

    fn probe(raw: u32, tag: &'static str) -> Probe {
        Probe {
            id: EntityId::new(raw),
            tag,
        }
    }

    #[test]
    fn duplicate_id_keeps_the_original() {
        let mut store = EntityStore::new("node");
        store.add(probe(1, "original"));
        store.add(probe(1, "impostor"));
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(EntityId::new(1)).unwrap().tag, "original");
    }

    #[test]
    fn update_of_missing_id_is_a_noop() {
        let mut store = EntityStore::new("node");
        store.add(probe(1, "a"));
        assert!(!store.update(EntityId::new(9), probe(9, "ghost")));
        assert_eq!(store.len(), 1);
        assert!(store.update(EntityId::new(1), probe(1, "b")));
        assert_eq!(store.get(EntityId::new(1)).unwrap().tag, "b");
    }

    #[test]
    fn snapshot_is_independent_of_truncation() {
        let mut store = EntityStore::new("node");
        store.add(probe(1, "a"));
        store.add(probe(2, "b"));
        let snapshot = store.snapshot();
        store.truncate();
        assert!(store.is_empty());
        assert_eq!(snapshot.len(), 2);

        // Rebuild in snapshot order, as the frame loop does.
        for item in snapshot {
            store.add(item);
        }
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn remove_runs_the_detach_hook() {
        let mut store = EntityStore::new("node");
        store.add(probe(1, "a"));
        let mut detached = None;
        assert!(store.remove_with(EntityId::new(1), |item| detached = Some(item.id)));
        assert_eq!(detached, Some(EntityId::new(1)));
        assert!(!store.remove_with(EntityId::new(1), |_| panic!("nothing to detach")));
    }
}
