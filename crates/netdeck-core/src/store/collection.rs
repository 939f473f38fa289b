// ── Generic reactive entity collection ──

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::watch;

use crate::model::EntityId;

/// Lock-free reactive storage for one entity type.
///
/// `DashMap` gives O(1) concurrent lookups; every mutation bumps a
/// version counter and rebuilds the snapshot broadcast to subscribers
/// over a `watch` channel.
pub(crate) struct EntityCollection<T: Clone + Send + Sync + 'static> {
    entities: DashMap<EntityId, Arc<T>>,

    /// Bumped on every mutation.
    version: watch::Sender<u64>,

    /// Full snapshot, rebuilt on mutation.
    snapshot: watch::Sender<Arc<Vec<Arc<T>>>>,
}

impl<T: Clone + Send + Sync + 'static> EntityCollection<T> {
    pub(crate) fn new() -> Self {
        let (version, _) = watch::channel(0u64);
        let (snapshot, _) = watch::channel(Arc::new(Vec::new()));

        Self {
            entities: DashMap::new(),
            version,
            snapshot,
        }
    }

    /// Insert or update an entity. Returns `true` if the id was new.
    pub(crate) fn upsert(&self, id: EntityId, entity: T) -> bool {
        let is_new = self.entities.insert(id, Arc::new(entity)).is_none();
        self.rebuild_snapshot();
        self.bump_version();
        is_new
    }

    /// Remove an entity, returning it if it existed.
    pub(crate) fn remove(&self, id: &EntityId) -> Option<Arc<T>> {
        let removed = self.entities.remove(id).map(|(_, v)| v);
        if removed.is_some() {
            self.rebuild_snapshot();
            self.bump_version();
        }
        removed
    }

    pub(crate) fn get(&self, id: &EntityId) -> Option<Arc<T>> {
        self.entities.get(id).map(|r| Arc::clone(r.value()))
    }

    /// Current snapshot (cheap `Arc` clone).
    pub(crate) fn snapshot(&self) -> Arc<Vec<Arc<T>>> {
        self.snapshot.borrow().clone()
    }

    pub(crate) fn subscribe(&self) -> watch::Receiver<Arc<Vec<Arc<T>>>> {
        self.snapshot.subscribe()
    }

    pub(crate) fn len(&self) -> usize {
        self.entities.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub(crate) fn ids(&self) -> Vec<EntityId> {
        self.entities.iter().map(|r| r.key().clone()).collect()
    }

    fn rebuild_snapshot(&self) {
        let values: Vec<Arc<T>> = self.entities.iter().map(|r| Arc::clone(r.value())).collect();
        // send_modify updates even with zero receivers.
        self.snapshot.send_modify(|snap| *snap = Arc::new(values));
    }

    fn bump_version(&self) {
        self.version.send_modify(|v| *v += 1);
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn upsert_distinguishes_new_from_update() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::from("qos-1");
        assert!(col.upsert(id.clone(), "v1".into()));
        assert!(!col.upsert(id.clone(), "v2".into()));
        assert_eq!(*col.get(&id).unwrap(), "v2");
    }

    #[test]
    fn remove_returns_entity_and_shrinks_snapshot() {
        let col: EntityCollection<String> = EntityCollection::new();
        let id = EntityId::from("alert-1");
        col.upsert(id.clone(), "x".into());

        assert_eq!(*col.remove(&id).unwrap(), "x");
        assert!(col.remove(&id).is_none());
        assert!(col.is_empty());
        assert!(col.snapshot().is_empty());
    }

    #[tokio::test]
    async fn subscribers_see_mutations() {
        let col: EntityCollection<u32> = EntityCollection::new();
        let mut rx = col.subscribe();

        col.upsert(EntityId::from("a"), 1);
        rx.changed().await.unwrap();
        assert_eq!(rx.borrow_and_update().len(), 1);
    }
}
