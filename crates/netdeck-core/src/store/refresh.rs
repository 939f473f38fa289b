// ── Refresh application ──
//
// Applies one fetch cycle's worth of data to the store. Upsert-then-
// prune keeps entities that survived the refresh in place, so
// subscribers never observe the brief empty state a clear-then-insert
// approach would broadcast.

use std::collections::HashSet;

use chrono::Utc;

use super::collection::EntityCollection;
use super::{DataStore, Keyed};
use crate::model::{ComputeServer, EntityId, Link, Node, Project, QosPolicy, SecurityAlert, SlaTarget};

fn upsert_and_prune<T>(collection: &EntityCollection<T>, items: Vec<T>)
where
    T: Keyed + Clone + Send + Sync + 'static,
{
    let incoming: HashSet<EntityId> = items.iter().map(Keyed::key).collect();
    for item in items {
        collection.upsert(item.key(), item);
    }
    for existing in collection.ids() {
        if !incoming.contains(&existing) {
            collection.remove(&existing);
        }
    }
}

/// Everything fetched during one refresh cycle.
#[derive(Debug, Default)]
pub struct RefreshSnapshot {
    pub projects: Vec<Project>,
    pub computes: Vec<ComputeServer>,
    pub nodes: Vec<Node>,
    pub links: Vec<Link>,
    pub qos_policies: Vec<QosPolicy>,
    pub sla_targets: Vec<SlaTarget>,
    pub alerts: Vec<SecurityAlert>,
}

impl DataStore {
    /// Apply a refresh only if no later-started fetch has already
    /// landed. There is no ordering guarantee between concurrent
    /// fetches, so a slow response from an earlier cycle must never
    /// clobber a newer snapshot. Returns whether the data was applied.
    pub fn apply_refresh_if_newer(&self, generation: u64, snap: RefreshSnapshot) -> bool {
        let prev = self
            .applied_generation
            .fetch_max(generation, std::sync::atomic::Ordering::SeqCst);
        if prev >= generation {
            return false;
        }
        self.apply_refresh(snap);
        true
    }

    /// Apply a full refresh cycle.
    pub fn apply_refresh(&self, snap: RefreshSnapshot) {
        upsert_and_prune(&self.projects, snap.projects);
        upsert_and_prune(&self.computes, snap.computes);
        upsert_and_prune(&self.nodes, snap.nodes);
        upsert_and_prune(&self.links, snap.links);
        upsert_and_prune(&self.qos_policies, snap.qos_policies);
        upsert_and_prune(&self.sla_targets, snap.sla_targets);
        upsert_and_prune(&self.alerts, snap.alerts);

        let _ = self.last_refresh.send(Some(Utc::now()));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::ProjectStatus;
    use uuid::Uuid;

    fn project(name: &str) -> Project {
        Project {
            id: Uuid::new_v4(),
            name: name.into(),
            status: ProjectStatus::Closed,
        }
    }

    #[test]
    fn refresh_prunes_entities_missing_from_incoming_set() {
        let store = DataStore::new();
        let keep = project("keep");
        let drop = project("drop");

        store.apply_refresh(RefreshSnapshot {
            projects: vec![keep.clone(), drop.clone()],
            ..RefreshSnapshot::default()
        });
        assert_eq!(store.projects_snapshot().len(), 2);

        store.apply_refresh(RefreshSnapshot {
            projects: vec![keep.clone()],
            ..RefreshSnapshot::default()
        });

        let snap = store.projects_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].name, "keep");
        assert!(store.project(&EntityId::Uuid(drop.id)).is_none());
    }

    #[test]
    fn refresh_updates_entities_in_place() {
        let store = DataStore::new();
        let mut p = project("lab");
        store.apply_refresh(RefreshSnapshot {
            projects: vec![p.clone()],
            ..RefreshSnapshot::default()
        });

        p.status = ProjectStatus::Opened;
        store.apply_refresh(RefreshSnapshot {
            projects: vec![p.clone()],
            ..RefreshSnapshot::default()
        });

        let stored = store.project(&EntityId::Uuid(p.id)).unwrap();
        assert_eq!(stored.status, ProjectStatus::Opened);
    }

    #[test]
    fn stale_generation_never_clobbers_newer_data() {
        let store = DataStore::new();
        let newer = project("newer");
        let stale = project("stale");

        assert!(store.apply_refresh_if_newer(2, RefreshSnapshot {
            projects: vec![newer.clone()],
            ..RefreshSnapshot::default()
        }));
        // A fetch that started earlier but finished later loses.
        assert!(!store.apply_refresh_if_newer(1, RefreshSnapshot {
            projects: vec![stale],
            ..RefreshSnapshot::default()
        }));

        let snap = store.projects_snapshot();
        assert_eq!(snap.len(), 1);
        assert_eq!(snap[0].name, "newer");
    }

    #[test]
    fn refresh_stamps_last_refresh() {
        let store = DataStore::new();
        assert!(store.last_refresh().is_none());
        store.apply_refresh(RefreshSnapshot::default());
        assert!(store.last_refresh().is_some());
        assert!(store.data_age().unwrap() >= chrono::Duration::zero());
    }
}
