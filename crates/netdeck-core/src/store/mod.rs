// ── Central reactive data store ──
//
// Thread-safe storage for every fetched entity. Mutations are broadcast
// to subscribers via `watch` channels; the TUI's data bridge and any
// other consumer read through `EntityStream` handles.

mod collection;
mod refresh;

use std::sync::Arc;
use std::sync::atomic::AtomicU64;

use chrono::{DateTime, Utc};
use tokio::sync::watch;

use collection::EntityCollection;
pub use refresh::RefreshSnapshot;

use crate::model::{
    ComputeServer, EntityId, Link, Node, Project, QosPolicy, SecurityAlert, SlaTarget,
};
use crate::stream::EntityStream;

/// Anything storable under an [`EntityId`].
pub trait Keyed {
    fn key(&self) -> EntityId;
}

impl Keyed for Project {
    fn key(&self) -> EntityId {
        EntityId::Uuid(self.id)
    }
}

impl Keyed for ComputeServer {
    fn key(&self) -> EntityId {
        EntityId::from(self.id.clone())
    }
}

impl Keyed for Node {
    fn key(&self) -> EntityId {
        EntityId::Uuid(self.id)
    }
}

impl Keyed for Link {
    fn key(&self) -> EntityId {
        EntityId::Uuid(self.id)
    }
}

impl Keyed for QosPolicy {
    fn key(&self) -> EntityId {
        EntityId::from(self.id.clone())
    }
}

impl Keyed for SlaTarget {
    fn key(&self) -> EntityId {
        EntityId::from(self.id.clone())
    }
}

impl Keyed for SecurityAlert {
    fn key(&self) -> EntityId {
        EntityId::from(self.id.clone())
    }
}

/// Central reactive store for all netdeck entities.
pub struct DataStore {
    pub(crate) projects: EntityCollection<Project>,
    pub(crate) computes: EntityCollection<ComputeServer>,
    pub(crate) nodes: EntityCollection<Node>,
    pub(crate) links: EntityCollection<Link>,
    pub(crate) qos_policies: EntityCollection<QosPolicy>,
    pub(crate) sla_targets: EntityCollection<SlaTarget>,
    pub(crate) alerts: EntityCollection<SecurityAlert>,
    pub(crate) last_refresh: watch::Sender<Option<DateTime<Utc>>>,
    /// Highest refresh generation applied so far; stale fetches lose.
    pub(crate) applied_generation: AtomicU64,
}

impl DataStore {
    pub fn new() -> Self {
        let (last_refresh, _) = watch::channel(None);

        Self {
            projects: EntityCollection::new(),
            computes: EntityCollection::new(),
            nodes: EntityCollection::new(),
            links: EntityCollection::new(),
            qos_policies: EntityCollection::new(),
            sla_targets: EntityCollection::new(),
            alerts: EntityCollection::new(),
            last_refresh,
            applied_generation: AtomicU64::new(0),
        }
    }

    // ── Snapshot accessors ───────────────────────────────────────────

    pub fn projects_snapshot(&self) -> Arc<Vec<Arc<Project>>> {
        self.projects.snapshot()
    }

    pub fn computes_snapshot(&self) -> Arc<Vec<Arc<ComputeServer>>> {
        self.computes.snapshot()
    }

    pub fn nodes_snapshot(&self) -> Arc<Vec<Arc<Node>>> {
        self.nodes.snapshot()
    }

    pub fn links_snapshot(&self) -> Arc<Vec<Arc<Link>>> {
        self.links.snapshot()
    }

    pub fn qos_policies_snapshot(&self) -> Arc<Vec<Arc<QosPolicy>>> {
        self.qos_policies.snapshot()
    }

    pub fn sla_targets_snapshot(&self) -> Arc<Vec<Arc<SlaTarget>>> {
        self.sla_targets.snapshot()
    }

    pub fn alerts_snapshot(&self) -> Arc<Vec<Arc<SecurityAlert>>> {
        self.alerts.snapshot()
    }

    // ── Single-entity lookups ────────────────────────────────────────

    pub fn project(&self, id: &EntityId) -> Option<Arc<Project>> {
        self.projects.get(id)
    }

    pub fn qos_policy(&self, id: &EntityId) -> Option<Arc<QosPolicy>> {
        self.qos_policies.get(id)
    }

    pub fn alert(&self, id: &EntityId) -> Option<Arc<SecurityAlert>> {
        self.alerts.get(id)
    }

    // ── Counts ───────────────────────────────────────────────────────

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    pub fn alert_count(&self) -> usize {
        self.alerts.len()
    }

    // ── Subscriptions ────────────────────────────────────────────────

    pub fn subscribe_projects(&self) -> EntityStream<Project> {
        EntityStream::new(self.projects.subscribe())
    }

    pub fn subscribe_computes(&self) -> EntityStream<ComputeServer> {
        EntityStream::new(self.computes.subscribe())
    }

    pub fn subscribe_nodes(&self) -> EntityStream<Node> {
        EntityStream::new(self.nodes.subscribe())
    }

    pub fn subscribe_links(&self) -> EntityStream<Link> {
        EntityStream::new(self.links.subscribe())
    }

    pub fn subscribe_qos_policies(&self) -> EntityStream<QosPolicy> {
        EntityStream::new(self.qos_policies.subscribe())
    }

    pub fn subscribe_sla_targets(&self) -> EntityStream<SlaTarget> {
        EntityStream::new(self.sla_targets.subscribe())
    }

    pub fn subscribe_alerts(&self) -> EntityStream<SecurityAlert> {
        EntityStream::new(self.alerts.subscribe())
    }

    // ── Metadata ─────────────────────────────────────────────────────

    pub fn last_refresh(&self) -> Option<DateTime<Utc>> {
        *self.last_refresh.borrow()
    }

    /// Age of the data on screen, `None` before the first refresh.
    pub fn data_age(&self) -> Option<chrono::Duration> {
        self.last_refresh().map(|t| Utc::now() - t)
    }
}

impl Default for DataStore {
    fn default() -> Self {
        Self::new()
    }
}
