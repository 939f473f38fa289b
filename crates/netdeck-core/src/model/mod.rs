//! Domain model: topology graph types, dashboard records, and the
//! identity type shared across both backends.

mod entity_id;
mod link;
mod node;
mod project;
mod records;

pub use entity_id::EntityId;
pub use link::{Endpoint, Link, LinkId, LinkKind, LinkStatus};
pub use node::{Node, NodeId, NodeKind, NodeStatus, Port, PortStatus, Position};
pub use project::{ComputeServer, Project, ProjectStatus};
pub use records::{
    AlertSeverity, Direction, QosPolicy, SecurityAlert, SlaStanding, SlaTarget, TrafficClass,
};
