// ── Topology link domain types ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::node::NodeId;

pub type LinkId = Uuid;

/// Physical cable class between two ports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkKind {
    #[default]
    Ethernet,
    Serial,
    Optical,
}

impl LinkKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Ethernet => "ethernet",
            Self::Serial => "serial",
            Self::Optical => "optical",
        }
    }
}

/// Operational state of a link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkStatus {
    Up,
    #[default]
    Down,
}

/// One end of a link: a node plus an index into its port list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Endpoint {
    pub node: NodeId,
    pub port: usize,
}

impl Endpoint {
    pub fn new(node: NodeId, port: usize) -> Self {
        Self { node, port }
    }
}

/// An edge in the topology graph. Endpoints are unordered for identity
/// purposes but source/target is preserved for rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Link {
    pub id: LinkId,
    pub source: Endpoint,
    pub target: Endpoint,
    pub kind: LinkKind,
    pub status: LinkStatus,
}

impl Link {
    /// True if either end lands on `node`.
    pub fn touches(&self, node: NodeId) -> bool {
        self.source.node == node || self.target.node == node
    }

    /// True if either end is exactly this node+port pair.
    pub fn uses_port(&self, node: NodeId, port: usize) -> bool {
        (self.source.node == node && self.source.port == port)
            || (self.target.node == node && self.target.port == port)
    }

    /// The end attached to `node`, if any.
    pub fn endpoint_on(&self, node: NodeId) -> Option<Endpoint> {
        if self.source.node == node {
            Some(self.source)
        } else if self.target.node == node {
            Some(self.target)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(a: NodeId, ap: usize, b: NodeId, bp: usize) -> Link {
        Link {
            id: Uuid::new_v4(),
            source: Endpoint::new(a, ap),
            target: Endpoint::new(b, bp),
            kind: LinkKind::Ethernet,
            status: LinkStatus::Down,
        }
    }

    #[test]
    fn touches_either_end() {
        let (a, b, c) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let l = link(a, 0, b, 1);
        assert!(l.touches(a));
        assert!(l.touches(b));
        assert!(!l.touches(c));
    }

    #[test]
    fn uses_port_is_exact() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let l = link(a, 0, b, 1);
        assert!(l.uses_port(a, 0));
        assert!(!l.uses_port(a, 1));
        assert!(l.uses_port(b, 1));
    }
}
