// ── Topology node domain types ──

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Node identifiers are lab-server UUIDs (locally created nodes mint v4).
pub type NodeId = Uuid;

/// Device class of a topology node.
///
/// Closed set: every kind carries its own default port table and display
/// metadata through exhaustive matches, so adding a variant is a compile
/// error everywhere it matters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeKind {
    Router,
    Switch,
    Firewall,
    Server,
    Host,
    Wireless,
    Cloud,
}

impl NodeKind {
    /// All kinds, in palette order.
    pub const ALL: [NodeKind; 7] = [
        Self::Router,
        Self::Switch,
        Self::Firewall,
        Self::Server,
        Self::Host,
        Self::Wireless,
        Self::Cloud,
    ];

    /// Default ports assigned at creation, in declared order. The
    /// declared order is load-bearing: auto-connect picks the first
    /// free port from this list.
    pub fn default_ports(self) -> Vec<Port> {
        let names: &[&str] = match self {
            Self::Router => &["Gi0/0", "Gi0/1", "Gi0/2", "Gi0/3"],
            Self::Switch => &["e0", "e1", "e2", "e3", "e4", "e5", "e6", "e7"],
            Self::Firewall => &["outside", "inside", "dmz"],
            Self::Server => &["eth0", "eth1"],
            Self::Host => &["eth0"],
            Self::Wireless => &["wlan0", "eth0"],
            Self::Cloud => &["nio0", "nio1"],
        };
        names.iter().map(|n| Port::new(*n)).collect()
    }

    /// Prefix for auto-generated node names (`R1`, `SW2`, …).
    pub fn name_prefix(self) -> &'static str {
        match self {
            Self::Router => "R",
            Self::Switch => "SW",
            Self::Firewall => "FW",
            Self::Server => "SRV",
            Self::Host => "PC",
            Self::Wireless => "AP",
            Self::Cloud => "CL",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Router => "Router",
            Self::Switch => "Switch",
            Self::Firewall => "Firewall",
            Self::Server => "Server",
            Self::Host => "Host",
            Self::Wireless => "Wireless",
            Self::Cloud => "Cloud",
        }
    }

    /// Single-character glyph for canvas rendering.
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Router => "◆",
            Self::Switch => "▣",
            Self::Firewall => "▲",
            Self::Server => "■",
            Self::Host => "●",
            Self::Wireless => "◉",
            Self::Cloud => "☁",
        }
    }
}

/// Node operational state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeStatus {
    Started,
    #[default]
    Stopped,
    Suspended,
}

impl NodeStatus {
    pub fn is_running(self) -> bool {
        matches!(self, Self::Started)
    }
}

/// Link state of a single port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PortStatus {
    Up,
    #[default]
    Down,
}

/// A named connection point on a node. Usable by at most one link.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Port {
    pub name: String,
    pub status: PortStatus,
    pub connected: bool,
}

impl Port {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: PortStatus::Down,
            connected: false,
        }
    }
}

/// Canvas position in project coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Round both coordinates to the nearest multiple of `grid`.
    pub fn snapped(self, grid: f64) -> Self {
        if grid <= 0.0 {
            return self;
        }
        Self {
            x: (self.x / grid).round() * grid,
            y: (self.y / grid).round() * grid,
        }
    }
}

/// A topology graph vertex: one simulated network device.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub id: NodeId,
    pub name: String,
    pub kind: NodeKind,
    pub position: Position,
    pub status: NodeStatus,
    /// Ordered port list; indices are stable for the node's lifetime.
    pub ports: Vec<Port>,
}

impl Node {
    /// Index of the first unconnected port, in declared order.
    pub fn first_free_port(&self) -> Option<usize> {
        self.ports.iter().position(|p| !p.connected)
    }

    pub fn free_port_count(&self) -> usize {
        self.ports.iter().filter(|p| !p.connected).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_ports_match_kind_table() {
        assert_eq!(NodeKind::Router.default_ports().len(), 4);
        assert_eq!(NodeKind::Switch.default_ports().len(), 8);
        assert_eq!(NodeKind::Host.default_ports().len(), 1);
        assert_eq!(NodeKind::Firewall.default_ports()[0].name, "outside");
    }

    #[test]
    fn new_ports_start_down_and_free() {
        for kind in NodeKind::ALL {
            for port in kind.default_ports() {
                assert_eq!(port.status, PortStatus::Down);
                assert!(!port.connected);
            }
        }
    }

    #[test]
    fn position_snaps_to_grid() {
        let pos = Position::new(117.0, -38.0).snapped(25.0);
        assert_eq!(pos, Position::new(125.0, -50.0));
    }

    #[test]
    fn zero_grid_is_identity() {
        let pos = Position::new(117.0, -38.0);
        assert_eq!(pos.snapped(0.0), pos);
    }
}
