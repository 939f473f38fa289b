// ── Wire-to-domain conversion ──
//
// All translation from netdeck-api DTOs into domain types lives here.
// Unknown wire strings degrade to a catch-all variant instead of
// failing the refresh; the raw value is logged once at debug.

use std::str::FromStr;

use netdeck_api::types::{
    ComputeDto, LinkDto, NodeDto, PortDto, ProjectDto, QosPolicyDto, SecurityAlertDto, SlaTargetDto,
};
use tracing::debug;

use crate::model::{
    AlertSeverity, ComputeServer, Direction, Endpoint, Link, LinkKind, LinkStatus, Node, NodeKind,
    NodeStatus, Port, PortStatus, Position, Project, ProjectStatus, QosPolicy, SecurityAlert,
    SlaTarget, TrafficClass,
};

/// Map the lab server's free-form node type to a device class.
///
/// Emulator backends report their engine ("dynamips", "qemu", …)
/// rather than a device class, so this matches on substrings.
pub fn node_kind_from_wire(raw: &str) -> NodeKind {
    let lower = raw.to_lowercase();
    if lower.contains("switch") {
        NodeKind::Switch
    } else if lower.contains("router") || lower.contains("dynamips") || lower.contains("iou") {
        NodeKind::Router
    } else if lower.contains("firewall") || lower.contains("asa") {
        NodeKind::Firewall
    } else if lower.contains("server") || lower.contains("qemu") || lower.contains("docker") {
        NodeKind::Server
    } else if lower.contains("wireless") || lower.contains("ap") {
        NodeKind::Wireless
    } else if lower.contains("cloud") || lower.contains("nat") {
        NodeKind::Cloud
    } else {
        debug!(node_type = raw, "unrecognized node type, treating as host");
        NodeKind::Host
    }
}

fn node_status_from_wire(raw: &str) -> NodeStatus {
    match raw {
        "started" => NodeStatus::Started,
        "suspended" => NodeStatus::Suspended,
        _ => NodeStatus::Stopped,
    }
}

fn port_status_from_wire(raw: Option<&str>) -> PortStatus {
    match raw {
        Some("up") => PortStatus::Up,
        _ => PortStatus::Down,
    }
}

impl From<ProjectDto> for Project {
    fn from(dto: ProjectDto) -> Self {
        Self {
            id: dto.project_id,
            name: dto.name,
            status: if dto.status == "opened" {
                ProjectStatus::Opened
            } else {
                ProjectStatus::Closed
            },
        }
    }
}

impl From<ComputeDto> for ComputeServer {
    fn from(dto: ComputeDto) -> Self {
        Self {
            id: dto.compute_id,
            name: dto.name,
            host: dto.host,
            port: dto.port,
            connected: dto.connected,
            cpu_usage_pct: dto.cpu_usage_percent,
            memory_usage_pct: dto.memory_usage_percent,
        }
    }
}

impl From<PortDto> for Port {
    fn from(dto: PortDto) -> Self {
        Self {
            name: dto.name,
            status: port_status_from_wire(dto.status.as_deref()),
            connected: dto.connected,
        }
    }
}

impl From<NodeDto> for Node {
    fn from(dto: NodeDto) -> Self {
        let kind = node_kind_from_wire(&dto.node_type);
        let ports = if dto.ports.is_empty() {
            // Older lab servers omit port lists; fall back to the
            // kind's default table so connect() still has ports.
            kind.default_ports()
        } else {
            dto.ports.into_iter().map(Port::from).collect()
        };
        Self {
            id: dto.node_id,
            name: dto.name,
            kind,
            position: Position::new(dto.x, dto.y),
            status: node_status_from_wire(&dto.status),
            ports,
        }
    }
}

impl From<LinkDto> for Link {
    fn from(dto: LinkDto) -> Self {
        Self {
            id: dto.link_id,
            source: Endpoint::new(dto.source.node_id, dto.source.port_number),
            target: Endpoint::new(dto.target.node_id, dto.target.port_number),
            kind: match dto.link_type.as_deref() {
                Some("serial") => LinkKind::Serial,
                Some("optical") => LinkKind::Optical,
                _ => LinkKind::Ethernet,
            },
            status: match dto.status.as_deref() {
                Some("up") => LinkStatus::Up,
                _ => LinkStatus::Down,
            },
        }
    }
}

impl From<QosPolicyDto> for QosPolicy {
    fn from(dto: QosPolicyDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            direction: Direction::from_str(&dto.direction).unwrap_or(Direction::Outbound),
            class: TrafficClass::from_str(&dto.class).unwrap_or(TrafficClass::Other),
            rate_limit_kbps: dto.rate_limit_kbps,
            matched_sessions: dto.matched_sessions,
            enabled: dto.enabled,
            description: dto.description,
        }
    }
}

impl From<SlaTargetDto> for SlaTarget {
    fn from(dto: SlaTargetDto) -> Self {
        Self {
            id: dto.id,
            name: dto.name,
            availability_target_pct: dto.availability_target_pct,
            availability_pct: dto.availability_pct,
            latency_ms: dto.latency_ms,
            jitter_ms: dto.jitter_ms,
            packet_loss_pct: dto.packet_loss_pct,
        }
    }
}

impl From<SecurityAlertDto> for SecurityAlert {
    fn from(dto: SecurityAlertDto) -> Self {
        Self {
            id: dto.id,
            severity: AlertSeverity::from_str(&dto.severity).unwrap_or(AlertSeverity::Info),
            category: dto.category,
            message: dto.message,
            source: dto.source,
            acknowledged: dto.acknowledged,
            timestamp: dto.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn node_kind_matches_emulator_backends() {
        assert_eq!(node_kind_from_wire("dynamips"), NodeKind::Router);
        assert_eq!(node_kind_from_wire("ethernet_switch"), NodeKind::Switch);
        assert_eq!(node_kind_from_wire("qemu"), NodeKind::Server);
        assert_eq!(node_kind_from_wire("cloud"), NodeKind::Cloud);
        assert_eq!(node_kind_from_wire("vpcs"), NodeKind::Host);
    }

    #[test]
    fn missing_port_list_falls_back_to_kind_defaults() {
        let dto = NodeDto {
            node_id: uuid::Uuid::new_v4(),
            name: "R1".into(),
            node_type: "router".into(),
            status: "stopped".into(),
            x: 0.0,
            y: 0.0,
            ports: vec![],
        };
        let node = Node::from(dto);
        assert_eq!(node.ports.len(), 4);
    }

    #[test]
    fn unknown_record_strings_degrade_to_catch_alls() {
        let dto = QosPolicyDto {
            id: "q".into(),
            name: "n".into(),
            direction: "sideways".into(),
            class: "mystery".into(),
            rate_limit_kbps: None,
            matched_sessions: 0,
            enabled: true,
            description: None,
        };
        let policy = QosPolicy::from(dto);
        assert_eq!(policy.class, TrafficClass::Other);
    }
}
