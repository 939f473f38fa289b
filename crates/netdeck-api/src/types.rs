// ── Wire DTOs ──
//
// Raw response shapes as the servers send them. Field names follow the
// wire (snake_case JSON); translation to domain types happens in
// netdeck-core's convert module, never here.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ── Lab server (/v2/) ───────────────────────────────────────────────

/// A compute server registered with the lab controller.
#[derive(Debug, Clone, Deserialize)]
pub struct ComputeDto {
    pub compute_id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub connected: bool,
    #[serde(default)]
    pub cpu_usage_percent: Option<f64>,
    #[serde(default)]
    pub memory_usage_percent: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProjectDto {
    pub project_id: Uuid,
    pub name: String,
    /// `"opened"` or `"closed"` on the wire.
    pub status: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PortDto {
    pub name: String,
    /// `"up"` or `"down"`.
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub connected: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NodeDto {
    pub node_id: Uuid,
    pub name: String,
    /// Device class, e.g. `"router"`, `"switch"`, `"firewall"`.
    pub node_type: String,
    /// `"started"`, `"stopped"`, or `"suspended"`.
    pub status: String,
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub ports: Vec<PortDto>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkEndpointDto {
    pub node_id: Uuid,
    /// Index into the node's declared port list.
    pub port_number: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LinkDto {
    pub link_id: Uuid,
    pub source: LinkEndpointDto,
    pub target: LinkEndpointDto,
    /// `"ethernet"`, `"serial"`, or `"optical"`.
    #[serde(default)]
    pub link_type: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

/// Body for `POST /v2/projects/{id}/nodes`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateNodeRequest {
    pub name: String,
    pub node_type: String,
    pub x: f64,
    pub y: f64,
}

/// Body for `POST /v2/projects/{id}/links`.
#[derive(Debug, Clone, Serialize)]
pub struct CreateLinkRequest {
    pub source_node_id: Uuid,
    pub source_port: usize,
    pub target_node_id: Uuid,
    pub target_port: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_type: Option<String>,
}

// ── Dashboard service ──────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct QosPolicyDto {
    pub id: String,
    pub name: String,
    /// `"inbound"` or `"outbound"`.
    pub direction: String,
    /// Traffic class, e.g. `"voice"`, `"video"`, `"best-effort"`.
    pub class: String,
    #[serde(default)]
    pub rate_limit_kbps: Option<u64>,
    #[serde(default)]
    pub matched_sessions: u64,
    pub enabled: bool,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SlaTargetDto {
    pub id: String,
    pub name: String,
    pub availability_target_pct: f64,
    pub availability_pct: f64,
    #[serde(default)]
    pub latency_ms: Option<f64>,
    #[serde(default)]
    pub jitter_ms: Option<f64>,
    #[serde(default)]
    pub packet_loss_pct: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityAlertDto {
    pub id: String,
    /// `"critical"`, `"high"`, `"medium"`, `"low"`, or `"info"`.
    pub severity: String,
    pub category: String,
    pub message: String,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub acknowledged: bool,
    pub timestamp: DateTime<Utc>,
}

/// Body for `PATCH /api/qos/policies/{id}`.
#[derive(Debug, Clone, Serialize)]
pub struct SetPolicyEnabledRequest {
    pub enabled: bool,
}
