use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProjectStatus {
    Opened,
    #[default]
    Closed,
}

/// A lab project: a named container for one topology.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: Uuid,
    pub name: String,
    pub status: ProjectStatus,
}

impl Project {
    pub fn is_open(&self) -> bool {
        self.status == ProjectStatus::Opened
    }
}

/// A compute server registered with the lab controller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComputeServer {
    pub id: String,
    pub name: String,
    pub host: String,
    pub port: u16,
    pub connected: bool,
    pub cpu_usage_pct: Option<f64>,
    pub memory_usage_pct: Option<f64>,
}
