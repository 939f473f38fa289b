// ── Dashboard domain records ──
//
// QoS policies, SLA targets, and security alerts as the UI consumes
// them. Wire strings are parsed into closed enums during conversion;
// anything unrecognized falls back to a catch-all variant rather than
// failing the whole refresh.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ── QoS ──────────────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Inbound,
    Outbound,
}

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum TrafficClass {
    Voice,
    Video,
    Critical,
    BestEffort,
    Scavenger,
    Other,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QosPolicy {
    pub id: String,
    pub name: String,
    pub direction: Direction,
    pub class: TrafficClass,
    /// `None` means the policy prioritizes without shaping.
    pub rate_limit_kbps: Option<u64>,
    pub matched_sessions: u64,
    pub enabled: bool,
    pub description: Option<String>,
}

// ── SLA ──────────────────────────────────────────────────────────────

/// Compliance bucket for a target, derived from measured availability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum SlaStanding {
    Met,
    AtRisk,
    Breached,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaTarget {
    pub id: String,
    pub name: String,
    pub availability_target_pct: f64,
    pub availability_pct: f64,
    pub latency_ms: Option<f64>,
    pub jitter_ms: Option<f64>,
    pub packet_loss_pct: Option<f64>,
}

impl SlaTarget {
    /// Breached below target, at risk within half a point above it.
    pub fn standing(&self) -> SlaStanding {
        if self.availability_pct < self.availability_target_pct {
            SlaStanding::Breached
        } else if self.availability_pct < self.availability_target_pct + 0.5 {
            SlaStanding::AtRisk
        } else {
            SlaStanding::Met
        }
    }
}

// ── Security ─────────────────────────────────────────────────────────

/// Ordered most severe first, so sorting by severity puts critical on top.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum AlertSeverity {
    Critical,
    High,
    Medium,
    Low,
    Info,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityAlert {
    pub id: String,
    pub severity: AlertSeverity,
    pub category: String,
    pub message: String,
    pub source: Option<String>,
    pub acknowledged: bool,
    pub timestamp: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn target(target_pct: f64, measured_pct: f64) -> SlaTarget {
        SlaTarget {
            id: "sla-1".into(),
            name: "core uplink".into(),
            availability_target_pct: target_pct,
            availability_pct: measured_pct,
            latency_ms: None,
            jitter_ms: None,
            packet_loss_pct: None,
        }
    }

    #[test]
    fn standing_below_target_is_breached() {
        assert_eq!(target(99.9, 99.7).standing(), SlaStanding::Breached);
    }

    #[test]
    fn standing_just_above_target_is_at_risk() {
        assert_eq!(target(99.0, 99.3).standing(), SlaStanding::AtRisk);
    }

    #[test]
    fn standing_with_headroom_is_met() {
        assert_eq!(target(99.0, 99.6).standing(), SlaStanding::Met);
    }

    #[test]
    fn severity_orders_critical_first() {
        assert!(AlertSeverity::Critical < AlertSeverity::High);
        assert!(AlertSeverity::Low < AlertSeverity::Info);
    }

    #[test]
    fn traffic_class_parses_kebab_case() {
        assert_eq!(
            TrafficClass::from_str("best-effort").unwrap(),
            TrafficClass::BestEffort
        );
    }
}
