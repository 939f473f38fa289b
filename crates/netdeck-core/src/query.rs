// ── Widget query logic ──
//
// Pure functions over store snapshots: filtering, substring search,
// sorting, and aggregate summaries. Recomputed per render by the TUI,
// so everything here is allocation-light and side-effect free.

use std::sync::Arc;

use crate::model::{AlertSeverity, QosPolicy, SecurityAlert, SlaStanding, SlaTarget, TrafficClass};

// ── Filters ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicyFilter {
    #[default]
    All,
    Enabled,
    Disabled,
    Class(TrafficClass),
}

impl PolicyFilter {
    pub fn matches(&self, policy: &QosPolicy) -> bool {
        match self {
            Self::All => true,
            Self::Enabled => policy.enabled,
            Self::Disabled => !policy.enabled,
            Self::Class(class) => policy.class == *class,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Enabled => "enabled",
            Self::Disabled => "disabled",
            Self::Class(_) => "class",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AlertFilter {
    #[default]
    All,
    Unacknowledged,
    /// Alerts at this severity or worse.
    MinSeverity(AlertSeverity),
}

impl AlertFilter {
    pub fn matches(&self, alert: &SecurityAlert) -> bool {
        match self {
            Self::All => true,
            Self::Unacknowledged => !alert.acknowledged,
            Self::MinSeverity(min) => alert.severity <= *min,
        }
    }
}

// ── Sorting ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PolicySort {
    #[default]
    Name,
    /// Busiest policies first.
    MatchedSessions,
    Class,
}

// ── Queries ──────────────────────────────────────────────────────────

/// Filter, search, and sort one policy snapshot for display.
///
/// Search is a case-insensitive substring match over name and
/// description; filter and search compose independently.
pub fn query_policies(
    policies: &[Arc<QosPolicy>],
    filter: PolicyFilter,
    search: &str,
    sort: PolicySort,
) -> Vec<Arc<QosPolicy>> {
    let needle = search.to_lowercase();
    let mut out: Vec<Arc<QosPolicy>> = policies
        .iter()
        .filter(|p| filter.matches(p))
        .filter(|p| {
            needle.is_empty()
                || p.name.to_lowercase().contains(&needle)
                || p.description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    match sort {
        PolicySort::Name => out.sort_by(|a, b| a.name.cmp(&b.name)),
        PolicySort::MatchedSessions => {
            out.sort_by(|a, b| b.matched_sessions.cmp(&a.matched_sessions));
        }
        PolicySort::Class => out.sort_by(|a, b| a.class.cmp(&b.class).then(a.name.cmp(&b.name))),
    }
    out
}

/// Filter and search an alert snapshot, most severe and newest first.
pub fn query_alerts(
    alerts: &[Arc<SecurityAlert>],
    filter: AlertFilter,
    search: &str,
) -> Vec<Arc<SecurityAlert>> {
    let needle = search.to_lowercase();
    let mut out: Vec<Arc<SecurityAlert>> = alerts
        .iter()
        .filter(|a| filter.matches(a))
        .filter(|a| {
            needle.is_empty()
                || a.message.to_lowercase().contains(&needle)
                || a.category.to_lowercase().contains(&needle)
                || a.source.as_deref().is_some_and(|s| s.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect();

    out.sort_by(|a, b| {
        a.severity
            .cmp(&b.severity)
            .then(b.timestamp.cmp(&a.timestamp))
    });
    out
}

/// Sort SLA targets worst standing first for the compliance table.
pub fn sorted_sla_targets(targets: &[Arc<SlaTarget>]) -> Vec<Arc<SlaTarget>> {
    let rank = |t: &SlaTarget| match t.standing() {
        SlaStanding::Breached => 0,
        SlaStanding::AtRisk => 1,
        SlaStanding::Met => 2,
    };
    let mut out = targets.to_vec();
    out.sort_by(|a, b| rank(a).cmp(&rank(b)).then(a.name.cmp(&b.name)));
    out
}

// ── Aggregates ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PolicySummary {
    pub total: usize,
    pub enabled: usize,
    pub matched_sessions: u64,
}

pub fn policy_summary(policies: &[Arc<QosPolicy>]) -> PolicySummary {
    PolicySummary {
        total: policies.len(),
        enabled: policies.iter().filter(|p| p.enabled).count(),
        matched_sessions: policies.iter().map(|p| p.matched_sessions).sum(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct SlaSummary {
    pub total: usize,
    pub met: usize,
    pub at_risk: usize,
    pub breached: usize,
    pub avg_availability_pct: f64,
}

impl SlaSummary {
    /// Share of targets meeting or exceeding their target, 0–100.
    pub fn compliance_pct(&self) -> f64 {
        if self.total == 0 {
            return 100.0;
        }
        #[allow(clippy::cast_precision_loss)]
        let pct = (self.met + self.at_risk) as f64 / self.total as f64 * 100.0;
        pct
    }
}

pub fn sla_summary(targets: &[Arc<SlaTarget>]) -> SlaSummary {
    let mut summary = SlaSummary {
        total: targets.len(),
        ..SlaSummary::default()
    };
    let mut availability_sum = 0.0;
    for target in targets {
        availability_sum += target.availability_pct;
        match target.standing() {
            SlaStanding::Met => summary.met += 1,
            SlaStanding::AtRisk => summary.at_risk += 1,
            SlaStanding::Breached => summary.breached += 1,
        }
    }
    if summary.total > 0 {
        #[allow(clippy::cast_precision_loss)]
        {
            summary.avg_availability_pct = availability_sum / summary.total as f64;
        }
    }
    summary
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AlertSummary {
    pub total: usize,
    pub unacknowledged: usize,
    pub critical: usize,
    pub high: usize,
}

pub fn alert_summary(alerts: &[Arc<SecurityAlert>]) -> AlertSummary {
    AlertSummary {
        total: alerts.len(),
        unacknowledged: alerts.iter().filter(|a| !a.acknowledged).count(),
        critical: alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::Critical)
            .count(),
        high: alerts
            .iter()
            .filter(|a| a.severity == AlertSeverity::High)
            .count(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Direction;
    use chrono::{TimeZone, Utc};

    fn policy(id: &str, name: &str, class: TrafficClass, enabled: bool, sessions: u64) -> Arc<QosPolicy> {
        Arc::new(QosPolicy {
            id: id.into(),
            name: name.into(),
            direction: Direction::Outbound,
            class,
            rate_limit_kbps: None,
            matched_sessions: sessions,
            enabled,
            description: None,
        })
    }

    fn alert(id: &str, severity: AlertSeverity, message: &str, acked: bool) -> Arc<SecurityAlert> {
        Arc::new(SecurityAlert {
            id: id.into(),
            severity,
            category: "ids".into(),
            message: message.into(),
            source: None,
            acknowledged: acked,
            timestamp: Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap(),
        })
    }

    fn fixture() -> Vec<Arc<QosPolicy>> {
        vec![
            policy("1", "voip-priority", TrafficClass::Voice, true, 42),
            policy("2", "bulk-backup", TrafficClass::Scavenger, false, 7),
            policy("3", "video-calls", TrafficClass::Video, true, 133),
        ]
    }

    #[test]
    fn enabled_filter_returns_exactly_enabled_subset() {
        let policies = fixture();
        // Regardless of search text or sort order.
        for sort in [PolicySort::Name, PolicySort::MatchedSessions, PolicySort::Class] {
            let out = query_policies(&policies, PolicyFilter::Enabled, "", sort);
            assert_eq!(out.len(), 2);
            assert!(out.iter().all(|p| p.enabled));
        }
        let out = query_policies(&policies, PolicyFilter::Enabled, "vo", PolicySort::Name);
        assert!(out.iter().all(|p| p.enabled));
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let policies = fixture();
        let out = query_policies(&policies, PolicyFilter::All, "VOIP", PolicySort::Name);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].name, "voip-priority");
    }

    #[test]
    fn session_sort_is_descending() {
        let policies = fixture();
        let out = query_policies(&policies, PolicyFilter::All, "", PolicySort::MatchedSessions);
        assert_eq!(out[0].matched_sessions, 133);
        assert_eq!(out[2].matched_sessions, 7);
    }

    #[test]
    fn class_filter_selects_one_class() {
        let policies = fixture();
        let out = query_policies(
            &policies,
            PolicyFilter::Class(TrafficClass::Voice),
            "",
            PolicySort::Name,
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].class, TrafficClass::Voice);
    }

    #[test]
    fn alert_min_severity_includes_worse() {
        let alerts = vec![
            alert("a", AlertSeverity::Critical, "port scan", false),
            alert("b", AlertSeverity::Medium, "weak cipher", false),
            alert("c", AlertSeverity::Info, "login", true),
        ];
        let out = query_alerts(&alerts, AlertFilter::MinSeverity(AlertSeverity::Medium), "");
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].severity, AlertSeverity::Critical);
    }

    #[test]
    fn alert_summary_counts() {
        let alerts = vec![
            alert("a", AlertSeverity::Critical, "x", false),
            alert("b", AlertSeverity::High, "y", true),
            alert("c", AlertSeverity::High, "z", false),
        ];
        let summary = alert_summary(&alerts);
        assert_eq!(summary.total, 3);
        assert_eq!(summary.unacknowledged, 2);
        assert_eq!(summary.critical, 1);
        assert_eq!(summary.high, 2);
    }

    #[test]
    fn sla_summary_buckets_and_average() {
        let mk = |id: &str, target: f64, measured: f64| {
            Arc::new(SlaTarget {
                id: id.into(),
                name: id.into(),
                availability_target_pct: target,
                availability_pct: measured,
                latency_ms: None,
                jitter_ms: None,
                packet_loss_pct: None,
            })
        };
        let targets = vec![mk("a", 99.0, 99.9), mk("b", 99.0, 99.2), mk("c", 99.9, 98.0)];
        let summary = sla_summary(&targets);
        assert_eq!(summary.met, 1);
        assert_eq!(summary.at_risk, 1);
        assert_eq!(summary.breached, 1);
        assert!((summary.avg_availability_pct - 99.033).abs() < 0.01);
        assert!((summary.compliance_pct() - 66.666).abs() < 0.01);

        assert!((SlaSummary::default().compliance_pct() - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn sla_sort_puts_breached_first() {
        let mk = |name: &str, target: f64, measured: f64| {
            Arc::new(SlaTarget {
                id: name.into(),
                name: name.into(),
                availability_target_pct: target,
                availability_pct: measured,
                latency_ms: None,
                jitter_ms: None,
                packet_loss_pct: None,
            })
        };
        let out = sorted_sla_targets(&[mk("ok", 99.0, 99.9), mk("bad", 99.9, 98.0)]);
        assert_eq!(out[0].name, "bad");
    }
}
