//! Human-readable value formatting helpers.

use chrono::{DateTime, Utc};

/// Format a percentage with one decimal, e.g. "99.9%".
pub fn fmt_pct(pct: f64) -> String {
    format!("{pct:.1}%")
}

/// Format an optional percentage, "—" when absent.
pub fn fmt_opt_pct(pct: Option<f64>) -> String {
    pct.map_or_else(|| "—".to_owned(), fmt_pct)
}

/// Format an optional millisecond figure, e.g. "12.4 ms".
pub fn fmt_opt_ms(ms: Option<f64>) -> String {
    ms.map_or_else(|| "—".to_owned(), |v| format!("{v:.1} ms"))
}

/// Format a rate limit in kbit/s, "unlimited" when absent.
pub fn fmt_rate_limit(kbps: Option<u64>) -> String {
    match kbps {
        Some(kbps) if kbps >= 1_000_000 => {
            #[allow(clippy::cast_precision_loss)]
            let gbps = kbps as f64 / 1_000_000.0;
            format!("{gbps:.1} Gbps")
        }
        Some(kbps) if kbps >= 1_000 => {
            #[allow(clippy::cast_precision_loss)]
            let mbps = kbps as f64 / 1_000.0;
            format!("{mbps:.1} Mbps")
        }
        Some(kbps) => format!("{kbps} Kbps"),
        None => "unlimited".to_owned(),
    }
}

/// Compact "how long ago" formatting for timestamps, e.g. "4m 12s ago".
pub fn fmt_age(timestamp: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let age = now.signed_duration_since(timestamp);
    let Ok(age) = age.to_std() else {
        return "just now".to_owned();
    };
    // Truncate to whole seconds so humantime stays terse.
    let secs = std::time::Duration::from_secs(age.as_secs());
    if secs.is_zero() {
        return "just now".to_owned();
    }
    format!("{} ago", humantime::format_duration(secs))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeDelta;

    #[test]
    fn rate_limit_picks_sensible_units() {
        assert_eq!(fmt_rate_limit(None), "unlimited");
        assert_eq!(fmt_rate_limit(Some(512)), "512 Kbps");
        assert_eq!(fmt_rate_limit(Some(2_500)), "2.5 Mbps");
        assert_eq!(fmt_rate_limit(Some(1_000_000)), "1.0 Gbps");
    }

    #[test]
    fn age_handles_future_and_zero() {
        let now = Utc::now();
        assert_eq!(fmt_age(now, now), "just now");
        assert_eq!(fmt_age(now + TimeDelta::seconds(5), now), "just now");
        assert_eq!(fmt_age(now - TimeDelta::seconds(90), now), "1m 30s ago");
    }
}
