//! Status indicators — ●/○/◐ spans with theme color mapping.

use netdeck_core::{AlertSeverity, LinkStatus, NodeStatus};
use ratatui::text::Span;

use crate::theme::{StylePart, Theme};

/// Styled status dot for a node.
pub fn node_status_span(status: NodeStatus, theme: &Theme) -> Span<'static> {
    let (symbol, part) = match status {
        NodeStatus::Started => ("●", StylePart::StatusGood),
        NodeStatus::Stopped => ("○", StylePart::StatusBad),
        NodeStatus::Suspended => ("◐", StylePart::StatusWarn),
    };
    Span::styled(symbol, theme.style(part))
}

/// Styled status dot for a link.
pub fn link_status_span(status: LinkStatus, theme: &Theme) -> Span<'static> {
    let (symbol, part) = match status {
        LinkStatus::Up => ("●", StylePart::StatusGood),
        LinkStatus::Down => ("○", StylePart::StatusIdle),
    };
    Span::styled(symbol, theme.style(part))
}

/// Styled severity badge, fixed width for table alignment.
pub fn severity_span(severity: AlertSeverity, theme: &Theme) -> Span<'static> {
    let label = match severity {
        AlertSeverity::Critical => "CRIT",
        AlertSeverity::High => "HIGH",
        AlertSeverity::Medium => "MED ",
        AlertSeverity::Low => "LOW ",
        AlertSeverity::Info => "INFO",
    };
    Span::styled(label, theme.severity_style(severity))
}

/// Styled connected/disconnected dot for a compute server.
pub fn compute_status_span(connected: bool, theme: &Theme) -> Span<'static> {
    if connected {
        Span::styled("●", theme.style(StylePart::StatusGood))
    } else {
        Span::styled("○", theme.style(StylePart::StatusBad))
    }
}
