//! Themes and semantic styling for the TUI.
//!
//! Every renderable surface asks the active [`Theme`] for a style by
//! [`StylePart`]; the lookup is an exhaustive match, so a theme can never
//! be missing a part. The selected theme name persists through
//! `netdeck-config` and round-trips across restarts.

use std::fmt;

use netdeck_core::{AlertSeverity, SlaStanding};
use ratatui::style::{Color, Modifier, Style};

// ── Theme selection ──────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ThemeKind {
    /// High-saturation dark theme.
    #[default]
    Neon,
    /// Muted blue-gray dark theme.
    Midnight,
    /// Light theme for bright terminals.
    Paper,
}

impl ThemeKind {
    pub const ALL: [ThemeKind; 3] = [Self::Neon, Self::Midnight, Self::Paper];

    /// Canonical name as persisted in the config file.
    pub fn name(self) -> &'static str {
        match self {
            Self::Neon => "neon",
            Self::Midnight => "midnight",
            Self::Paper => "paper",
        }
    }

    /// Parse a persisted name; unknown or absent values get the default.
    pub fn from_name(name: Option<&str>) -> Self {
        match name {
            Some("neon") => Self::Neon,
            Some("midnight") => Self::Midnight,
            Some("paper") => Self::Paper,
            _ => Self::default(),
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Neon => Self::Midnight,
            Self::Midnight => Self::Paper,
            Self::Paper => Self::Neon,
        }
    }
}

impl fmt::Display for ThemeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ── Style parts ──────────────────────────────────────────────────────

/// Every semantic style a screen can request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StylePart {
    Title,
    BorderFocused,
    BorderDefault,
    TableHeader,
    TableRow,
    TableSelected,
    TabActive,
    TabInactive,
    KeyHint,
    KeyHintKey,
    StatusGood,
    StatusWarn,
    StatusBad,
    StatusIdle,
    ToastInfo,
    ToastSuccess,
    ToastWarning,
    ToastError,
    GaugeFill,
    Overlay,
}

// ── Palette ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
struct Palette {
    accent: Color,
    heading: Color,
    text: Color,
    dim: Color,
    border: Color,
    bg: Color,
    bg_highlight: Color,
    good: Color,
    warn: Color,
    bad: Color,
    info: Color,
}

const NEON: Palette = Palette {
    accent: Color::Rgb(225, 53, 255),       // electric purple
    heading: Color::Rgb(128, 255, 234),     // neon cyan
    text: Color::Rgb(189, 193, 207),
    dim: Color::Rgb(98, 114, 164),
    border: Color::Rgb(98, 114, 164),
    bg: Color::Rgb(30, 31, 41),
    bg_highlight: Color::Rgb(40, 42, 54),
    good: Color::Rgb(80, 250, 123),
    warn: Color::Rgb(241, 250, 140),
    bad: Color::Rgb(255, 99, 99),
    info: Color::Rgb(139, 233, 253),
};

const MIDNIGHT: Palette = Palette {
    accent: Color::Rgb(122, 162, 247),      // steel blue
    heading: Color::Rgb(125, 207, 255),
    text: Color::Rgb(169, 177, 214),
    dim: Color::Rgb(86, 95, 137),
    border: Color::Rgb(59, 66, 97),
    bg: Color::Rgb(26, 27, 38),
    bg_highlight: Color::Rgb(41, 46, 66),
    good: Color::Rgb(158, 206, 106),
    warn: Color::Rgb(224, 175, 104),
    bad: Color::Rgb(247, 118, 142),
    info: Color::Rgb(125, 207, 255),
};

const PAPER: Palette = Palette {
    accent: Color::Rgb(175, 0, 219),
    heading: Color::Rgb(0, 92, 197),
    text: Color::Rgb(36, 41, 46),
    dim: Color::Rgb(106, 115, 125),
    border: Color::Rgb(149, 157, 165),
    bg: Color::Rgb(255, 255, 255),
    bg_highlight: Color::Rgb(223, 231, 240),
    good: Color::Rgb(34, 134, 58),
    warn: Color::Rgb(176, 136, 0),
    bad: Color::Rgb(203, 36, 49),
    info: Color::Rgb(0, 92, 197),
};

// ── Theme ────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy)]
pub struct Theme {
    kind: ThemeKind,
    palette: Palette,
}

impl Theme {
    pub fn new(kind: ThemeKind) -> Self {
        let palette = match kind {
            ThemeKind::Neon => NEON,
            ThemeKind::Midnight => MIDNIGHT,
            ThemeKind::Paper => PAPER,
        };
        Self { kind, palette }
    }

    pub fn kind(&self) -> ThemeKind {
        self.kind
    }

    /// Semantic style lookup. Exhaustive over [`StylePart`].
    pub fn style(&self, part: StylePart) -> Style {
        let p = &self.palette;
        match part {
            StylePart::Title => Style::default().fg(p.heading).add_modifier(Modifier::BOLD),
            StylePart::BorderFocused => Style::default().fg(p.accent),
            StylePart::BorderDefault => Style::default().fg(p.border),
            StylePart::TableHeader => Style::default()
                .fg(p.heading)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
            StylePart::TableRow => Style::default().fg(p.text),
            StylePart::TableSelected => Style::default()
                .fg(p.accent)
                .bg(p.bg_highlight)
                .add_modifier(Modifier::BOLD),
            StylePart::TabActive => Style::default().fg(p.accent).add_modifier(Modifier::BOLD),
            StylePart::TabInactive => Style::default().fg(p.text),
            StylePart::KeyHint => Style::default().fg(p.dim),
            StylePart::KeyHintKey => Style::default().fg(p.heading).add_modifier(Modifier::BOLD),
            StylePart::StatusGood => Style::default().fg(p.good),
            StylePart::StatusWarn => Style::default().fg(p.warn),
            StylePart::StatusBad => Style::default().fg(p.bad),
            StylePart::StatusIdle => Style::default().fg(p.dim),
            StylePart::ToastInfo => Style::default().fg(p.info),
            StylePart::ToastSuccess => Style::default().fg(p.good),
            StylePart::ToastWarning => Style::default().fg(p.warn),
            StylePart::ToastError => Style::default().fg(p.bad).add_modifier(Modifier::BOLD),
            StylePart::GaugeFill => Style::default().fg(p.accent).bg(p.bg_highlight),
            StylePart::Overlay => Style::default().bg(p.bg),
        }
    }

    /// Style for an alert severity badge.
    pub fn severity_style(&self, severity: AlertSeverity) -> Style {
        match severity {
            AlertSeverity::Critical => self
                .style(StylePart::StatusBad)
                .add_modifier(Modifier::BOLD),
            AlertSeverity::High => self.style(StylePart::StatusBad),
            AlertSeverity::Medium => self.style(StylePart::StatusWarn),
            AlertSeverity::Low => self.style(StylePart::TableRow),
            AlertSeverity::Info => self.style(StylePart::StatusIdle),
        }
    }

    /// Style for an SLA standing cell.
    pub fn standing_style(&self, standing: SlaStanding) -> Style {
        match standing {
            SlaStanding::Met => self.style(StylePart::StatusGood),
            SlaStanding::AtRisk => self.style(StylePart::StatusWarn),
            SlaStanding::Breached => self.style(StylePart::StatusBad),
        }
    }

    // Raw colors for canvas drawing, where ratatui wants `Color` not `Style`.

    pub fn accent_color(&self) -> Color {
        self.palette.accent
    }

    pub fn dim_color(&self) -> Color {
        self.palette.dim
    }

    pub fn good_color(&self) -> Color {
        self.palette.good
    }

    pub fn bad_color(&self) -> Color {
        self.palette.bad
    }

    pub fn text_color(&self) -> Color {
        self.palette.text
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::new(ThemeKind::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_theme_name_falls_back_to_default() {
        assert_eq!(ThemeKind::from_name(Some("solarized")), ThemeKind::Neon);
        assert_eq!(ThemeKind::from_name(None), ThemeKind::Neon);
        assert_eq!(ThemeKind::from_name(Some("paper")), ThemeKind::Paper);
    }

    #[test]
    fn theme_names_round_trip() {
        for kind in ThemeKind::ALL {
            assert_eq!(ThemeKind::from_name(Some(kind.name())), kind);
        }
    }

    #[test]
    fn cycling_visits_every_theme() {
        let start = ThemeKind::Neon;
        let mut seen = vec![start];
        let mut current = start.next();
        while current != start {
            seen.push(current);
            current = current.next();
        }
        assert_eq!(seen.len(), ThemeKind::ALL.len());
    }
}
