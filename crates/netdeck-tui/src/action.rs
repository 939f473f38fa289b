//! All possible UI actions. Actions are the sole mechanism for state mutation.

use std::sync::Arc;

use netdeck_core::model::{
    ComputeServer, Link, Node, Project, QosPolicy, SecurityAlert, SlaTarget,
};
use netdeck_core::Command;

use crate::screen::ScreenId;
use crate::theme::ThemeKind;

/// Notification severity level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationLevel {
    Info,
    Success,
    Warning,
    Error,
}

/// A toast notification, rendered in the top-right corner until dismissed
/// or expired.
#[derive(Debug, Clone)]
pub struct Notification {
    pub message: String,
    pub level: NotificationLevel,
}

impl Notification {
    pub fn success(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Success,
        }
    }

    pub fn error(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Error,
        }
    }

    pub fn warning(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Warning,
        }
    }

    pub fn info(msg: impl Into<String>) -> Self {
        Self {
            message: msg.into(),
            level: NotificationLevel::Info,
        }
    }
}

/// Every state transition in the TUI is expressed as an Action.
#[derive(Debug, Clone)]
pub enum Action {
    // ── Lifecycle ──────────────────────────────────────────────────
    Quit,
    Tick,
    Render,
    Resize(u16, u16),

    // ── Navigation ────────────────────────────────────────────────
    SwitchScreen(ScreenId),
    GoBack,
    ToggleHelp,

    // ── Theme ─────────────────────────────────────────────────────
    SetTheme(ThemeKind),

    // ── Data events (from netdeck-core streams) ───────────────────
    ProjectsUpdated(Arc<Vec<Arc<Project>>>),
    ComputesUpdated(Arc<Vec<Arc<ComputeServer>>>),
    NodesUpdated(Arc<Vec<Arc<Node>>>),
    LinksUpdated(Arc<Vec<Arc<Link>>>),
    PoliciesUpdated(Arc<Vec<Arc<QosPolicy>>>),
    SlaTargetsUpdated(Arc<Vec<Arc<SlaTarget>>>),
    AlertsUpdated(Arc<Vec<Arc<SecurityAlert>>>),

    // ── Connection status ─────────────────────────────────────────
    Connecting,
    Connected,
    Disconnected(String),
    Reconnecting,

    // ── Controller commands ───────────────────────────────────────
    /// Dispatch a mutation to the controller's command processor.
    Dispatch(Command),

    // ── Notifications ─────────────────────────────────────────────
    Notify(Notification),
    DismissNotification,
}
