// ── Command API ──
//
// All server-side write operations flow through one `Command` enum,
// routed by the controller's command processor task. Reads never go
// through here; they come from the refresh cycle.

use uuid::Uuid;

use crate::error::CoreError;
use crate::model::NodeId;

/// A command plus its oneshot response channel.
pub(crate) struct CommandEnvelope {
    pub command: Command,
    pub response_tx: tokio::sync::oneshot::Sender<Result<(), CoreError>>,
}

/// All write operations against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Open a project and make it the active topology.
    OpenProject { id: Uuid },

    // ── Node lifecycle ───────────────────────────────────────────────
    StartNode { id: NodeId },
    StopNode { id: NodeId },
    SuspendNode { id: NodeId },

    // ── Dashboard mutations ──────────────────────────────────────────
    SetPolicyEnabled { id: String, enabled: bool },
    AcknowledgeAlert { id: String },
}
