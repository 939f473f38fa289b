//! Data bridge — connects [`Controller`] streams to TUI actions.
//!
//! Runs as a background task: subscribes to entity streams, notices, and
//! connection state from the controller, forwarding every change as an
//! [`Action`] through the TUI's action channel. Commands flow the other
//! way: the app sends [`Command`]s here and results come back as toasts.

use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use netdeck_core::{Command, ConnectionState, Controller};

use crate::action::{Action, Notification};

/// Spawn the data bridge connecting [`Controller`] reactive streams to the TUI.
///
/// Connects to the controller, sends initial data snapshots, then loops
/// forwarding every entity change and connection-state transition as an
/// [`Action`]. Shuts down cleanly on cancellation.
pub async fn spawn_data_bridge(
    controller: Controller,
    action_tx: mpsc::UnboundedSender<Action>,
    mut command_rx: mpsc::UnboundedReceiver<Command>,
    cancel: CancellationToken,
) {
    let _ = action_tx.send(Action::Connecting);

    if let Err(e) = controller.connect().await {
        warn!(error = %e, "failed to connect");
        let _ = action_tx.send(Action::Disconnected(format!("{e}")));
        let _ = action_tx.send(Action::Notify(Notification::error(format!(
            "connection failed: {e}"
        ))));
        return;
    }

    let _ = action_tx.send(Action::Connected);

    // Subscribe to entity streams
    let mut projects = controller.projects();
    let mut computes = controller.computes();
    let mut nodes = controller.nodes();
    let mut links = controller.links();
    let mut policies = controller.qos_policies();
    let mut sla_targets = controller.sla_targets();
    let mut alerts = controller.alerts();
    let mut notices = controller.notices();
    let mut conn_state = controller.connection_state();

    // Push initial snapshots so screens have data immediately
    let _ = action_tx.send(Action::ProjectsUpdated(projects.current().clone()));
    let _ = action_tx.send(Action::ComputesUpdated(computes.current().clone()));
    let _ = action_tx.send(Action::NodesUpdated(nodes.current().clone()));
    let _ = action_tx.send(Action::LinksUpdated(links.current().clone()));
    let _ = action_tx.send(Action::PoliciesUpdated(policies.current().clone()));
    let _ = action_tx.send(Action::SlaTargetsUpdated(sla_targets.current().clone()));
    let _ = action_tx.send(Action::AlertsUpdated(alerts.current().clone()));

    // Stream loop — forward every change until cancelled
    loop {
        tokio::select! {
            biased;

            () = cancel.cancelled() => break,

            Some(cmd) = command_rx.recv() => {
                execute_command(&controller, cmd, &action_tx);
            }

            Some(p) = projects.changed() => {
                let _ = action_tx.send(Action::ProjectsUpdated(p));
            }
            Some(c) = computes.changed() => {
                let _ = action_tx.send(Action::ComputesUpdated(c));
            }
            Some(n) = nodes.changed() => {
                let _ = action_tx.send(Action::NodesUpdated(n));
            }
            Some(l) = links.changed() => {
                let _ = action_tx.send(Action::LinksUpdated(l));
            }
            Some(p) = policies.changed() => {
                let _ = action_tx.send(Action::PoliciesUpdated(p));
            }
            Some(s) = sla_targets.changed() => {
                let _ = action_tx.send(Action::SlaTargetsUpdated(s));
            }
            Some(a) = alerts.changed() => {
                let _ = action_tx.send(Action::AlertsUpdated(a));
            }
            Ok(notice) = notices.recv() => {
                let _ = action_tx.send(Action::Notify(Notification::warning(notice.message)));
            }
            Ok(()) = conn_state.changed() => {
                let state = conn_state.borrow_and_update().clone();
                match state {
                    ConnectionState::Connected => {
                        let _ = action_tx.send(Action::Connected);
                    }
                    ConnectionState::Disconnected => {
                        let _ = action_tx.send(Action::Disconnected("disconnected".into()));
                    }
                    ConnectionState::Reconnecting { .. } => {
                        let _ = action_tx.send(Action::Reconnecting);
                    }
                    ConnectionState::Failed => {
                        let _ = action_tx.send(Action::Disconnected("connection failed".into()));
                    }
                    ConnectionState::Connecting => {}
                }
            }
        }
    }

    controller.disconnect().await;
    debug!("data bridge shut down");
}

/// Run one command off the bridge loop so a slow mutation never stalls
/// stream forwarding. Failures surface as error toasts.
fn execute_command(
    controller: &Controller,
    cmd: Command,
    action_tx: &mpsc::UnboundedSender<Action>,
) {
    let controller = controller.clone();
    let action_tx = action_tx.clone();
    tokio::spawn(async move {
        let label = command_label(&cmd);
        match controller.execute(cmd).await {
            Ok(()) => {
                let _ = action_tx.send(Action::Notify(Notification::success(label)));
            }
            Err(e) => {
                warn!(error = %e, "command failed");
                let _ = action_tx.send(Action::Notify(Notification::error(format!(
                    "{label} failed: {e}"
                ))));
            }
        }
    });
}

fn command_label(cmd: &Command) -> String {
    match cmd {
        Command::OpenProject { .. } => "project opened".into(),
        Command::StartNode { .. } => "node started".into(),
        Command::StopNode { .. } => "node stopped".into(),
        Command::SuspendNode { .. } => "node suspended".into(),
        Command::SetPolicyEnabled { enabled: true, .. } => "policy enabled".into(),
        Command::SetPolicyEnabled { enabled: false, .. } => "policy disabled".into(),
        Command::AcknowledgeAlert { .. } => "alert acknowledged".into(),
    }
}
