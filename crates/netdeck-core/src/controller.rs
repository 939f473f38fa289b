// ── Controller abstraction ──
//
// Full lifecycle management for a backend connection: client setup,
// initial fetch, periodic background refresh, command routing, and
// reactive data streaming through the DataStore.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use tokio::sync::{Mutex, broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use uuid::Uuid;

use netdeck_api::{DashboardClient, LabClient, TlsMode, TransportConfig};

use crate::command::{Command, CommandEnvelope};
use crate::config::{ControllerConfig, TlsVerification};
use crate::error::CoreError;
use crate::model::{
    ComputeServer, EntityId, Link, Node, Project, QosPolicy, SecurityAlert, SlaTarget,
};
use crate::store::{DataStore, RefreshSnapshot};
use crate::stream::EntityStream;

const COMMAND_CHANNEL_SIZE: usize = 64;
const NOTICE_CHANNEL_SIZE: usize = 64;

/// Refresh intervals are clamped to this range regardless of config.
pub const MIN_REFRESH_SECS: u64 = 1;
pub const MAX_REFRESH_SECS: u64 = 30;

/// Clamp a configured refresh interval into the supported range.
pub fn clamp_refresh_interval(secs: u64) -> Duration {
    Duration::from_secs(secs.clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS))
}

// ── ConnectionState ──────────────────────────────────────────────────

/// Connection state observable by consumers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Connected,
    Reconnecting { attempt: u32 },
    Failed,
}

/// An operator-facing notification, surfaced by the UI as a toast.
/// Failures are reported exactly once and never retried implicitly.
#[derive(Debug, Clone)]
pub struct Notice {
    pub message: String,
}

// ── Controller ───────────────────────────────────────────────────────

/// The main entry point for consumers.
///
/// Cheaply cloneable via `Arc<ControllerInner>`. Owns the client
/// handles, the background refresh task, and the command processor.
#[derive(Clone)]
pub struct Controller {
    inner: Arc<ControllerInner>,
}

struct ControllerInner {
    config: ControllerConfig,
    store: Arc<DataStore>,
    connection_state: watch::Sender<ConnectionState>,
    notice_tx: broadcast::Sender<Notice>,
    command_tx: Mutex<mpsc::Sender<CommandEnvelope>>,
    command_rx: Mutex<Option<mpsc::Receiver<CommandEnvelope>>>,
    cancel: CancellationToken,
    /// Child token for the current connection — cancelled on disconnect,
    /// replaced on reconnect.
    cancel_child: Mutex<CancellationToken>,
    lab: Mutex<Option<LabClient>>,
    dashboard: Mutex<Option<DashboardClient>>,
    /// Project whose topology is fetched each cycle.
    active_project: Mutex<Option<Uuid>>,
    task_handles: Mutex<Vec<JoinHandle<()>>>,
    /// Monotonic fetch counter backing the store's stale-drop gate.
    fetch_generation: AtomicU64,
}

impl Controller {
    /// Create a Controller from configuration. Does NOT connect — call
    /// [`connect()`](Self::connect) to fetch data and start tasks.
    pub fn new(config: ControllerConfig) -> Self {
        let store = Arc::new(DataStore::new());
        let (connection_state, _) = watch::channel(ConnectionState::Disconnected);
        let (notice_tx, _) = broadcast::channel(NOTICE_CHANNEL_SIZE);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
        let cancel = CancellationToken::new();
        let cancel_child = cancel.child_token();

        Self {
            inner: Arc::new(ControllerInner {
                config,
                store,
                connection_state,
                notice_tx,
                command_tx: Mutex::new(command_tx),
                command_rx: Mutex::new(Some(command_rx)),
                cancel,
                cancel_child: Mutex::new(cancel_child),
                lab: Mutex::new(None),
                dashboard: Mutex::new(None),
                active_project: Mutex::new(None),
                task_handles: Mutex::new(Vec::new()),
                fetch_generation: AtomicU64::new(0),
            }),
        }
    }

    pub fn config(&self) -> &ControllerConfig {
        &self.inner.config
    }

    pub fn store(&self) -> &Arc<DataStore> {
        &self.inner.store
    }

    // ── Connection lifecycle ─────────────────────────────────────────

    /// Connect to both backends, perform an initial fetch, and spawn
    /// the background refresh and command processor tasks.
    pub async fn connect(&self) -> Result<(), CoreError> {
        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Connecting);

        if let Err(e) = self.connect_inner().await {
            let _ = self.inner.connection_state.send(ConnectionState::Failed);
            return Err(e);
        }

        let _ = self.inner.connection_state.send(ConnectionState::Connected);
        info!("connected");
        Ok(())
    }

    async fn connect_inner(&self) -> Result<(), CoreError> {
        // Fresh child token for this connection (supports reconnect).
        let child = self.inner.cancel.child_token();
        *self.inner.cancel_child.lock().await = child.clone();

        let config = &self.inner.config;
        let transport = TransportConfig {
            timeout: Duration::from_secs(config.request_timeout_secs),
            tls: match config.tls {
                TlsVerification::SystemDefaults => TlsMode::SystemDefaults,
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
        };

        let lab = LabClient::new(config.lab_url.as_str(), config.auth.api_key(), &transport)?;
        let dashboard = DashboardClient::new(
            config.dashboard_url.as_str(),
            config.auth.api_key(),
            &transport,
        )?;

        // The first opened project becomes the active topology.
        let projects = lab.projects().await?;
        let opened = projects
            .iter()
            .find(|p| p.status == "opened")
            .map(|p| p.project_id);
        if let Some(id) = opened {
            debug!(project = %id, "resuming opened project");
        }

        *self.inner.lab.lock().await = Some(lab);
        *self.inner.dashboard.lock().await = Some(dashboard);
        *self.inner.active_project.lock().await = opened;

        self.full_refresh().await?;

        let mut handles = self.inner.task_handles.lock().await;

        if let Some(rx) = self.inner.command_rx.lock().await.take() {
            let ctrl = self.clone();
            handles.push(tokio::spawn(command_processor_task(ctrl, rx)));
        }

        {
            let ctrl = self.clone();
            let interval = clamp_refresh_interval(config.refresh_interval_secs);
            let cancel = child.clone();
            handles.push(tokio::spawn(refresh_task(ctrl, interval, cancel)));
        }

        Ok(())
    }

    /// Disconnect: cancel background tasks and drop the clients.
    pub async fn disconnect(&self) {
        // Cancel the child token (not the parent — allows reconnect).
        self.inner.cancel_child.lock().await.cancel();

        let mut handles = self.inner.task_handles.lock().await;
        for handle in handles.drain(..) {
            let _ = handle.await;
        }

        *self.inner.lab.lock().await = None;
        *self.inner.dashboard.lock().await = None;
        *self.inner.active_project.lock().await = None;

        // Recreate the command channel so a reconnect gets a fresh
        // receiver; the previous one was consumed by the processor task.
        {
            let (tx, rx) = mpsc::channel(COMMAND_CHANNEL_SIZE);
            *self.inner.command_tx.lock().await = tx;
            *self.inner.command_rx.lock().await = Some(rx);
        }

        let _ = self
            .inner
            .connection_state
            .send(ConnectionState::Disconnected);
        debug!("disconnected");
    }

    // ── Refresh ──────────────────────────────────────────────────────

    /// Fetch everything and apply it to the store.
    ///
    /// Lab server failures are fatal for the cycle. Dashboard service
    /// failures are not: the previous records stay in place and a
    /// notice is emitted for the UI to toast.
    pub async fn full_refresh(&self) -> Result<(), CoreError> {
        let generation = self.inner.fetch_generation.fetch_add(1, Ordering::SeqCst) + 1;

        let lab = self.lab_client().await?;
        let dashboard = self.dashboard_client().await?;
        let project = *self.inner.active_project.lock().await;

        let (computes_res, projects_res) = tokio::join!(lab.computes(), lab.projects());
        let computes: Vec<ComputeServer> = computes_res?
            .into_iter()
            .map(ComputeServer::from)
            .collect();
        let projects: Vec<Project> = projects_res?.into_iter().map(Project::from).collect();

        let (nodes, links) = match project {
            Some(id) => {
                let (nodes_res, links_res) = tokio::join!(lab.nodes(id), lab.links(id));
                (
                    nodes_res?.into_iter().map(Node::from).collect(),
                    links_res?.into_iter().map(Link::from).collect(),
                )
            }
            None => (Vec::new(), Vec::new()),
        };

        let (qos_res, sla_res, alerts_res) = tokio::join!(
            dashboard.qos_policies(),
            dashboard.sla_targets(),
            dashboard.security_alerts(),
        );

        let store = &self.inner.store;
        let qos_policies = self.keep_current_on_error(
            "QoS policies",
            qos_res.map(|v| v.into_iter().map(QosPolicy::from).collect()),
            &store.qos_policies_snapshot(),
        );
        let sla_targets = self.keep_current_on_error(
            "SLA targets",
            sla_res.map(|v| v.into_iter().map(SlaTarget::from).collect()),
            &store.sla_targets_snapshot(),
        );
        let alerts = self.keep_current_on_error(
            "security alerts",
            alerts_res.map(|v| v.into_iter().map(SecurityAlert::from).collect()),
            &store.alerts_snapshot(),
        );

        let applied = store.apply_refresh_if_newer(
            generation,
            RefreshSnapshot {
                projects,
                computes,
                nodes,
                links,
                qos_policies,
                sla_targets,
                alerts,
            },
        );
        if applied {
            debug!(
                generation,
                nodes = store.node_count(),
                links = store.link_count(),
                "refresh applied"
            );
        } else {
            debug!(generation, "stale refresh dropped");
        }

        Ok(())
    }

    /// On fetch failure: warn, emit a notice, and keep the data already
    /// on screen. No automatic retry — the next cycle tries again.
    fn keep_current_on_error<T: Clone>(
        &self,
        label: &str,
        result: Result<Vec<T>, netdeck_api::Error>,
        current: &[Arc<T>],
    ) -> Vec<T> {
        match result {
            Ok(items) => items,
            Err(e) => {
                warn!(error = %e, "{label} fetch failed");
                self.notify(format!("{label} fetch failed: {e}"));
                current.iter().map(|item| (**item).clone()).collect()
            }
        }
    }

    fn notify(&self, message: String) {
        let _ = self.inner.notice_tx.send(Notice { message });
    }

    async fn lab_client(&self) -> Result<LabClient, CoreError> {
        self.inner
            .lab
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    async fn dashboard_client(&self) -> Result<DashboardClient, CoreError> {
        self.inner
            .dashboard
            .lock()
            .await
            .clone()
            .ok_or(CoreError::Disconnected)
    }

    // ── Command execution ────────────────────────────────────────────

    /// Execute a write command, awaiting the result from the command
    /// processor task.
    pub async fn execute(&self, cmd: Command) -> Result<(), CoreError> {
        if *self.inner.connection_state.borrow() != ConnectionState::Connected {
            return Err(CoreError::Disconnected);
        }

        let (tx, rx) = tokio::sync::oneshot::channel();
        let command_tx = self.inner.command_tx.lock().await.clone();

        command_tx
            .send(CommandEnvelope {
                command: cmd,
                response_tx: tx,
            })
            .await
            .map_err(|_| CoreError::Disconnected)?;

        rx.await.map_err(|_| CoreError::Disconnected)?
    }

    pub async fn active_project(&self) -> Option<Uuid> {
        *self.inner.active_project.lock().await
    }

    // ── State observation ────────────────────────────────────────────

    pub fn connection_state(&self) -> watch::Receiver<ConnectionState> {
        self.inner.connection_state.subscribe()
    }

    /// Subscribe to operator notices (fetch failures, command errors).
    pub fn notices(&self) -> broadcast::Receiver<Notice> {
        self.inner.notice_tx.subscribe()
    }

    // ── Stream accessors (delegate to DataStore) ─────────────────────

    pub fn projects(&self) -> EntityStream<Project> {
        self.inner.store.subscribe_projects()
    }

    pub fn computes(&self) -> EntityStream<ComputeServer> {
        self.inner.store.subscribe_computes()
    }

    pub fn nodes(&self) -> EntityStream<Node> {
        self.inner.store.subscribe_nodes()
    }

    pub fn links(&self) -> EntityStream<Link> {
        self.inner.store.subscribe_links()
    }

    pub fn qos_policies(&self) -> EntityStream<QosPolicy> {
        self.inner.store.subscribe_qos_policies()
    }

    pub fn sla_targets(&self) -> EntityStream<SlaTarget> {
        self.inner.store.subscribe_sla_targets()
    }

    pub fn alerts(&self) -> EntityStream<SecurityAlert> {
        self.inner.store.subscribe_alerts()
    }
}

// ── Background tasks ─────────────────────────────────────────────────

/// Periodic refresh. Failures are surfaced once per cycle as a notice;
/// connection-level failures flip the state to `Reconnecting` until a
/// cycle succeeds again.
async fn refresh_task(controller: Controller, interval: Duration, cancel: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
    // The first tick fires immediately; connect already refreshed.
    ticker.tick().await;

    let mut attempt: u32 = 0;
    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            _ = ticker.tick() => {
                match controller.full_refresh().await {
                    Ok(()) => {
                        if attempt > 0 {
                            attempt = 0;
                            let _ = controller
                                .inner
                                .connection_state
                                .send(ConnectionState::Connected);
                        }
                    }
                    Err(e) => {
                        warn!(error = %e, "periodic refresh failed");
                        controller.notify(format!("refresh failed: {e}"));
                        if is_connection_error(&e) {
                            attempt += 1;
                            let _ = controller
                                .inner
                                .connection_state
                                .send(ConnectionState::Reconnecting { attempt });
                        }
                    }
                }
            }
        }
    }
}

fn is_connection_error(err: &CoreError) -> bool {
    matches!(
        err,
        CoreError::ConnectionFailed { .. } | CoreError::Timeout { .. } | CoreError::Disconnected
    )
}

/// Drain the command channel, routing each command to a backend call.
async fn command_processor_task(controller: Controller, mut rx: mpsc::Receiver<CommandEnvelope>) {
    let cancel = controller.inner.cancel_child.lock().await.clone();

    loop {
        tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            envelope = rx.recv() => {
                let Some(envelope) = envelope else { break };
                let result = route_command(&controller, envelope.command).await;
                let _ = envelope.response_tx.send(result);
            }
        }
    }
}

async fn route_command(controller: &Controller, cmd: Command) -> Result<(), CoreError> {
    let store = &controller.inner.store;

    match cmd {
        Command::OpenProject { id } => {
            let lab = controller.lab_client().await?;
            lab.open_project(id).await?;
            *controller.inner.active_project.lock().await = Some(id);
            controller.full_refresh().await
        }

        Command::StartNode { id } => {
            let lab = controller.lab_client().await?;
            let project = controller
                .active_project()
                .await
                .ok_or(CoreError::NoOpenProject)?;
            lab.start_node(project, id).await?;
            Ok(())
        }

        Command::StopNode { id } => {
            let lab = controller.lab_client().await?;
            let project = controller
                .active_project()
                .await
                .ok_or(CoreError::NoOpenProject)?;
            lab.stop_node(project, id).await?;
            Ok(())
        }

        Command::SuspendNode { id } => {
            let lab = controller.lab_client().await?;
            let project = controller
                .active_project()
                .await
                .ok_or(CoreError::NoOpenProject)?;
            lab.suspend_node(project, id).await?;
            Ok(())
        }

        Command::SetPolicyEnabled { id, enabled } => {
            let dashboard = controller.dashboard_client().await?;
            dashboard.set_policy_enabled(&id, enabled).await?;
            // Reflect the confirmed state immediately; the next refresh
            // re-fetches it anyway.
            let key = EntityId::from(id);
            if let Some(policy) = store.qos_policy(&key) {
                let mut updated = (*policy).clone();
                updated.enabled = enabled;
                store.qos_policies.upsert(key, updated);
            }
            Ok(())
        }

        Command::AcknowledgeAlert { id } => {
            let dashboard = controller.dashboard_client().await?;
            dashboard.acknowledge_alert(&id).await?;
            let key = EntityId::from(id);
            if let Some(alert) = store.alert(&key) {
                let mut updated = (*alert).clone();
                updated.acknowledged = true;
                store.alerts.upsert(key, updated);
            }
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn refresh_interval_is_clamped_to_supported_range() {
        assert_eq!(clamp_refresh_interval(0), Duration::from_secs(1));
        assert_eq!(clamp_refresh_interval(5), Duration::from_secs(5));
        assert_eq!(clamp_refresh_interval(600), Duration::from_secs(30));
    }

    #[tokio::test]
    async fn execute_fails_fast_when_disconnected() {
        let config = ControllerConfig::new(
            url::Url::parse("http://127.0.0.1:3080").expect("static url"),
            url::Url::parse("http://127.0.0.1:4000").expect("static url"),
        );
        let controller = Controller::new(config);
        let result = controller
            .execute(Command::StartNode { id: Uuid::new_v4() })
            .await;
        assert!(matches!(result, Err(CoreError::Disconnected)));
    }
}
