//! Domain core between `netdeck-api` and UI consumers.
//!
//! This crate owns the business logic, domain model, and reactive data
//! infrastructure for the netdeck workspace:
//!
//! - **[`TopologyEditor`]** — In-memory graph editing for one open
//!   project: node placement with per-kind default ports, first-free-port
//!   auto-connect, cascading delete, drag coalescing, and linear
//!   undo/redo over full snapshots. Pure and synchronous.
//!
//! - **[`Controller`]** — Central facade managing the full lifecycle:
//!   [`connect()`](Controller::connect) builds the clients, fetches an
//!   initial snapshot, then spawns background tasks for periodic refresh
//!   and command processing.
//!
//! - **[`DataStore`]** — Lock-free reactive storage built on
//!   `EntityCollection<T>` (`DashMap` + `tokio::sync::watch` channels),
//!   with a generation gate so stale fetches never clobber newer data.
//!
//! - **[`EntityStream<T>`]** — Subscription handle vended by the
//!   `DataStore`. Exposes `current()` / `latest()` / `changed()` for
//!   reactive rendering.
//!
//! - **[`Command`]** — Typed mutation requests routed through an `mpsc`
//!   channel to the controller's command processor. Reads bypass the
//!   channel via `DataStore` snapshots.
//!
//! - **Domain model** ([`model`]) and **widget queries** ([`query`]) —
//!   canonical types plus the pure filter/sort/search/aggregate
//!   functions the dashboard screens recompute per render.

pub mod command;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod query;
pub mod store;
pub mod stream;
pub mod topology;

// ── Primary re-exports ──────────────────────────────────────────────
pub use command::Command;
pub use config::{AuthCredentials, ControllerConfig, TlsVerification};
pub use controller::{ConnectionState, Controller, Notice, clamp_refresh_interval};
pub use error::CoreError;
pub use store::{DataStore, RefreshSnapshot};
pub use stream::EntityStream;
pub use topology::{Snapshot, TopologyEditor};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    AlertSeverity,
    ComputeServer,
    Direction,
    Endpoint,
    EntityId,
    Link,
    LinkId,
    LinkKind,
    LinkStatus,
    Node,
    NodeId,
    NodeKind,
    NodeStatus,
    Port,
    PortStatus,
    Position,
    Project,
    ProjectStatus,
    QosPolicy,
    SecurityAlert,
    SlaStanding,
    SlaTarget,
    TrafficClass,
};
