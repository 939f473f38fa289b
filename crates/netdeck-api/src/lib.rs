//! Async HTTP clients for the two backends netdeck talks to:
//!
//! - **[`LabClient`]** — the GNS3-style lab server (`/v2/` JSON REST).
//!   Compute servers, projects, topology nodes and links, node lifecycle.
//! - **[`DashboardClient`]** — the dashboard service speaking the
//!   `{success, data, error, metadata}` envelope. QoS policies, SLA
//!   targets, security alerts.
//!
//! Both clients are thin: they own a `reqwest::Client`, map HTTP/JSON
//! failures into [`Error`], and expose typed wire DTOs under [`types`].
//! Domain translation lives in `netdeck-core`.

pub mod dashboard;
pub mod error;
pub mod lab;
pub mod transport;
pub mod types;

pub use dashboard::{DashboardClient, Envelope};
pub use error::Error;
pub use lab::LabClient;
pub use transport::{TlsMode, TransportConfig};
