// ── Transport-layer error taxonomy ──
//
// Everything a request can fail with, typed. Consumers in netdeck-core
// translate these into CoreError so UI layers never see reqwest details.

use thiserror::Error;

/// Unified error type for both API clients.
#[derive(Debug, Error)]
pub enum Error {
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("authentication rejected by server")]
    Unauthorized,

    /// Non-2xx response from the lab server.
    #[error("lab server error ({status}): {message}")]
    Api {
        status: u16,
        message: String,
        /// Server-provided error code, when present.
        code: Option<String>,
    },

    /// The dashboard service answered `success: false`.
    #[error("dashboard service error: {message}")]
    Envelope {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// 2xx response whose body did not match the expected shape.
    #[error("response deserialization failed: {message}")]
    Deserialization { message: String, body: String },

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },
}

impl Error {
    /// True for errors worth surfacing as a connectivity problem rather
    /// than a request-specific failure.
    pub fn is_connection(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_connect() || e.is_timeout(),
            Self::Timeout { .. } => true,
            _ => false,
        }
    }
}
