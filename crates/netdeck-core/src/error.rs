// ── Core error types ──
//
// User-facing errors. Consumers never see raw HTTP statuses or JSON
// parse failures; the `From<netdeck_api::Error>` impl translates the
// transport taxonomy into domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("cannot connect to {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("not connected")]
    Disconnected,

    #[error("request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("no project is open")]
    NoOpenProject,

    #[error("{entity} not found: {identifier}")]
    NotFound { entity: String, identifier: String },

    #[error("server rejected the operation: {message}")]
    Rejected { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<netdeck_api::Error> for CoreError {
    fn from(err: netdeck_api::Error) -> Self {
        match err {
            netdeck_api::Error::Unauthorized => CoreError::AuthenticationFailed {
                message: "invalid or missing API key".into(),
            },
            netdeck_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map(|u| u.to_string())
                            .unwrap_or_else(|| "<unknown>".into()),
                        reason: e.to_string(),
                    }
                } else if e.status().map(|s| s.as_u16()) == Some(404) {
                    CoreError::NotFound {
                        entity: "resource".into(),
                        identifier: e.url().map(|u| u.path().to_owned()).unwrap_or_default(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        code: None,
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            netdeck_api::Error::Api {
                status,
                message,
                code,
            } => CoreError::Api {
                message,
                code,
                status: Some(status),
            },
            netdeck_api::Error::Envelope { message, .. } => CoreError::Rejected { message },
            netdeck_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            netdeck_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("invalid URL: {e}"),
            },
            netdeck_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("deserialization error: {message}"))
            }
        }
    }
}
