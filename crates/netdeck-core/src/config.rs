// ── Controller configuration ──

use secrecy::SecretString;
use url::Url;

/// TLS certificate verification mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsVerification {
    #[default]
    SystemDefaults,
    /// Accept invalid certificates. Lab servers commonly self-sign.
    DangerAcceptInvalid,
}

/// Credentials presented to both backends.
#[derive(Debug, Clone, Default)]
pub enum AuthCredentials {
    /// Unauthenticated (local lab server without auth enabled).
    #[default]
    None,
    ApiKey(SecretString),
}

impl AuthCredentials {
    pub fn api_key(&self) -> Option<&SecretString> {
        match self {
            Self::ApiKey(key) => Some(key),
            Self::None => None,
        }
    }
}

/// Everything a [`Controller`](crate::Controller) needs to connect.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Lab server base URL (the `/v2/` REST surface).
    pub lab_url: Url,
    /// Dashboard service base URL (the enveloped `/api/` surface).
    pub dashboard_url: Url,
    pub auth: AuthCredentials,
    pub tls: TlsVerification,
    /// Requested refresh interval; clamped to 1–30 s at use.
    pub refresh_interval_secs: u64,
    pub request_timeout_secs: u64,
}

impl ControllerConfig {
    pub fn new(lab_url: Url, dashboard_url: Url) -> Self {
        Self {
            lab_url,
            dashboard_url,
            auth: AuthCredentials::None,
            tls: TlsVerification::SystemDefaults,
            refresh_interval_secs: 5,
            request_timeout_secs: 30,
        }
    }
}
