// ── Shared reqwest client construction ──
//
// Both clients build their HTTP stack through TransportConfig so TLS
// policy and timeouts stay consistent across the workspace.

use std::time::Duration;

use reqwest::header::HeaderMap;

use crate::Error;

/// TLS verification policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlsMode {
    /// Verify against system roots.
    #[default]
    SystemDefaults,
    /// Accept any certificate. Lab servers commonly run self-signed.
    DangerAcceptInvalid,
}

/// Connection parameters shared by [`crate::LabClient`] and
/// [`crate::DashboardClient`].
#[derive(Debug, Clone)]
pub struct TransportConfig {
    pub timeout: Duration,
    pub tls: TlsMode,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            tls: TlsMode::SystemDefaults,
        }
    }
}

impl TransportConfig {
    /// Build a `reqwest::Client` with the given default headers.
    pub fn build_client_with_headers(&self, headers: HeaderMap) -> Result<reqwest::Client, Error> {
        let builder = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .danger_accept_invalid_certs(matches!(self.tls, TlsMode::DangerAcceptInvalid));
        Ok(builder.build()?)
    }
}
