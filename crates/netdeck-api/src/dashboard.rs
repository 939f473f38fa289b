// ── Dashboard service client ──
//
// Every dashboard endpoint wraps its payload in the same envelope:
//   { "success": bool, "data": T?, "error": {..}?, "metadata": {..}? }
// A 200 with success=false is still an error; unwrapping happens in
// Envelope::into_result so callers only ever see Result<T, Error>.

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::Error;
use crate::lab::{handle_empty, handle_response};
use crate::transport::TransportConfig;
use crate::types::{QosPolicyDto, SecurityAlertDto, SetPolicyEnabledRequest, SlaTargetDto};

// ── Envelope ─────────────────────────────────────────────────────────

#[derive(Debug, Clone, Deserialize)]
pub struct EnvelopeError {
    #[serde(rename = "type", default)]
    pub kind: Option<String>,
    pub message: String,
    #[serde(default)]
    pub details: Option<serde_json::Value>,
}

/// The `{success, data, error, metadata}` wrapper used by every
/// dashboard endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: serde::Deserialize<'de>"))]
pub struct Envelope<T> {
    pub success: bool,
    #[serde(default)]
    pub data: Option<T>,
    #[serde(default)]
    pub error: Option<EnvelopeError>,
    #[serde(default)]
    pub metadata: Option<serde_json::Value>,
}

impl<T> Envelope<T> {
    /// Unwrap the payload, mapping `success: false` (or a missing body
    /// on success) to a typed error.
    pub fn into_result(self) -> Result<T, Error> {
        if self.success {
            self.data.ok_or_else(|| Error::Envelope {
                message: "success response carried no data".into(),
                details: None,
            })
        } else {
            let err = self.error;
            Err(Error::Envelope {
                message: err
                    .as_ref()
                    .map_or_else(|| "unspecified error".into(), |e| e.message.clone()),
                details: err.and_then(|e| e.details),
            })
        }
    }
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the dashboard service under `/api/`.
#[derive(Clone)]
pub struct DashboardClient {
    http: reqwest::Client,
    base_url: Url,
}

impl DashboardClient {
    pub fn new(
        base_url: &str,
        api_key: Option<&SecretString>,
        transport: &TransportConfig,
    ) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", key.expose_secret()))
                .map_err(|_| Error::Unauthorized)?;
            value.set_sensitive(true);
            headers.insert(reqwest::header::AUTHORIZATION, value);
        }

        let http = transport.build_client_with_headers(headers)?;
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/api") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/api/"));
        }
        Ok(url)
    }

    async fn get_enveloped<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.base_url.join(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        let envelope: Envelope<T> = handle_response(resp).await?;
        envelope.into_result()
    }

    // ── Record fetches ───────────────────────────────────────────────

    pub async fn qos_policies(&self) -> Result<Vec<QosPolicyDto>, Error> {
        self.get_enveloped("qos/policies").await
    }

    pub async fn sla_targets(&self) -> Result<Vec<SlaTargetDto>, Error> {
        self.get_enveloped("sla/targets").await
    }

    pub async fn security_alerts(&self) -> Result<Vec<SecurityAlertDto>, Error> {
        self.get_enveloped("security/alerts").await
    }

    // ── Mutations ────────────────────────────────────────────────────

    pub async fn set_policy_enabled(&self, id: &str, enabled: bool) -> Result<(), Error> {
        let url = self.base_url.join(&format!("qos/policies/{id}"))?;
        debug!("PATCH {url}");

        let resp = self
            .http
            .patch(url)
            .json(&SetPolicyEnabledRequest { enabled })
            .send()
            .await?;
        let envelope: Envelope<serde_json::Value> = handle_response(resp).await?;
        envelope.into_result().map(|_| ())
    }

    pub async fn acknowledge_alert(&self, id: &str) -> Result<(), Error> {
        let url = self
            .base_url
            .join(&format!("security/alerts/{id}/acknowledge"))?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        handle_empty(resp).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn envelope_success_unwraps_data() {
        let env: Envelope<Vec<u32>> = serde_json::from_str(
            r#"{"success": true, "data": [1, 2, 3], "metadata": {"count": 3}}"#,
        )
        .unwrap();
        assert_eq!(env.into_result().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn envelope_failure_maps_to_error() {
        let env: Envelope<Vec<u32>> = serde_json::from_str(
            r#"{"success": false, "error": {"type": "not_found", "message": "no such policy"}}"#,
        )
        .unwrap();
        match env.into_result() {
            Err(Error::Envelope { message, .. }) => assert_eq!(message, "no such policy"),
            other => panic!("expected envelope error, got {other:?}"),
        }
    }

    #[test]
    fn envelope_success_without_data_is_error() {
        let env: Envelope<Vec<u32>> = serde_json::from_str(r#"{"success": true}"#).unwrap();
        assert!(env.into_result().is_err());
    }
}
