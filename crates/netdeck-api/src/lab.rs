// Hand-crafted async HTTP client for the lab server API.
//
// Base path: /v2/
// Auth: optional `Authorization: Bearer <key>` header

use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;
use uuid::Uuid;

use crate::Error;
use crate::transport::TransportConfig;
use crate::types::{
    ComputeDto, CreateLinkRequest, CreateNodeRequest, LinkDto, NodeDto, ProjectDto,
};

// ── Error response shape from the lab server ─────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    code: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the lab server's JSON REST API under `/v2/`.
/// Cheap to clone: `reqwest::Client` is a shared handle.
#[derive(Clone)]
pub struct LabClient {
    http: reqwest::Client,
    base_url: Url,
}

impl LabClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client. When `api_key` is present it is injected as a
    /// sensitive `Authorization` header on every request.
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

    /// Wrap an existing `reqwest::Client` (caller manages auth headers).
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Ensure the base URL ends with `/v2/` so relative joins work.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let mut url = Url::parse(raw)?;
        let path = url.path().trim_end_matches('/').to_owned();
        if path.ends_with("/v2") {
            url.set_path(&format!("{path}/"));
        } else {
            url.set_path(&format!("{path}/v2/"));
        }
        Ok(url)
    }

    /// Join a relative path (e.g. `"projects"`) onto the base URL.
    fn url(&self, path: &str) -> Result<Url, Error> {
        Ok(self.base_url.join(path)?)
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        handle_response(resp).await
    }

    async fn post_empty(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("POST {url}");

        let resp = self.http.post(url).send().await?;
        handle_empty(resp).await
    }

    async fn delete(&self, path: &str) -> Result<(), Error> {
        let url = self.url(path)?;
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        handle_empty(resp).await
    }

    // ── Computes & projects ──────────────────────────────────────────

    pub async fn computes(&self) -> Result<Vec<ComputeDto>, Error> {
        self.get("computes").await
    }

    pub async fn projects(&self) -> Result<Vec<ProjectDto>, Error> {
        self.get("projects").await
    }

    pub async fn open_project(&self, project: Uuid) -> Result<ProjectDto, Error> {
        self.post(&format!("projects/{project}/open"), &serde_json::json!({}))
            .await
    }

    // ── Topology ─────────────────────────────────────────────────────

    pub async fn nodes(&self, project: Uuid) -> Result<Vec<NodeDto>, Error> {
        self.get(&format!("projects/{project}/nodes")).await
    }

    pub async fn links(&self, project: Uuid) -> Result<Vec<LinkDto>, Error> {
        self.get(&format!("projects/{project}/links")).await
    }

    pub async fn create_node(
        &self,
        project: Uuid,
        req: &CreateNodeRequest,
    ) -> Result<NodeDto, Error> {
        self.post(&format!("projects/{project}/nodes"), req).await
    }

    pub async fn delete_node(&self, project: Uuid, node: Uuid) -> Result<(), Error> {
        self.delete(&format!("projects/{project}/nodes/{node}"))
            .await
    }

    pub async fn create_link(
        &self,
        project: Uuid,
        req: &CreateLinkRequest,
    ) -> Result<LinkDto, Error> {
        self.post(&format!("projects/{project}/links"), req).await
    }

    pub async fn delete_link(&self, project: Uuid, link: Uuid) -> Result<(), Error> {
        self.delete(&format!("projects/{project}/links/{link}"))
            .await
    }

    // ── Node lifecycle ───────────────────────────────────────────────

    pub async fn start_node(&self, project: Uuid, node: Uuid) -> Result<(), Error> {
        self.post_empty(&format!("projects/{project}/nodes/{node}/start"))
            .await
    }

    pub async fn stop_node(&self, project: Uuid, node: Uuid) -> Result<(), Error> {
        self.post_empty(&format!("projects/{project}/nodes/{node}/stop"))
            .await
    }

    pub async fn suspend_node(&self, project: Uuid, node: Uuid) -> Result<(), Error> {
        self.post_empty(&format!("projects/{project}/nodes/{node}/suspend"))
            .await
    }
}

// ── Response handling ────────────────────────────────────────────────

pub(crate) async fn handle_response<T: DeserializeOwned>(
    resp: reqwest::Response,
) -> Result<T, Error> {
    let status = resp.status();
    if status.is_success() {
        let body = resp.text().await?;
        serde_json::from_str(&body).map_err(|e| {
            let preview = body_preview(&body);
            Error::Deserialization {
                message: format!("{e} (body preview: {preview:?})"),
                body,
            }
        })
    } else {
        Err(parse_error(status, resp).await)
    }
}

pub(crate) async fn handle_empty(resp: reqwest::Response) -> Result<(), Error> {
    let status = resp.status();
    if status.is_success() {
        Ok(())
    } else {
        Err(parse_error(status, resp).await)
    }
}

async fn parse_error(status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
    if status == reqwest::StatusCode::UNAUTHORIZED {
        return Error::Unauthorized;
    }

    let raw = resp.text().await.unwrap_or_default();

    if let Ok(err) = serde_json::from_str::<ErrorResponse>(&raw) {
        Error::Api {
            status: status.as_u16(),
            message: err.message.unwrap_or_else(|| status.to_string()),
            code: err.code,
        }
    } else {
        Error::Api {
            status: status.as_u16(),
            message: if raw.is_empty() {
                status.to_string()
            } else {
                raw
            },
            code: None,
        }
    }
}

/// First 200 bytes of a response body for error context, cut back to a
/// char boundary so multi-byte UTF-8 never splits.
fn body_preview(body: &str) -> &str {
    let mut end = body.len().min(200);
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

#[cfg(test)]
mod tests {
    use super::body_preview;

    #[test]
    fn body_preview_respects_char_boundaries() {
        // 3-byte chars: 200 lands mid-char, so the cut backs up to 198.
        let multibyte = "✓".repeat(100);
        let preview = body_preview(&multibyte);
        assert_eq!(preview.len(), 198);
        assert!(preview.chars().all(|c| c == '✓'));

        let short = "not json";
        assert_eq!(body_preview(short), short);

        let exact = "x".repeat(200);
        assert_eq!(body_preview(&exact).len(), 200);
    }
}
