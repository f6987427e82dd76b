use std::time::Duration;

use axum::body::Bytes;
use reqwest::{Client, Method, StatusCode, Url, header};
use serde::{Serialize, de::DeserializeOwned};
use tracing::debug;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    #[error("invalid PowerDNS base URL {url:?}: {reason}")]
    BaseUrl { url: String, reason: String },

    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("failed to encode upstream request: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("upstream unreachable: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("decode: {source}")]
    Decode {
        status: StatusCode,
        body: Bytes,
        #[source]
        source: serde_json::Error,
    },
}

/// Outcome of one upstream call that produced an HTTP response.
#[derive(Debug)]
pub struct UpstreamReply<T> {
    pub status: StatusCode,
    pub content_type: Option<header::HeaderValue>,
    /// Raw response body, always populated.
    pub raw: Bytes,
    /// Decoded body; only set for a non-empty 2xx response.
    pub body: Option<T>,
}

impl<T> UpstreamReply<T> {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }
}

#[derive(Clone)]
pub struct PowerDnsClient {
    http: Client,
    base_url: Url, // e.g. "http://127.0.0.1:8081/api/v1"
    api_key: String,
    server_id: String, // usually "localhost"
}

impl PowerDnsClient {
    pub fn new(
        base_url: &str,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, GatewayError> {
        let http = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(GatewayError::Client)?;
        Self::with_client(http, base_url, api_key, server_id)
    }

    pub fn with_client(
        http: Client,
        base_url: &str,
        api_key: impl Into<String>,
        server_id: impl Into<String>,
    ) -> Result<Self, GatewayError> {
        let invalid = |reason: String| GatewayError::BaseUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("URL cannot carry a path".into()));
        }

        Ok(Self {
            http,
            base_url: parsed,
            api_key: api_key.into(),
            server_id: server_id.into(),
        })
    }

    fn auth_header(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("X-API-Key", &self.api_key)
    }

    /// `{base}/servers/{id}/` followed by `segments`, each escaped as one path segment.
    pub fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // with_client refuses cannot-be-a-base URLs, so this always succeeds.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty()
                .push("servers")
                .push(&self.server_id)
                .extend(segments);
        }
        url
    }

    /// Perform one JSON call against `{base}/servers/{id}/{segments...}`.
    ///
    /// A non-2xx status is not an error; callers inspect [`UpstreamReply::status`]
    /// and decide whether to forward `raw`.
    pub async fn invoke<B, T>(
        &self,
        method: Method,
        segments: &[&str],
        body: Option<&B>,
    ) -> Result<UpstreamReply<T>, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let payload = match body {
            Some(b) => serde_json::to_vec(b).map_err(GatewayError::Encode)?,
            None => Vec::new(),
        };

        let url = self.url(segments);
        debug!(%method, %url, "upstream request");
        let req = self
            .auth_header(self.http.request(method, url))
            .header(header::ACCEPT, "application/json")
            .header(header::CONTENT_TYPE, "application/json")
            .body(payload);

        let res = req.send().await?;
        let status = res.status();
        let content_type = res.headers().get(header::CONTENT_TYPE).cloned();
        let raw = res.bytes().await?;
        debug!(%status, len = raw.len(), "upstream response");

        let body = if status.is_success() && !raw.is_empty() {
            match serde_json::from_slice::<T>(&raw) {
                Ok(v) => Some(v),
                Err(source) => {
                    return Err(GatewayError::Decode {
                        status,
                        body: raw,
                        source,
                    });
                }
            }
        } else {
            None
        };

        Ok(UpstreamReply {
            status,
            content_type,
            raw,
            body,
        })
    }

    pub async fn list_zones<T: DeserializeOwned>(&self) -> Result<UpstreamReply<T>, GatewayError> {
        self.invoke::<(), T>(Method::GET, &["zones"], None).await
    }

    pub async fn get_zone<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<UpstreamReply<T>, GatewayError> {
        self.invoke::<(), T>(Method::GET, &["zones", name], None)
            .await
    }

    pub async fn create_zone<B, T>(&self, z: &B) -> Result<UpstreamReply<T>, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.invoke(Method::POST, &["zones"], Some(z)).await
    }

    pub async fn patch_zone<B, T>(
        &self,
        name: &str,
        patch: &B,
    ) -> Result<UpstreamReply<T>, GatewayError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        self.invoke(Method::PATCH, &["zones", name], Some(patch))
            .await
    }

    pub async fn delete_zone<T: DeserializeOwned>(
        &self,
        name: &str,
    ) -> Result<UpstreamReply<T>, GatewayError> {
        self.invoke::<(), T>(Method::DELETE, &["zones", name], None)
            .await
    }
}
