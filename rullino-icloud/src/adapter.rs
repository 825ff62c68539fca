use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use url::Url;

use rullino_core::RullinoError;

use crate::CONNECTOR_NAME;

/// Transport abstraction over the photos service (so we can inject fakes in
/// tests).
///
/// Two primitives cover every operation: a JSON POST against a service path
/// (queries, counts, modify operations) and a raw GET against a rendition
/// download URL.
#[async_trait]
pub trait CloudKitTransport: Send + Sync {
    /// POST `body` to `path` under the service endpoint and parse the JSON
    /// response.
    async fn post(&self, path: &str, body: &Value) -> Result<Value, RullinoError>;

    /// Fetch raw bytes from a short-lived rendition URL.
    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RullinoError>;
}

/// Real transport backed by a shared `reqwest` client.
///
/// Holds the authenticated session's service endpoint and query parameters;
/// establishing that session is the caller's concern. `reqwest::Client` is
/// cheap to clone and internally pooled, so no external locking is needed,
/// and it tolerates concurrent use when callers run several streams at once.
/// Timeouts are whatever the provided client is configured with.
pub struct HttpTransport {
    http: reqwest::Client,
    endpoint: Url,
    params: Vec<(String, String)>,
}

impl HttpTransport {
    /// Build a transport for a service endpoint plus session query params.
    #[must_use]
    pub fn new(endpoint: Url, params: Vec<(String, String)>) -> Self {
        Self::with_client(reqwest::Client::new(), endpoint, params)
    }

    /// Build a transport reusing an existing client (custom timeouts,
    /// proxies, ...).
    #[must_use]
    pub const fn with_client(
        http: reqwest::Client,
        endpoint: Url,
        params: Vec<(String, String)>,
    ) -> Self {
        Self {
            http,
            endpoint,
            params,
        }
    }

    fn service_url(&self, path: &str) -> Result<Url, RullinoError> {
        let mut url = self.endpoint.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|()| RullinoError::InvalidArg("endpoint cannot be a base URL".into()))?;
            segments.pop_if_empty();
            segments.extend(path.split('/'));
        }
        Ok(url)
    }
}

#[async_trait]
impl CloudKitTransport for HttpTransport {
    async fn post(&self, path: &str, body: &Value) -> Result<Value, RullinoError> {
        let url = self.service_url(path)?;
        let response = self
            .http
            .post(url)
            .query(&self.params)
            // The service expects JSON bodies declared as text/plain.
            .header(CONTENT_TYPE, "text/plain")
            .body(body.to_string())
            .send()
            .await
            .map_err(|e| RullinoError::transport(CONNECTOR_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RullinoError::transport(
                CONNECTOR_NAME,
                format!("{path} returned {status}"),
            ));
        }
        response
            .json()
            .await
            .map_err(|e| RullinoError::transport(CONNECTOR_NAME, e.to_string()))
    }

    async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, RullinoError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| RullinoError::transport(CONNECTOR_NAME, e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(RullinoError::transport(
                CONNECTOR_NAME,
                format!("download returned {status}"),
            ));
        }
        Ok(response
            .bytes()
            .await
            .map_err(|e| RullinoError::transport(CONNECTOR_NAME, e.to_string()))?
            .to_vec())
    }
}
