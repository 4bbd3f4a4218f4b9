//! Reqwest-backed transport for the customer API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode, Url};
use tracing::{debug, warn};

use super::transport::{Method, Request, Response, Transport, TransportError};

/// HTTP request timeout in seconds, used when none is configured.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Maximum number of retries for rate-limited (429) requests.
const MAX_RATE_LIMIT_RETRIES: u32 = 3;

/// Initial backoff delay in milliseconds for rate limiting.
const INITIAL_BACKOFF_MS: u64 = 1000;

/// Transport that issues real HTTP requests against one base URL.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: Url,
    initial_backoff: Duration,
}

impl HttpTransport {
    /// Create a transport for `base_url` (e.g. `http://localhost:3000`).
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| TransportError::InvalidUrl(format!("{base_url}: {e}")))?;
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            initial_backoff: Duration::from_millis(INITIAL_BACKOFF_MS),
        })
    }

    /// Delay before the first retry of a rate-limited request; doubles per retry.
    pub fn with_initial_backoff(mut self, backoff: Duration) -> Self {
        self.initial_backoff = backoff;
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    fn url_for(&self, path: &str) -> Result<Url, TransportError> {
        self.base_url
            .join(path)
            .map_err(|e| TransportError::InvalidUrl(format!("{path}: {e}")))
    }

    async fn send_once(
        &self,
        url: &Url,
        request: &Request,
    ) -> Result<reqwest::Response, TransportError> {
        let builder = match request.method {
            Method::Get => self.client.get(url.clone()),
            Method::Post => self.client.post(url.clone()),
        };
        let builder = builder.header(header::ACCEPT, "application/json");
        let builder = match request.body {
            Some(ref body) => builder.json(body),
            None => builder,
        };

        builder.send().await.map_err(|e| {
            if e.is_connect() {
                TransportError::Unavailable(e.to_string())
            } else {
                TransportError::Network(e)
            }
        })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Response, TransportError> {
        let url = self.url_for(&request.path)?;
        let mut retries = 0;
        let mut backoff = self.initial_backoff;

        loop {
            let response = self.send_once(&url, &request).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS && retries < MAX_RATE_LIMIT_RETRIES {
                retries += 1;
                warn!(
                    url = %url,
                    retry = retries,
                    backoff_ms = backoff.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(backoff).await;
                backoff *= 2; // Exponential backoff
                continue;
            }

            let body = response.bytes().await?;
            debug!(
                method = ?request.method,
                url = %url,
                status = status.as_u16(),
                bytes = body.len(),
                "Response received"
            );
            return Ok(Response::new(status.as_u16(), body.to_vec()));
        }
    }
}
