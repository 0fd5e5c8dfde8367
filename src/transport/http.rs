use crate::client::translate;
use crate::config::ClientConfig;
use crate::{Error, ErrorContext, Result};
use std::time::{Duration, Instant};
use tracing::{debug, info, trace};
use uuid::Uuid;

/// Correlation header attached to every request.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A complete response, read to the end before it is handed back.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: Vec<u8>,
    pub request_id: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// The live session with the stack.
///
/// Holds a pooled reqwest client restricted to a single idle connection, so
/// sequential calls reuse one keep-alive connection. Dropping the transport
/// closes it.
pub struct HttpTransport {
    client: Option<reqwest::Client>,
    base_url: String,
    timeout: Duration,
}

impl HttpTransport {
    /// Open a session against the configured stack.
    ///
    /// With `verify_on_open` the health path is probed once; any HTTP status
    /// counts as reachable, only transport failures abort the open.
    pub async fn open(config: &ClientConfig) -> Result<Self> {
        config.validate()?;
        let base_url = config.base_url()?;

        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .pool_max_idle_per_host(1)
            .user_agent(config.user_agent())
            .build()
            .map_err(|e| {
                Error::connection_with_context(
                    format!("cannot initialise HTTP client: {}", e),
                    ErrorContext::new().with_source("transport"),
                )
            })?;

        let transport = Self {
            client: Some(client),
            base_url,
            timeout: config.timeout(),
        };

        if config.verify_on_open() {
            let probe = transport
                .send(Method::Get, &config.paths().health, None, None)
                .await?;
            debug!(
                request_id = %probe.request_id,
                status = probe.status,
                "stack reachable"
            );
        }

        info!(base_url = %transport.base_url, "stack session opened");
        Ok(transport)
    }

    /// Release the connection pool. Calling it again is a no-op.
    pub fn close(&mut self) {
        match self.client.take() {
            Some(_) => info!(base_url = %self.base_url, "stack session closed"),
            None => trace!(base_url = %self.base_url, "stack session already closed"),
        }
    }

    pub fn is_open(&self) -> bool {
        self.client.is_some()
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Default per-request timeout of this session.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one request and read the complete response.
    ///
    /// Only transport failures are errors here; non-2xx statuses are returned
    /// as-is for the caller to classify. No retry.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        payload: Option<&serde_json::Value>,
        timeout: Option<Duration>,
    ) -> Result<RawResponse> {
        let client = self.client.as_ref().ok_or_else(|| {
            Error::connection_with_context(
                "session is closed",
                ErrorContext::new()
                    .with_details(format!("{} {}", method, path))
                    .with_source("transport"),
            )
        })?;

        let url = format!("{}{}", self.base_url, path);
        let timeout = timeout.unwrap_or(self.timeout);
        let request_id = Uuid::new_v4().to_string();

        let mut req = match method {
            Method::Get => client.get(&url),
            Method::Post => client.post(&url),
        };
        req = req
            .timeout(timeout)
            .header("accept", "application/json")
            .header(REQUEST_ID_HEADER, &request_id);
        if let Some(body) = payload {
            req = req.json(body);
        }

        let started = Instant::now();
        debug!(request_id = %request_id, method = %method, url = %url, "sending request");

        let response = req
            .send()
            .await
            .map_err(|e| translate::transport_error(&e, &url, timeout))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| translate::transport_error(&e, &url, timeout))?;

        debug!(
            request_id = %request_id,
            status,
            bytes = body.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "response received"
        );

        Ok(RawResponse {
            status,
            body: body.to_vec(),
            request_id,
        })
    }
}

impl Drop for HttpTransport {
    fn drop(&mut self) {
        self.close();
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("open", &self.is_open())
            .finish()
    }
}
