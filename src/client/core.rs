use crate::client::request::{
    AskRequest, ChatOptions, ChatRequest, ForecastRequest, HealthRequest, StackRequest,
    TraceRequest,
};
use crate::client::translate;
use crate::config::ClientConfig;
use crate::transport::HttpTransport;
use crate::types::{
    AskResult, ChatResult, ForecastResult, HealthStatus, Message, Pipeline, TraceResult,
};
use crate::{Error, ErrorContext, Result};
use std::time::Duration;
use tracing::{debug, warn};

/// Client for a locally running stack.
///
/// A `StackClient` is a scoped resource: opening it opens the transport
/// session, and dropping it (or calling [`close`](Self::close)) closes the
/// session on every exit path, including early returns through `?`.
///
/// Each capability call encodes the request, sends it, and decodes the reply
/// or translates the failure. Calls resolve only once the whole response has
/// arrived. The client keeps no per-call state beyond the session.
///
/// A client is meant for one caller issuing calls in sequence. Callers that
/// need concurrent calls should open one client each.
#[derive(Debug)]
pub struct StackClient {
    config: ClientConfig,
    transport: HttpTransport,
}

impl StackClient {
    /// Open a session with the given configuration.
    pub async fn open(config: ClientConfig) -> Result<Self> {
        let transport = HttpTransport::open(&config).await?;
        Ok(Self { config, transport })
    }

    /// Open a session against `http://localhost:12210` with default settings.
    pub async fn connect() -> Result<Self> {
        Self::open(ClientConfig::default()).await
    }

    pub fn builder() -> crate::client::builder::StackClientBuilder {
        crate::client::builder::StackClientBuilder::new()
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn is_open(&self) -> bool {
        self.transport.is_open()
    }

    /// Close the session. Idempotent; every later call fails with
    /// [`Error::Connection`].
    pub fn close(&mut self) {
        self.transport.close();
    }

    /// Probe the stack's health endpoint.
    pub async fn health_check(&self) -> Result<HealthStatus> {
        self.execute(&HealthRequest).await
    }

    /// Run the autonomous agent on `query` and return its answer with the
    /// ordered tool steps it took.
    pub async fn trace(&self, query: &str) -> Result<TraceResult> {
        self.execute(&TraceRequest::new(query)).await
    }

    /// Ask a question answered through retrieval with the given pipeline.
    pub async fn ask(&self, query: &str, pipeline: Pipeline) -> Result<AskResult> {
        self.execute(&AskRequest::new(query).pipeline(pipeline)).await
    }

    /// Chat directly with the stack's model.
    pub async fn chat(&self, messages: &[Message], options: ChatOptions) -> Result<ChatResult> {
        self.execute(&ChatRequest::new(messages).options(options))
            .await
    }

    /// Forecast `forecast_period_size` points of series `name` from the last
    /// `context_period_size` observations.
    pub async fn forecast(
        &self,
        name: &str,
        context_period_size: u32,
        forecast_period_size: u32,
    ) -> Result<ForecastResult> {
        self.execute(&ForecastRequest::new(
            name,
            context_period_size,
            forecast_period_size,
        ))
        .await
    }

    /// Execute any capability request with the session's default timeout.
    pub async fn execute<R: StackRequest>(&self, request: &R) -> Result<R::Output> {
        self.dispatch(request, None).await
    }

    /// Execute a request with its own timeout. On expiry the call fails with
    /// [`Error::Connection`]; the session stays usable.
    pub async fn execute_with_timeout<R: StackRequest>(
        &self,
        request: &R,
        timeout: Duration,
    ) -> Result<R::Output> {
        self.dispatch(request, Some(timeout)).await
    }

    async fn dispatch<R: StackRequest>(
        &self,
        request: &R,
        timeout: Option<Duration>,
    ) -> Result<R::Output> {
        let endpoint = request.endpoint();

        // A closed session reports itself before any argument check.
        if !self.transport.is_open() {
            return Err(Error::connection_with_context(
                "session is closed",
                ErrorContext::new()
                    .with_details(endpoint.name())
                    .with_source("client"),
            ));
        }

        let payload = request.encode()?;
        debug!(endpoint = endpoint.name(), "dispatching request");

        let raw = self
            .transport
            .send(
                endpoint.method(),
                endpoint.path(self.config.paths()),
                payload.as_ref(),
                timeout,
            )
            .await?;
        let raw = translate::ensure_success(raw)?;

        request.decode(&raw.body).map_err(|e| {
            warn!(
                request_id = %raw.request_id,
                endpoint = endpoint.name(),
                error = %e,
                "undecodable response"
            );
            e
        })
    }
}
