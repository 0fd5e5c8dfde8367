use crate::client::core::StackClient;
use crate::config::{explicit_port, ClientConfig, EndpointPaths};
use crate::Result;
use std::time::Duration;

/// Builder for creating clients with custom configuration.
///
/// Keep this surface area small and predictable: every setter maps to one
/// [`ClientConfig`] field.
#[derive(Debug, Clone, Default)]
pub struct StackClientBuilder {
    config: ClientConfig,
}

impl StackClientBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from the `STACK_*` environment overrides instead of the defaults.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            config: ClientConfig::from_env()?,
        })
    }

    /// Start from an existing configuration.
    pub fn config(mut self, config: ClientConfig) -> Self {
        self.config = config;
        self
    }

    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config = self.config.with_host(host);
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config = self.config.with_port(port);
        self
    }

    /// Override host and port from a full base URL such as a mock server's.
    ///
    /// A URL without an explicit port keeps the configured port.
    pub fn base_url(mut self, base_url: &str) -> Self {
        match url::Url::parse(base_url) {
            Ok(url) => {
                if let Some(port) = explicit_port(&url, base_url) {
                    self.config = self.config.with_port(port);
                }
                let host = format!(
                    "{}://{}{}",
                    url.scheme(),
                    url.host_str().unwrap_or_default(),
                    url.path().trim_end_matches('/')
                );
                self.config = self.config.with_host(host);
            }
            // Left for `base_url()` validation at open time.
            Err(_) => self.config = self.config.with_host(base_url),
        }
        self
    }

    /// Default per-call timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_timeout(timeout);
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config = self.config.with_connect_timeout(timeout);
        self
    }

    pub fn verify_on_open(mut self, verify: bool) -> Self {
        self.config = self.config.with_verify_on_open(verify);
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config = self.config.with_user_agent(user_agent);
        self
    }

    pub fn paths(mut self, paths: EndpointPaths) -> Self {
        self.config = self.config.with_paths(paths);
        self
    }

    /// The configuration as built so far.
    pub fn build_config(self) -> ClientConfig {
        self.config
    }

    /// Open the client.
    pub async fn build(self) -> Result<StackClient> {
        StackClient::open(self.config).await
    }
}
