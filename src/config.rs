//! Client configuration: where the stack lives and how long to wait for it.
//!
//! Defaults point at a stack on `http://localhost:12210`. Every knob can be set
//! programmatically, from the environment (`STACK_*` variables) or from a YAML
//! document:
//!
//! ```yaml
//! host: http://127.0.0.1
//! port: 12210
//! timeout_ms: 60000
//! paths:
//!   ask: /v1/ask
//! ```

use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "http://localhost";
pub const DEFAULT_PORT: u16 = 12210;
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Paths of the five capability endpoints, relative to the base URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EndpointPaths {
    pub health: String,
    pub trace: String,
    pub ask: String,
    pub chat: String,
    pub forecast: String,
}

impl Default for EndpointPaths {
    fn default() -> Self {
        Self {
            health: "/health".to_string(),
            trace: "/trace".to_string(),
            ask: "/ask".to_string(),
            chat: "/chat".to_string(),
            forecast: "/forecast".to_string(),
        }
    }
}

impl EndpointPaths {
    fn normalized(mut self) -> Self {
        for path in [
            &mut self.health,
            &mut self.trace,
            &mut self.ask,
            &mut self.chat,
            &mut self.forecast,
        ] {
            if !path.starts_with('/') {
                *path = format!("/{}", path);
            }
        }
        self
    }
}

/// Immutable configuration of a [`StackClient`](crate::StackClient).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    host: String,
    port: u16,
    timeout: Duration,
    connect_timeout: Duration,
    verify_on_open: bool,
    user_agent: String,
    paths: EndpointPaths,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
            connect_timeout: DEFAULT_CONNECT_TIMEOUT,
            verify_on_open: true,
            user_agent: format!("stack-client/{}", env!("CARGO_PKG_VERSION")),
            paths: EndpointPaths::default(),
        }
    }
}

/// On-disk shape; every field falls back to the default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ConfigFile {
    host: Option<String>,
    port: Option<u16>,
    timeout_ms: Option<u64>,
    connect_timeout_ms: Option<u64>,
    verify_on_open: Option<bool>,
    user_agent: Option<String>,
    paths: Option<EndpointPaths>,
}

impl ClientConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Self::default()
        }
    }

    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    /// Probe the stack while opening the session (default `true`).
    pub fn with_verify_on_open(mut self, verify: bool) -> Self {
        self.verify_on_open = verify;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn with_paths(mut self, paths: EndpointPaths) -> Self {
        self.paths = paths.normalized();
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub fn verify_on_open(&self) -> bool {
        self.verify_on_open
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    pub fn paths(&self) -> &EndpointPaths {
        &self.paths
    }

    /// Defaults overridden by `STACK_HOST`, `STACK_PORT`, `STACK_TIMEOUT_SECS`,
    /// `STACK_CONNECT_TIMEOUT_SECS` and `STACK_VERIFY_ON_OPEN`.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(|key| std::env::var(key).ok())
    }

    pub(crate) fn from_vars(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(host) = lookup("STACK_HOST").filter(|s| !s.trim().is_empty()) {
            config.host = host.trim().to_string();
        }
        if let Some(port) = lookup("STACK_PORT") {
            config.port = parse_var("STACK_PORT", &port)?;
        }
        if let Some(secs) = lookup("STACK_TIMEOUT_SECS") {
            config.timeout = Duration::from_secs(parse_var("STACK_TIMEOUT_SECS", &secs)?);
        }
        if let Some(secs) = lookup("STACK_CONNECT_TIMEOUT_SECS") {
            config.connect_timeout =
                Duration::from_secs(parse_var("STACK_CONNECT_TIMEOUT_SECS", &secs)?);
        }
        if let Some(flag) = lookup("STACK_VERIFY_ON_OPEN") {
            config.verify_on_open = match flag.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::invalid_argument_with_context(
                        format!("expected a boolean, got {:?}", other),
                        ErrorContext::new()
                            .with_field_path("STACK_VERIFY_ON_OPEN")
                            .with_source("config"),
                    ))
                }
            };
        }
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: ConfigFile = serde_yaml::from_str(yaml).map_err(|e| {
            Error::invalid_argument_with_context(
                format!("invalid configuration: {}", e),
                ErrorContext::new().with_source("config"),
            )
        })?;

        let defaults = Self::default();
        let config = Self {
            host: file.host.unwrap_or(defaults.host),
            port: file.port.unwrap_or(defaults.port),
            timeout: file
                .timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.timeout),
            connect_timeout: file
                .connect_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.connect_timeout),
            verify_on_open: file.verify_on_open.unwrap_or(defaults.verify_on_open),
            user_agent: file.user_agent.unwrap_or(defaults.user_agent),
            paths: file.paths.unwrap_or(defaults.paths).normalized(),
        };
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            Error::invalid_argument_with_context(
                format!("cannot read configuration file: {}", e),
                ErrorContext::new()
                    .with_details(path.display().to_string())
                    .with_source("config"),
            )
        })?;
        Self::from_yaml_str(&raw)
    }

    /// Base URL (`scheme://host:port[/prefix]`, no trailing slash).
    ///
    /// A malformed host or port is a connection failure: the stack cannot be
    /// reached at an address that does not parse.
    pub fn base_url(&self) -> Result<String> {
        let malformed = |msg: String| {
            Error::connection_with_context(
                msg,
                ErrorContext::new()
                    .with_field_path("config.host")
                    .with_details(format!("{}:{}", self.host, self.port))
                    .with_source("config"),
            )
        };

        let raw = self.host.trim();
        if raw.is_empty() {
            return Err(malformed("host is empty".to_string()));
        }
        if self.port == 0 {
            return Err(malformed("port 0 is not a valid stack port".to_string()));
        }

        let with_scheme = if raw.contains("://") {
            raw.to_string()
        } else {
            format!("http://{}", raw)
        };
        let mut url = url::Url::parse(&with_scheme)
            .map_err(|e| malformed(format!("malformed host {:?}: {}", raw, e)))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(malformed(format!("unsupported scheme {:?}", url.scheme())));
        }
        if url.host_str().map(str::is_empty).unwrap_or(true) {
            return Err(malformed(format!("host {:?} has no hostname", raw)));
        }
        if let Some(explicit) = explicit_port(&url, &with_scheme) {
            if explicit != self.port {
                return Err(malformed(format!(
                    "host carries port {} but port {} is configured",
                    explicit, self.port
                )));
            }
        }
        url.set_port(Some(self.port))
            .map_err(|_| malformed(format!("cannot set port on {:?}", raw)))?;

        Ok(url.as_str().trim_end_matches('/').to_string())
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.timeout.is_zero() {
            return Err(Error::invalid_argument_with_context(
                "timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("config.timeout")
                    .with_source("config"),
            ));
        }
        if self.connect_timeout.is_zero() {
            return Err(Error::invalid_argument_with_context(
                "connect timeout must be greater than zero",
                ErrorContext::new()
                    .with_field_path("config.connect_timeout")
                    .with_source("config"),
            ));
        }
        Ok(())
    }
}

/// Port written in the authority of `raw`, including one equal to the
/// scheme default that [`url::Url::port`] reports as `None`.
pub(crate) fn explicit_port(url: &url::Url, raw: &str) -> Option<u16> {
    if let Some(port) = url.port() {
        return Some(port);
    }
    let rest = raw.split_once("://").map_or(raw, |(_, rest)| rest);
    let authority = rest.split(['/', '?', '#']).next().unwrap_or_default();
    let host_port = authority.rsplit_once('@').map_or(authority, |(_, hp)| hp);
    let after_host = match host_port.rfind(']') {
        Some(end) => &host_port[end + 1..],
        None => host_port,
    };
    if after_host.contains(':') {
        url.port_or_known_default()
    } else {
        None
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T>
where
    T::Err: std::fmt::Display,
{
    raw.trim().parse::<T>().map_err(|e| {
        Error::invalid_argument_with_context(
            format!("cannot parse {:?}: {}", raw, e),
            ErrorContext::new().with_field_path(key).with_source("config"),
        )
    })
}
