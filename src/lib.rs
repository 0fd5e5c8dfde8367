//! # stack-client
//!
//! Async client for a locally running multi-capability intelligence stack.
//!
//! ## Overview
//!
//! The stack exposes five capabilities over HTTP: a health probe, autonomous
//! agent tracing, retrieval-augmented question answering, direct chat (with an
//! optional extended "thinking" mode) and timeseries forecasting. This crate
//! only transports requests and decodes results; all intelligence lives in the
//! stack.
//!
//! ## Key Features
//!
//! - **Scoped sessions**: [`StackClient`] opens one connection on creation and
//!   closes it when dropped or explicitly closed
//! - **Local validation**: malformed requests fail before any network call
//! - **Strict decoding**: results are typed value objects; shape mismatches are errors
//! - **Closed error taxonomy**: every failure is one of four [`ErrorKind`]s
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use stack_client::{ChatOptions, Message, Pipeline, StackClient};
//!
//! #[tokio::main]
//! async fn main() -> stack_client::Result<()> {
//!     let client = StackClient::connect().await?;
//!
//!     let trace = client.trace("Analyze the auth logic").await?;
//!     for step in &trace.steps {
//!         println!("{} {:?}", step.tool, step.args);
//!     }
//!
//!     let answer = client.ask("How are tokens refreshed?", Pipeline::Reranking).await?;
//!     println!("{}", answer.answer);
//!
//!     let chat = client
//!         .chat(&[Message::user("Why is the sky blue?")], ChatOptions::thinking())
//!         .await?;
//!     println!("{}", chat.answer);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`client`] | Client facade, request codec, response decoder |
//! | [`config`] | Client configuration, env and YAML loading |
//! | [`transport`] | HTTP session with the stack |
//! | [`types`] | Messages and result value objects |
//! | [`error`] | Error taxonomy |

pub mod client;
pub mod config;
pub mod transport;
pub mod types;

// Re-export main types for convenience
pub use client::{
    AskRequest, ChatOptions, ChatRequest, Endpoint, ForecastRequest, HealthRequest, StackClient,
    StackClientBuilder, StackRequest, TraceRequest, DEFAULT_THINKING_BUDGET,
};
pub use config::{ClientConfig, EndpointPaths};
pub use types::{
    AgentStep, AskResult, ChatResult, ForecastResult, HealthStatus, Message, MessageRole,
    Pipeline, Source, TokenUsage, TraceResult,
};

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext, ErrorKind};

/// Convenient glob import for applications.
pub mod prelude {
    pub use crate::{
        ChatOptions, ClientConfig, Error, ErrorKind, Message, MessageRole, Pipeline, Result,
        StackClient, StackClientBuilder,
    };
}
