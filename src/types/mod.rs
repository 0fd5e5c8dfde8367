//! # Types Module
//!
//! Value types exchanged with the stack.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Message`] | Chat turn with role and content |
//! | [`MessageRole`] | `system`, `user` or `assistant` |
//! | [`Pipeline`] | Retrieval strategy selector for `ask` |
//! | [`HealthStatus`] | Health probe reply |
//! | [`TraceResult`] / [`AgentStep`] | Agent answer and its ordered tool calls |
//! | [`AskResult`] / [`Source`] | RAG answer and its ordered sources |
//! | [`ChatResult`] / [`TokenUsage`] | Chat answer, optional thinking trace, usage |
//! | [`ForecastResult`] | Ordered forecast points and context metadata |
//!
//! ## Example
//!
//! ```rust
//! use stack_client::types::{Message, MessageRole, Pipeline};
//!
//! let system = Message::system("You are a helpful assistant");
//! let user = Message::user("What changed in the auth module?");
//! assert_eq!(user.role, MessageRole::User);
//! assert_eq!("reranking".parse::<Pipeline>().unwrap(), Pipeline::Reranking);
//! ```

pub mod message;
pub mod pipeline;
pub mod results;

pub use message::{Message, MessageRole};
pub use pipeline::Pipeline;
pub use results::{
    AgentStep, AskResult, ChatResult, ForecastResult, HealthStatus, Source, TokenUsage,
    TraceResult,
};
