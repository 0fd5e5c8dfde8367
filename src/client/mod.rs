//! Client facade and the codec/decoder/translator it composes.

pub mod builder;
pub mod core;
pub mod decode;
pub mod request;
pub(crate) mod translate;

pub use self::builder::StackClientBuilder;
pub use self::core::StackClient;
pub use self::request::{
    AskRequest, ChatOptions, ChatRequest, Endpoint, ForecastRequest, HealthRequest, StackRequest,
    TraceRequest, DEFAULT_THINKING_BUDGET,
};
