use thiserror::Error;

/// Structured error context for better error handling and debugging.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path that caused the error (e.g., "config.port", "steps[0].tool")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected shape, offending value)
    pub details: Option<String>,
    /// Component that raised the error (e.g., "transport", "request_codec")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Discriminant of [`Error`], for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Connection,
    Api,
    InvalidArgument,
    Decode,
}

/// Unified error type of the stack client.
///
/// Every failure surfaced by this crate is exactly one of these four kinds;
/// transport and parser errors are translated before they reach the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// The service was never reached, the connection dropped before a complete
    /// response arrived, or the session was used before open / after close.
    #[error("Connection error: {message}{}", format_context(.context))]
    Connection {
        message: String,
        context: ErrorContext,
    },

    /// The service answered with a non-success status.
    #[error("API error: HTTP {status}{}: {message}", format_code(.code))]
    Api {
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// Local pre-flight validation failed; nothing was sent.
    #[error("Invalid argument: {message}{}", format_context(.context))]
    InvalidArgument {
        message: String,
        context: ErrorContext,
    },

    /// A response arrived but does not have the expected shape.
    #[error("Decode error: {message}{}", format_context(.context))]
    Decode {
        message: String,
        context: ErrorContext,
    },
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

fn format_code(code: &Option<String>) -> String {
    match code {
        Some(code) => format!(" [{}]", code),
        None => String::new(),
    }
}

impl Error {
    pub fn connection(msg: impl Into<String>) -> Self {
        Self::connection_with_context(msg, ErrorContext::new())
    }

    pub fn connection_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Connection {
            message: msg.into(),
            context,
        }
    }

    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::invalid_argument_with_context(msg, ErrorContext::new())
    }

    pub fn invalid_argument_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::InvalidArgument {
            message: msg.into(),
            context,
        }
    }

    pub fn decode(msg: impl Into<String>) -> Self {
        Self::decode_with_context(msg, ErrorContext::new())
    }

    pub fn decode_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Decode {
            message: msg.into(),
            context,
        }
    }

    pub fn api(status: u16, code: Option<String>, message: impl Into<String>) -> Self {
        Error::Api {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Connection { .. } => ErrorKind::Connection,
            Error::Api { .. } => ErrorKind::Api,
            Error::InvalidArgument { .. } => ErrorKind::InvalidArgument,
            Error::Decode { .. } => ErrorKind::Decode,
        }
    }

    pub fn is_connection(&self) -> bool {
        self.kind() == ErrorKind::Connection
    }

    pub fn is_api(&self) -> bool {
        self.kind() == ErrorKind::Api
    }

    pub fn is_invalid_argument(&self) -> bool {
        self.kind() == ErrorKind::InvalidArgument
    }

    pub fn is_decode(&self) -> bool {
        self.kind() == ErrorKind::Decode
    }

    /// HTTP status of an [`Error::Api`].
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Machine-readable code reported by the service, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Error::Api { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Connection { context, .. }
            | Error::InvalidArgument { context, .. }
            | Error::Decode { context, .. } => Some(context),
            Error::Api { .. } => None,
        }
    }
}
