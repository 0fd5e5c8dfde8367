//! Transport session: the single HTTP connection to the stack.

mod http;

pub use http::{HttpTransport, Method, RawResponse, REQUEST_ID_HEADER};
