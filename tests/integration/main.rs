//! Integration tests with mock HTTP server

mod capabilities;
mod errors;
mod mock_server;
