//! Mock stack server setup for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use serde_json::Value;
use stack_client::{StackClient, StackClientBuilder};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::oneshot;

/// Test fixture that manages a mock stack
pub struct MockStack {
    pub server: ServerGuard,
}

impl MockStack {
    pub async fn start() -> Self {
        Self {
            server: Server::new_async().await,
        }
    }

    pub fn base_url(&self) -> String {
        self.server.url()
    }

    /// Builder aimed at the mock server. The open-time probe is off so that
    /// health mocks only count the calls made by the test itself.
    pub fn builder(&self) -> StackClientBuilder {
        StackClientBuilder::new()
            .base_url(&self.base_url())
            .verify_on_open(false)
    }

    pub async fn client(&self) -> StackClient {
        self.builder()
            .build()
            .await
            .expect("client against mock server")
    }

    /// Mock a JSON reply on `path`.
    pub async fn mock_json(&mut self, method: &str, path: &str, status: usize, body: Value) -> Mock {
        self.server
            .mock(method, path)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body.to_string())
            .create_async()
            .await
    }

    /// Mock a JSON reply that is only served for the given request body.
    pub async fn mock_exchange(&mut self, path: &str, request: Value, response: Value) -> Mock {
        self.server
            .mock("POST", path)
            .match_header("content-type", "application/json")
            .match_body(Matcher::Json(request))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(response.to_string())
            .expect(1)
            .create_async()
            .await
    }

    /// A mock that must never be hit.
    pub async fn mock_never(&mut self, method: &str, path: &str) -> Mock {
        self.server
            .mock(method, path)
            .with_status(200)
            .with_body("{}")
            .expect(0)
            .create_async()
            .await
    }
}

/// A port on localhost where nothing listens.
pub async fn closed_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);
    port
}

/// A server that reads the request, then announces a body it never finishes.
pub async fn truncating_server() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: 100\r\n\r\n{\"answer\":",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });
    format!("http://{}", addr)
}

/// A server that answers the first request with `body` over a keep-alive
/// connection, then waits for the client to hang up. The receiver fires once
/// the accepted socket reads EOF.
pub async fn single_reply_server(body: &'static str) -> (String, oneshot::Receiver<()>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let (hung_up, rx) = oneshot::channel();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = [0u8; 4096];
        let _ = socket.read(&mut buf).await;
        let reply = format!(
            "HTTP/1.1 200 OK\r\ncontent-type: application/json\r\ncontent-length: {}\r\n\r\n{}",
            body.len(),
            body
        );
        socket.write_all(reply.as_bytes()).await.unwrap();
        loop {
            match socket.read(&mut buf).await {
                Ok(0) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        let _ = hung_up.send(());
    });
    (format!("http://{}", addr), rx)
}
