//! Test utilities for integration tests
#![allow(dead_code)]
use std::net::SocketAddr;
use std::sync::{Arc, RwLock};

use axum::{Router, body::Body};

use docqa::api::AppState;
use docqa::api::app;
use docqa::core::AppConfig;
use docqa::view::Document;

pub const SERVER_TOKEN: &str = "test-server-token";

/// Config for a stub server that streams without delays.
pub fn test_config(server_token: Option<&str>) -> AppConfig {
    AppConfig {
        api_url: String::from("http://127.0.0.1:8000"),
        auth_token: None,
        streaming: true,
        send_original_text: false,
        timeout_secs: 10,
        document_path: None,
        server_token: server_token.map(String::from),
        token_delay_ms: 0,
    }
}

/// Creates a test application router over the default document.
pub fn test_app(config: AppConfig) -> Router {
    let app_state = AppState::new(config, Document::default());
    app(Arc::new(RwLock::new(app_state)))
}

/// Serves the test application on a random local port and returns
/// the base url.
pub async fn spawn_app(config: AppConfig) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind test listener");
    let addr: SocketAddr = listener.local_addr().unwrap();
    let app = test_app(config);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

pub async fn body_to_string(body: Body) -> String {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}
