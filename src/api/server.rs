use std::sync::{Arc, RwLock};

use anyhow::Result;
use axum::Router;
use axum::middleware;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use super::auth::require_token;
use super::routes;
use crate::api::state::AppState;
use crate::core::AppConfig;
use crate::view::Document;

pub fn app(shared_state: Arc<RwLock<AppState>>) -> Router {
    let cors = CorsLayer::permissive();

    Router::new()
        .merge(routes::router().route_layer(middleware::from_fn_with_state(
            Arc::clone(&shared_state),
            require_token,
        )))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(Arc::clone(&shared_state))
}

// Run the server
pub async fn serve(host: String, port: String, config: AppConfig) -> Result<()> {
    let document = Document::from_config(&config)?;
    if config.server_token.is_none() {
        tracing::warn!("DOCQA_SERVER_TOKEN is not set, requests will not be authenticated");
    }

    let app_state = AppState::new(config, document);
    let shared_state = Arc::new(RwLock::new(app_state));
    let app = app(Arc::clone(&shared_state));

    let listener = tokio::net::TcpListener::bind(format!("{}:{}", host, port)).await?;

    tracing::info!("Server started. Listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;

    Ok(())
}
