//! Bearer token check for the API routes

use std::sync::{Arc, RwLock};

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::{IntoResponse, Response},
};
use http::{StatusCode, header::AUTHORIZATION};

use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

/// Rejects requests with a 401 unless they carry the configured
/// server token. Does nothing when no token is configured.
pub async fn require_token(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let expected = match state.read() {
        Ok(state) => state.config.server_token.clone(),
        Err(_) => {
            tracing::error!("Unable to read shared state");
            return StatusCode::INTERNAL_SERVER_ERROR.into_response();
        }
    };

    if let Some(expected) = expected {
        match bearer_token(&request) {
            None => {
                return (StatusCode::UNAUTHORIZED, "Missing Authorization").into_response();
            }
            Some(token) if token != expected => {
                tracing::debug!("Rejected request with invalid token");
                return (StatusCode::UNAUTHORIZED, "Invalid token").into_response();
            }
            Some(_) => {}
        }
    }

    next.run(request).await
}
