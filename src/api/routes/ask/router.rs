//! Router for the ask API

use std::convert::Infallible;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use anyhow::anyhow;
use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::ACCEPT},
    response::{IntoResponse, Response, sse::Event, sse::KeepAlive, sse::Sse},
    routing::post,
};

use super::public::{self, AskRequest, AskResponse, Source, StreamEvent};
use crate::api::public::ApiError;
use crate::api::state::AppState;

type SharedState = Arc<RwLock<AppState>>;

fn wants_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.contains("text/event-stream"))
}

/// Answer a question with the canned answer, either as a single JSON
/// payload or as a stream of frames.
async fn ask_handler(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<AskRequest>,
) -> Result<Response, ApiError> {
    if payload.question.trim().is_empty() {
        return Ok((
            StatusCode::UNPROCESSABLE_ENTITY,
            "Question must not be empty",
        )
            .into_response());
    }

    let (top_docs, token_delay) = {
        let shared_state = state
            .read()
            .map_err(|_| anyhow!("Unable to read shared state"))?;
        let top_docs = if payload.references.is_empty() {
            shared_state
                .document
                .first_paragraph()
                .map(|p| vec![p.to_string()])
                .unwrap_or_default()
        } else {
            payload.references.clone()
        };
        (
            top_docs,
            Duration::from_millis(shared_state.config.token_delay_ms),
        )
    };

    tracing::debug!(
        "Answering {:?} with {} reference(s)",
        payload.question,
        payload.references.len()
    );

    if !wants_event_stream(&headers) {
        let sources = top_docs
            .into_iter()
            .take(1)
            .map(|snippet| Source {
                id: 1,
                snippet,
                page: Some(2),
            })
            .collect();
        return Ok(Json(AskResponse {
            answer: public::DUMMY_ANSWER.to_string(),
            sources,
        })
        .into_response());
    }

    let mut events = vec![StreamEvent::Context { top_docs }];
    events.extend(
        public::answer_tokens(public::DUMMY_ANSWER)
            .into_iter()
            .map(|text| StreamEvent::Token { text }),
    );

    let sse_stream = async_stream::stream! {
        for event in events {
            if !token_delay.is_zero() {
                tokio::time::sleep(token_delay).await;
            }
            match Event::default().json_data(&event) {
                Ok(event) => yield Ok::<Event, Infallible>(event),
                Err(e) => tracing::error!("Failed to encode event: {}", e),
            }
        }
    };

    let resp = Sse::new(sse_stream)
        .keep_alive(
            KeepAlive::default()
                .text("keep-alive")
                .interval(Duration::from_millis(100)),
        )
        .into_response();

    Ok(resp)
}

/// Create the ask router
pub fn router() -> Router<SharedState> {
    Router::new().route("/", post(ask_handler))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_wants_event_stream() {
        let mut headers = HeaderMap::new();
        assert!(!wants_event_stream(&headers));

        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        assert!(!wants_event_stream(&headers));

        headers.insert(
            ACCEPT,
            HeaderValue::from_static("text/event-stream, */*;q=0.1"),
        );
        assert!(wants_event_stream(&headers));
    }
}
