use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use futures_util::stream::BoxStream;
use http::header::ACCEPT;

use super::decoder::decode_stream;
use super::error::AskError;
use super::models::{AskRequest, AskResponse, StreamEvent};
use crate::core::AppConfig;

pub type EventStream = BoxStream<'static, Result<StreamEvent, AskError>>;

/// The remote service that answers questions. `AskClient` talks to
/// it over HTTP, tests can script it in memory.
#[async_trait]
pub trait AskBackend: Send + Sync {
    /// Single JSON response with the whole answer.
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError>;

    /// Resolves once the response headers arrive. Events are read
    /// from the body lazily.
    async fn ask_stream(&self, request: &AskRequest) -> Result<EventStream, AskError>;
}

#[derive(Clone, Debug)]
pub struct AskClient {
    client: reqwest::Client,
    api_url: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl AskClient {
    pub fn new(api_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url: api_url.to_string(),
            auth_token: None,
            timeout: Duration::from_secs(60 * 5),
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        let client = Self::new(&config.api_url).timeout(Duration::from_secs(config.timeout_secs));
        match &config.auth_token {
            Some(token) => client.bearer_token(token),
            None => client,
        }
    }

    pub fn bearer_token(mut self, token: &str) -> Self {
        self.auth_token = Some(token.to_string());
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn send(
        &self,
        request: &AskRequest,
        accept: &'static str,
    ) -> Result<reqwest::Response, AskError> {
        let url = format!("{}/ask", self.api_url.trim_end_matches("/"));
        let mut builder = self
            .client
            .post(url)
            .header(ACCEPT, accept)
            .timeout(self.timeout)
            .json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder.send().await?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!("Ask request rejected with status {}", status);
            return Err(AskError::from_status(status));
        }

        Ok(response)
    }
}

#[async_trait]
impl AskBackend for AskClient {
    async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AskError> {
        let response = self.send(request, "application/json").await?;
        Ok(response.json::<AskResponse>().await?)
    }

    async fn ask_stream(&self, request: &AskRequest) -> Result<EventStream, AskError> {
        let response = self.send(request, "text/event-stream").await?;
        let events = decode_stream(response.bytes_stream()).map(|event| event.map_err(AskError::from));
        Ok(events.boxed())
    }
}
