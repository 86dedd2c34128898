use futures_util::StreamExt;
use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use super::transcript::{AnswerBuilder, Applied, Message, Transcript, TranscriptUpdate};
use crate::ask::{AskBackend, AskError, AskRequest, StreamEvent};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LifecycleState {
    Idle,
    WaitingFirstByte,
    Streaming,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestStatus {
    WaitingFirstByte,
    Streaming,
    Finished,
}

/// How an ask operation ended. The conversation is `Idle` again in
/// every case.
#[derive(Debug)]
pub enum AskOutcome {
    Completed,
    Cancelled,
    Failed(AskError),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SubmitError {
    #[error("question is empty")]
    EmptyQuestion,
    #[error("a question is already being answered")]
    Busy,
    #[error("no question has been submitted")]
    NothingPending,
}

/// A live ask operation. Clones share the same cancellation token so
/// a handle can be moved to another task and cancelled from there.
#[derive(Clone, Debug)]
pub struct RequestHandle {
    id: Uuid,
    token: CancellationToken,
    status: watch::Receiver<RequestStatus>,
}

impl RequestHandle {
    /// Request an abort. Calling this more than once, or after the
    /// operation finished, does nothing.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    pub fn status(&self) -> RequestStatus {
        *self.status.borrow()
    }

    /// Wait until the request reaches `wanted` or finishes, whichever
    /// happens first.
    pub async fn wait_until(&self, wanted: RequestStatus) -> RequestStatus {
        let mut rx = self.status.clone();
        match rx
            .wait_for(|s| *s == wanted || *s == RequestStatus::Finished)
            .await
        {
            Ok(status) => *status,
            Err(_) => RequestStatus::Finished,
        }
    }
}

struct ActiveRequest {
    handle: RequestHandle,
    status: watch::Sender<RequestStatus>,
    request: AskRequest,
}

/// Drives ask operations against a backend and owns the transcript
/// they produce. At most one request is live at a time.
///
/// Use `Conversation::builder()` to construct a `Conversation`.
pub struct Conversation {
    backend: Box<dyn AskBackend>,
    streaming: bool,
    original_text: Option<String>,
    transcript: Transcript,
    updates: Option<mpsc::UnboundedSender<TranscriptUpdate>>,
    active: Option<ActiveRequest>,
}

impl Conversation {
    pub fn builder(backend: impl AskBackend + 'static) -> ConversationBuilder {
        ConversationBuilder::new(backend)
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn handle(&self) -> Option<&RequestHandle> {
        self.active.as_ref().map(|a| &a.handle)
    }

    pub fn state(&self) -> LifecycleState {
        match &self.active {
            None => LifecycleState::Idle,
            // Cancelled means idle even when nothing is driving `run`
            Some(active) if active.handle.is_cancelled() => LifecycleState::Idle,
            Some(active) => match *active.status.borrow() {
                RequestStatus::WaitingFirstByte => LifecycleState::WaitingFirstByte,
                RequestStatus::Streaming => LifecycleState::Streaming,
                RequestStatus::Finished => LifecycleState::Idle,
            },
        }
    }

    /// Record the user's question and open a new request. Nothing is
    /// sent until `run` is awaited.
    pub fn submit(
        &mut self,
        question: &str,
        references: Vec<String>,
    ) -> Result<RequestHandle, SubmitError> {
        self.reap_cancelled();
        if self.active.is_some() {
            return Err(SubmitError::Busy);
        }
        let question = question.trim();
        if question.is_empty() {
            return Err(SubmitError::EmptyQuestion);
        }

        let index = self.transcript.push_user(question);
        self.notify_appended(index);

        let mut request = AskRequest::new(question, references);
        if let Some(text) = &self.original_text {
            request = request.with_original_text(text);
        }

        let (status, rx) = watch::channel(RequestStatus::WaitingFirstByte);
        let handle = RequestHandle {
            id: Uuid::new_v4(),
            token: CancellationToken::new(),
            status: rx,
        };
        tracing::debug!("Submitted request {}", handle.id);

        self.active = Some(ActiveRequest {
            handle: handle.clone(),
            status,
            request,
        });

        Ok(handle)
    }

    /// Run the submitted request until it completes, fails, or is
    /// cancelled through its handle.
    pub async fn run(&mut self) -> Result<AskOutcome, SubmitError> {
        let (id, token, request) = {
            let active = self.active.as_ref().ok_or(SubmitError::NothingPending)?;
            (
                active.handle.id,
                active.handle.token.clone(),
                active.request.clone(),
            )
        };

        let outcome = if self.streaming {
            self.run_stream(&token, &request).await
        } else {
            self.run_once(&token, &request).await
        };

        match &outcome {
            AskOutcome::Completed => tracing::debug!("Request {} completed", id),
            AskOutcome::Cancelled => tracing::debug!("Request {} cancelled", id),
            AskOutcome::Failed(e) => {
                tracing::error!("Request {} failed: {}", id, e);
                let index = self.transcript.push_error(e.user_message());
                self.notify_appended(index);
            }
        }

        if let Some(active) = self.active.take() {
            active.status.send_replace(RequestStatus::Finished);
        }

        Ok(outcome)
    }

    /// Submit and run in one go.
    pub async fn ask(
        &mut self,
        question: &str,
        references: Vec<String>,
    ) -> Result<AskOutcome, SubmitError> {
        self.submit(question, references)?;
        self.run().await
    }

    async fn run_once(&mut self, token: &CancellationToken, request: &AskRequest) -> AskOutcome {
        let result = tokio::select! {
            biased;
            _ = token.cancelled() => return AskOutcome::Cancelled,
            result = self.backend.ask(request) => result,
        };

        match result {
            Ok(response) => {
                let index = self.transcript.push_answer(response);
                self.notify_appended(index);
                AskOutcome::Completed
            }
            Err(e) => AskOutcome::Failed(e),
        }
    }

    async fn run_stream(&mut self, token: &CancellationToken, request: &AskRequest) -> AskOutcome {
        let opened = tokio::select! {
            biased;
            _ = token.cancelled() => return AskOutcome::Cancelled,
            opened = self.backend.ask_stream(request) => opened,
        };
        let mut events = match opened {
            Ok(events) => events,
            Err(e) => return AskOutcome::Failed(e),
        };

        let mut builder = AnswerBuilder::new();
        loop {
            let next = tokio::select! {
                biased;
                _ = token.cancelled() => return AskOutcome::Cancelled,
                next = events.next() => next,
            };

            match next {
                Some(Ok(event)) => self.apply(&mut builder, event),
                Some(Err(e)) => return AskOutcome::Failed(e),
                None => return AskOutcome::Completed,
            }
        }
    }

    // A cancelled request whose `run` was never awaited, or was dropped
    // part way, is finished here instead
    fn reap_cancelled(&mut self) {
        if let Some(active) = self.active.take_if(|a| a.handle.is_cancelled()) {
            tracing::debug!("Request {} cancelled", active.handle.id);
            active.status.send_replace(RequestStatus::Finished);
        }
    }

    fn apply(&mut self, builder: &mut AnswerBuilder, event: StreamEvent) {
        let fragment = match &event {
            StreamEvent::Token { text } => Some(text.clone()),
            StreamEvent::Context { .. } => None,
        };

        match builder.apply(&mut self.transcript, event) {
            Applied::Opened(index) => {
                if let Some(active) = &self.active {
                    active.status.send_replace(RequestStatus::Streaming);
                }
                self.notify_appended(index);
            }
            Applied::Extended(index) => {
                if let (Some(tx), Some(text)) = (&self.updates, fragment) {
                    let _ = tx.send(TranscriptUpdate::Extended { index, text });
                }
            }
            Applied::ContextPending | Applied::Ignored => {}
        }
    }

    fn notify_appended(&self, index: usize) {
        if let (Some(tx), Some(message)) = (&self.updates, self.transcript.messages().get(index)) {
            // A closed receiver only means nobody is rendering
            let _ = tx.send(TranscriptUpdate::Appended {
                index,
                message: message.clone(),
            });
        }
    }
}

pub struct ConversationBuilder {
    backend: Box<dyn AskBackend>,
    streaming: bool,
    original_text: Option<String>,
    transcript: Transcript,
    updates: Option<mpsc::UnboundedSender<TranscriptUpdate>>,
}

impl ConversationBuilder {
    pub fn new(backend: impl AskBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            streaming: true,
            original_text: None,
            transcript: Transcript::new(),
            updates: None,
        }
    }

    pub fn build(self) -> Conversation {
        Conversation {
            backend: self.backend,
            streaming: self.streaming,
            original_text: self.original_text,
            transcript: self.transcript,
            updates: self.updates,
            active: None,
        }
    }

    pub fn streaming(mut self, streaming: bool) -> Self {
        self.streaming = streaming;
        self
    }

    /// Send the source document along with every question.
    pub fn original_text(mut self, text: &str) -> Self {
        self.original_text = Some(text.to_string());
        self
    }

    pub fn transcript(mut self, messages: Vec<Message>) -> Self {
        self.transcript = Transcript::new_with_messages(messages);
        self
    }

    pub fn updates(mut self, transmitter: mpsc::UnboundedSender<TranscriptUpdate>) -> Self {
        self.updates = Some(transmitter);
        self
    }
}
