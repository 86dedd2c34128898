//! The conversation transcript and the rules for folding streamed
//! events into it.
use serde::{Deserialize, Serialize};

use crate::ask::{AskResponse, Source, StreamEvent};
use crate::view::CitationTable;

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Message {
    pub content: String,
    pub timestamp: String,
    pub is_user: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub retrieved_snippets: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sources: Vec<Source>,
}

fn now() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

impl Message {
    pub fn user(content: &str) -> Self {
        Self {
            content: content.to_string(),
            timestamp: now(),
            is_user: true,
            retrieved_snippets: Vec::new(),
            sources: Vec::new(),
        }
    }

    pub fn assistant(content: &str, retrieved_snippets: Vec<String>) -> Self {
        Self {
            content: content.to_string(),
            timestamp: now(),
            is_user: false,
            retrieved_snippets,
            sources: Vec::new(),
        }
    }

    /// Sources from a full response take precedence over streamed
    /// snippets when resolving `[n]` markers.
    pub fn citation_table(&self) -> CitationTable<'_> {
        if self.sources.is_empty() {
            CitationTable::Positional(&self.retrieved_snippets)
        } else {
            CitationTable::ById(&self.sources)
        }
    }
}

/// Changes to the transcript, in the order they happen, for anything
/// rendering it.
#[derive(Clone, Debug, PartialEq)]
pub enum TranscriptUpdate {
    Appended { index: usize, message: Message },
    Extended { index: usize, text: String },
}

/// Ordered, append-only list of messages. Insertion order is display
/// order.
#[derive(Clone, Debug, Default)]
pub struct Transcript(Vec<Message>);

impl Transcript {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn new_with_messages(messages: Vec<Message>) -> Self {
        Self(messages)
    }

    pub fn messages(&self) -> &[Message] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Message> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Message> {
        self.0.iter()
    }

    /// The most recent answer, skipping nothing but user messages.
    pub fn last_answer(&self) -> Option<&Message> {
        self.0.iter().rev().find(|m| !m.is_user)
    }

    fn push(&mut self, msg: Message) -> usize {
        self.0.push(msg);
        self.0.len() - 1
    }

    pub fn push_user(&mut self, question: &str) -> usize {
        self.push(Message::user(question))
    }

    pub fn push_answer(&mut self, response: AskResponse) -> usize {
        let mut msg = Message::assistant(&response.answer, Vec::new());
        msg.sources = response.sources;
        self.push(msg)
    }

    pub fn push_error(&mut self, text: &str) -> usize {
        self.push(Message::assistant(text, Vec::new()))
    }

    // Only the last message can be open for appending
    fn extend(&mut self, index: usize, text: &str) {
        debug_assert_eq!(index + 1, self.0.len(), "Extending a message that is not last");
        if let Some(msg) = self.0.get_mut(index) {
            msg.content.push_str(text);
        }
    }
}

/// What applying one event did to the transcript.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    Opened(usize),
    Extended(usize),
    ContextPending,
    Ignored,
}

/// Assembles a single streamed answer. Create one per ask operation.
#[derive(Debug, Default)]
pub struct AnswerBuilder {
    pending_snippets: Vec<String>,
    open: Option<usize>,
}

impl AnswerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn apply(&mut self, transcript: &mut Transcript, event: StreamEvent) -> Applied {
        match (event, self.open) {
            (StreamEvent::Context { top_docs }, None) => {
                self.pending_snippets = top_docs;
                Applied::ContextPending
            }
            (StreamEvent::Context { .. }, Some(index)) => {
                tracing::debug!("Ignoring context received after message {} opened", index);
                Applied::Ignored
            }
            (StreamEvent::Token { text }, None) => {
                let snippets = std::mem::take(&mut self.pending_snippets);
                let index = transcript.push(Message::assistant(&text, snippets));
                self.open = Some(index);
                Applied::Opened(index)
            }
            (StreamEvent::Token { text }, Some(index)) => {
                transcript.extend(index, &text);
                Applied::Extended(index)
            }
        }
    }
}
