use serde::{Deserialize, Serialize};

// {"type":"context","top_docs":["Sunlight helps..."]}
// {"type":"token","answer":"Sun"}
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StreamEvent {
    Context { top_docs: Vec<String> },
    Token {
        #[serde(rename = "answer")]
        text: String,
    },
}

/// A cited passage returned by the non-streaming `/ask` response.
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct Source {
    pub id: u32,
    pub snippet: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
}

#[derive(Clone, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub references: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_text: Option<String>,
}

impl AskRequest {
    pub fn new(question: &str, references: Vec<String>) -> Self {
        Self {
            question: question.to_string(),
            references,
            original_text: None,
        }
    }

    pub fn with_original_text(mut self, text: &str) -> Self {
        self.original_text = Some(text.to_string());
        self
    }
}

// Older backends only send `answer` so `sources` is optional
#[derive(Clone, Serialize, Deserialize, Debug, PartialEq)]
pub struct AskResponse {
    pub answer: String,
    #[serde(default)]
    pub sources: Vec<Source>,
}
