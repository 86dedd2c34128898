//! Public types for the ask API
pub use crate::ask::{AskRequest, AskResponse, Source, StreamEvent};

/// Every question gets this answer. The stub does no retrieval.
pub const DUMMY_ANSWER: &str = "A dummy answer with a citation [1].";

/// Split an answer into the fragments sent as `token` frames. The
/// fragments concatenate back to the full answer.
pub fn answer_tokens(answer: &str) -> Vec<String> {
    answer.split_inclusive(' ').map(String::from).collect()
}
