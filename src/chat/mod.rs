mod lifecycle;
mod transcript;

pub use lifecycle::{
    AskOutcome, Conversation, ConversationBuilder, LifecycleState, RequestHandle, RequestStatus,
    SubmitError,
};
pub use transcript::{AnswerBuilder, Applied, Message, Transcript, TranscriptUpdate};
