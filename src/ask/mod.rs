mod client;
mod decoder;
mod error;
mod models;

pub use client::{AskBackend, AskClient, EventStream};
pub use decoder::{EventDecoder, decode_frame, decode_stream};
pub use error::{AUTH_ERROR_MESSAGE, AskError, GENERIC_ERROR_MESSAGE};
pub use models::{AskRequest, AskResponse, Source, StreamEvent};
