//! Incremental decoding of `data: `-prefixed lines into
//! [`StreamEvent`]s.
use futures_util::{Stream, StreamExt, pin_mut};

use super::models::StreamEvent;

const FRAME_PREFIX: &str = "data: ";

/// Parse a single line of the response body. Returns `None` for
/// anything that is not a well formed frame.
pub fn decode_frame(line: &str) -> Option<StreamEvent> {
    let payload = line.strip_prefix(FRAME_PREFIX)?;

    serde_json::from_str::<StreamEvent>(payload)
        .inspect_err(|e| tracing::warn!("Skipping malformed frame {}\nError: {}", payload, e))
        .ok()
}

fn decode_line(line: &[u8]) -> Option<StreamEvent> {
    let line = std::str::from_utf8(line)
        .inspect_err(|e| tracing::warn!("Skipping line that is not valid utf-8: {}", e))
        .ok()?;
    decode_frame(line.strip_suffix('\r').unwrap_or(line))
}

/// Buffers raw bytes from the transport and emits an event for each
/// complete frame.
///
/// Splitting happens on raw bytes so a line (or a multi-byte
/// character) split across two chunks is held back until the rest
/// of it arrives.
#[derive(Debug, Default)]
pub struct EventDecoder {
    buffer: Vec<u8>,
}

impl EventDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, chunk: &[u8]) -> Vec<StreamEvent> {
        self.buffer.extend_from_slice(chunk);

        let mut events = Vec::new();
        while let Some(end) = self.buffer.iter().position(|b| *b == b'\n') {
            let line: Vec<u8> = self.buffer.drain(..=end).collect();
            if let Some(event) = decode_line(&line[..end]) {
                events.push(event);
            }
        }
        events
    }

    /// Decode whatever is left once the transport closes. An
    /// unterminated trailing line is all that can still be in the
    /// buffer.
    pub fn finish(self) -> Option<StreamEvent> {
        if self.buffer.is_empty() {
            return None;
        }
        decode_line(&self.buffer)
    }
}

/// Lazily turn a byte stream into a stream of events. Transport
/// errors are passed through and end the stream.
pub fn decode_stream<S, B, E>(bytes: S) -> impl Stream<Item = Result<StreamEvent, E>>
where
    S: Stream<Item = Result<B, E>>,
    B: AsRef<[u8]>,
{
    async_stream::stream! {
        let mut decoder = EventDecoder::new();
        pin_mut!(bytes);

        while let Some(chunk) = bytes.next().await {
            match chunk {
                Ok(chunk) => {
                    for event in decoder.push(chunk.as_ref()) {
                        yield Ok(event);
                    }
                }
                Err(e) => {
                    yield Err(e);
                    return;
                }
            }
        }

        if let Some(event) = decoder.finish() {
            yield Ok(event);
        }
    }
}
