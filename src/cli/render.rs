use std::io::Write;

use crate::chat::{Message, TranscriptUpdate};
use crate::view::{Segment, render_citations};

pub fn print_update(update: &TranscriptUpdate) {
    match update {
        // Questions are echoed by whoever typed them
        TranscriptUpdate::Appended { message, .. } if message.is_user => return,
        TranscriptUpdate::Appended { message, .. } => {
            print!("[{}] {}", message.timestamp, message.content)
        }
        TranscriptUpdate::Extended { text, .. } => print!("{}", text),
    }
    let _ = std::io::stdout().flush();
}

/// One line per distinct citation in the answer, in the order they
/// first appear.
pub fn footnotes(message: &Message) -> Vec<String> {
    let table = message.citation_table();
    let mut seen = Vec::new();
    let mut lines = Vec::new();

    for segment in render_citations(&message.content, &table) {
        if let Segment::Citation { number, snippet } = segment {
            if seen.contains(&number) {
                continue;
            }
            seen.push(number);
            lines.push(format!("  [{}] {}", number, snippet));
        }
    }
    lines
}
