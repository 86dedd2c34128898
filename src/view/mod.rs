//! Presentation helpers that sit around the transcript: citation
//! markers, source highlighting and reference chips.
mod citation;
mod document;
mod references;

pub use citation::{CitationTable, HoverEvent, Segment, dispatch_hover, render_citations};
pub use document::{DEFAULT_DOCUMENT, Document, HighlightSink};
pub use references::ReferenceChips;
