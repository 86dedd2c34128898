use std::sync::LazyLock;

use regex::Regex;

use super::document::HighlightSink;
use crate::ask::Source;

static CITATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\[(\d+)\]").expect("Invalid citation regex"));

/// Where the snippet behind a `[n]` marker comes from.
#[derive(Clone, Copy, Debug)]
pub enum CitationTable<'a> {
    /// Sources returned alongside a full answer, matched on `id`.
    ById(&'a [Source]),
    /// Streamed context, where `[1]` is the first snippet.
    Positional(&'a [String]),
}

impl<'a> CitationTable<'a> {
    pub fn lookup(&self, number: u32) -> Option<&'a str> {
        match self {
            CitationTable::ById(sources) => sources
                .iter()
                .find(|s| s.id == number)
                .map(|s| s.snippet.as_str()),
            CitationTable::Positional(snippets) => (number as usize)
                .checked_sub(1)
                .and_then(|i| snippets.get(i))
                .map(String::as_str),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Segment {
    Text(String),
    Citation { number: u32, snippet: String },
}

#[derive(Clone, Debug, PartialEq)]
pub enum HoverEvent {
    Enter(String),
    Leave,
}

impl Segment {
    pub fn on_enter(&self) -> Option<HoverEvent> {
        match self {
            Segment::Citation { snippet, .. } => Some(HoverEvent::Enter(snippet.clone())),
            Segment::Text(_) => None,
        }
    }

    pub fn on_leave(&self) -> Option<HoverEvent> {
        match self {
            Segment::Citation { .. } => Some(HoverEvent::Leave),
            Segment::Text(_) => None,
        }
    }
}

/// Split `text` around `[n]` markers. Markers without a matching
/// snippet are left in place as plain text.
pub fn render_citations(text: &str, table: &CitationTable) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut last = 0;

    for caps in CITATION_RE.captures_iter(text) {
        let Some(marker) = caps.get(0) else {
            continue;
        };
        let Some(number) = caps[1].parse::<u32>().ok() else {
            continue;
        };
        let Some(snippet) = table.lookup(number) else {
            continue;
        };

        if marker.start() > last {
            segments.push(Segment::Text(text[last..marker.start()].to_string()));
        }
        segments.push(Segment::Citation {
            number,
            snippet: snippet.to_string(),
        });
        last = marker.end();
    }

    if last < text.len() {
        segments.push(Segment::Text(text[last..].to_string()));
    }

    segments
}

pub fn dispatch_hover(event: HoverEvent, sink: &mut dyn HighlightSink) {
    match event {
        HoverEvent::Enter(snippet) => sink.highlight(&snippet),
        HoverEvent::Leave => sink.clear(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text(s: &str) -> Segment {
        Segment::Text(s.to_string())
    }

    fn citation(number: u32, snippet: &str) -> Segment {
        Segment::Citation {
            number,
            snippet: snippet.to_string(),
        }
    }

    #[test]
    fn test_render_by_id() {
        let sources = vec![Source {
            id: 1,
            snippet: "Dummy snippet from page 2".to_string(),
            page: Some(2),
        }];
        let segments = render_citations(
            "A dummy answer with a citation [1].",
            &CitationTable::ById(&sources),
        );
        assert_eq!(
            segments,
            vec![
                text("A dummy answer with a citation "),
                citation(1, "Dummy snippet from page 2"),
                text("."),
            ]
        );
    }

    #[test]
    fn test_render_positional() {
        let snippets = vec!["first".to_string(), "second".to_string()];
        let segments = render_citations("[2] then [1]", &CitationTable::Positional(&snippets));
        assert_eq!(
            segments,
            vec![citation(2, "second"), text(" then "), citation(1, "first")]
        );
    }

    #[test]
    fn test_unknown_markers_stay_text() {
        let snippets = vec!["only".to_string()];
        let table = CitationTable::Positional(&snippets);

        assert_eq!(
            render_citations("See [0] and [3] and [x].", &table),
            vec![text("See [0] and [3] and [x].")]
        );
        assert_eq!(
            render_citations("Before [3] after [1]", &table),
            vec![text("Before [3] after "), citation(1, "only")]
        );
    }

    #[test]
    fn test_render_without_snippets() {
        let table = CitationTable::Positional(&[]);
        assert_eq!(render_citations("Plain [1]", &table), vec![text("Plain [1]")]);
        assert!(render_citations("", &table).is_empty());
    }

    #[test]
    fn test_hover_events() {
        let segment = citation(1, "Sunlight helps");
        assert_eq!(
            segment.on_enter(),
            Some(HoverEvent::Enter("Sunlight helps".to_string()))
        );
        assert_eq!(segment.on_leave(), Some(HoverEvent::Leave));
        assert_eq!(text("plain").on_enter(), None);
    }

    #[derive(Default)]
    struct RecordingSink(Vec<Option<String>>);

    impl HighlightSink for RecordingSink {
        fn highlight(&mut self, snippet: &str) {
            self.0.push(Some(snippet.to_string()));
        }

        fn clear(&mut self) {
            self.0.push(None);
        }
    }

    #[test]
    fn test_dispatch_hover() {
        let mut sink = RecordingSink::default();
        dispatch_hover(HoverEvent::Enter("a".to_string()), &mut sink);
        dispatch_hover(HoverEvent::Leave, &mut sink);
        assert_eq!(sink.0, vec![Some("a".to_string()), None]);
    }
}
