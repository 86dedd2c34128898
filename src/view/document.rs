use std::fs;

use anyhow::{Result, anyhow};

use crate::core::AppConfig;

/// Receives highlight requests from citation hovers.
pub trait HighlightSink {
    fn highlight(&mut self, snippet: &str);
    fn clear(&mut self);
}

/// The passage shown when no document file is configured.
pub const DEFAULT_DOCUMENT: &[&str] = &[
    "Plants need sunlight, water, air, and soil to grow well.",
    "Sunlight helps plants make their own food through a process called photosynthesis.",
    "This is how they turn light into energy.",
    "Water is taken in by the roots and moves up through the plant to the leaves.",
    "Without enough water, a plant may wilt or stop growing.",
    "Air gives plants carbon dioxide, which they use along with sunlight to make food.",
    "This is why plants are usually found in open spaces.",
    "Soil supports the plant and gives it important nutrients like nitrogen and potassium.",
    "These nutrients help plants grow taller, greener, and stronger.",
    "If a plant gets too little sunlight, or is in very dry soil, it may grow slowly or not at all.",
    "People often place their plants near windows or in gardens to give them what they need.",
];

#[derive(Clone, Debug)]
struct Paragraph {
    text: String,
    highlighted: bool,
}

/// The source text a question is asked about, one entry per
/// displayed paragraph.
#[derive(Clone, Debug)]
pub struct Document {
    paragraphs: Vec<Paragraph>,
}

impl Default for Document {
    fn default() -> Self {
        Self::new(DEFAULT_DOCUMENT.iter().map(|p| p.to_string()).collect())
    }
}

impl Document {
    pub fn new(paragraphs: Vec<String>) -> Self {
        Self {
            paragraphs: paragraphs
                .into_iter()
                .map(|text| Paragraph {
                    text,
                    highlighted: false,
                })
                .collect(),
        }
    }

    /// One paragraph per non-blank line.
    pub fn from_text(text: &str) -> Self {
        Self::new(
            text.lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(String::from)
                .collect(),
        )
    }

    pub fn load(path: &str) -> Result<Self> {
        let text = fs::read_to_string(path)
            .map_err(|e| anyhow!("Failed to read document {}: {}", path, e))?;
        Ok(Self::from_text(&text))
    }

    pub fn from_config(config: &AppConfig) -> Result<Self> {
        match &config.document_path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn paragraphs(&self) -> impl Iterator<Item = &str> {
        self.paragraphs.iter().map(|p| p.text.as_str())
    }

    pub fn len(&self) -> usize {
        self.paragraphs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paragraphs.is_empty()
    }

    pub fn first_paragraph(&self) -> Option<&str> {
        self.paragraphs.first().map(|p| p.text.as_str())
    }

    pub fn highlighted(&self) -> Vec<usize> {
        self.paragraphs
            .iter()
            .enumerate()
            .filter(|(_, p)| p.highlighted)
            .map(|(i, _)| i)
            .collect()
    }

    pub fn full_text(&self) -> String {
        self.paragraphs().collect::<Vec<_>>().join("\n")
    }

    /// Numbered paragraphs for a terminal, with highlighted ones
    /// marked.
    pub fn render(&self) -> String {
        self.paragraphs
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let marker = if p.highlighted { ">>" } else { "  " };
                format!("{} {:>2}. {}", marker, i + 1, p.text)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl HighlightSink for Document {
    // Every paragraph containing the snippet is emphasised, all the
    // others are cleared
    fn highlight(&mut self, snippet: &str) {
        for p in self.paragraphs.iter_mut() {
            p.highlighted = !snippet.is_empty() && p.text.contains(snippet);
        }
    }

    fn clear(&mut self) {
        for p in self.paragraphs.iter_mut() {
            p.highlighted = false;
        }
    }
}
