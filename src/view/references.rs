/// Free-text snippets the user attached to the next question.
#[derive(Clone, Debug, Default)]
pub struct ReferenceChips(Vec<String>);

impl ReferenceChips {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    /// Returns false when there is nothing but whitespace to attach.
    pub fn add(&mut self, text: &str) -> bool {
        let text = text.trim();
        if text.is_empty() {
            return false;
        }
        self.0.push(text.to_string());
        true
    }

    pub fn remove(&mut self, index: usize) -> Option<String> {
        if index < self.0.len() {
            Some(self.0.remove(index))
        } else {
            None
        }
    }

    pub fn list(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Hand the chips over to a question and start fresh.
    pub fn take(&mut self) -> Vec<String> {
        std::mem::take(&mut self.0)
    }
}
