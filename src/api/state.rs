use crate::core::AppConfig;
use crate::view::Document;

pub struct AppState {
    pub config: AppConfig,
    // Canned answers cite from this document
    pub document: Document,
}

impl AppState {
    pub fn new(config: AppConfig, document: Document) -> Self {
        Self { config, document }
    }
}
