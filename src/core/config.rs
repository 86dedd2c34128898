use std::collections::HashMap;
use std::env;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub api_url: String,
    pub auth_token: Option<String>,
    pub streaming: bool,
    pub send_original_text: bool,
    pub timeout_secs: u64,
    pub document_path: Option<String>,
    pub server_token: Option<String>,
    pub token_delay_ms: u64,
}

/// Typed reads over a variable lookup, usually the process
/// environment.
struct Vars<F: Fn(&str) -> Option<String>>(F);

impl<F: Fn(&str) -> Option<String>> Vars<F> {
    fn get(&self, name: &str) -> Option<String> {
        (self.0)(name)
    }

    fn flag(&self, name: &str, default: bool) -> bool {
        match self.get(name) {
            Some(val) => matches!(val.to_lowercase().as_str(), "1" | "true" | "yes" | "on"),
            None => default,
        }
    }

    fn number(&self, name: &str, default: u64) -> u64 {
        self.get(name)
            .and_then(|val| {
                val.parse()
                    .inspect_err(|e| tracing::warn!("Ignoring invalid {}={}: {}", name, val, e))
                    .ok()
            })
            .unwrap_or(default)
    }

    // Blank values count as unset so `DOCQA_AUTH_TOKEN=` disables auth
    fn optional(&self, name: &str) -> Option<String> {
        self.get(name).filter(|val| !val.trim().is_empty())
    }
}

impl AppConfig {
    /// Build the config from any variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let host = "127.0.0.1";
        let port = "8000";
        let vars = Vars(get);
        let api_url = vars
            .get("DOCQA_API_URL")
            .unwrap_or_else(|| format!("http://{}:{}", host, port));

        Self {
            api_url,
            auth_token: vars.optional("DOCQA_AUTH_TOKEN"),
            streaming: vars.flag("DOCQA_STREAMING", true),
            send_original_text: vars.flag("DOCQA_SEND_ORIGINAL_TEXT", false),
            timeout_secs: vars.number("DOCQA_TIMEOUT_SECS", 60 * 5),
            document_path: vars.optional("DOCQA_DOCUMENT_PATH"),
            server_token: vars.optional("DOCQA_SERVER_TOKEN"),
            token_delay_ms: vars.number("DOCQA_TOKEN_DELAY_MS", 50),
        }
    }

    pub fn from_map(vars: &HashMap<String, String>) -> Self {
        Self::from_lookup(|name| vars.get(name).cloned())
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::from_lookup(|name| env::var(name).ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_defaults_when_unset() {
        let config = AppConfig::from_map(&HashMap::new());
        assert_eq!(config.api_url, "http://127.0.0.1:8000");
        assert_eq!(config.auth_token, None);
        assert!(config.streaming);
        assert!(!config.send_original_text);
        assert_eq!(config.timeout_secs, 300);
        assert_eq!(config.document_path, None);
        assert_eq!(config.server_token, None);
        assert_eq!(config.token_delay_ms, 50);
    }

    #[test]
    fn test_reads_every_variable() {
        let config = AppConfig::from_map(&vars(&[
            ("DOCQA_API_URL", "http://qa.local:9000"),
            ("DOCQA_AUTH_TOKEN", "token"),
            ("DOCQA_STREAMING", "off"),
            ("DOCQA_SEND_ORIGINAL_TEXT", "TRUE"),
            ("DOCQA_TIMEOUT_SECS", "25"),
            ("DOCQA_DOCUMENT_PATH", "/tmp/doc.txt"),
            ("DOCQA_SERVER_TOKEN", "server"),
            ("DOCQA_TOKEN_DELAY_MS", "0"),
        ]));
        assert_eq!(config.api_url, "http://qa.local:9000");
        assert_eq!(config.auth_token, Some("token".to_string()));
        assert!(!config.streaming);
        assert!(config.send_original_text);
        assert_eq!(config.timeout_secs, 25);
        assert_eq!(config.document_path, Some("/tmp/doc.txt".to_string()));
        assert_eq!(config.server_token, Some("server".to_string()));
        assert_eq!(config.token_delay_ms, 0);
    }

    #[test]
    fn test_invalid_and_blank_values_fall_back() {
        let config = AppConfig::from_map(&vars(&[
            ("DOCQA_AUTH_TOKEN", "  "),
            ("DOCQA_SERVER_TOKEN", ""),
            ("DOCQA_TIMEOUT_SECS", "soon"),
            ("DOCQA_STREAMING", "0"),
        ]));
        assert_eq!(config.auth_token, None);
        assert_eq!(config.server_token, None);
        assert_eq!(config.timeout_secs, 300);
        assert!(!config.streaming);
    }
}
