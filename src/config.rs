//! Runtime configuration for the chat client.
//!
//! Browser builds bake these values in at compile time (see the frontend's
//! `build.rs`); native hosts and tests read them from the environment.

pub const DEFAULT_API_BASE: &str = "http://localhost:8000";
pub const DEFAULT_STORAGE_KEY: &str = "ai_support_chat_v1";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u32 = 30_000;

pub const API_BASE_VAR: &str = "SUPPORT_CHAT_API_BASE";
pub const STORAGE_KEY_VAR: &str = "SUPPORT_CHAT_STORAGE_KEY";
pub const TIMEOUT_VAR: &str = "SUPPORT_CHAT_TIMEOUT_MS";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatConfig {
    /// Base address of the support backend, without a trailing slash.
    pub api_base: String,
    /// Key the transcript snapshot is stored under.
    pub storage_key: String,
    pub request_timeout_ms: u32,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT_MS,
        }
    }
}

impl ChatConfig {
    pub fn new(api_base: impl Into<String>) -> Self {
        Self::default().with_api_base(api_base)
    }

    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_storage_key(mut self, storage_key: impl Into<String>) -> Self {
        self.storage_key = storage_key.into();
        self
    }

    pub fn with_request_timeout_ms(mut self, request_timeout_ms: u32) -> Self {
        self.request_timeout_ms = request_timeout_ms;
        self
    }

    /// Builds a config from optional raw values, falling back to defaults for
    /// anything missing, blank, or unparsable.
    pub fn from_values(
        api_base: Option<&str>,
        storage_key: Option<&str>,
        request_timeout_ms: Option<&str>,
    ) -> Self {
        let mut config = Self::default();
        if let Some(base) = non_blank(api_base) {
            config = config.with_api_base(base);
        }
        if let Some(key) = non_blank(storage_key) {
            config.storage_key = key.to_string();
        }
        if let Some(ms) = non_blank(request_timeout_ms).and_then(|v| v.parse::<u32>().ok()) {
            if ms > 0 {
                config.request_timeout_ms = ms;
            }
        }
        config
    }

    /// Reads `SUPPORT_CHAT_API_BASE`, `SUPPORT_CHAT_STORAGE_KEY` and
    /// `SUPPORT_CHAT_TIMEOUT_MS`.
    pub fn from_env() -> Self {
        let base = std::env::var(API_BASE_VAR).ok();
        let key = std::env::var(STORAGE_KEY_VAR).ok();
        let timeout = std::env::var(TIMEOUT_VAR).ok();
        Self::from_values(base.as_deref(), key.as_deref(), timeout.as_deref())
    }

    pub fn chat_url(&self) -> String {
        format!("{}/chat", self.api_base)
    }

    pub fn escalate_url(&self) -> String {
        format!("{}/escalate", self.api_base)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_backend() {
        let config = ChatConfig::default();
        assert_eq!(config.chat_url(), "http://localhost:8000/chat");
        assert_eq!(config.escalate_url(), "http://localhost:8000/escalate");
        assert_eq!(config.storage_key, "ai_support_chat_v1");
        assert_eq!(config.request_timeout_ms, 30_000);
    }

    #[test]
    fn trailing_slashes_are_trimmed() {
        let config = ChatConfig::new("https://support.example.com/api//");
        assert_eq!(config.chat_url(), "https://support.example.com/api/chat");
    }

    #[test]
    fn builder_overrides_fields() {
        let config = ChatConfig::new("http://10.0.0.5:8000")
            .with_storage_key("support_chat_staging")
            .with_request_timeout_ms(5_000);
        assert_eq!(config.escalate_url(), "http://10.0.0.5:8000/escalate");
        assert_eq!(config.storage_key, "support_chat_staging");
        assert_eq!(config.request_timeout_ms, 5_000);
    }

    #[test]
    fn from_values_falls_back_on_bad_input() {
        let config = ChatConfig::from_values(Some("  "), None, Some("soon"));
        assert_eq!(config, ChatConfig::default());

        let config = ChatConfig::from_values(None, None, Some("0"));
        assert_eq!(config.request_timeout_ms, DEFAULT_REQUEST_TIMEOUT_MS);
    }

    #[test]
    fn from_values_applies_overrides() {
        let config = ChatConfig::from_values(
            Some("https://chat.example.com/"),
            Some("support_chat_test"),
            Some("1500"),
        );
        assert_eq!(config.api_base, "https://chat.example.com");
        assert_eq!(config.storage_key, "support_chat_test");
        assert_eq!(config.request_timeout_ms, 1500);
    }

    #[test]
    fn from_env_reads_overrides() {
        std::env::set_var(API_BASE_VAR, "http://backend.test:9000");
        std::env::remove_var(STORAGE_KEY_VAR);
        std::env::set_var(TIMEOUT_VAR, "250");
        let config = ChatConfig::from_env();
        std::env::remove_var(API_BASE_VAR);
        std::env::remove_var(TIMEOUT_VAR);
        assert_eq!(config.api_base, "http://backend.test:9000");
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.request_timeout_ms, 250);
    }
}
