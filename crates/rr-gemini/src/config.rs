//! Gateway configuration

/// Default Gemini model
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

/// Gemini API base URL
pub const API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Environment variable holding the API key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

/// Configuration for the Gemini gateway
///
/// A missing API key is not an error at construction time: every call
/// short-circuits with a configuration-error response instead.
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    /// API key; `None` disables all network calls
    pub api_key: Option<String>,
    /// Model id (e.g. "gemini-2.5-flash")
    pub model: String,
    /// API base URL, overridable for tests
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: DEFAULT_MODEL.to_string(),
            base_url: API_BASE.to_string(),
        }
    }
}

impl GeminiConfig {
    /// Build a configuration from the environment
    #[must_use]
    pub fn from_env() -> Self {
        let api_key = std::env::var(API_KEY_ENV).ok().filter(|k| !k.is_empty());
        if api_key.is_none() {
            tracing::warn!(
                "{API_KEY_ENV} is not set; AI calls will return configuration errors"
            );
        }
        Self {
            api_key,
            ..Self::default()
        }
    }

    /// With an explicit API key
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// With a specific model
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// With a custom base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}
