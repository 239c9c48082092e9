use crate::replicate::{PollPolicy, DEFAULT_MODEL_VERSION};

/// Provider credentials and tuning for the built-in capability adapters.
///
/// A missing key is not an error here; each adapter decides what a missing
/// key means when it is called.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub openai_api_key: Option<String>,
    pub replicate_api_key: Option<String>,
    pub ocr_space_api_key: Option<String>,
    pub replicate_version: String,
    pub poll: PollPolicy,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            openai_api_key: None,
            replicate_api_key: None,
            ocr_space_api_key: None,
            replicate_version: DEFAULT_MODEL_VERSION.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl ProviderConfig {
    /// Read `OPENAI_API_KEY`, `REPLICATE_API_KEY`, `OCR_SPACE_API_KEY`,
    /// `REPLICATE_MODEL_VERSION`, `REPLICATE_POLL_INTERVAL_MS` and
    /// `REPLICATE_MAX_POLLS`.
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut poll = defaults.poll;
        if let Some(ms) = non_empty("REPLICATE_POLL_INTERVAL_MS").and_then(|v| v.parse().ok()) {
            poll.interval_ms = ms;
        }
        if let Some(max) = non_empty("REPLICATE_MAX_POLLS").and_then(|v| v.parse().ok()) {
            poll.max_attempts = max;
        }

        Self {
            openai_api_key: non_empty("OPENAI_API_KEY"),
            replicate_api_key: non_empty("REPLICATE_API_KEY"),
            ocr_space_api_key: non_empty("OCR_SPACE_API_KEY"),
            replicate_version: non_empty("REPLICATE_MODEL_VERSION")
                .unwrap_or(defaults.replicate_version),
            poll,
        }
    }
}
