//! Environment configuration.
//!
//! Read once at start-up, after `.env` has been loaded.

use std::time::Duration;

pub const DEFAULT_API_URL: &str = "https://api.cohere.ai/v1/generate";
pub const DEFAULT_MODEL: &str = "command";
pub const DEFAULT_DAILY_LIMIT: u32 = 100;
pub const DEFAULT_CALL_DELAY_MS: u64 = 2_000;
pub const DEFAULT_USAGE_FILE: &str = "data/api-usage.json";

#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// Absent key selects the offline fallback narrative for every region.
    pub api_key: Option<String>,
    pub api_url: String,
    pub model: String,
    /// Bypass the daily call ceiling.
    pub force: bool,
    pub daily_limit: u32,
    pub call_delay: Duration,
    pub usage_file: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: DEFAULT_API_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            force: false,
            daily_limit: DEFAULT_DAILY_LIMIT,
            call_delay: Duration::from_millis(DEFAULT_CALL_DELAY_MS),
            usage_file: DEFAULT_USAGE_FILE.to_string(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds settings from an arbitrary variable lookup.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let non_empty = |key: &str| get(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        Self {
            api_key: non_empty("COHERE_API_KEY"),
            api_url: non_empty("COHERE_API_URL").unwrap_or(defaults.api_url),
            model: non_empty("COHERE_MODEL").unwrap_or(defaults.model),
            force: non_empty("FORCE_AI_ANALYSIS")
                .is_some_and(|v| matches!(v.to_ascii_lowercase().as_str(), "true" | "1" | "yes")),
            daily_limit: non_empty("AI_DAILY_CALL_LIMIT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.daily_limit),
            call_delay: non_empty("AI_CALL_DELAY_MS")
                .and_then(|v| v.parse().ok())
                .map(Duration::from_millis)
                .unwrap_or(defaults.call_delay),
            usage_file: non_empty("API_USAGE_FILE").unwrap_or(defaults.usage_file),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from(pairs: &[(&str, &str)]) -> Settings {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|k| vars.get(k).cloned())
    }

    #[test]
    fn test_defaults() {
        assert_eq!(from(&[]), Settings::default());
    }

    #[test]
    fn test_overrides() {
        let s = from(&[
            ("COHERE_API_KEY", " abc "),
            ("FORCE_AI_ANALYSIS", "TRUE"),
            ("AI_DAILY_CALL_LIMIT", "5"),
            ("AI_CALL_DELAY_MS", "250"),
        ]);
        assert_eq!(s.api_key.as_deref(), Some("abc"));
        assert!(s.force);
        assert_eq!(s.daily_limit, 5);
        assert_eq!(s.call_delay, Duration::from_millis(250));
    }

    #[test]
    fn test_blank_key_is_absent_and_bad_numbers_ignored() {
        let s = from(&[("COHERE_API_KEY", "   "), ("AI_DAILY_CALL_LIMIT", "lots")]);
        assert_eq!(s.api_key, None);
        assert_eq!(s.daily_limit, DEFAULT_DAILY_LIMIT);
    }
}
