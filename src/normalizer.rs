//! Cleanup of free-text transaction details.

use regex::Regex;

use crate::config::{NormalizerConfig, compile_patterns};
use crate::errors::ConfigError;

/// Strips MT940 in-line tags from descriptions and pulls counterparty names
/// out of detail text.
#[derive(Debug, Clone)]
pub struct TextNormalizer {
    tag_prefixes: Vec<String>,
    counterparty_patterns: Vec<Regex>,
    field_separator: char,
    min_segment_len: usize,
}

impl TextNormalizer {
    pub fn new(config: &NormalizerConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            tag_prefixes: config.tag_prefixes.clone(),
            counterparty_patterns: compile_patterns(&config.counterparty_patterns)?,
            field_separator: config.field_separator,
            min_segment_len: config.min_segment_len,
        })
    }

    /// Removes tag prefixes wherever they occur and collapses whitespace.
    pub fn clean(&self, text: &str) -> String {
        let mut cleaned = text.to_string();
        for prefix in &self.tag_prefixes {
            cleaned = cleaned.replace(prefix.as_str(), " ");
        }
        cleaned.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    /// Best-effort counterparty name from detail text, empty if nothing looks
    /// like a name.
    pub fn extract_counterparty(&self, details: &str) -> String {
        if details.trim().is_empty() {
            return String::new();
        }

        for pattern in &self.counterparty_patterns {
            if let Some(name) = pattern.captures(details).and_then(|caps| caps.get(1)) {
                let name = name.as_str().trim();
                if !name.is_empty() {
                    return name.to_string();
                }
            }
        }

        details
            .split(self.field_separator)
            .map(str::trim)
            .find(|part| part.chars().count() > self.min_segment_len && !is_all_uppercase(part))
            .map(str::to_string)
            .unwrap_or_default()
    }
}

// Uppercase-only segments are bank codes, not names. Digits carry no case.
fn is_all_uppercase(s: &str) -> bool {
    let has_cased = s.chars().any(|c| c.is_uppercase() || c.is_lowercase());
    has_cased && !s.chars().any(char::is_lowercase)
}
