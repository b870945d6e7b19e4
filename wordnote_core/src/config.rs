//! Quiz and storage settings

use serde::{Deserialize, Serialize};

use crate::error::{Result, WordNoteError};
use crate::logging;
use crate::questions::MAX_DISTRACTORS;

/// Storage keys used by past releases of the extension, newest first.
pub const LEGACY_STORAGE_KEYS: [&str; 5] = ["vocab_items", "words", "wn-words", "wordNote", "WordNote"];

pub const DEFAULT_CATEGORY: &str = "other";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// Distractors per question, at most [`MAX_DISTRACTORS`]; options never
    /// exceed `distractor_count + 1`.
    pub distractor_count: usize,
    /// Keys tried in order when reading the word list from the store.
    pub storage_keys: Vec<String>,
    pub default_category: String,
    /// Fallback filter for [`QuizConfig::init_tracing`] when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            distractor_count: 3,
            storage_keys: LEGACY_STORAGE_KEYS.iter().map(|k| k.to_string()).collect(),
            default_category: DEFAULT_CATEGORY.to_string(),
            log_level: "info".to_string(),
        }
    }
}

impl QuizConfig {
    pub fn from_json_str(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.distractor_count > MAX_DISTRACTORS {
            return Err(WordNoteError::InvalidConfig {
                key: "distractor_count".to_string(),
                value: self.distractor_count.to_string(),
            });
        }
        Ok(())
    }

    /// Install the global subscriber filtered at `log_level`.
    pub fn init_tracing(&self) -> bool {
        logging::init_tracing(&self.log_level)
    }

    /// Load overrides from `WORDNOTE_*` environment variables on top of the defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(raw) = lookup("WORDNOTE_DISTRACTORS") {
            config.distractor_count = raw
                .trim()
                .parse::<usize>()
                .ok()
                .filter(|count| *count <= MAX_DISTRACTORS)
                .ok_or_else(|| WordNoteError::InvalidConfig {
                    key: "WORDNOTE_DISTRACTORS".to_string(),
                    value: raw.clone(),
                })?;
        }

        if let Some(raw) = lookup("WORDNOTE_STORAGE_KEYS") {
            let keys: Vec<String> = raw
                .split(',')
                .map(|k| k.trim())
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect();
            if keys.is_empty() {
                return Err(WordNoteError::InvalidConfig {
                    key: "WORDNOTE_STORAGE_KEYS".to_string(),
                    value: raw,
                });
            }
            config.storage_keys = keys;
        }

        if let Some(raw) = lookup("WORDNOTE_DEFAULT_CATEGORY") {
            let category = raw.trim();
            if !category.is_empty() {
                config.default_category = category.to_string();
            }
        }

        if let Some(raw) = lookup("WORDNOTE_LOG") {
            let level = raw.trim();
            if !level.is_empty() {
                config.log_level = level.to_string();
            }
        }

        Ok(config)
    }
}
