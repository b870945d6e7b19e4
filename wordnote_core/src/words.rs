//! Vocabulary entries and normalization of raw stored records
//!
//! Records written by different releases of the extension name the same
//! fields differently. Each canonical field has an ordered alias list; the
//! first alias present with a non-null value wins.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::debug;

use crate::config::DEFAULT_CATEGORY;

/// Identifier of a word, unique within one loaded word set.
///
/// Numeric and textual ids never compare equal, so `1` and `"1"` are distinct.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WordId {
    Num(i64),
    Text(String),
}

impl fmt::Display for WordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordId::Num(n) => write!(f, "{}", n),
            WordId::Text(s) => f.write_str(s),
        }
    }
}

/// Canonical vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabWord {
    pub id: WordId,
    pub word: String,
    pub translation: String,
    pub category: String,
    /// Epoch milliseconds
    pub created_at: i64,
}

/// Canonical fields resolved from a raw record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    Id,
    Word,
    Translation,
    Category,
    CreatedAt,
}

/// Field -> alias keys, in resolution order.
pub const FIELD_ALIASES: [(Field, &[&str]); 5] = [
    (Field::Id, &["id", "wordId", "_id"]),
    (Field::Word, &["word", "en", "text"]),
    (Field::Translation, &["vi", "vn", "meaning", "description", "desc"]),
    (Field::Category, &["cat", "category", "type"]),
    (Field::CreatedAt, &["createdAt", "time", "timestamp", "created"]),
];

impl Field {
    pub fn aliases(self) -> &'static [&'static str] {
        FIELD_ALIASES
            .iter()
            .find(|(field, _)| *field == self)
            .map(|(_, aliases)| *aliases)
            .unwrap_or(&[])
    }

    /// Whether `key` names this field, ignoring ASCII case. Used for file headers.
    pub fn matches_key(self, key: &str) -> bool {
        let key = key.trim();
        self.aliases().iter().any(|alias| alias.eq_ignore_ascii_case(key))
    }
}

fn resolve(record: &Map<String, Value>, field: Field) -> Option<&Value> {
    field
        .aliases()
        .iter()
        .filter_map(|alias| record.get(*alias))
        .find(|value| !value.is_null())
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        _ => String::new(),
    }
}

/// Numeric coercion for timestamps; zero and non-numeric values count as missing.
pub(crate) fn coerce_timestamp(value: &Value) -> Option<i64> {
    let millis = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !millis.is_finite() || millis == 0.0 {
        return None;
    }
    Some(millis as i64)
}

fn coerce_id(value: &Value) -> Option<WordId> {
    match value {
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Some(WordId::Num(i))
            } else {
                match n.as_f64() {
                    Some(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => Some(WordId::Num(f as i64)),
                    _ => Some(WordId::Text(n.to_string())),
                }
            }
        }
        Value::String(s) => Some(WordId::Text(s.clone())),
        Value::Bool(b) => Some(WordId::Text(b.to_string())),
        _ => None,
    }
}

pub(crate) fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Normalize raw records using the current time for missing timestamps.
pub fn normalize_words(records: &[Value]) -> Vec<VocabWord> {
    normalize_words_with(records, DEFAULT_CATEGORY, now_millis())
}

/// Normalize raw records into vocabulary entries.
///
/// Never fails. Records that are not objects, or whose word or translation
/// is empty after trimming, are dropped. A missing id becomes the record's
/// 1-based position in `records`.
pub fn normalize_words_with(records: &[Value], default_category: &str, now_ms: i64) -> Vec<VocabWord> {
    let words: Vec<VocabWord> = records
        .iter()
        .enumerate()
        .filter_map(|(idx, raw)| normalize_record(raw, idx + 1, default_category, now_ms))
        .collect();

    if words.len() < records.len() {
        debug!(kept = words.len(), dropped = records.len() - words.len(), "normalized word records");
    }
    words
}

fn normalize_record(raw: &Value, position: usize, default_category: &str, now_ms: i64) -> Option<VocabWord> {
    let record = raw.as_object()?;

    let word = resolve(record, Field::Word).map(coerce_text).unwrap_or_default();
    let translation = resolve(record, Field::Translation).map(coerce_text).unwrap_or_default();
    if word.is_empty() || translation.is_empty() {
        return None;
    }

    let id = resolve(record, Field::Id)
        .and_then(coerce_id)
        .unwrap_or(WordId::Num(position as i64));

    let category = resolve(record, Field::Category)
        .map(coerce_text)
        .filter(|c| !c.is_empty())
        .unwrap_or_else(|| default_category.to_string());

    let created_at = resolve(record, Field::CreatedAt)
        .and_then(coerce_timestamp)
        .unwrap_or(now_ms);

    Some(VocabWord {
        id,
        word,
        translation,
        category,
        created_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    const NOW: i64 = 1_700_000_000_000;

    fn normalize(records: Vec<Value>) -> Vec<VocabWord> {
        normalize_words_with(&records, "other", NOW)
    }

    #[test]
    fn canonical_record() {
        let words = normalize(vec![json!({
            "id": 7, "word": "apple", "vi": "quả táo", "cat": "noun", "createdAt": 1_690_000_000_000i64
        })]);
        assert_eq!(
            words,
            vec![VocabWord {
                id: WordId::Num(7),
                word: "apple".to_string(),
                translation: "quả táo".to_string(),
                category: "noun".to_string(),
                created_at: 1_690_000_000_000,
            }]
        );
    }

    #[test]
    fn legacy_aliases_resolve() {
        let words = normalize(vec![
            json!({"_id": "abc", "en": "run", "meaning": "chạy", "type": "verb", "time": "1690000000000"}),
            json!({"text": "quick", "desc": "nhanh", "category": "adj", "timestamp": 1_680_000_000_000i64}),
        ]);
        assert_eq!(words.len(), 2);
        assert_eq!(words[0].id, WordId::Text("abc".to_string()));
        assert_eq!(words[0].word, "run");
        assert_eq!(words[0].translation, "chạy");
        assert_eq!(words[0].category, "verb");
        assert_eq!(words[0].created_at, 1_690_000_000_000);
        assert_eq!(words[1].id, WordId::Num(2));
        assert_eq!(words[1].translation, "nhanh");
    }

    #[test]
    fn first_non_null_alias_wins() {
        let words = normalize(vec![json!({"word": null, "en": "fallback", "vi": "x"})]);
        assert_eq!(words[0].word, "fallback");

        // An empty canonical value still shadows later aliases.
        let words = normalize(vec![json!({"word": "  ", "en": "ignored", "vi": "x"})]);
        assert!(words.is_empty());
    }

    #[test]
    fn drops_empty_word_or_translation() {
        let words = normalize(vec![
            json!({"word": "  ", "vi": "trống"}),
            json!({"word": "ok", "vi": "\t"}),
            json!({"word": "ok"}),
            json!("not an object"),
            json!({"word": "kept", "vi": "giữ"}),
        ]);
        assert_eq!(words.len(), 1);
        assert_eq!(words[0].word, "kept");
        assert_eq!(words[0].id, WordId::Num(5));
        for w in &words {
            assert!(!w.word.trim().is_empty());
            assert!(!w.translation.trim().is_empty());
        }
    }

    #[test]
    fn trims_text() {
        let words = normalize(vec![json!({"word": "  cat ", "vi": " con mèo  "})]);
        assert_eq!(words[0].word, "cat");
        assert_eq!(words[0].translation, "con mèo");
    }

    #[test]
    fn invalid_timestamp_defaults_to_now() {
        let words = normalize(vec![
            json!({"word": "a", "vi": "1", "createdAt": "yesterday"}),
            json!({"word": "b", "vi": "2", "createdAt": 0}),
            json!({"word": "c", "vi": "3"}),
            json!({"word": "d", "vi": "4", "createdAt": {"nested": true}}),
        ]);
        assert!(words.iter().all(|w| w.created_at == NOW));
    }

    #[test]
    fn missing_or_blank_category_uses_default() {
        let words = normalize_words_with(
            &[json!({"word": "a", "vi": "1"}), json!({"word": "b", "vi": "2", "cat": ""})],
            "misc",
            NOW,
        );
        assert_eq!(words[0].category, "misc");
        assert_eq!(words[1].category, "misc");
    }

    #[test]
    fn numeric_values_coerce_to_text() {
        let words = normalize(vec![json!({"word": 42, "vi": "bốn mươi hai"})]);
        assert_eq!(words[0].word, "42");
    }

    #[test]
    fn numeric_and_text_ids_differ() {
        assert_ne!(WordId::Num(1), WordId::Text("1".to_string()));
        assert_eq!(WordId::Num(1).to_string(), "1");
    }

    #[test]
    fn header_matching_ignores_case() {
        assert!(Field::Word.matches_key(" Word "));
        assert!(Field::Translation.matches_key("MEANING"));
        assert!(!Field::Translation.matches_key("notes"));
    }
}
