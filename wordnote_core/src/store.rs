//! Key-value blob storage for the vocabulary list and preferences
//!
//! Mirrors the extension's storage area: each key holds one JSON value.

use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;
use tracing::{debug, warn};

use crate::config::QuizConfig;
use crate::error::Result;
use crate::ports::WordSource;

pub struct KvStore {
    conn: Connection,
}

impl KvStore {
    /// Open (or create) a store backed by the SQLite file at `path`.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::init(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            )",
            [],
        )?;
        Ok(Self { conn })
    }

    pub fn get(&self, key: &str) -> Result<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| row.get(0))
            .optional()?;
        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    pub fn set(&self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv (key, value) VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value",
            params![key, text],
        )?;
        Ok(())
    }

    /// Returns true when a value was removed.
    pub fn remove(&self, key: &str) -> Result<bool> {
        let deleted = self.conn.execute("DELETE FROM kv WHERE key = ?1", params![key])?;
        Ok(deleted > 0)
    }

    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<rusqlite::Result<Vec<String>>>()?;
        Ok(keys)
    }
}

/// Extract record list from one stored value.
///
/// Arrays are records as-is, objects contribute their values. Strings are
/// treated as serialized JSON from the old string-blob storage and parsed once.
fn records_from_value(key: &str, value: Value, allow_string: bool) -> Option<Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(map) => Some(map.into_iter().map(|(_, v)| v).collect()),
        Value::String(text) if allow_string => match serde_json::from_str(&text) {
            Ok(inner) => records_from_value(key, inner, false),
            Err(e) => {
                warn!(key, error = %e, "stored word list is not valid JSON");
                None
            }
        },
        _ => None,
    }
}

/// Reads the word list from the first storage key holding a usable value.
pub struct StorageWordSource<'a> {
    store: &'a KvStore,
    keys: Vec<String>,
}

impl<'a> StorageWordSource<'a> {
    pub fn new(store: &'a KvStore, config: &QuizConfig) -> Self {
        Self {
            store,
            keys: config.storage_keys.clone(),
        }
    }
}

impl WordSource for StorageWordSource<'_> {
    fn load_words(&self) -> Result<Vec<Value>> {
        for key in &self.keys {
            let Some(value) = self.store.get(key)? else {
                continue;
            };
            if value.is_null() {
                continue;
            }
            match records_from_value(key, value, true) {
                Some(records) => {
                    debug!(key = key.as_str(), records = records.len(), "loaded word list");
                    return Ok(records);
                }
                None => warn!(key = key.as_str(), "skipping unusable word list value"),
            }
        }
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn set_get_remove() {
        let store = KvStore::open_in_memory().unwrap();
        assert_eq!(store.get("prefs").unwrap(), None);

        store.set("prefs", &json!({"sortMode": "time_asc"})).unwrap();
        store.set("prefs", &json!({"sortMode": "text_asc"})).unwrap();
        assert_eq!(store.get("prefs").unwrap(), Some(json!({"sortMode": "text_asc"})));
        assert_eq!(store.keys().unwrap(), vec!["prefs".to_string()]);

        assert!(store.remove("prefs").unwrap());
        assert!(!store.remove("prefs").unwrap());
    }

    #[test]
    fn first_usable_key_wins() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("words", &json!([{"word": "late", "vi": "muộn"}])).unwrap();
        store.set("WordNote", &json!([{"word": "older", "vi": "cũ"}])).unwrap();

        let source = StorageWordSource::new(&store, &QuizConfig::default());
        let records = source.load_words().unwrap();
        assert_eq!(records, vec![json!({"word": "late", "vi": "muộn"})]);
    }

    #[test]
    fn object_values_become_records() {
        let store = KvStore::open_in_memory().unwrap();
        store
            .set("wn-words", &json!({"a": {"text": "one", "vi": "một"}, "b": {"text": "two", "vi": "hai"}}))
            .unwrap();
        let records = StorageWordSource::new(&store, &QuizConfig::default()).load_words().unwrap();
        assert_eq!(records.len(), 2);
    }

    #[test]
    fn string_blob_is_parsed() {
        let store = KvStore::open_in_memory().unwrap();
        store
            .set("wordNote", &json!(r#"[{"en": "blob", "meaning": "khối"}]"#))
            .unwrap();
        let records = StorageWordSource::new(&store, &QuizConfig::default()).load_words().unwrap();
        assert_eq!(records, vec![json!({"en": "blob", "meaning": "khối"})]);
    }

    #[test]
    fn unusable_values_fall_through() {
        let store = KvStore::open_in_memory().unwrap();
        store.set("vocab_items", &json!(42)).unwrap();
        store.set("words", &json!("not json")).unwrap();
        store.set("wn-words", &json!([{"word": "kept", "vi": "giữ"}])).unwrap();
        let records = StorageWordSource::new(&store, &QuizConfig::default()).load_words().unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn no_candidates_is_empty() {
        let store = KvStore::open_in_memory().unwrap();
        let records = StorageWordSource::new(&store, &QuizConfig::default()).load_words().unwrap();
        assert!(records.is_empty());
    }
}
