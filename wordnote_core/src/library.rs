//! Saved vocabulary list: capture, search, import/export and preferences
//!
//! `StoredItem` is the shape the capture bubble and the board page persist
//! under `vocab_items`. The quiz reads the same list through the normalizer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use tracing::info;

use crate::config::DEFAULT_CATEGORY;
use crate::error::{Result, WordNoteError};
use crate::store::KvStore;
use crate::words::{coerce_timestamp, now_millis};

pub const ITEMS_KEY: &str = "vocab_items";
pub const PREFS_KEY: &str = "prefs";
pub const MANUAL_URL: &str = "manual";

/// Word categories offered by the capture bubble and the board.
pub const CATEGORIES: [&str; 6] = ["noun", "verb", "adj", "adv", "phrase", "other"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredItem {
    pub text: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub vi: String,
    #[serde(default = "default_category")]
    pub cat: String,
    #[serde(default = "default_url")]
    pub url: String,
    /// Epoch milliseconds
    #[serde(default)]
    pub time: i64,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Map a captured category onto [`CATEGORIES`]; unknown names become "other", blank stays unset.
fn capture_category(cat: &str) -> Option<&'static str> {
    let cat = cat.trim();
    if cat.is_empty() {
        return None;
    }
    Some(
        CATEGORIES
            .iter()
            .find(|known| known.eq_ignore_ascii_case(cat))
            .copied()
            .unwrap_or(DEFAULT_CATEGORY),
    )
}

fn default_url() -> String {
    MANUAL_URL.to_string()
}

fn text_of(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Validate one imported item. Items without text are rejected.
pub fn normalize_item(raw: &Value, now_ms: i64) -> Option<StoredItem> {
    let obj = raw.as_object()?;
    let text = text_of(obj.get("text")).filter(|t| !t.is_empty())?;
    Some(StoredItem {
        text,
        vi: text_of(obj.get("vi")).unwrap_or_default(),
        cat: text_of(obj.get("cat")).filter(|c| !c.is_empty()).unwrap_or_else(default_category),
        url: text_of(obj.get("url")).filter(|u| !u.is_empty()).unwrap_or_else(default_url),
        time: obj.get("time").and_then(coerce_timestamp).unwrap_or(now_ms),
    })
}

fn sort_newest_first(items: &mut [StoredItem]) {
    items.sort_by(|a, b| b.time.cmp(&a.time));
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    Added,
    Updated,
    Unchanged,
    /// Empty selection text; nothing stored.
    Ignored,
}

/// Save a captured word.
///
/// An item with the same text (ignoring case) captured on the same page is
/// updated in place: a non-empty note replaces the old one and the
/// category is overwritten. New words go to the front of the list. Categories
/// outside [`CATEGORIES`] are stored as "other".
pub fn add_entry(items: &mut Vec<StoredItem>, text: &str, vi: &str, cat: &str, url: &str, now_ms: i64) -> AddOutcome {
    let text = text.trim();
    if text.is_empty() {
        return AddOutcome::Ignored;
    }
    let vi = vi.trim();
    let cat = capture_category(cat);

    let existing = items
        .iter_mut()
        .find(|it| it.text.to_lowercase() == text.to_lowercase() && it.url == url);

    match existing {
        Some(item) => {
            let mut changed = false;
            if !vi.is_empty() && item.vi != vi {
                item.vi = vi.to_string();
                changed = true;
            }
            if let Some(cat) = cat.filter(|cat| item.cat != *cat) {
                item.cat = cat.to_string();
                changed = true;
            }
            if changed {
                AddOutcome::Updated
            } else {
                AddOutcome::Unchanged
            }
        }
        None => {
            items.insert(
                0,
                StoredItem {
                    text: text.to_string(),
                    vi: vi.to_string(),
                    cat: cat.unwrap_or(DEFAULT_CATEGORY).to_string(),
                    url: url.to_string(),
                    time: now_ms,
                },
            );
            AddOutcome::Added
        }
    }
}

/// Look up a saved note for `text`, preferring one captured on `url`.
pub fn find_note<'a>(items: &'a [StoredItem], text: &str, url: &str) -> Option<&'a StoredItem> {
    let needle = text.trim().to_lowercase();
    let annotated = |it: &&StoredItem| it.text.to_lowercase() == needle && (!it.vi.is_empty() || !it.cat.is_empty());
    items
        .iter()
        .filter(annotated)
        .find(|it| it.url == url)
        .or_else(|| items.iter().find(annotated))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub items: Vec<StoredItem>,
    pub added: usize,
    pub replaced: usize,
}

/// Import mode "replace": the incoming list overwrites everything.
pub fn replace_all(incoming: &[Value], now_ms: i64) -> MergeOutcome {
    let mut items: Vec<StoredItem> = incoming.iter().filter_map(|raw| normalize_item(raw, now_ms)).collect();
    sort_newest_first(&mut items);
    MergeOutcome {
        added: items.len(),
        replaced: 0,
        items,
    }
}

fn merge_key(item: &StoredItem) -> String {
    format!("{}|{}", item.text, item.vi).to_lowercase().trim().to_string()
}

/// Import mode "merge": items are matched on text and note, ignoring case.
///
/// Matches keep the newer timestamp and take the incoming category and
/// source url unless those are the defaults.
pub fn merge_unique(current: Vec<StoredItem>, incoming: &[Value], now_ms: i64) -> MergeOutcome {
    let mut order: Vec<String> = Vec::with_capacity(current.len());
    let mut by_key: HashMap<String, StoredItem> = HashMap::with_capacity(current.len());
    for item in current {
        let key = merge_key(&item);
        if !by_key.contains_key(&key) {
            order.push(key.clone());
        }
        by_key.insert(key, item);
    }

    let mut added = 0;
    let mut replaced = 0;
    for item in incoming.iter().filter_map(|raw| normalize_item(raw, now_ms)) {
        let key = merge_key(&item);
        match by_key.get_mut(&key) {
            Some(cur) => {
                cur.time = cur.time.max(item.time);
                if item.cat != DEFAULT_CATEGORY {
                    cur.cat = item.cat;
                }
                if item.url != MANUAL_URL {
                    cur.url = item.url;
                }
                replaced += 1;
            }
            None => {
                order.push(key.clone());
                by_key.insert(key, item);
                added += 1;
            }
        }
    }

    let mut items: Vec<StoredItem> = order.iter().filter_map(|k| by_key.remove(k)).collect();
    sort_newest_first(&mut items);
    MergeOutcome { items, added, replaced }
}

/// Parse an import file body; only a JSON array is accepted.
pub fn parse_import(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        _ => Err(WordNoteError::InvalidImport("expected a JSON array of items".to_string())),
    }
}

pub fn export_json(items: &[StoredItem]) -> Result<String> {
    Ok(serde_json::to_string_pretty(items)?)
}

/// Export file name stamped with the UTC time, e.g. `word-note-2024-03-05-14-07-09.json`.
pub fn export_file_name(now: DateTime<Utc>) -> String {
    format!("word-note-{}.json", now.format("%Y-%m-%d-%H-%M-%S"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    TimeDesc,
    TimeAsc,
    TextAsc,
    TextDesc,
}

impl SortMode {
    pub fn as_str(self) -> &'static str {
        match self {
            SortMode::TimeDesc => "time_desc",
            SortMode::TimeAsc => "time_asc",
            SortMode::TextAsc => "text_asc",
            SortMode::TextDesc => "text_desc",
        }
    }
}

impl fmt::Display for SortMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortMode {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "time_desc" => Ok(SortMode::TimeDesc),
            "time_asc" => Ok(SortMode::TimeAsc),
            "text_asc" => Ok(SortMode::TextAsc),
            "text_desc" => Ok(SortMode::TextDesc),
            other => Err(format!("unknown sort mode '{}'", other)),
        }
    }
}

/// Board list preferences, persisted under `prefs`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoardPrefs {
    pub filter_cat: String,
    pub sort_mode: SortMode,
}

impl Default for BoardPrefs {
    fn default() -> Self {
        Self {
            filter_cat: "all".to_string(),
            sort_mode: SortMode::default(),
        }
    }
}

/// Search, category filter and ordering applied to the board list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardQuery {
    pub term: String,
    pub category: Option<String>,
    pub sort: SortMode,
}

impl BoardQuery {
    pub fn from_prefs(term: &str, prefs: &BoardPrefs) -> Self {
        let category = match prefs.filter_cat.as_str() {
            "" | "all" => None,
            cat => Some(cat.to_string()),
        };
        Self {
            term: term.to_string(),
            category,
            sort: prefs.sort_mode,
        }
    }

    pub fn apply<'a>(&self, items: &'a [StoredItem]) -> Vec<&'a StoredItem> {
        let term = self.term.trim().to_lowercase();
        let mut matched: Vec<&StoredItem> = items
            .iter()
            .filter(|it| term.is_empty() || it.text.to_lowercase().contains(&term) || it.vi.to_lowercase().contains(&term))
            .filter(|it| match &self.category {
                Some(cat) => it.cat == *cat,
                None => true,
            })
            .collect();

        let by_text = |a: &&StoredItem, b: &&StoredItem| -> Ordering { a.text.to_lowercase().cmp(&b.text.to_lowercase()) };
        match self.sort {
            SortMode::TimeDesc => matched.sort_by(|a, b| b.time.cmp(&a.time)),
            SortMode::TimeAsc => matched.sort_by(|a, b| a.time.cmp(&b.time)),
            SortMode::TextAsc => matched.sort_by(by_text),
            SortMode::TextDesc => matched.sort_by(|a, b| by_text(b, a)),
        }
        matched
    }
}

/// The saved word list and board preferences inside a `KvStore`.
pub struct Library<'a> {
    store: &'a KvStore,
}

impl<'a> Library<'a> {
    pub fn new(store: &'a KvStore) -> Self {
        Self { store }
    }

    /// Saved items; entries that fail validation are skipped.
    pub fn items(&self) -> Result<Vec<StoredItem>> {
        let now = now_millis();
        match self.store.get(ITEMS_KEY)? {
            Some(Value::Array(raw)) => Ok(raw.iter().filter_map(|v| normalize_item(v, now)).collect()),
            _ => Ok(Vec::new()),
        }
    }

    pub fn save_items(&self, items: &[StoredItem]) -> Result<()> {
        self.store.set(ITEMS_KEY, &serde_json::to_value(items)?)
    }

    pub fn add(&self, text: &str, vi: &str, cat: &str, url: &str) -> Result<AddOutcome> {
        let mut items = self.items()?;
        let outcome = add_entry(&mut items, text, vi, cat, url, now_millis());
        if matches!(outcome, AddOutcome::Added | AddOutcome::Updated) {
            self.save_items(&items)?;
        }
        Ok(outcome)
    }

    /// Import a JSON array, either replacing or merging with the saved list.
    pub fn import(&self, text: &str, replace: bool) -> Result<MergeOutcome> {
        let incoming = parse_import(text)?;
        let now = now_millis();
        let outcome = if replace {
            replace_all(&incoming, now)
        } else {
            merge_unique(self.items()?, &incoming, now)
        };
        self.save_items(&outcome.items)?;
        info!(added = outcome.added, replaced = outcome.replaced, replace, "imported vocabulary");
        Ok(outcome)
    }

    pub fn export(&self) -> Result<String> {
        export_json(&self.items()?)
    }

    pub fn prefs(&self) -> Result<BoardPrefs> {
        match self.store.get(PREFS_KEY)? {
            Some(value) => Ok(serde_json::from_value(value).unwrap_or_default()),
            None => Ok(BoardPrefs::default()),
        }
    }

    pub fn save_prefs(&self, prefs: &BoardPrefs) -> Result<()> {
        self.store.set(PREFS_KEY, &serde_json::to_value(prefs)?)
    }
}
