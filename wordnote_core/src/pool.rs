//! Month-based pool selection

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, Local, TimeZone};
use serde::{Deserialize, Serialize};

use crate::words::VocabWord;

pub const ALL_MONTHS: &str = "all";

/// A calendar month, rendered as `YYYY-MM`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    /// 1-12
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Option<Self> {
        (1..=12).contains(&month).then_some(Self { year, month })
    }

    /// The month containing `millis` in the given timezone.
    pub fn of_millis_in<Tz: TimeZone>(millis: i64, tz: &Tz) -> Option<Self> {
        let dt = tz.timestamp_millis_opt(millis).earliest()?;
        Some(Self {
            year: dt.year(),
            month: dt.month(),
        })
    }

    /// Display form used by the month selector, e.g. `03/2024`.
    pub fn label(&self) -> String {
        format!("{:02}/{}", self.month, self.year)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .trim()
            .split_once('-')
            .ok_or_else(|| format!("expected YYYY-MM, got '{}'", s))?;
        let year: i32 = year.parse().map_err(|_| format!("invalid year in '{}'", s))?;
        let month: u32 = month.parse().map_err(|_| format!("invalid month in '{}'", s))?;
        MonthKey::new(year, month).ok_or_else(|| format!("month out of range in '{}'", s))
    }
}

/// Pool selector: every word, or the words created in one month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum MonthSelection {
    #[default]
    All,
    Month(MonthKey),
}

impl MonthSelection {
    /// Parse a selector value; empty input and anything unparseable select all words.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(MonthSelection::All)
    }
}

impl fmt::Display for MonthSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MonthSelection::All => f.write_str(ALL_MONTHS),
            MonthSelection::Month(key) => write!(f, "{}", key),
        }
    }
}

impl FromStr for MonthSelection {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case(ALL_MONTHS) {
            return Ok(MonthSelection::All);
        }
        s.parse().map(MonthSelection::Month)
    }
}

impl Serialize for MonthSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Words created in the selected month, in local time.
pub fn filter_pool(words: &[VocabWord], selection: MonthSelection) -> Vec<VocabWord> {
    filter_pool_in(words, selection, &Local)
}

pub fn filter_pool_in<Tz: TimeZone>(words: &[VocabWord], selection: MonthSelection, tz: &Tz) -> Vec<VocabWord> {
    match selection {
        MonthSelection::All => words.to_vec(),
        MonthSelection::Month(key) => words
            .iter()
            .filter(|w| MonthKey::of_millis_in(w.created_at, tz) == Some(key))
            .cloned()
            .collect(),
    }
}

/// Selector choices: `all` first, then each distinct month, most recent first.
pub fn month_choices(words: &[VocabWord]) -> Vec<MonthSelection> {
    month_choices_in(words, &Local)
}

pub fn month_choices_in<Tz: TimeZone>(words: &[VocabWord], tz: &Tz) -> Vec<MonthSelection> {
    let months: BTreeSet<MonthKey> = words
        .iter()
        .filter_map(|w| MonthKey::of_millis_in(w.created_at, tz))
        .collect();

    std::iter::once(MonthSelection::All)
        .chain(months.into_iter().rev().map(MonthSelection::Month))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::words::WordId;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn word(id: i64, created_at: i64) -> VocabWord {
        VocabWord {
            id: WordId::Num(id),
            word: format!("w{}", id),
            translation: format!("t{}", id),
            category: "other".to_string(),
            created_at,
        }
    }

    fn millis(y: i32, m: u32, d: u32) -> i64 {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap().timestamp_millis()
    }

    #[test]
    fn month_key_format_and_parse() {
        let key = MonthKey::new(2024, 3).unwrap();
        assert_eq!(key.to_string(), "2024-03");
        assert_eq!(key.label(), "03/2024");
        assert_eq!("2024-03".parse::<MonthKey>().unwrap(), key);
        assert!("2024-13".parse::<MonthKey>().is_err());
        assert!("March".parse::<MonthKey>().is_err());
    }

    #[test]
    fn selection_parse() {
        assert_eq!("all".parse::<MonthSelection>().unwrap(), MonthSelection::All);
        assert_eq!("".parse::<MonthSelection>().unwrap(), MonthSelection::All);
        assert_eq!(
            "2023-11".parse::<MonthSelection>().unwrap(),
            MonthSelection::Month(MonthKey::new(2023, 11).unwrap())
        );
        assert_eq!(MonthSelection::parse_lenient("garbage"), MonthSelection::All);
    }

    #[test]
    fn filter_by_month() {
        let words = vec![
            word(1, millis(2024, 3, 15)),
            word(2, millis(2024, 4, 2)),
            word(3, millis(2024, 3, 28)),
        ];
        let march = MonthSelection::Month(MonthKey::new(2024, 3).unwrap());
        let pool = filter_pool_in(&words, march, &Utc);
        let ids: Vec<_> = pool.iter().map(|w| w.id.clone()).collect();
        assert_eq!(ids, vec![WordId::Num(1), WordId::Num(3)]);

        assert_eq!(filter_pool_in(&words, MonthSelection::All, &Utc).len(), 3);

        let empty = MonthSelection::Month(MonthKey::new(2020, 1).unwrap());
        assert!(filter_pool_in(&words, empty, &Utc).is_empty());
    }

    #[test]
    fn choices_are_distinct_and_descending() {
        let words = vec![
            word(1, millis(2023, 12, 10)),
            word(2, millis(2024, 2, 10)),
            word(3, millis(2024, 2, 20)),
            word(4, millis(2024, 1, 5)),
        ];
        let labels: Vec<String> = month_choices_in(&words, &Utc).iter().map(|s| s.to_string()).collect();
        assert_eq!(labels, vec!["all", "2024-02", "2024-01", "2023-12"]);
    }

    #[test]
    fn choices_for_empty_list() {
        assert_eq!(month_choices(&[]), vec![MonthSelection::All]);
    }

    #[test]
    fn selection_serde_uses_keys() {
        let sel = MonthSelection::Month(MonthKey::new(2024, 5).unwrap());
        assert_eq!(serde_json::to_string(&sel).unwrap(), "\"2024-05\"");
        let back: MonthSelection = serde_json::from_str("\"all\"").unwrap();
        assert_eq!(back, MonthSelection::All);
    }
}
