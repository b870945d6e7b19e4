//! File import for vocabulary lists (JSON, CSV and spreadsheets)
//!
//! Every format is turned into raw records keyed by the file's own field or
//! header names; the normalizer's alias table decides what they mean.

use calamine::{open_workbook_auto, Data, Reader};
use csv::{ReaderBuilder, Trim};
use serde_json::{Map, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::error::{Result, WordNoteError};
use crate::ports::WordSource;
use crate::words::Field;

/// Days between the spreadsheet epoch (1899-12-30) and the Unix epoch.
const SPREADSHEET_EPOCH_OFFSET_DAYS: f64 = 25_569.0;
const MILLIS_PER_DAY: f64 = 86_400_000.0;

/// Parse a JSON export: an array of records, or an object whose values are records.
pub fn parse_json_records(text: &str) -> Result<Vec<Value>> {
    match serde_json::from_str::<Value>(text)? {
        Value::Array(items) => Ok(items),
        Value::Object(map) => Ok(map.into_iter().map(|(_, v)| v).collect()),
        _ => Err(WordNoteError::InvalidImport("expected a JSON array or object".to_string())),
    }
}

/// Require a word column and a translation column among the headers.
fn check_headers(headers: &[String]) -> Result<()> {
    if !headers.iter().any(|h| Field::Word.matches_key(h)) {
        return Err(WordNoteError::MissingColumns("word"));
    }
    if !headers.iter().any(|h| Field::Translation.matches_key(h)) {
        return Err(WordNoteError::MissingColumns("translation"));
    }
    Ok(())
}

/// Map header names onto the canonical alias spelling so the normalizer finds them.
fn header_key(header: &str) -> String {
    let trimmed = header.trim();
    [Field::Id, Field::Word, Field::Translation, Field::Category, Field::CreatedAt]
        .iter()
        .flat_map(|field| field.aliases().iter())
        .find(|alias| alias.eq_ignore_ascii_case(trimmed))
        .map(|alias| alias.to_string())
        .unwrap_or_else(|| trimmed.to_string())
}

fn row_to_record(headers: &[String], cells: impl Iterator<Item = Value>) -> Option<Value> {
    let record: Map<String, Value> = headers
        .iter()
        .zip(cells)
        .filter(|(h, v)| !h.is_empty() && !v.is_null())
        .map(|(h, v)| (h.clone(), v))
        .collect();
    (!record.is_empty()).then_some(Value::Object(record))
}

/// Parse CSV text with a header row.
pub fn parse_csv_str(text: &str) -> Result<Vec<Value>> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_reader(text.as_bytes());
    read_csv(reader)
}

fn read_csv<R: std::io::Read>(mut reader: csv::Reader<R>) -> Result<Vec<Value>> {
    let headers: Vec<String> = reader.headers()?.iter().map(header_key).collect();
    check_headers(&headers)?;

    let mut records = Vec::new();
    for row in reader.records() {
        let row = row?;
        let cells = row.iter().map(|cell| {
            if cell.is_empty() {
                Value::Null
            } else {
                Value::String(cell.to_string())
            }
        });
        records.extend(row_to_record(&headers, cells));
    }
    Ok(records)
}

pub fn parse_csv_file(path: &Path) -> Result<Vec<Value>> {
    let reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(Trim::All)
        .from_path(path)?;
    read_csv(reader)
}

/// Spreadsheet serial date (days since 1899-12-30, fraction = time of day) to epoch milliseconds.
fn serial_to_millis(serial: f64) -> i64 {
    ((serial - SPREADSHEET_EPOCH_OFFSET_DAYS) * MILLIS_PER_DAY).round() as i64
}

/// Convert a spreadsheet cell to a JSON value; dates become epoch milliseconds.
fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::String(s) => {
            let s = s.trim();
            if s.is_empty() {
                Value::Null
            } else {
                Value::String(s.to_string())
            }
        }
        Data::Int(i) => Value::from(*i),
        Data::Float(f) => serde_json::Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(dt) => Value::from(serial_to_millis(dt.as_f64())),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Value::String(s.clone()),
        Data::Error(_) | Data::Empty => Value::Null,
    }
}

fn cell_header(cell: &Data) -> String {
    match cell_value(cell) {
        Value::String(s) => header_key(&s),
        Value::Null => String::new(),
        other => header_key(&other.to_string()),
    }
}

/// Read the first sheet of a workbook (xlsx, xls, ods).
pub fn parse_spreadsheet(path: &Path) -> Result<Vec<Value>> {
    let mut workbook = open_workbook_auto(path)?;
    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| WordNoteError::InvalidImport("no sheets found in workbook".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;

    let mut rows = range.rows();
    let header_row = rows
        .next()
        .ok_or_else(|| WordNoteError::InvalidImport("empty sheet - no header row".to_string()))?;
    let headers: Vec<String> = header_row.iter().map(cell_header).collect();
    check_headers(&headers)?;

    Ok(rows
        .filter_map(|row| row_to_record(&headers, row.iter().map(cell_value)))
        .collect())
}

/// Word source reading an exported or hand-made vocabulary file.
#[derive(Debug, Clone)]
pub struct FileWordSource {
    path: PathBuf,
}

impl FileWordSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl WordSource for FileWordSource {
    fn load_words(&self) -> Result<Vec<Value>> {
        let extension = self
            .path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        let records = match extension.as_str() {
            "json" => parse_json_records(&fs::read_to_string(&self.path)?)?,
            "csv" => parse_csv_file(&self.path)?,
            "xlsx" | "xls" | "xlsm" | "ods" => parse_spreadsheet(&self.path)?,
            _ => return Err(WordNoteError::UnsupportedFormat(extension)),
        };
        info!(path = %self.path.display(), records = records.len(), "read vocabulary file");
        Ok(records)
    }
}
