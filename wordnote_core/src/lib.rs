//! Word Note Core - vocabulary capture and multiple-choice quiz engine
//!
//! Normalizes vocabulary saved under several legacy layouts, filters it by
//! month, builds shuffled multiple-choice questions and runs quiz sessions.
//! Also manages the saved word list (capture, import/export, board view).

pub mod config;
pub mod controller;
pub mod error;
pub mod import;
pub mod library;
pub mod logging;
pub mod pool;
pub mod ports;
pub mod questions;
pub mod session;
pub mod store;
pub mod words;

#[cfg(feature = "python")]
mod python;

#[cfg(feature = "python")]
use pyo3::prelude::*;

pub use config::QuizConfig;
pub use controller::QuizController;
pub use error::{Result, WordNoteError};
pub use import::{parse_csv_str, parse_json_records, FileWordSource};
pub use library::{AddOutcome, BoardPrefs, BoardQuery, Library, MergeOutcome, SortMode, StoredItem};
pub use logging::init_tracing;
pub use pool::{filter_pool, month_choices, MonthKey, MonthSelection};
pub use ports::{Renderer, WordSource};
pub use questions::{build_questions, QuizQuestion};
pub use session::{QuizResult, QuizSession, SessionSnapshot, SessionState};
pub use store::{KvStore, StorageWordSource};
pub use words::{normalize_words, normalize_words_with, VocabWord, WordId};

/// Word Note Python Module
#[cfg(feature = "python")]
#[pymodule]
fn wordnote_core(m: &Bound<'_, PyModule>) -> PyResult<()> {
    // Word list helpers
    m.add_function(wrap_pyfunction!(python::py_normalize_json, m)?)?;
    m.add_function(wrap_pyfunction!(python::py_month_choices_json, m)?)?;

    // Logging
    m.add_function(wrap_pyfunction!(python::py_init_tracing, m)?)?;

    // Register classes
    m.add_class::<python::PyQuiz>()?;
    m.add_class::<QuizQuestion>()?;
    m.add_class::<SessionSnapshot>()?;
    m.add_class::<QuizResult>()?;

    Ok(())
}
