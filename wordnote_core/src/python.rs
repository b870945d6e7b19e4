//! Python bindings (feature `python`)

use pyo3::exceptions::{PyRuntimeError, PyValueError};
use pyo3::prelude::*;

use crate::config::QuizConfig;
use crate::controller::QuizController;
use crate::error::WordNoteError;
use crate::import::{parse_json_records, FileWordSource};
use crate::pool::{month_choices, MonthSelection};
use crate::questions::QuizQuestion;
use crate::session::{QuizResult, SessionSnapshot};
use crate::store::{KvStore, StorageWordSource};
use crate::words::normalize_words;

fn runtime_err(e: WordNoteError) -> PyErr {
    PyRuntimeError::new_err(e.to_string())
}

#[pymethods]
impl QuizQuestion {
    #[getter]
    fn word_id(&self) -> String {
        self.word_id.to_string()
    }

    fn __repr__(&self) -> String {
        format!(
            "QuizQuestion(prompt='{}', options={}, answered={})",
            self.prompt.chars().take(40).collect::<String>(),
            self.options.len(),
            self.is_answered()
        )
    }
}

#[pymethods]
impl SessionSnapshot {
    #[getter]
    fn state(&self) -> &'static str {
        self.state.as_str()
    }

    fn __repr__(&self) -> String {
        format!(
            "SessionSnapshot(state='{}', question={}/{}, score={})",
            self.state.as_str(),
            self.current_index + 1,
            self.total,
            self.score
        )
    }
}

#[pymethods]
impl QuizResult {
    fn __repr__(&self) -> String {
        format!("QuizResult(score={}/{}, percent={}%)", self.score, self.total, self.percent)
    }
}

/// Quiz controller exposed to Python as `Quiz`.
#[pyclass(name = "Quiz", unsendable)]
pub struct PyQuiz {
    inner: QuizController,
    config: QuizConfig,
}

#[pymethods]
impl PyQuiz {
    /// Settings come from `WORDNOTE_*`; `distractor_count` above 3 raises `ValueError`.
    #[new]
    #[pyo3(signature = (distractor_count=None))]
    fn new(distractor_count: Option<usize>) -> PyResult<Self> {
        let mut config = QuizConfig::from_env().map_err(runtime_err)?;
        if let Some(count) = distractor_count {
            config.distractor_count = count;
        }
        config.validate().map_err(|e| PyValueError::new_err(e.to_string()))?;
        config.init_tracing();
        Ok(Self {
            inner: QuizController::new(config.clone()),
            config,
        })
    }

    /// Load words from a .json, .csv or spreadsheet file.
    fn load_file(&mut self, path: &str) -> PyResult<usize> {
        self.inner.load(&FileWordSource::new(path)).map_err(runtime_err)
    }

    /// Load words from a key-value store database, trying the legacy keys in order.
    fn load_store(&mut self, db_path: &str) -> PyResult<usize> {
        let store = KvStore::open(db_path).map_err(runtime_err)?;
        let source = StorageWordSource::new(&store, &self.config);
        self.inner.load(&source).map_err(runtime_err)
    }

    fn load_json(&mut self, text: &str) -> PyResult<usize> {
        let records = parse_json_records(text).map_err(runtime_err)?;
        Ok(self.inner.import_records(&records))
    }

    fn month_choices(&self) -> Vec<String> {
        self.inner.month_choices().iter().map(|m| m.to_string()).collect()
    }

    #[pyo3(signature = (month=None))]
    fn start(&mut self, month: Option<&str>) -> PyResult<SessionSnapshot> {
        let selection = match month {
            Some(raw) => raw.parse::<MonthSelection>().map_err(PyValueError::new_err)?,
            None => MonthSelection::All,
        };
        Ok(self.inner.start(selection))
    }

    fn restart(&mut self) -> SessionSnapshot {
        self.inner.restart()
    }

    fn answer(&mut self, question_index: usize, option_index: usize) -> SessionSnapshot {
        self.inner.answer(question_index, option_index)
    }

    fn goto(&mut self, index: i64) -> SessionSnapshot {
        self.inner.goto(index)
    }

    fn next(&mut self) -> SessionSnapshot {
        self.inner.next()
    }

    fn prev(&mut self) -> SessionSnapshot {
        self.inner.prev()
    }

    fn finish(&mut self) -> QuizResult {
        self.inner.finish()
    }

    fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot()
    }

    fn questions(&self) -> Vec<QuizQuestion> {
        self.inner.session().questions().to_vec()
    }
}

/// Normalize a JSON word list and return the canonical entries as JSON.
#[pyfunction]
#[pyo3(name = "normalize_json")]
pub fn py_normalize_json(text: &str) -> PyResult<String> {
    let records = parse_json_records(text).map_err(runtime_err)?;
    serde_json::to_string(&normalize_words(&records)).map_err(|e| runtime_err(e.into()))
}

#[pyfunction]
#[pyo3(name = "month_choices_json")]
pub fn py_month_choices_json(text: &str) -> PyResult<Vec<String>> {
    let records = parse_json_records(text).map_err(runtime_err)?;
    Ok(month_choices(&normalize_words(&records))
        .iter()
        .map(|m| m.to_string())
        .collect())
}

#[pyfunction]
#[pyo3(name = "init_tracing", signature = (level=None))]
pub fn py_init_tracing(level: Option<&str>) -> PyResult<bool> {
    match level {
        Some(level) => Ok(crate::logging::init_tracing(level)),
        None => Ok(QuizConfig::from_env().map_err(runtime_err)?.init_tracing()),
    }
}
