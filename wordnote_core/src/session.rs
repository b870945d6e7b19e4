//! Quiz session state: question order, answers, score and navigation
//!
//! A session moves `Unstarted -> InProgress -> Finished`. Navigation never
//! changes the state. The score is always recomputed from the questions'
//! recorded answers, never adjusted incrementally.

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info};

use crate::questions::{build_questions, QuizQuestion};
use crate::words::VocabWord;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Unstarted,
    InProgress,
    Finished,
}

impl SessionState {
    pub fn as_str(self) -> &'static str {
        match self {
            SessionState::Unstarted => "unstarted",
            SessionState::InProgress => "in_progress",
            SessionState::Finished => "finished",
        }
    }
}

/// Final tally shown when a quiz is finished.
#[cfg_attr(feature = "python", pyclass(get_all))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizResult {
    pub score: usize,
    pub total: usize,
    /// Rounded percentage of correct answers; 0 for an empty quiz.
    pub percent: u32,
}

/// Read-only view of a session handed to renderers after each transition.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub current_index: usize,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub total: usize,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub score: usize,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub finished: bool,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub progress_percent: u32,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub question: Option<QuizQuestion>,
}

#[derive(Debug, Clone, Default)]
pub struct QuizSession {
    questions: Vec<QuizQuestion>,
    current_index: usize,
    score: usize,
    started: bool,
    finished: bool,
}

impl QuizSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a fresh question set from `pool`, discarding any previous answers.
    pub fn start<R: Rng + ?Sized>(&mut self, pool: &[VocabWord], distractor_count: usize, rng: &mut R) {
        self.questions = build_questions(pool, distractor_count, rng);
        self.current_index = 0;
        self.started = true;
        self.finished = false;
        self.recompute_score();
        info!(questions = self.questions.len(), "quiz started");
    }

    /// Record `option_index` as the answer to `question_index`.
    ///
    /// Re-answering overwrites the earlier choice. Returns false without
    /// changing anything once the session is finished or when either index
    /// is out of range.
    pub fn answer(&mut self, question_index: usize, option_index: usize) -> bool {
        if self.finished {
            debug!(question_index, "ignoring answer after finish");
            return false;
        }
        let Some(question) = self.questions.get_mut(question_index) else {
            return false;
        };
        if option_index >= question.options.len() {
            return false;
        }
        question.chosen_index = Some(option_index);
        self.recompute_score();
        true
    }

    /// Move to question `index`, clamped into range. No-op without questions.
    pub fn goto(&mut self, index: i64) {
        if self.questions.is_empty() {
            return;
        }
        let last = self.questions.len() as i64 - 1;
        self.current_index = index.clamp(0, last) as usize;
    }

    pub fn next(&mut self) {
        if self.current_index + 1 < self.questions.len() {
            self.goto(self.current_index as i64 + 1);
        }
    }

    pub fn prev(&mut self) {
        if self.current_index > 0 {
            self.goto(self.current_index as i64 - 1);
        }
    }

    /// Finish the quiz. Unanswered questions count as incorrect.
    pub fn finish(&mut self) {
        self.finished = true;
        self.recompute_score();
        info!(score = self.score, total = self.questions.len(), "quiz finished");
    }

    fn recompute_score(&mut self) {
        self.score = self.questions.iter().filter(|q| q.is_correct()).count();
    }

    pub fn state(&self) -> SessionState {
        if self.finished {
            SessionState::Finished
        } else if self.started {
            SessionState::InProgress
        } else {
            SessionState::Unstarted
        }
    }

    pub fn questions(&self) -> &[QuizQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&QuizQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    pub fn progress_percent(&self) -> u32 {
        if self.questions.is_empty() {
            return 0;
        }
        let ratio = (self.current_index + 1) as f64 / self.questions.len() as f64;
        (ratio * 100.0).round() as u32
    }

    pub fn result(&self) -> QuizResult {
        let total = self.questions.len();
        let ratio = self.score as f64 / total.max(1) as f64;
        QuizResult {
            score: self.score,
            total,
            percent: (ratio * 100.0).round() as u32,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            state: self.state(),
            current_index: self.current_index,
            total: self.questions.len(),
            score: self.score,
            finished: self.finished,
            progress_percent: self.progress_percent(),
            question: self.current_question().cloned(),
        }
    }
}
