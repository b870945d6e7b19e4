//! Owns the loaded words and the active quiz session.
//!
//! One controller handles user actions one at a time; starting or
//! restarting replaces the session wholesale.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde_json::Value;
use tracing::info;

use crate::config::QuizConfig;
use crate::error::Result;
use crate::pool::{filter_pool, MonthSelection};
use crate::ports::{Renderer, WordSource};
use crate::session::{QuizResult, QuizSession, SessionSnapshot};
use crate::words::{normalize_words_with, now_millis, VocabWord};

pub struct QuizController<R: Rng = StdRng> {
    config: QuizConfig,
    words: Vec<VocabWord>,
    selection: MonthSelection,
    pool: Vec<VocabWord>,
    session: QuizSession,
    rng: R,
    renderer: Option<Box<dyn Renderer>>,
}

impl QuizController<StdRng> {
    pub fn new(config: QuizConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }
}

impl<R: Rng> QuizController<R> {
    /// Controller with an injected random source, e.g. a seeded `StdRng` in tests.
    pub fn with_rng(config: QuizConfig, rng: R) -> Self {
        Self {
            config,
            words: Vec::new(),
            selection: MonthSelection::All,
            pool: Vec::new(),
            session: QuizSession::new(),
            rng,
            renderer: None,
        }
    }

    pub fn set_renderer(&mut self, renderer: impl Renderer + 'static) {
        self.renderer = Some(Box::new(renderer));
    }

    /// Replace the word list with the records from `source`.
    pub fn load(&mut self, source: &dyn WordSource) -> Result<usize> {
        let records = source.load_words()?;
        Ok(self.import_records(&records))
    }

    /// Replace the word list and reset to an unstarted session over all words.
    /// Returns the word count.
    pub fn import_records(&mut self, records: &[Value]) -> usize {
        self.words = normalize_words_with(records, &self.config.default_category, now_millis());
        self.selection = MonthSelection::All;
        self.pool = self.words.clone();
        self.session = QuizSession::new();
        info!(records = records.len(), words = self.words.len(), "word list loaded");
        self.transition();
        self.words.len()
    }

    pub fn words(&self) -> &[VocabWord] {
        &self.words
    }

    pub fn selection(&self) -> MonthSelection {
        self.selection
    }

    pub fn month_choices(&self) -> Vec<MonthSelection> {
        crate::pool::month_choices(&self.words)
    }

    pub fn session(&self) -> &QuizSession {
        &self.session
    }

    /// Filter the pool by `selection` and start a fresh quiz over it.
    pub fn start(&mut self, selection: MonthSelection) -> SessionSnapshot {
        self.selection = selection;
        self.pool = filter_pool(&self.words, selection);
        self.restart()
    }

    /// Start over on the current pool with a new shuffle.
    pub fn restart(&mut self) -> SessionSnapshot {
        let mut session = QuizSession::new();
        session.start(&self.pool, self.config.distractor_count, &mut self.rng);
        self.session = session;
        self.transition()
    }

    pub fn answer(&mut self, question_index: usize, option_index: usize) -> SessionSnapshot {
        self.session.answer(question_index, option_index);
        self.transition()
    }

    /// Answer the question under the cursor.
    pub fn answer_current(&mut self, option_index: usize) -> SessionSnapshot {
        let current = self.session.current_index();
        self.answer(current, option_index)
    }

    pub fn goto(&mut self, index: i64) -> SessionSnapshot {
        self.session.goto(index);
        self.transition()
    }

    pub fn next(&mut self) -> SessionSnapshot {
        self.session.next();
        self.transition()
    }

    pub fn prev(&mut self) -> SessionSnapshot {
        self.session.prev();
        self.transition()
    }

    pub fn finish(&mut self) -> QuizResult {
        self.session.finish();
        self.transition();
        self.session.result()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.session.snapshot()
    }

    fn transition(&mut self) -> SessionSnapshot {
        let snapshot = self.session.snapshot();
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.render(&snapshot);
        }
        snapshot
    }
}
