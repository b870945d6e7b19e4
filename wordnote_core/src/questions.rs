//! Multiple-choice question generation for the vocabulary quiz

#[cfg(feature = "python")]
use pyo3::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::Serialize;
use std::collections::HashSet;

use crate::words::{VocabWord, WordId};

/// Upper bound on distractors; a question never offers more than four options.
pub const MAX_DISTRACTORS: usize = 3;

/// One question: pick the translation of `prompt` among `options`.
#[cfg_attr(feature = "python", pyclass)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub word_id: WordId,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub prompt: String,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub category: String,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub correct_answer: String,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub options: Vec<String>,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub correct_index: usize,
    #[cfg_attr(feature = "python", pyo3(get))]
    pub chosen_index: Option<usize>,
}

impl QuizQuestion {
    pub fn is_answered(&self) -> bool {
        self.chosen_index.is_some()
    }

    pub fn is_correct(&self) -> bool {
        self.chosen_index == Some(self.correct_index)
    }
}

/// Collect up to `count` distinct translations of other words, in random order.
fn pick_distractors<R: Rng + ?Sized>(pool: &[&VocabWord], target: &VocabWord, count: usize, rng: &mut R) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut candidates: Vec<&str> = pool
        .iter()
        .filter(|w| w.id != target.id && w.translation != target.translation)
        .map(|w| w.translation.as_str())
        .filter(|t| seen.insert(*t))
        .collect();

    candidates.shuffle(rng);
    candidates.truncate(count);
    candidates.into_iter().map(str::to_string).collect()
}

fn build_question<R: Rng + ?Sized>(target: &VocabWord, pool: &[&VocabWord], distractor_count: usize, rng: &mut R) -> QuizQuestion {
    let distractors = pick_distractors(pool, target, distractor_count, rng);

    let mut options = Vec::with_capacity(distractors.len() + 1);
    options.push(target.translation.clone());
    options.extend(distractors);
    options.shuffle(rng);

    let correct_index = options
        .iter()
        .position(|o| *o == target.translation)
        .unwrap_or_default();

    QuizQuestion {
        word_id: target.id.clone(),
        prompt: target.word.clone(),
        category: target.category.clone(),
        correct_answer: target.translation.clone(),
        options,
        correct_index,
        chosen_index: None,
    }
}

/// Build one question per pool entry, most recently added word first.
///
/// `distractor_count` is capped at [`MAX_DISTRACTORS`]. Pools with fewer
/// distinct translations than `distractor_count + 1` yield questions with
/// fewer options; an empty pool yields no questions.
pub fn build_questions<R: Rng + ?Sized>(pool: &[VocabWord], distractor_count: usize, rng: &mut R) -> Vec<QuizQuestion> {
    let distractor_count = distractor_count.min(MAX_DISTRACTORS);
    let mut sorted: Vec<&VocabWord> = pool.iter().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));

    sorted
        .iter()
        .map(|target| build_question(target, &sorted, distractor_count, rng))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn word(id: i64, translation: &str, created_at: i64) -> VocabWord {
        VocabWord {
            id: WordId::Num(id),
            word: format!("word{}", id),
            translation: translation.to_string(),
            category: "noun".to_string(),
            created_at,
        }
    }

    fn assert_well_formed(q: &QuizQuestion) {
        let hits = q.options.iter().filter(|o| **o == q.correct_answer).count();
        assert_eq!(hits, 1, "correct answer must appear once in {:?}", q.options);
        assert_eq!(q.options[q.correct_index], q.correct_answer);
        let distinct: HashSet<&String> = q.options.iter().collect();
        assert_eq!(distinct.len(), q.options.len());
        assert!(q.chosen_index.is_none());
    }

    #[test]
    fn five_distinct_translations_give_four_options_each() {
        let pool: Vec<VocabWord> = ["A", "B", "C", "D", "E"]
            .iter()
            .enumerate()
            .map(|(i, t)| word(i as i64 + 1, t, 1_000 + i as i64))
            .collect();
        let mut rng = StdRng::seed_from_u64(7);
        let questions = build_questions(&pool, 3, &mut rng);

        assert_eq!(questions.len(), 5);
        assert!(questions.iter().all(|q| q.options.len() == 4));
        assert_eq!(questions.iter().map(|q| q.options.len()).sum::<usize>(), 20);
        questions.iter().for_each(assert_well_formed);
    }

    #[test]
    fn single_word_pool() {
        let pool = vec![word(1, "only", 5)];
        let questions = build_questions(&pool, 3, &mut StdRng::seed_from_u64(1));
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].options, vec!["only".to_string()]);
        assert_eq!(questions[0].correct_index, 0);
    }

    #[test]
    fn empty_pool_yields_no_questions() {
        let questions = build_questions(&[], 3, &mut StdRng::seed_from_u64(1));
        assert!(questions.is_empty());
    }

    #[test]
    fn ordered_by_recency() {
        let pool = vec![word(1, "a", 10), word(2, "b", 30), word(3, "c", 20)];
        let questions = build_questions(&pool, 3, &mut StdRng::seed_from_u64(3));
        let prompts: Vec<&str> = questions.iter().map(|q| q.prompt.as_str()).collect();
        assert_eq!(prompts, vec!["word2", "word3", "word1"]);
    }

    #[test]
    fn duplicate_translations_are_not_distractors_twice() {
        let pool = vec![
            word(1, "same", 1),
            word(2, "same", 2),
            word(3, "other", 3),
            word(4, "other", 4),
        ];
        let questions = build_questions(&pool, 3, &mut StdRng::seed_from_u64(11));
        for q in &questions {
            // two distinct translations in the pool: correct + one distractor
            assert_eq!(q.options.len(), 2);
            assert_well_formed(q);
        }
    }

    #[test]
    fn option_count_tracks_distinct_translations() {
        let pool = vec![word(1, "x", 1), word(2, "y", 2), word(3, "z", 3)];
        for seed in 0..20 {
            let questions = build_questions(&pool, 3, &mut StdRng::seed_from_u64(seed));
            assert!(questions.iter().all(|q| q.options.len() == 3));
        }
    }

    #[test]
    fn distractor_count_caps_options() {
        let pool: Vec<VocabWord> = (1..=10).map(|i| word(i, &format!("t{}", i), i)).collect();
        let questions = build_questions(&pool, 1, &mut StdRng::seed_from_u64(5));
        assert!(questions.iter().all(|q| q.options.len() == 2));
    }

    #[test]
    fn oversized_distractor_count_still_gives_four_options() {
        let pool: Vec<VocabWord> = (1..=8).map(|i| word(i, &format!("t{}", i), i)).collect();
        let questions = build_questions(&pool, 6, &mut StdRng::seed_from_u64(9));
        assert_eq!(questions.len(), 8);
        assert!(questions.iter().all(|q| q.options.len() == MAX_DISTRACTORS + 1));
        questions.iter().for_each(assert_well_formed);
    }

    #[test]
    fn correct_answer_position_varies() {
        let pool: Vec<VocabWord> = (1..=8).map(|i| word(i, &format!("t{}", i), i)).collect();
        let mut rng = StdRng::seed_from_u64(42);
        let positions: HashSet<usize> = (0..20)
            .flat_map(|_| build_questions(&pool, 3, &mut rng))
            .map(|q| q.correct_index)
            .collect();
        assert_eq!(positions.len(), 4);
    }
}
