// src/services/scoring.rs

use std::collections::{BTreeMap, HashMap};

use serde::Serialize;
use thiserror::Error;

use crate::models::question::Question;
use crate::models::review::ReviewQuestion;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoreError {
    #[error("{} question(s) left unanswered", missing.len())]
    MissingAnswers { missing: Vec<String> },
}

/// Outcome of scoring one submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoreResult {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,

    /// Keys of the incorrectly answered questions, in question order.
    pub failed: Vec<String>,
}

fn selected<'a>(answers: &'a HashMap<String, String>, key: &str) -> Option<&'a str> {
    answers
        .get(key)
        .map(String::as_str)
        .filter(|label| !label.trim().is_empty())
}

fn is_correct(question: &Question, label: &str) -> bool {
    question
        .correct_option()
        .is_some_and(|option| option.label == label)
}

/// Scores a submission against the questions of one test.
///
/// Every question must be answered; otherwise nothing is scored and all
/// missing keys are reported at once.
pub fn score(
    questions: &[Question],
    answers: &HashMap<String, String>,
) -> Result<ScoreResult, ScoreError> {
    let keys: Vec<String> = questions
        .iter()
        .enumerate()
        .map(|(idx, q)| q.answer_key(idx))
        .collect();

    let missing: Vec<String> = keys
        .iter()
        .filter(|key| selected(answers, key).is_none())
        .cloned()
        .collect();
    if !missing.is_empty() {
        return Err(ScoreError::MissingAnswers { missing });
    }

    let mut result = ScoreResult {
        correct: 0,
        incorrect: 0,
        total: questions.len() as u32,
        failed: Vec::new(),
    };

    for (question, key) in questions.iter().zip(keys) {
        let label = selected(answers, &key).unwrap_or_default();
        if is_correct(question, label) {
            result.correct += 1;
        } else {
            result.incorrect += 1;
            result.failed.push(key);
        }
    }

    Ok(result)
}

#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct TestTally {
    pub correct: u32,
    pub total: u32,
}

/// Outcome of a failure review round.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewScore {
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub per_test: BTreeMap<String, TestTally>,
}

/// Grades a failure review round. Items are keyed by
/// [`ReviewQuestion::review_key`]; the same all-answered rule as [`score`]
/// applies.
pub fn grade_review(
    items: &[ReviewQuestion],
    answers: &HashMap<String, String>,
) -> Result<ReviewScore, ScoreError> {
    let missing: Vec<String> = items
        .iter()
        .map(ReviewQuestion::review_key)
        .filter(|key| selected(answers, key).is_none())
        .collect();
    if !missing.is_empty() {
        return Err(ScoreError::MissingAnswers { missing });
    }

    let mut graded = ReviewScore {
        correct: 0,
        incorrect: 0,
        total: items.len() as u32,
        per_test: BTreeMap::new(),
    };

    for item in items {
        let label = selected(answers, &item.review_key()).unwrap_or_default();
        let tally = graded.per_test.entry(item.test_id.clone()).or_default();
        tally.total += 1;
        if is_correct(&item.question, label) {
            tally.correct += 1;
            graded.correct += 1;
        } else {
            graded.incorrect += 1;
        }
    }

    Ok(graded)
}
