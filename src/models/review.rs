// src/models/review.rs

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::question::{Question, QuestionCode};

/// A failed question resolved back to its full document, tagged with the test
/// it was failed in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewQuestion {
    pub test_id: String,
    pub test_description: String,

    /// The failed code as recorded in the attempts.
    pub code: QuestionCode,

    /// Text of the correct option, empty when the question has none flagged.
    pub correct_answer: String,

    pub question: Question,
}

impl ReviewQuestion {
    pub fn new(
        test_id: impl Into<String>,
        test_description: impl Into<String>,
        code: QuestionCode,
        question: Question,
    ) -> Self {
        Self {
            test_id: test_id.into(),
            test_description: test_description.into(),
            code,
            correct_answer: question.correct_answer_text(),
            question,
        }
    }

    /// Answer key of this item in a review round. Namespaced by test id so
    /// equal codes from different tests do not collide.
    pub fn review_key(&self) -> String {
        review_key(&self.test_id, self.code.as_str())
    }
}

pub fn review_key(test_id: &str, code: &str) -> String {
    format!("{test_id}:{code}")
}

/// Failures of a single test, in resolution order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestFailures {
    pub test_id: String,
    pub test_description: String,
    pub questions: Vec<ReviewQuestion>,
}

/// DTO for grading a failure review round.
#[derive(Debug, Deserialize)]
pub struct ReviewAnswersRequest {
    /// `"{test_id}:{code}"` -> selected option label.
    pub answers: HashMap<String, String>,
}
