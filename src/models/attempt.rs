// src/models/attempt.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::question::QuestionCode;
use crate::services::scoring::ScoreResult;

/// One recorded submission of a test. Immutable once stored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attempt {
    pub id: i64,

    /// Authenticated user id or guest id.
    pub user_id: String,

    pub test_id: String,

    /// Question key -> selected option label.
    pub answers: BTreeMap<String, String>,

    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,

    pub elapsed_seconds: u64,

    pub submitted_at: DateTime<Utc>,

    /// Keys of the questions answered incorrectly.
    pub failed: Vec<QuestionCode>,
}

/// An attempt ready to be appended to the attempt log.
#[derive(Debug, Clone, PartialEq)]
pub struct NewAttempt {
    pub user_id: String,
    pub test_id: String,
    pub answers: BTreeMap<String, String>,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub elapsed_seconds: u64,
    pub submitted_at: DateTime<Utc>,
    pub failed: Vec<QuestionCode>,
}

impl NewAttempt {
    pub fn from_score(
        user_id: impl Into<String>,
        test_id: impl Into<String>,
        answers: &HashMap<String, String>,
        score: &ScoreResult,
        elapsed_seconds: u64,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id: user_id.into(),
            test_id: test_id.into(),
            answers: answers
                .iter()
                .map(|(k, v)| (k.clone(), v.clone()))
                .collect(),
            correct: score.correct,
            incorrect: score.incorrect,
            total: score.total,
            elapsed_seconds,
            submitted_at,
            failed: score.failed.iter().map(|k| QuestionCode::new(k.as_str())).collect(),
        }
    }

    pub fn with_id(self, id: i64) -> Attempt {
        Attempt {
            id,
            user_id: self.user_id,
            test_id: self.test_id,
            answers: self.answers,
            correct: self.correct,
            incorrect: self.incorrect,
            total: self.total,
            elapsed_seconds: self.elapsed_seconds,
            submitted_at: self.submitted_at,
            failed: self.failed,
        }
    }
}

/// DTO for submitting a test attempt.
#[derive(Debug, Deserialize, Validate)]
pub struct SubmitAttemptRequest {
    /// Question key -> selected option label.
    pub answers: HashMap<String, String>,

    /// Seconds the user spent on the test.
    #[serde(default)]
    #[validate(range(max = 86_400, message = "Elapsed time must be at most one day."))]
    pub elapsed_seconds: u64,
}

/// Response returned after an attempt has been scored and recorded.
#[derive(Debug, Serialize)]
pub struct AttemptResponse {
    pub attempt_id: i64,
    pub test_id: String,
    pub correct: u32,
    pub incorrect: u32,
    pub total: u32,
    pub failed: Vec<String>,
    pub elapsed_seconds: u64,
}
