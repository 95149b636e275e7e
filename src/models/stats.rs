// src/models/stats.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::services::study_time::StudyLevel;

/// Per-user study-time counter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserStats {
    pub user_id: String,
    pub total_seconds: u64,
    pub sessions_count: u64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserStats {
    pub fn new(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            total_seconds: 0,
            sessions_count: 0,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-test entry of the statistics page.
#[derive(Debug, Serialize)]
pub struct TestSummaryResponse {
    pub test_id: String,
    pub test_description: String,
    pub attempts: u32,
    pub last_correct: u32,
    pub last_total: u32,
    pub last_submitted_at: DateTime<Utc>,
}

/// Study-time statistics for the current user.
#[derive(Debug, Serialize)]
pub struct TimeStatsResponse {
    pub total_seconds: u64,
    pub total_formatted: String,
    pub sessions_count: u64,
    pub average_session_seconds: u64,
    pub days_since_start: i64,
    pub is_tracking: bool,
    pub level: StudyLevel,
}
