// src/store/mod.rs

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use thiserror::Error;

use crate::models::attempt::{Attempt, NewAttempt};
use crate::models::question::{Question, QuestionCode};
use crate::models::stats::UserStats;
use crate::models::test::Test;

pub mod memory;
pub mod postgres;

pub use memory::InMemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(String),

    #[error("stored document could not be decoded: {0}")]
    Serialization(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => StoreError::NotFound,
            other => StoreError::Database(other.to_string()),
        }
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serialization(err.to_string())
    }
}

/// Tests, their question subcollections, and the global question collection.
#[async_trait]
pub trait QuestionStore: Send + Sync {
    async fn get_test(&self, test_id: &str) -> Result<Option<Test>, StoreError>;

    async fn list_tests(&self) -> Result<Vec<Test>, StoreError>;

    /// Questions of a test in their stored order.
    async fn list_questions(&self, test_id: &str) -> Result<Vec<Question>, StoreError>;

    /// Exact-match lookup of `code` in the subcollection of `test_id`.
    async fn find_test_question(
        &self,
        test_id: &str,
        code: &str,
    ) -> Result<Option<Question>, StoreError>;

    /// Exact-match lookup of `code` in the global question collection.
    async fn find_global_question(&self, code: &str) -> Result<Option<Question>, StoreError>;

    /// Returns `StoreError::NotFound` when the test does not exist.
    async fn update_test_description(
        &self,
        test_id: &str,
        description: &str,
    ) -> Result<(), StoreError>;
}

/// Append-only attempt log.
#[async_trait]
pub trait AttemptStore: Send + Sync {
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<i64, StoreError>;

    /// Attempts of a user in submission order, optionally limited to one test.
    async fn attempts_for_user(
        &self,
        user_id: &str,
        test_id: Option<&str>,
    ) -> Result<Vec<Attempt>, StoreError>;
}

/// Per-user study-time counters.
#[async_trait]
pub trait StudyTimeStore: Send + Sync {
    async fn load_study_time(&self, user_id: &str) -> Result<Option<UserStats>, StoreError>;

    /// Creates the counter when missing and counts one more session.
    async fn begin_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserStats, StoreError>;

    /// Overwrites the total. The last writer wins.
    async fn save_study_time(
        &self,
        user_id: &str,
        total_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError>;
}

/// Store handles shared by the handlers.
#[derive(Clone)]
pub struct Repositories {
    pub questions: Arc<dyn QuestionStore>,
    pub attempts: Arc<dyn AttemptStore>,
    pub study_time: Arc<dyn StudyTimeStore>,
}

impl Repositories {
    pub fn in_memory(store: InMemoryStore) -> Self {
        let store = Arc::new(store);
        Self {
            questions: store.clone(),
            attempts: store.clone(),
            study_time: store,
        }
    }

    pub fn postgres(pool: PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            questions: store.clone(),
            attempts: store.clone(),
            study_time: store,
        }
    }
}
