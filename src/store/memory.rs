// src/store/memory.rs

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::models::attempt::{Attempt, NewAttempt};
use crate::models::question::Question;
use crate::models::stats::UserStats;
use crate::models::test::Test;
use crate::store::{AttemptStore, QuestionStore, StoreError, StudyTimeStore};

/// In-memory store for tests and local runs. Clones share the same data.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    tests: Arc<Mutex<HashMap<String, Test>>>,
    test_questions: Arc<Mutex<HashMap<String, Vec<Question>>>>,
    global_questions: Arc<Mutex<HashMap<String, Question>>>,
    attempts: Arc<Mutex<Vec<Attempt>>>,
    study_time: Arc<Mutex<HashMap<String, UserStats>>>,
}

fn lock<T>(mutex: &Mutex<T>) -> Result<MutexGuard<'_, T>, StoreError> {
    mutex
        .lock()
        .map_err(|e| StoreError::Database(e.to_string()))
}

impl InMemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a test together with its question subcollection.
    pub fn insert_test(&self, test: Test, questions: Vec<Question>) -> Result<(), StoreError> {
        lock(&self.test_questions)?.insert(test.id.clone(), questions);
        lock(&self.tests)?.insert(test.id.clone(), test);
        Ok(())
    }

    /// Seeds the global question collection, keyed by the given code.
    pub fn insert_global_question(
        &self,
        code: impl Into<String>,
        question: Question,
    ) -> Result<(), StoreError> {
        lock(&self.global_questions)?.insert(code.into(), question);
        Ok(())
    }
}

#[async_trait]
impl QuestionStore for InMemoryStore {
    async fn get_test(&self, test_id: &str) -> Result<Option<Test>, StoreError> {
        Ok(lock(&self.tests)?.get(test_id).cloned())
    }

    async fn list_tests(&self) -> Result<Vec<Test>, StoreError> {
        Ok(lock(&self.tests)?.values().cloned().collect())
    }

    async fn list_questions(&self, test_id: &str) -> Result<Vec<Question>, StoreError> {
        Ok(lock(&self.test_questions)?
            .get(test_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn find_test_question(
        &self,
        test_id: &str,
        code: &str,
    ) -> Result<Option<Question>, StoreError> {
        let guard = lock(&self.test_questions)?;
        Ok(guard.get(test_id).and_then(|questions| {
            questions
                .iter()
                .find(|q| q.code.as_ref().is_some_and(|c| c.as_str() == code))
                .cloned()
        }))
    }

    async fn find_global_question(&self, code: &str) -> Result<Option<Question>, StoreError> {
        Ok(lock(&self.global_questions)?.get(code).cloned())
    }

    async fn update_test_description(
        &self,
        test_id: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.tests)?;
        let test = guard.get_mut(test_id).ok_or(StoreError::NotFound)?;
        test.description = Some(description.to_string());
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for InMemoryStore {
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<i64, StoreError> {
        let mut guard = lock(&self.attempts)?;
        let id = guard.len() as i64 + 1;
        guard.push(attempt.clone().with_id(id));
        Ok(id)
    }

    async fn attempts_for_user(
        &self,
        user_id: &str,
        test_id: Option<&str>,
    ) -> Result<Vec<Attempt>, StoreError> {
        Ok(lock(&self.attempts)?
            .iter()
            .filter(|a| a.user_id == user_id)
            .filter(|a| test_id.is_none_or(|t| a.test_id == t))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl StudyTimeStore for InMemoryStore {
    async fn load_study_time(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        Ok(lock(&self.study_time)?.get(user_id).cloned())
    }

    async fn begin_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserStats, StoreError> {
        let mut guard = lock(&self.study_time)?;
        let stats = guard
            .entry(user_id.to_string())
            .or_insert_with(|| UserStats::new(user_id, now));
        stats.sessions_count += 1;
        stats.updated_at = now;
        Ok(stats.clone())
    }

    async fn save_study_time(
        &self,
        user_id: &str,
        total_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let mut guard = lock(&self.study_time)?;
        let stats = guard
            .entry(user_id.to_string())
            .or_insert_with(|| UserStats::new(user_id, now));
        stats.total_seconds = total_seconds;
        stats.updated_at = now;
        Ok(())
    }
}
