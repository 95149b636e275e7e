// src/store/postgres.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;

use crate::models::attempt::{Attempt, NewAttempt};
use crate::models::question::{Question, QuestionCode};
use crate::models::stats::UserStats;
use crate::models::test::Test;
use crate::store::{AttemptStore, QuestionStore, StoreError, StudyTimeStore};

/// Postgres-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct TestRow {
    id: String,
    prefix: String,
    question_count: i32,
    description: Option<String>,
    created_at: Option<DateTime<Utc>>,
}

impl From<TestRow> for Test {
    fn from(row: TestRow) -> Self {
        Self {
            id: row.id,
            prefix: row.prefix,
            question_count: row.question_count.max(0) as u32,
            description: row.description,
            created_at: row.created_at,
        }
    }
}

/// Question document of either collection.
#[derive(sqlx::FromRow)]
struct QuestionRow {
    document: Json<Question>,
}

#[derive(sqlx::FromRow)]
struct AttemptRow {
    id: i64,
    user_id: String,
    test_id: String,
    answers: Json<BTreeMap<String, String>>,
    correct: i32,
    incorrect: i32,
    total: i32,
    elapsed_seconds: i64,
    submitted_at: DateTime<Utc>,
    failed: Json<Vec<QuestionCode>>,
}

impl From<AttemptRow> for Attempt {
    fn from(row: AttemptRow) -> Self {
        Self {
            id: row.id,
            user_id: row.user_id,
            test_id: row.test_id,
            answers: row.answers.0,
            correct: row.correct.max(0) as u32,
            incorrect: row.incorrect.max(0) as u32,
            total: row.total.max(0) as u32,
            elapsed_seconds: row.elapsed_seconds.max(0) as u64,
            submitted_at: row.submitted_at,
            failed: row.failed.0,
        }
    }
}

#[derive(sqlx::FromRow)]
struct StatsRow {
    user_id: String,
    total_seconds: i64,
    sessions_count: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<StatsRow> for UserStats {
    fn from(row: StatsRow) -> Self {
        Self {
            user_id: row.user_id,
            total_seconds: row.total_seconds.max(0) as u64,
            sessions_count: row.sessions_count.max(0) as u64,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[async_trait]
impl QuestionStore for PgStore {
    async fn get_test(&self, test_id: &str) -> Result<Option<Test>, StoreError> {
        let row = sqlx::query_as::<_, TestRow>(
            r#"
            SELECT id, prefix, question_count, description, created_at
            FROM tests
            WHERE id = $1
            "#,
        )
        .bind(test_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Test::from))
    }

    async fn list_tests(&self) -> Result<Vec<Test>, StoreError> {
        let rows = sqlx::query_as::<_, TestRow>(
            "SELECT id, prefix, question_count, description, created_at FROM tests",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Test::from).collect())
    }

    async fn list_questions(&self, test_id: &str) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT document
            FROM test_questions
            WHERE test_id = $1
            ORDER BY position ASC
            "#,
        )
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(|row| row.document.0).collect())
    }

    async fn find_test_question(
        &self,
        test_id: &str,
        code: &str,
    ) -> Result<Option<Question>, StoreError> {
        let row = sqlx::query_as::<_, QuestionRow>(
            r#"
            SELECT document
            FROM test_questions
            WHERE test_id = $1 AND code = $2
            ORDER BY position ASC
            LIMIT 1
            "#,
        )
        .bind(test_id)
        .bind(code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|row| row.document.0))
    }

    async fn find_global_question(&self, code: &str) -> Result<Option<Question>, StoreError> {
        let row =
            sqlx::query_as::<_, QuestionRow>("SELECT document FROM questions WHERE code = $1")
                .bind(code)
                .fetch_optional(&self.pool)
                .await?;

        Ok(row.map(|row| row.document.0))
    }

    async fn update_test_description(
        &self,
        test_id: &str,
        description: &str,
    ) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE tests SET description = $1 WHERE id = $2")
            .bind(description)
            .bind(test_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptStore for PgStore {
    async fn append_attempt(&self, attempt: &NewAttempt) -> Result<i64, StoreError> {
        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO test_attempts
                (user_id, test_id, answers, correct, incorrect, total, elapsed_seconds, submitted_at, failed)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING id
            "#,
        )
        .bind(&attempt.user_id)
        .bind(&attempt.test_id)
        .bind(Json(&attempt.answers))
        .bind(attempt.correct as i32)
        .bind(attempt.incorrect as i32)
        .bind(attempt.total as i32)
        .bind(attempt.elapsed_seconds as i64)
        .bind(attempt.submitted_at)
        .bind(Json(&attempt.failed))
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn attempts_for_user(
        &self,
        user_id: &str,
        test_id: Option<&str>,
    ) -> Result<Vec<Attempt>, StoreError> {
        let rows = sqlx::query_as::<_, AttemptRow>(
            r#"
            SELECT id, user_id, test_id, answers, correct, incorrect, total,
                   elapsed_seconds, submitted_at, failed
            FROM test_attempts
            WHERE user_id = $1 AND ($2::TEXT IS NULL OR test_id = $2)
            ORDER BY id ASC
            "#,
        )
        .bind(user_id)
        .bind(test_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Attempt::from).collect())
    }
}

#[async_trait]
impl StudyTimeStore for PgStore {
    async fn load_study_time(&self, user_id: &str) -> Result<Option<UserStats>, StoreError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            SELECT user_id, total_seconds, sessions_count, created_at, updated_at
            FROM user_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(UserStats::from))
    }

    async fn begin_session(
        &self,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> Result<UserStats, StoreError> {
        let row = sqlx::query_as::<_, StatsRow>(
            r#"
            INSERT INTO user_stats (user_id, total_seconds, sessions_count, created_at, updated_at)
            VALUES ($1, 0, 1, $2, $2)
            ON CONFLICT (user_id) DO UPDATE SET
                sessions_count = user_stats.sessions_count + 1,
                updated_at = EXCLUDED.updated_at
            RETURNING user_id, total_seconds, sessions_count, created_at, updated_at
            "#,
        )
        .bind(user_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into())
    }

    async fn save_study_time(
        &self,
        user_id: &str,
        total_seconds: u64,
        now: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO user_stats (user_id, total_seconds, sessions_count, created_at, updated_at)
            VALUES ($1, $2, 0, $3, $3)
            ON CONFLICT (user_id) DO UPDATE SET
                total_seconds = EXCLUDED.total_seconds,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(user_id)
        .bind(total_seconds as i64)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
