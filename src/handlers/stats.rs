// src/handlers/stats.rs

use std::collections::HashMap;
use std::sync::Arc;

use axum::{Extension, Json, extract::State, response::IntoResponse};
use chrono::Utc;
use serde_json::json;

use crate::{
    error::AppError,
    models::{
        stats::{TestSummaryResponse, TimeStatsResponse},
        test::display_name,
    },
    services::{
        progress::{summarize, summarize_tests},
        study_time::{StudyLevel, average_session_seconds, days_since_start, format_duration},
        time_tracker::StudyTimeTracker,
    },
    store::Repositories,
    utils::identity::Identity,
};

/// Share of the catalog the user has attempted at least once.
pub async fn progress(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos.attempts.attempts_for_user(identity.id(), None).await?;
    let total_tests = repos.questions.list_tests().await?.len();

    Ok(Json(summarize(&attempts, total_tests)))
}

/// Attempt count and latest result per attempted test.
pub async fn test_summaries(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos.attempts.attempts_for_user(identity.id(), None).await?;
    let descriptions: HashMap<String, Option<String>> = repos
        .questions
        .list_tests()
        .await?
        .into_iter()
        .map(|t| (t.id, t.description))
        .collect();

    let summaries: Vec<TestSummaryResponse> = summarize_tests(&attempts)
        .into_iter()
        .map(|s| TestSummaryResponse {
            test_description: display_name(
                &s.test_id,
                descriptions.get(&s.test_id).and_then(|d| d.as_deref()),
            ),
            test_id: s.test_id,
            attempts: s.attempts,
            last_correct: s.last_correct,
            last_total: s.last_total,
            last_submitted_at: s.last_submitted_at,
        })
        .collect();

    Ok(Json(summaries))
}

/// Study-time statistics. An open session contributes its running total.
pub async fn time_stats(
    State(repos): State<Repositories>,
    State(tracker): State<Arc<StudyTimeTracker>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let now = Utc::now();
    let stored = repos.study_time.load_study_time(identity.id()).await?;
    let live_total = tracker.current_total(identity.id(), now);

    let (stored_total, sessions_count, started_at) = match &stored {
        Some(stats) => (stats.total_seconds, stats.sessions_count, stats.created_at),
        None => (0, 0, now),
    };
    let total_seconds = live_total.unwrap_or(stored_total);

    Ok(Json(TimeStatsResponse {
        total_seconds,
        total_formatted: format_duration(total_seconds),
        sessions_count,
        average_session_seconds: average_session_seconds(total_seconds, sessions_count),
        days_since_start: days_since_start(started_at, now),
        is_tracking: live_total.is_some(),
        level: StudyLevel::for_seconds(total_seconds),
    }))
}

/// Opens a study session for the current user.
pub async fn start_tracking(
    State(tracker): State<Arc<StudyTimeTracker>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let started = tracker.start(identity.id(), Utc::now()).await?;

    Ok(Json(json!({ "tracking": true, "started": started })))
}

/// Closes the study session of the current user after a final flush.
pub async fn stop_tracking(
    State(tracker): State<Arc<StudyTimeTracker>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let total = tracker.stop(identity.id(), Utc::now()).await?;

    Ok(Json(json!({ "tracking": false, "total_seconds": total })))
}
