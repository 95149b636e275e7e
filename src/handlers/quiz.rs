// src/handlers/quiz.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use validator::Validate;

use crate::{
    error::AppError,
    models::attempt::{AttemptResponse, NewAttempt, SubmitAttemptRequest},
    services::scoring::score,
    store::Repositories,
    utils::identity::Identity,
};

/// Scores a submission and appends it to the attempt log.
///
/// Every question of the test must be answered, otherwise 400 with the
/// missing keys and nothing is recorded.
pub async fn submit_attempt(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
    Path(test_id): Path<String>,
    Json(payload): Json<SubmitAttemptRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    if repos.questions.get_test(&test_id).await?.is_none() {
        return Err(AppError::NotFound("Test not found".to_string()));
    }

    let questions = repos.questions.list_questions(&test_id).await?;
    let result = score(&questions, &payload.answers)?;

    let attempt = NewAttempt::from_score(
        identity.id(),
        &test_id,
        &payload.answers,
        &result,
        payload.elapsed_seconds,
        Utc::now(),
    );
    let attempt_id = repos.attempts.append_attempt(&attempt).await?;

    tracing::info!(
        "Attempt {} recorded for {}: test {} scored {}/{}",
        attempt_id,
        identity.id(),
        test_id,
        result.correct,
        result.total
    );

    Ok((
        StatusCode::CREATED,
        Json(AttemptResponse {
            attempt_id,
            test_id,
            correct: result.correct,
            incorrect: result.incorrect,
            total: result.total,
            failed: result.failed,
            elapsed_seconds: payload.elapsed_seconds,
        }),
    ))
}
