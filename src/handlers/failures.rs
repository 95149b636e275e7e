// src/handlers/failures.rs

use axum::{
    Extension, Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::review::ReviewAnswersRequest,
    services::{
        failures::{FailureAggregator, FailureReview},
        scoring::grade_review,
    },
    store::Repositories,
    utils::identity::Identity,
};

/// Failed questions of the current user, grouped per test.
pub async fn list_failures(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos.attempts.attempts_for_user(identity.id(), None).await?;
    let review = FailureAggregator::new(repos.questions.as_ref())
        .per_test(&attempts)
        .await?;

    Ok(Json(review))
}

/// Failed questions of every test, shuffled into a single review round.
pub async fn all_failures(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos.attempts.attempts_for_user(identity.id(), None).await?;
    let review = FailureAggregator::new(repos.questions.as_ref())
        .all_tests(&attempts)
        .await?;

    Ok(Json(review))
}

/// Grades a review round over every failed question. Nothing is recorded.
pub async fn review_all(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
    Json(payload): Json<ReviewAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos.attempts.attempts_for_user(identity.id(), None).await?;
    let review = FailureAggregator::new(repos.questions.as_ref())
        .all_tests(&attempts)
        .await?;

    let graded = match review {
        FailureReview::NoFailures => FailureReview::NoFailures,
        FailureReview::Found(items) => FailureReview::Found(grade_review(&items, &payload.answers)?),
    };
    Ok(Json(graded))
}

/// Failed questions of one test.
pub async fn test_failures(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
    Path(test_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos
        .attempts
        .attempts_for_user(identity.id(), Some(&test_id))
        .await?;
    let review = FailureAggregator::new(repos.questions.as_ref())
        .for_test(&test_id, &attempts)
        .await?;

    Ok(Json(review))
}

/// Grades a review round over the failed questions of one test.
pub async fn review_test(
    State(repos): State<Repositories>,
    Extension(identity): Extension<Identity>,
    Path(test_id): Path<String>,
    Json(payload): Json<ReviewAnswersRequest>,
) -> Result<impl IntoResponse, AppError> {
    let attempts = repos
        .attempts
        .attempts_for_user(identity.id(), Some(&test_id))
        .await?;
    let review = FailureAggregator::new(repos.questions.as_ref())
        .for_test(&test_id, &attempts)
        .await?;

    let graded = match review {
        FailureReview::NoFailures => FailureReview::NoFailures,
        FailureReview::Found(group) => {
            FailureReview::Found(grade_review(&group.questions, &payload.answers)?)
        }
    };
    Ok(Json(graded))
}
