// src/handlers/catalog.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::{
        question::PublicQuestion,
        test::{
            CategoryCounts, TestCatalog, TestDetail, TestListItem, TestListParams,
            UpdateDescriptionRequest, compare_test_ids,
        },
    },
    store::Repositories,
    utils::html::clean_html,
};

/// Lists tests ordered by numeric id, optionally filtered by category.
///
/// Counts always cover the whole catalog.
pub async fn list_tests(
    State(repos): State<Repositories>,
    Query(params): Query<TestListParams>,
) -> Result<impl IntoResponse, AppError> {
    let mut tests = repos.questions.list_tests().await?;
    tests.sort_by(|a, b| compare_test_ids(&a.id, &b.id));

    let counts = CategoryCounts::from_tests(&tests);
    let tests = tests
        .into_iter()
        .filter(|t| params.category.is_none_or(|c| t.category() == c))
        .map(TestListItem::from)
        .collect();

    Ok(Json(TestCatalog { tests, counts }))
}

/// Gets a test and its questions, without the answer key.
pub async fn get_test(
    State(repos): State<Repositories>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let test = repos
        .questions
        .get_test(&id)
        .await?
        .ok_or_else(|| AppError::NotFound("Test not found".to_string()))?;

    let questions = repos
        .questions
        .list_questions(&id)
        .await?
        .iter()
        .enumerate()
        .map(|(idx, q)| PublicQuestion::from_question(q, idx))
        .collect();

    Ok(Json(TestDetail {
        test: test.into(),
        questions,
    }))
}

/// Replaces a test description. The text is sanitized before storing.
pub async fn update_description(
    State(repos): State<Repositories>,
    Path(id): Path<String>,
    Json(payload): Json<UpdateDescriptionRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    let description = clean_html(payload.description.trim());
    repos
        .questions
        .update_test_description(&id, &description)
        .await?;

    tracing::info!("Description of test {} updated", id);
    Ok(Json(json!({ "id": id, "description": description })))
}
