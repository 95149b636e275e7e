// src/handlers/auth.rs

use axum::{Json, http::StatusCode, response::IntoResponse};
use serde_json::json;

use crate::{error::AppError, utils::identity::generate_guest_id};

/// Issues a fresh guest id.
///
/// Guests send it back in the `X-Guest-Id` header to submit attempts
/// without an account.
pub async fn issue_guest() -> Result<impl IntoResponse, AppError> {
    let guest_id = generate_guest_id();
    tracing::info!("Issued guest id {}", guest_id);

    Ok((StatusCode::CREATED, Json(json!({ "guest_id": guest_id }))))
}
