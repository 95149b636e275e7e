// src/routes.rs

use axum::{
    Router,
    http::{HeaderName, Method},
    middleware,
    routing::{get, post, put},
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{
    handlers::{auth, catalog, failures, quiz, stats},
    state::AppState,
    utils::{
        identity::{GUEST_HEADER, identity_middleware},
        jwt::auth_middleware,
    },
};

/// Assembles the main application router.
///
/// * Merges all sub-routers (auth, tests, failures, stats).
/// * Applies global middleware (Trace, CORS).
/// * Injects global state (stores, config, study-time tracker).
pub fn create_router(state: AppState) -> Router {
    let origins = [
        axum::http::HeaderValue::from_static("http://localhost:3000"),
        axum::http::HeaderValue::from_static("http://127.0.0.1:3000"),
    ];

    let cors = CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            HeaderName::from_static(GUEST_HEADER),
        ]);

    let auth_routes = Router::new().route("/guest", post(auth::issue_guest));

    let test_routes = Router::new()
        .route("/", get(catalog::list_tests))
        .route("/{id}", get(catalog::get_test))
        .merge(
            Router::new()
                .route("/{id}/description", put(catalog::update_description))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    auth_middleware,
                )),
        )
        // Users and guests may both submit attempts
        .merge(
            Router::new()
                .route("/{id}/attempts", post(quiz::submit_attempt))
                .layer(middleware::from_fn_with_state(
                    state.clone(),
                    identity_middleware,
                )),
        );

    let failure_routes = Router::new()
        .route("/", get(failures::list_failures))
        .route("/all", get(failures::all_failures))
        .route("/review", post(failures::review_all))
        .route("/{test_id}", get(failures::test_failures))
        .route("/{test_id}/review", post(failures::review_test))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    let stats_routes = Router::new()
        .route("/progress", get(stats::progress))
        .route("/tests", get(stats::test_summaries))
        .route("/time", get(stats::time_stats))
        .route("/time/start", post(stats::start_tracking))
        .route("/time/stop", post(stats::stop_tracking))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .nest("/api/auth", auth_routes)
        .nest("/api/tests", test_routes)
        .nest("/api/failures", failure_routes)
        .nest("/api/stats", stats_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
