// src/state.rs

use std::sync::Arc;

use axum::extract::FromRef;

use crate::config::Config;
use crate::services::time_tracker::StudyTimeTracker;
use crate::store::Repositories;

#[derive(Clone)]
pub struct AppState {
    pub repos: Repositories,
    pub config: Config,
    pub tracker: Arc<StudyTimeTracker>,
}

impl AppState {
    /// Builds the state with a tracker writing to the same study-time store.
    pub fn new(repos: Repositories, config: Config) -> Self {
        let tracker = Arc::new(StudyTimeTracker::new(repos.study_time.clone()));
        Self {
            repos,
            config,
            tracker,
        }
    }
}

impl FromRef<AppState> for Repositories {
    fn from_ref(state: &AppState) -> Self {
        state.repos.clone()
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

impl FromRef<AppState> for Arc<StudyTimeTracker> {
    fn from_ref(state: &AppState) -> Self {
        state.tracker.clone()
    }
}
