// src/services/mod.rs

pub mod failures;
pub mod progress;
pub mod scoring;
pub mod study_time;
pub mod time_tracker;
