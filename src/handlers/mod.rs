// src/handlers/mod.rs

pub mod auth;
pub mod catalog;
pub mod failures;
pub mod quiz;
pub mod stats;
