// src/utils/mod.rs

pub mod html;
pub mod identity;
pub mod jwt;
