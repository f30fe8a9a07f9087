//! HTTP handlers

pub mod health;
pub mod classify;
pub mod corrections;
pub mod rules;
