//! Command handlers for the WildLens console.

pub mod auth;
pub mod jobs;
pub mod logs;
