//! apiscan: find where a codebase calls into a known API surface, and how.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
