//! Core types, configuration, and error handling for git2effort.
//!
//! This crate provides the shared foundation used by the other crates:
//! - [`EffortError`]: unified error type using `thiserror`
//! - [`Git2EffortConfig`]: configuration loaded from `.git2effort.toml`
//! - Shared types: [`Period`], [`OutputFormat`]

mod config;
mod error;
mod types;

pub use config::{EffortConfig, Git2EffortConfig, HistoryConfig, VALID_PERIOD_LENGTHS};
pub use error::EffortError;
pub use types::{OutputFormat, Period};

/// A convenience `Result` type for git2effort operations.
pub type Result<T> = std::result::Result<T, EffortError>;
