//! Core types, configuration, and error handling for Steward.
//!
//! This crate provides the shared foundation used by the other Steward crates:
//! - [`StewardError`]: unified error type using `thiserror` and `miette`
//! - [`StewardConfig`]: configuration loaded from `.steward.toml` and the environment
//! - Shared types: [`RepoId`], [`PullRequest`], [`CommitRef`], [`FileDiff`],
//!   [`ReviewFinding`], [`ReviewOutcome`]

mod config;
mod error;
mod types;

pub use config::{GitHubConfig, LlmConfig, ReviewConfig, StewardConfig};
pub use error::StewardError;
pub use types::{CommitRef, FileDiff, PullRequest, RepoId, ReviewFinding, ReviewOutcome};

/// A convenience `Result` type for Steward operations.
pub type Result<T> = std::result::Result<T, StewardError>;
