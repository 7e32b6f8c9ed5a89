//! Pull request review orchestration.
//!
//! Provides the two stages of a review run: the [`generator`] fetches the
//! diff and asks the model for a review, the [`applier`] turns the response
//! into line comments and a handoff to a human reviewer. Remote services sit
//! behind the [`host::PullRequestHost`] and [`llm::ReviewModel`] traits.

pub mod applier;
pub mod generator;
pub mod github;
pub mod host;
pub mod llm;
pub mod prompt;
pub mod response;

#[cfg(test)]
pub(crate) mod testing;
