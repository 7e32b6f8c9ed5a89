use std::path::Path;

use steward_core::{CommitRef, ReviewConfig, StewardError};
use tracing::info;

use crate::host::PullRequestHost;
use crate::llm::ReviewModel;
use crate::prompt;

/// Prompt and anchor commit for a pull request, ready to send to the model.
#[derive(Debug, Clone)]
pub struct PreparedReview {
    /// Full prompt text.
    pub prompt: String,
    /// Latest commit of the pull request.
    pub commit: CommitRef,
    /// Number of changed files embedded in the prompt.
    pub files_changed: usize,
}

/// The model's verbatim response and the commit to anchor comments on.
#[derive(Debug, Clone)]
pub struct GeneratedReview {
    /// Raw response text.
    pub raw: String,
    /// Latest commit of the pull request.
    pub commit: CommitRef,
}

/// First stage of a review run: diff + standards in, model response out.
pub struct ReviewGenerator<'a> {
    host: &'a dyn PullRequestHost,
    model: &'a dyn ReviewModel,
    config: &'a ReviewConfig,
}

impl<'a> ReviewGenerator<'a> {
    /// Create a generator over the given services and review settings.
    pub fn new(
        host: &'a dyn PullRequestHost,
        model: &'a dyn ReviewModel,
        config: &'a ReviewConfig,
    ) -> Self {
        Self {
            host,
            model,
            config,
        }
    }

    /// Fetch everything the prompt needs without calling the model.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::GitHub`] if the pull request does not exist or
    /// has no commits, and [`StewardError::FileNotFound`] or
    /// [`StewardError::Io`] if the standards document cannot be read.
    pub async fn prepare(&self, number: u64) -> Result<PreparedReview, StewardError> {
        let pr = self.host.pull_request(number).await?;
        let standards = read_standards(&self.config.standards_path)?;

        let commit = self
            .host
            .commits(number)
            .await?
            .pop()
            .ok_or_else(|| StewardError::GitHub(format!("pull request #{number} has no commits")))?;

        let files = self.host.compare(&pr.base_sha, &pr.head_sha).await?;
        info!(
            pr = number,
            files = files.len(),
            commit = %commit.sha,
            "collected pull request diff"
        );

        let diff = prompt::diff_blob(&files);
        Ok(PreparedReview {
            prompt: prompt::build_review_prompt(&self.config.project, &standards, &diff),
            commit,
            files_changed: files.len(),
        })
    }

    /// Send a prepared prompt to the model.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::Llm`] if the model call fails.
    pub async fn complete(&self, prepared: PreparedReview) -> Result<GeneratedReview, StewardError> {
        info!(model = self.model.model(), "requesting review");
        let raw = self.model.generate(&prepared.prompt).await?;
        Ok(GeneratedReview {
            raw,
            commit: prepared.commit,
        })
    }

    /// Prepare and complete in one step.
    ///
    /// # Errors
    ///
    /// See [`ReviewGenerator::prepare`] and [`ReviewGenerator::complete`].
    pub async fn generate(&self, number: u64) -> Result<GeneratedReview, StewardError> {
        let prepared = self.prepare(number).await?;
        self.complete(prepared).await
    }
}

fn read_standards(path: &Path) -> Result<String, StewardError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StewardError::FileNotFound(path.to_path_buf()),
        _ => StewardError::Io(e),
    })
}
