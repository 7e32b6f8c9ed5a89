use async_trait::async_trait;
use steward_core::{CommitRef, FileDiff, PullRequest, ReviewFinding, StewardError};
use tracing::info;

/// Operations the review needs from a code-hosting service.
///
/// Implementations are bound to a single repository; pull requests are
/// addressed by number.
#[async_trait]
pub trait PullRequestHost: Send + Sync {
    /// Look up a pull request.
    async fn pull_request(&self, number: u64) -> Result<PullRequest, StewardError>;

    /// Commits of a pull request, oldest first.
    async fn commits(&self, number: u64) -> Result<Vec<CommitRef>, StewardError>;

    /// Changed files between two revisions, in the service's order.
    async fn compare(&self, base: &str, head: &str) -> Result<Vec<FileDiff>, StewardError>;

    /// Post a comment on one line of the pull request diff.
    async fn create_review_comment(
        &self,
        number: u64,
        commit: &CommitRef,
        finding: &ReviewFinding,
    ) -> Result<(), StewardError>;

    /// Add a user to the pull request's assignees.
    async fn add_assignee(&self, number: u64, login: &str) -> Result<(), StewardError>;

    /// Post a plain conversation comment.
    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), StewardError>;
}

/// A host that performs reads against `inner` but only logs writes.
///
/// Used by `--dry-run` to preview what a review would post.
pub struct DryRun<H> {
    inner: H,
}

impl<H> DryRun<H> {
    /// Wrap a host so that comments and assignments are not sent.
    pub fn new(inner: H) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl<H: PullRequestHost> PullRequestHost for DryRun<H> {
    async fn pull_request(&self, number: u64) -> Result<PullRequest, StewardError> {
        self.inner.pull_request(number).await
    }

    async fn commits(&self, number: u64) -> Result<Vec<CommitRef>, StewardError> {
        self.inner.commits(number).await
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Vec<FileDiff>, StewardError> {
        self.inner.compare(base, head).await
    }

    async fn create_review_comment(
        &self,
        number: u64,
        commit: &CommitRef,
        finding: &ReviewFinding,
    ) -> Result<(), StewardError> {
        info!(
            pr = number,
            commit = %commit.sha,
            path = %finding.path,
            line = finding.line,
            "dry run: would post line comment: {}",
            finding.comment
        );
        Ok(())
    }

    async fn add_assignee(&self, number: u64, login: &str) -> Result<(), StewardError> {
        info!(pr = number, "dry run: would assign {login}");
        Ok(())
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), StewardError> {
        info!(pr = number, "dry run: would post comment: {body}");
        Ok(())
    }
}
