use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use steward_core::{CommitRef, FileDiff, PullRequest, RepoId, ReviewFinding, StewardError};
use tracing::debug;

use crate::host::PullRequestHost;

const COMMITS_PER_PAGE: usize = 100;

/// GitHub REST client bound to one repository.
///
/// # Examples
///
/// ```no_run
/// use steward_core::RepoId;
/// use steward_review::github::GitHubClient;
///
/// let client = GitHubClient::new("ghp_xxxx", RepoId::new("flutter", "flutter-intellij"), None).unwrap();
/// ```
pub struct GitHubClient {
    octocrab: octocrab::Octocrab,
    repo: RepoId,
}

impl GitHubClient {
    /// Create a client for `repo` authenticated with `token`.
    ///
    /// `api_base` points the client at a GitHub Enterprise instance.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::GitHub`] if the client cannot be built.
    pub fn new(token: &str, repo: RepoId, api_base: Option<&str>) -> Result<Self, StewardError> {
        let mut builder = octocrab::Octocrab::builder().personal_token(token.to_string());
        if let Some(base) = api_base {
            builder = builder
                .base_uri(base)
                .map_err(|e| StewardError::Config(format!("invalid GitHub API base '{base}': {e}")))?;
        }
        let octocrab = builder
            .build()
            .map_err(|e| StewardError::GitHub(format!("failed to create GitHub client: {e}")))?;

        Ok(Self { octocrab, repo })
    }

    /// The repository this client targets.
    pub fn repo(&self) -> &RepoId {
        &self.repo
    }

    fn route(&self, tail: &str) -> String {
        repo_route(&self.repo, tail)
    }
}

/// Build a REST route below `/repos/{owner}/{name}`.
///
/// # Examples
///
/// ```
/// use steward_core::RepoId;
/// use steward_review::github::repo_route;
///
/// let repo = RepoId::new("flutter", "flutter-intellij");
/// assert_eq!(
///     repo_route(&repo, "/pulls/42"),
///     "/repos/flutter/flutter-intellij/pulls/42"
/// );
/// ```
pub fn repo_route(repo: &RepoId, tail: &str) -> String {
    format!("/repos/{}/{}{tail}", repo.owner, repo.name)
}

#[derive(Deserialize)]
struct PullResponse {
    number: u64,
    base: GitRef,
    head: GitRef,
}

#[derive(Deserialize)]
struct GitRef {
    sha: String,
}

#[derive(Deserialize)]
struct CommitResponse {
    sha: String,
}

#[derive(Deserialize)]
struct Comparison {
    #[serde(default)]
    files: Vec<FileDiff>,
}

#[derive(Serialize)]
struct PageParams {
    per_page: usize,
    page: u32,
}

#[derive(Serialize)]
struct NewReviewComment<'a> {
    body: &'a str,
    commit_id: &'a str,
    path: &'a str,
    line: u64,
    side: &'static str,
}

#[async_trait]
impl PullRequestHost for GitHubClient {
    async fn pull_request(&self, number: u64) -> Result<PullRequest, StewardError> {
        let route = self.route(&format!("/pulls/{number}"));
        debug!(%route, "fetching pull request");
        let pr: PullResponse = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| {
                StewardError::GitHub(format!(
                    "failed to fetch pull request {}#{number}: {e}",
                    self.repo
                ))
            })?;

        Ok(PullRequest {
            number: pr.number,
            base_sha: pr.base.sha,
            head_sha: pr.head.sha,
        })
    }

    async fn commits(&self, number: u64) -> Result<Vec<CommitRef>, StewardError> {
        let route = self.route(&format!("/pulls/{number}/commits"));
        let mut commits = Vec::new();
        let mut page = 1;
        loop {
            debug!(%route, page, "fetching pull request commits");
            let batch: Vec<CommitResponse> = self
                .octocrab
                .get(
                    &route,
                    Some(&PageParams {
                        per_page: COMMITS_PER_PAGE,
                        page,
                    }),
                )
                .await
                .map_err(|e| StewardError::GitHub(format!("failed to list commits: {e}")))?;

            let last_page = batch.len() < COMMITS_PER_PAGE;
            commits.extend(batch.into_iter().map(|c| CommitRef { sha: c.sha }));
            if last_page {
                break;
            }
            page += 1;
        }
        Ok(commits)
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Vec<FileDiff>, StewardError> {
        let route = self.route(&format!("/compare/{base}...{head}"));
        debug!(%route, "comparing revisions");
        let comparison: Comparison = self
            .octocrab
            .get(route, None::<&()>)
            .await
            .map_err(|e| StewardError::GitHub(format!("failed to compare {base}...{head}: {e}")))?;
        Ok(comparison.files)
    }

    async fn create_review_comment(
        &self,
        number: u64,
        commit: &CommitRef,
        finding: &ReviewFinding,
    ) -> Result<(), StewardError> {
        let route = self.route(&format!("/pulls/{number}/comments"));
        debug!(%route, path = %finding.path, line = finding.line, "posting line comment");
        let body = NewReviewComment {
            body: &finding.comment,
            commit_id: &commit.sha,
            path: &finding.path,
            line: finding.line,
            side: "RIGHT",
        };
        let _response: serde_json::Value =
            self.octocrab.post(route, Some(&body)).await.map_err(|e| {
                StewardError::GitHub(format!(
                    "failed to comment on {}:{}: {e}",
                    finding.path, finding.line
                ))
            })?;
        Ok(())
    }

    async fn add_assignee(&self, number: u64, login: &str) -> Result<(), StewardError> {
        let route = self.route(&format!("/issues/{number}/assignees"));
        debug!(%route, login, "assigning reviewer");
        let body = serde_json::json!({ "assignees": [login] });
        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| StewardError::GitHub(format!("failed to assign {login}: {e}")))?;
        Ok(())
    }

    async fn create_issue_comment(&self, number: u64, body: &str) -> Result<(), StewardError> {
        let route = self.route(&format!("/issues/{number}/comments"));
        debug!(%route, "posting comment");
        let body = serde_json::json!({ "body": body });
        let _response: serde_json::Value = self
            .octocrab
            .post(route, Some(&body))
            .await
            .map_err(|e| StewardError::GitHub(format!("failed to post comment: {e}")))?;
        Ok(())
    }
}
