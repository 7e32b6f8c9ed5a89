//! In-memory fakes for the host and model traits.

use std::sync::Mutex;

use async_trait::async_trait;
use steward_core::{CommitRef, FileDiff, PullRequest, ReviewFinding, StewardError};

use crate::host::PullRequestHost;
use crate::llm::ReviewModel;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    ReviewComment {
        commit: String,
        path: String,
        line: u64,
        body: String,
    },
    Assign(String),
    IssueComment(String),
}

pub(crate) struct FakeHost {
    pr: Option<PullRequest>,
    commits: Vec<CommitRef>,
    files: Vec<FileDiff>,
    fail_review_comment_at: Option<usize>,
    fail_assign: bool,
    calls: Mutex<Vec<Call>>,
}

impl FakeHost {
    pub(crate) fn with_pull_request(number: u64) -> Self {
        Self {
            pr: Some(PullRequest {
                number,
                base_sha: "base".into(),
                head_sha: "head".into(),
            }),
            commits: vec![CommitRef { sha: "c1".into() }, CommitRef { sha: "c2".into() }],
            files: vec![
                FileDiff {
                    filename: "lib/a.dart".into(),
                    patch: Some("@@ -1 +1 @@\n-old\n+new".into()),
                },
                FileDiff {
                    filename: "assets/logo.png".into(),
                    patch: None,
                },
            ],
            fail_review_comment_at: None,
            fail_assign: false,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn missing() -> Self {
        Self {
            pr: None,
            commits: Vec::new(),
            files: Vec::new(),
            ..Self::with_pull_request(0)
        }
    }

    pub(crate) fn without_commits(mut self) -> Self {
        self.commits.clear();
        self
    }

    /// Fail the review comment with this zero-based index.
    pub(crate) fn failing_review_comment_at(mut self, index: usize) -> Self {
        self.fail_review_comment_at = Some(index);
        self
    }

    pub(crate) fn failing_assign(mut self) -> Self {
        self.fail_assign = true;
        self
    }

    pub(crate) fn writes(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn review_comment_count(&self) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|c| matches!(c, Call::ReviewComment { .. }))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }
}

#[async_trait]
impl PullRequestHost for FakeHost {
    async fn pull_request(&self, number: u64) -> Result<PullRequest, StewardError> {
        self.pr
            .clone()
            .filter(|pr| pr.number == number)
            .ok_or_else(|| StewardError::GitHub(format!("pull request #{number}: Not Found")))
    }

    async fn commits(&self, number: u64) -> Result<Vec<CommitRef>, StewardError> {
        self.pull_request(number).await?;
        Ok(self.commits.clone())
    }

    async fn compare(&self, base: &str, head: &str) -> Result<Vec<FileDiff>, StewardError> {
        match &self.pr {
            Some(pr) if pr.base_sha == base && pr.head_sha == head => Ok(self.files.clone()),
            _ => Err(StewardError::GitHub(format!("no comparison {base}...{head}"))),
        }
    }

    async fn create_review_comment(
        &self,
        _number: u64,
        commit: &CommitRef,
        finding: &ReviewFinding,
    ) -> Result<(), StewardError> {
        if self.fail_review_comment_at == Some(self.review_comment_count()) {
            return Err(StewardError::GitHub(
                "Unprocessable Entity: line could not be resolved".into(),
            ));
        }
        self.record(Call::ReviewComment {
            commit: commit.sha.clone(),
            path: finding.path.clone(),
            line: finding.line,
            body: finding.comment.clone(),
        });
        Ok(())
    }

    async fn add_assignee(&self, _number: u64, login: &str) -> Result<(), StewardError> {
        if self.fail_assign {
            return Err(StewardError::GitHub("Forbidden".into()));
        }
        self.record(Call::Assign(login.to_string()));
        Ok(())
    }

    async fn create_issue_comment(&self, _number: u64, body: &str) -> Result<(), StewardError> {
        self.record(Call::IssueComment(body.to_string()));
        Ok(())
    }
}

pub(crate) struct FakeModel {
    response: String,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub(crate) fn replying(response: &str) -> Self {
        Self {
            response: response.to_string(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl ReviewModel for FakeModel {
    fn model(&self) -> &str {
        "fake-model"
    }

    async fn generate(&self, prompt: &str) -> Result<String, StewardError> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        Ok(self.response.clone())
    }
}
