use std::fmt;
use std::str::FromStr;

use serde::{de, Deserialize, Deserializer, Serialize};

use crate::error::StewardError;

/// A GitHub repository identified by owner and name.
///
/// # Examples
///
/// ```
/// use steward_core::RepoId;
///
/// let repo: RepoId = "flutter/flutter-intellij".parse().unwrap();
/// assert_eq!(repo.owner, "flutter");
/// assert_eq!(repo.name, "flutter-intellij");
/// assert_eq!(repo.to_string(), "flutter/flutter-intellij");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    /// Account or organization that owns the repository.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl RepoId {
    /// Build a repository identifier from its parts.
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepoId {
    type Err = StewardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((owner, name))
                if !owner.is_empty() && !name.is_empty() && !name.contains('/') =>
            {
                Ok(Self::new(owner, name))
            }
            _ => Err(StewardError::Config(format!(
                "invalid repository '{s}', expected owner/name"
            ))),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = StewardError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(repo: RepoId) -> Self {
        repo.to_string()
    }
}

/// The parts of a pull request needed to compute its diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PullRequest {
    /// Pull request number.
    pub number: u64,
    /// Commit the pull request is based on.
    pub base_sha: String,
    /// Tip of the pull request branch.
    pub head_sha: String,
}

/// A commit that review comments are anchored to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitRef {
    /// Full commit SHA.
    pub sha: String,
}

/// One changed file from a base/head comparison.
///
/// # Examples
///
/// ```
/// use steward_core::FileDiff;
///
/// let diff = FileDiff {
///     filename: "lib/main.dart".into(),
///     patch: Some("@@ -1 +1 @@\n-a\n+b".into()),
/// };
/// assert_eq!(diff.patch_text(), "@@ -1 +1 @@\n-a\n+b");
///
/// let binary = FileDiff { filename: "logo.png".into(), patch: None };
/// assert_eq!(binary.patch_text(), "");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct FileDiff {
    /// Path of the file in the head revision.
    pub filename: String,
    /// Unified patch text. GitHub omits it for binary or oversized files.
    #[serde(default)]
    pub patch: Option<String>,
}

impl FileDiff {
    /// Patch text, empty when the service did not provide one.
    pub fn patch_text(&self) -> &str {
        self.patch.as_deref().unwrap_or_default()
    }
}

/// A single line-level finding emitted by the model.
///
/// `line` accepts either a JSON integer or a string holding one.
///
/// # Examples
///
/// ```
/// use steward_core::ReviewFinding;
///
/// let f: ReviewFinding =
///     serde_json::from_str(r#"{"path":"lib/a.dart","line":"10","comment":"fix this"}"#).unwrap();
/// assert_eq!(f.line, 10);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReviewFinding {
    /// File path relative to the repository root.
    pub path: String,
    /// Line number in the new version of the file.
    #[serde(deserialize_with = "deserialize_line")]
    pub line: u64,
    /// Feedback text posted as the comment body.
    pub comment: String,
}

fn deserialize_line<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Line {
        Number(u64),
        Text(String),
    }

    match Line::deserialize(deserializer)? {
        Line::Number(n) => Ok(n),
        Line::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid line number: {s:?}"))),
    }
}

/// Result of interpreting the model's raw response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewOutcome {
    /// The JSON payload parsed into findings.
    Parsed {
        /// Findings in the order the model emitted them.
        findings: Vec<ReviewFinding>,
        /// Whether the handoff marker was present.
        ready_for_human: bool,
    },
    /// The payload could not be interpreted; the raw text is kept for posting.
    Unparsed {
        /// The complete model response.
        raw: String,
        /// Why parsing failed.
        reason: String,
    },
}
