use std::fmt;

use steward_core::{CommitRef, ReviewFinding, ReviewOutcome, StewardError};
use tracing::{error, info, warn};

use crate::generator::GeneratedReview;
use crate::host::PullRequestHost;
use crate::response::parse_review_response;

/// What the applier did to the pull request.
///
/// # Examples
///
/// ```
/// use steward_review::applier::ApplyReport;
///
/// let report = ApplyReport { comments_posted: 2, handed_off: true, fallback: false };
/// assert_eq!(report.to_string(), "posted 2 line comments, handed off to reviewer");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    /// Line comments successfully posted.
    pub comments_posted: usize,
    /// Whether the reviewer was assigned and notified.
    pub handed_off: bool,
    /// Whether the raw response was posted as a fallback comment.
    pub fallback: bool,
}

impl fmt::Display for ApplyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.comments_posted == 1 {
            "comment"
        } else {
            "comments"
        };
        write!(f, "posted {} line {noun}", self.comments_posted)?;
        if self.handed_off {
            write!(f, ", handed off to reviewer")?;
        }
        if self.fallback {
            write!(f, ", posted raw response as fallback")?;
        }
        Ok(())
    }
}

/// Body of the comment announcing the handoff.
pub fn handoff_message(reviewer: &str) -> String {
    format!("AI Review complete. Reassigning to @{reviewer} for final sign-off.")
}

/// Body of the comment carrying an uninterpretable response.
pub fn fallback_message(raw: &str) -> String {
    format!("AI Review Error: {raw}")
}

/// Second stage of a review run: model response in, pull request actions out.
pub struct CommentApplier<'a> {
    host: &'a dyn PullRequestHost,
    number: u64,
    reviewer: &'a str,
}

impl<'a> CommentApplier<'a> {
    /// Create an applier for pull request `number` handing off to `reviewer`.
    pub fn new(host: &'a dyn PullRequestHost, number: u64, reviewer: &'a str) -> Self {
        Self {
            host,
            number,
            reviewer,
        }
    }

    /// Post the review.
    ///
    /// A parsed response becomes one line comment per finding, in order, all
    /// anchored to the review's commit, then a handoff when the marker is
    /// present. If the response does not parse, or any of those calls fails,
    /// the raw response is posted as a single comment instead and no handoff
    /// happens. Comments posted before a failure stay.
    ///
    /// # Errors
    ///
    /// Returns [`StewardError::GitHub`] only if the fallback comment itself
    /// cannot be posted.
    pub async fn apply(&self, review: &GeneratedReview) -> Result<ApplyReport, StewardError> {
        match parse_review_response(&review.raw) {
            ReviewOutcome::Parsed {
                findings,
                ready_for_human,
            } => {
                let mut posted = 0;
                let result = self
                    .apply_structured(&findings, ready_for_human, &review.commit, &mut posted)
                    .await;
                match result {
                    Ok(handed_off) => Ok(ApplyReport {
                        comments_posted: posted,
                        handed_off,
                        fallback: false,
                    }),
                    Err(e) => {
                        error!(
                            pr = self.number,
                            posted, "failed to apply review comments: {e}"
                        );
                        self.post_fallback(&review.raw).await?;
                        Ok(ApplyReport {
                            comments_posted: posted,
                            handed_off: false,
                            fallback: true,
                        })
                    }
                }
            }
            ReviewOutcome::Unparsed { raw, reason } => {
                warn!(pr = self.number, "error parsing AI response: {reason}");
                self.post_fallback(&raw).await?;
                Ok(ApplyReport {
                    comments_posted: 0,
                    handed_off: false,
                    fallback: true,
                })
            }
        }
    }

    async fn apply_structured(
        &self,
        findings: &[ReviewFinding],
        ready_for_human: bool,
        commit: &CommitRef,
        posted: &mut usize,
    ) -> Result<bool, StewardError> {
        for finding in findings {
            self.host
                .create_review_comment(self.number, commit, finding)
                .await?;
            *posted += 1;
        }
        info!(pr = self.number, count = *posted, "posted line comments");

        if !ready_for_human {
            return Ok(false);
        }
        self.host.add_assignee(self.number, self.reviewer).await?;
        self.host
            .create_issue_comment(self.number, &handoff_message(self.reviewer))
            .await?;
        info!(pr = self.number, reviewer = self.reviewer, "handed off for human review");
        Ok(true)
    }

    async fn post_fallback(&self, raw: &str) -> Result<(), StewardError> {
        self.host
            .create_issue_comment(self.number, &fallback_message(raw))
            .await
    }
}
