use std::fmt::Write;

use steward_core::FileDiff;

/// Prefix the model writes before its handoff marker.
pub const ACTION_PREFIX: &str = "ACTION:";

/// Marker signalling the change is ready for a human reviewer.
pub const READY_MARKER: &str = "READY_FOR_HUMAN_REVIEW";

/// Concatenate changed files into the diff blob embedded in the prompt.
///
/// Files keep the order the hosting service returned them in.
///
/// # Examples
///
/// ```
/// use steward_core::FileDiff;
/// use steward_review::prompt::diff_blob;
///
/// let files = vec![FileDiff { filename: "a.dart".into(), patch: Some("+x".into()) }];
/// assert_eq!(diff_blob(&files), "File: a.dart\n+x\n\n");
/// ```
pub fn diff_blob(files: &[FileDiff]) -> String {
    let mut blob = String::new();
    for file in files {
        let _ = write!(blob, "File: {}\n{}\n\n", file.filename, file.patch_text());
    }
    blob
}

/// Build the review prompt from the standards document and diff blob.
///
/// The output instructions are the contract with the model: a JSON array of
/// `{"path", "line", "comment"}` objects followed by
/// `ACTION: READY_FOR_HUMAN_REVIEW`.
///
/// # Examples
///
/// ```
/// use steward_review::prompt::build_review_prompt;
///
/// let prompt = build_review_prompt("my project", "No unwraps.", "File: a.rs\n+x\n\n");
/// assert!(prompt.contains("No unwraps."));
/// assert!(prompt.contains("ACTION: READY_FOR_HUMAN_REVIEW"));
/// ```
pub fn build_review_prompt(project: &str, standards: &str, diff: &str) -> String {
    format!(
        "Review this PR for {project} based on these standards:\n\
         {standards}\n\
         \n\
         PR DIFF:\n\
         {diff}\n\
         \n\
         INSTRUCTIONS:\n\
         Return your review as a JSON list of objects. Each object MUST have:\n\
         \"path\": (the file path),\n\
         \"line\": (the line number in the new code),\n\
         \"comment\": (your feedback).\n\
         \n\
         If no issues are found, return an empty list [].\n\
         Finally, append the string \"{ACTION_PREFIX} {READY_MARKER}\" at the very end outside the JSON.\n"
    )
}
