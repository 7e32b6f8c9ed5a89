use steward_core::{ReviewFinding, ReviewOutcome};

use crate::prompt::{ACTION_PREFIX, READY_MARKER};

/// Interpret the raw model response.
///
/// Everything before the first `ACTION:` is the JSON payload; a surrounding
/// Markdown code fence is tolerated. The handoff flag is a plain substring
/// test on the whole response, independent of whether the JSON parses.
///
/// # Examples
///
/// ```
/// use steward_core::ReviewOutcome;
/// use steward_review::response::parse_review_response;
///
/// let outcome = parse_review_response("[]\nACTION: READY_FOR_HUMAN_REVIEW");
/// assert_eq!(
///     outcome,
///     ReviewOutcome::Parsed { findings: vec![], ready_for_human: true }
/// );
/// ```
pub fn parse_review_response(raw: &str) -> ReviewOutcome {
    let payload = match raw.split_once(ACTION_PREFIX) {
        Some((before, _)) => before,
        None => raw,
    };

    match serde_json::from_str::<Vec<ReviewFinding>>(strip_code_fences(payload)) {
        Ok(findings) => ReviewOutcome::Parsed {
            findings,
            ready_for_human: is_ready_for_human(raw),
        },
        Err(e) => ReviewOutcome::Unparsed {
            raw: raw.to_string(),
            reason: e.to_string(),
        },
    }
}

/// Whether the response asks for a human reviewer.
pub fn is_ready_for_human(raw: &str) -> bool {
    raw.contains(READY_MARKER)
}

fn strip_code_fences(s: &str) -> &str {
    let trimmed = s.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (```json) along with the opening line.
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn finding(path: &str, line: u64, comment: &str) -> ReviewFinding {
        ReviewFinding {
            path: path.into(),
            line,
            comment: comment.into(),
        }
    }

    #[test]
    fn empty_list_with_marker() {
        let outcome = parse_review_response("[]\n\nACTION: READY_FOR_HUMAN_REVIEW\n");
        assert_eq!(
            outcome,
            ReviewOutcome::Parsed {
                findings: vec![],
                ready_for_human: true,
            }
        );
    }

    #[test]
    fn single_finding_with_marker() {
        let raw = r#"[{"path":"lib/a.dart","line":10,"comment":"fix this"}] ACTION: READY_FOR_HUMAN_REVIEW"#;
        let outcome = parse_review_response(raw);
        assert_eq!(
            outcome,
            ReviewOutcome::Parsed {
                findings: vec![finding("lib/a.dart", 10, "fix this")],
                ready_for_human: true,
            }
        );
    }

    #[test]
    fn findings_keep_model_order() {
        let raw = r#"[
            {"path":"b.dart","line":2,"comment":"second file first"},
            {"path":"a.dart","line":1,"comment":"then this"},
            {"path":"b.dart","line":2,"comment":"second file first"}
        ]"#;
        let ReviewOutcome::Parsed { findings, .. } = parse_review_response(raw) else {
            panic!("expected parsed outcome");
        };
        assert_eq!(findings.len(), 3);
        assert_eq!(findings[0].path, "b.dart");
        assert_eq!(findings[1].path, "a.dart");
        assert_eq!(findings[2], findings[0]);
    }

    #[test]
    fn missing_marker_means_not_ready() {
        let outcome = parse_review_response("[]");
        assert_eq!(
            outcome,
            ReviewOutcome::Parsed {
                findings: vec![],
                ready_for_human: false,
            }
        );
    }

    #[test]
    fn trailing_comma_is_unparsed() {
        let raw = r#"[{"path":"a.dart","line":1,"comment":"x"},] ACTION: READY_FOR_HUMAN_REVIEW"#;
        match parse_review_response(raw) {
            ReviewOutcome::Unparsed { raw: kept, reason } => {
                assert_eq!(kept, raw);
                assert!(!reason.is_empty());
            }
            other => panic!("expected unparsed, got {other:?}"),
        }
    }

    #[test]
    fn unbalanced_braces_are_unparsed() {
        let raw = r#"[{"path":"a.dart","line":1,"comment":"x"]"#;
        assert!(matches!(
            parse_review_response(raw),
            ReviewOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn object_instead_of_list_is_unparsed() {
        let raw = r#"{"comments":[]}"#;
        assert!(matches!(
            parse_review_response(raw),
            ReviewOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn entry_missing_key_is_unparsed() {
        let raw = r#"[{"path":"a.dart","comment":"no line"}]"#;
        assert!(matches!(
            parse_review_response(raw),
            ReviewOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn prose_is_unparsed() {
        let raw = "Looks good to me!\nACTION: READY_FOR_HUMAN_REVIEW";
        assert!(matches!(
            parse_review_response(raw),
            ReviewOutcome::Unparsed { .. }
        ));
    }

    #[test]
    fn marker_detection_ignores_json_validity() {
        assert!(is_ready_for_human("garbage {{ READY_FOR_HUMAN_REVIEW"));
        assert!(is_ready_for_human("[]READY_FOR_HUMAN_REVIEW"));
        assert!(!is_ready_for_human("[] ACTION: DONE"));
    }

    #[test]
    fn fenced_json_is_accepted() {
        let raw = "```json\n[{\"path\":\"a.dart\",\"line\":\"4\",\"comment\":\"x\"}]\n```\nACTION: READY_FOR_HUMAN_REVIEW";
        assert_eq!(
            parse_review_response(raw),
            ReviewOutcome::Parsed {
                findings: vec![finding("a.dart", 4, "x")],
                ready_for_human: true,
            }
        );
    }

    #[test]
    fn marker_inside_fence_is_accepted() {
        let raw = "```\n[]\nACTION: READY_FOR_HUMAN_REVIEW\n```";
        assert_eq!(
            parse_review_response(raw),
            ReviewOutcome::Parsed {
                findings: vec![],
                ready_for_human: true,
            }
        );
    }

    #[test]
    fn strip_code_fences_variants() {
        assert_eq!(strip_code_fences("  []  "), "[]");
        assert_eq!(strip_code_fences("```json\n[]\n```"), "[]");
        assert_eq!(strip_code_fences("```\n[]\n```\n"), "[]");
        assert_eq!(strip_code_fences("```json\n[]"), "[]");
    }
}
