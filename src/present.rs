//! Presentation state and rendering.
//!
//! [`Presentation`] is what a front end shows for a session: a spinner, an
//! error banner, a "nothing found" notice, or a result. An empty result is
//! never rendered as an error.
//!
//! Model output is untrusted: every renderer that produces markup escapes it
//! first.

use crate::output::{ComparisonResult, DiffKind, ExtractionResult, GenerationResult, OperationResult};
use crate::prompts::{DIFF_ADDED_MARKER, DIFF_CONTEXT_MARKER, DIFF_REMOVED_MARKER};
use crate::session::{SessionSnapshot, SessionState};
use std::fmt::Write;

pub const NO_CLAUSES_MESSAGE: &str =
    "No specific clauses could be identified. The text might be too short or not a standard contract.";

pub const NO_DIFFERENCES_MESSAGE: &str =
    "No differences were identified between the two versions.";

#[derive(Debug, Clone, PartialEq)]
pub enum Presentation {
    /// Nothing to show yet.
    Idle,
    /// A decode or submit is in flight.
    Working,
    /// Short, user-facing error banner.
    Error(String),
    /// The run succeeded but found nothing.
    NothingFound(String),
    Clauses(ExtractionResult),
    Diff(ComparisonResult),
    Draft(GenerationResult),
}

impl Presentation {
    pub fn from_snapshot(snapshot: &SessionSnapshot) -> Self {
        match snapshot.state {
            SessionState::Parsing | SessionState::Submitting => return Presentation::Working,
            SessionState::Succeeded => {
                if let Some(result) = &snapshot.result {
                    return Self::from_result(result);
                }
            }
            SessionState::Idle | SessionState::Ready | SessionState::Failed => {}
        }

        match &snapshot.error {
            Some(e) => Presentation::Error(e.user_message(snapshot.tool.action())),
            None => Presentation::Idle,
        }
    }

    pub fn from_result(result: &OperationResult) -> Self {
        match result {
            OperationResult::Extraction(r) if r.is_empty() => {
                Presentation::NothingFound(NO_CLAUSES_MESSAGE.to_string())
            }
            OperationResult::Comparison(r) if !r.has_changes() => {
                Presentation::NothingFound(NO_DIFFERENCES_MESSAGE.to_string())
            }
            OperationResult::Extraction(r) => Presentation::Clauses(r.clone()),
            OperationResult::Comparison(r) => Presentation::Diff(r.clone()),
            OperationResult::Generation(r) => Presentation::Draft(r.clone()),
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Presentation::Error(_))
    }
}

// ── Markup ───────────────────────────────────────────────────────────────────

/// Escape `&`, `<`, `>`, `"` and `'`.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 16);
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn marker(kind: DiffKind) -> &'static str {
    match kind {
        DiffKind::Removed => DIFF_REMOVED_MARKER,
        DiffKind::Added => DIFF_ADDED_MARKER,
        DiffKind::Unchanged => DIFF_CONTEXT_MARKER,
    }
}

/// One `<p>` per diff line, marker kept, classed by kind.
pub fn diff_to_html(result: &ComparisonResult) -> String {
    let mut html = String::new();
    for line in &result.lines {
        let class = match line.kind {
            DiffKind::Removed => "diff-removed",
            DiffKind::Added => "diff-added",
            DiffKind::Unchanged => "diff-context",
        };
        let _ = writeln!(
            html,
            "<p class=\"{class}\">{}{}</p>",
            escape_html(marker(line.kind)),
            escape_html(&line.text)
        );
    }
    html
}

pub fn clauses_to_html(result: &ExtractionResult) -> String {
    let mut html = String::new();
    for clause in &result.clauses {
        let _ = write!(
            html,
            "<section class=\"clause\">\n<h4>{}</h4>\n<p class=\"clause-summary\"><strong>Summary:</strong> {}</p>\n<pre class=\"clause-text\">{}</pre>\n</section>\n",
            escape_html(&clause.clause_type),
            escape_html(&clause.summary),
            escape_html(&clause.verbatim_text)
        );
    }
    html
}

pub fn draft_to_html(result: &GenerationResult) -> String {
    format!("<pre class=\"draft\">{}</pre>\n", escape_html(result.as_str()))
}

/// Render a result as HTML, or the nothing-found notice.
pub fn to_html(result: &OperationResult) -> String {
    match Presentation::from_result(result) {
        Presentation::NothingFound(msg) => format!("<p class=\"nothing-found\">{}</p>\n", escape_html(&msg)),
        Presentation::Clauses(r) => clauses_to_html(&r),
        Presentation::Diff(r) => diff_to_html(&r),
        Presentation::Draft(r) => draft_to_html(&r),
        Presentation::Idle | Presentation::Working | Presentation::Error(_) => String::new(),
    }
}

// ── Plain text ───────────────────────────────────────────────────────────────

/// Render a result for a terminal.
pub fn to_text(result: &OperationResult) -> String {
    match Presentation::from_result(result) {
        Presentation::NothingFound(msg) => format!("{msg}\n"),
        Presentation::Clauses(r) => {
            let mut out = String::new();
            for (i, clause) in r.clauses.iter().enumerate() {
                if i > 0 {
                    out.push('\n');
                }
                let _ = writeln!(out, "## {}", clause.clause_type);
                let _ = writeln!(out, "Summary: {}", clause.summary);
                for line in clause.verbatim_text.lines() {
                    let _ = writeln!(out, "> {line}");
                }
            }
            out
        }
        Presentation::Diff(r) => {
            let mut out = String::new();
            for line in &r.lines {
                let _ = writeln!(out, "{}{}", marker(line.kind), line.text);
            }
            out
        }
        Presentation::Draft(r) => {
            let mut out = r.as_str().to_string();
            if !out.ends_with('\n') {
                out.push('\n');
            }
            out
        }
        Presentation::Idle | Presentation::Working | Presentation::Error(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LegalDocError;
    use crate::output::{Clause, DiffLine};
    use crate::pipeline::request::TemplateKind;
    use crate::session::Tool;

    fn snapshot(state: SessionState) -> SessionSnapshot {
        SessionSnapshot {
            tool: Tool::ClauseExtractor,
            state,
            template: TemplateKind::Nda,
            inputs: Vec::new(),
            result: None,
            error: None,
        }
    }

    #[test]
    fn empty_extraction_is_nothing_found_not_error() {
        let mut snap = snapshot(SessionState::Succeeded);
        snap.result = Some(OperationResult::Extraction(ExtractionResult::default()));
        assert_eq!(
            Presentation::from_snapshot(&snap),
            Presentation::NothingFound(NO_CLAUSES_MESSAGE.into())
        );
    }

    #[test]
    fn comparison_without_changes_is_nothing_found() {
        let result = OperationResult::Comparison(ComparisonResult {
            lines: vec![DiffLine::unchanged("The documents are identical.")],
        });
        assert!(matches!(
            Presentation::from_result(&result),
            Presentation::NothingFound(_)
        ));
    }

    #[test]
    fn failed_session_shows_tool_message() {
        let mut snap = snapshot(SessionState::Failed);
        snap.error = Some(LegalDocError::EmptyResponse);
        match Presentation::from_snapshot(&snap) {
            Presentation::Error(msg) => assert!(msg.starts_with("Failed to extract clauses")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn busy_states_show_working() {
        assert_eq!(Presentation::from_snapshot(&snapshot(SessionState::Parsing)), Presentation::Working);
        assert_eq!(
            Presentation::from_snapshot(&snapshot(SessionState::Submitting)),
            Presentation::Working
        );
        assert_eq!(Presentation::from_snapshot(&snapshot(SessionState::Ready)), Presentation::Idle);
    }

    #[test]
    fn diff_html_escapes_model_text() {
        let result = ComparisonResult {
            lines: vec![
                DiffLine::removed("<script>alert(1)</script>"),
                DiffLine::added("Fees & \"expenses\""),
                DiffLine::unchanged("Term"),
            ],
        };
        let html = diff_to_html(&result);
        assert!(!html.contains("<script>"));
        assert!(html.contains("<p class=\"diff-removed\">- &lt;script&gt;alert(1)&lt;/script&gt;</p>"));
        assert!(html.contains("<p class=\"diff-added\">+ Fees &amp; &quot;expenses&quot;</p>"));
        assert!(html.contains("<p class=\"diff-context\">  Term</p>"));
    }

    #[test]
    fn clause_html_escapes_every_field() {
        let result = ExtractionResult {
            clauses: vec![Clause {
                clause_type: "<b>Liability</b>".into(),
                summary: "caps at 1 < 2".into(),
                verbatim_text: "A & B".into(),
            }],
        };
        let html = clauses_to_html(&result);
        assert!(html.contains("&lt;b&gt;Liability&lt;/b&gt;"));
        assert!(html.contains("caps at 1 &lt; 2"));
        assert!(html.contains("A &amp; B"));
    }

    #[test]
    fn text_rendering_keeps_diff_markers() {
        let result = OperationResult::Comparison(ComparisonResult {
            lines: vec![
                DiffLine::unchanged("Summary"),
                DiffLine::removed("old"),
                DiffLine::added("new"),
            ],
        });
        assert_eq!(to_text(&result), "  Summary\n- old\n+ new\n");
    }
}
