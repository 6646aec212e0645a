//! Response decoding: turn raw model output into a typed result.
//!
//! One decoder per mode:
//!
//! * **extraction**: strict JSON validation of `{ "clauses": [...] }`; every
//!   present clause must carry three non-empty strings. A missing or empty
//!   `clauses` array is a valid empty result.
//! * **comparison**: line-by-line translation of the diff markup. Lines that
//!   carry no marker (the summary header, stray prose) are kept as unchanged
//!   lines rather than dropped or rejected.
//! * **generation**: identity.
//!
//! All three reject output that is empty after trimming.

use crate::error::LegalDocError;
use crate::output::{
    Clause, ComparisonResult, DiffLine, ExtractionResult, GenerationResult, OperationResult,
};
use crate::pipeline::request::OperationRequest;
use crate::prompts::{DIFF_ADDED_MARKER, DIFF_CONTEXT_MARKER, DIFF_REMOVED_MARKER};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

/// Decode `raw` with the decoder matching the request's mode.
pub fn decode(request: &OperationRequest, raw: &str) -> Result<OperationResult, LegalDocError> {
    match request {
        OperationRequest::Extract { .. } => decode_extraction(raw).map(OperationResult::Extraction),
        OperationRequest::Compare { .. } => decode_comparison(raw).map(OperationResult::Comparison),
        OperationRequest::Generate { .. } => decode_generation(raw).map(OperationResult::Generation),
    }
}

// ── Extraction ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct RawPayload {
    #[serde(default)]
    clauses: Option<Vec<RawClause>>,
}

#[derive(Debug, Deserialize)]
struct RawClause {
    #[serde(default, rename = "clauseType", alias = "clause_type")]
    clause_type: Option<String>,
    #[serde(default)]
    summary: Option<String>,
    #[serde(default, rename = "verbatimText", alias = "verbatim_text")]
    verbatim_text: Option<String>,
}

/// Parse and validate a structured extraction payload.
pub fn decode_extraction(raw: &str) -> Result<ExtractionResult, LegalDocError> {
    let body = non_empty(raw)?;
    let body = strip_outer_fence(body);

    let value: Value = serde_json::from_str(body)
        .map_err(|e| LegalDocError::MalformedResponse(format!("not valid JSON: {e}")))?;
    if !value.is_object() {
        return Err(LegalDocError::MalformedResponse(
            "expected a top-level JSON object".to_string(),
        ));
    }

    let payload: RawPayload = serde_json::from_value(value)
        .map_err(|e| LegalDocError::MalformedResponse(format!("unexpected clause list: {e}")))?;

    let clauses = payload
        .clauses
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(idx, raw)| validate_clause(idx, raw))
        .collect::<Result<Vec<_>, _>>()?;

    debug!("Decoded {} clauses", clauses.len());
    Ok(ExtractionResult { clauses })
}

fn validate_clause(idx: usize, raw: RawClause) -> Result<Clause, LegalDocError> {
    let field = |value: Option<String>, name: &str| -> Result<String, LegalDocError> {
        match value {
            Some(v) if !v.trim().is_empty() => Ok(v),
            Some(_) => Err(LegalDocError::MalformedResponse(format!(
                "clause {idx}: field '{name}' is empty"
            ))),
            None => Err(LegalDocError::MalformedResponse(format!(
                "clause {idx}: missing required field '{name}'"
            ))),
        }
    };

    Ok(Clause {
        clause_type: field(raw.clause_type, "clauseType")?,
        summary: field(raw.summary, "summary")?,
        verbatim_text: field(raw.verbatim_text, "verbatimText")?,
    })
}

// ── Comparison ───────────────────────────────────────────────────────────────

/// Translate diff markup into typed lines.
pub fn decode_comparison(raw: &str) -> Result<ComparisonResult, LegalDocError> {
    let body = strip_outer_fence(non_empty(raw)?);

    let mut lines: Vec<DiffLine> = body.lines().map(classify_line).collect();
    while lines.last().is_some_and(|l| l.text.trim().is_empty()) {
        lines.pop();
    }

    let result = ComparisonResult { lines };
    debug!(
        "Decoded comparison: {} lines, changes={}",
        result.lines.len(),
        result.has_changes()
    );
    Ok(result)
}

fn classify_line(line: &str) -> DiffLine {
    if let Some(rest) = line.strip_prefix(DIFF_REMOVED_MARKER) {
        DiffLine::removed(rest)
    } else if let Some(rest) = line.strip_prefix(DIFF_ADDED_MARKER) {
        DiffLine::added(rest)
    } else if let Some(rest) = line.strip_prefix(DIFF_CONTEXT_MARKER) {
        DiffLine::unchanged(rest)
    } else {
        DiffLine::unchanged(line)
    }
}

// ── Generation ───────────────────────────────────────────────────────────────

/// Identity, except that empty output is an error.
pub fn decode_generation(raw: &str) -> Result<GenerationResult, LegalDocError> {
    non_empty(raw)?;
    Ok(GenerationResult(raw.to_string()))
}

// ── Shared helpers ───────────────────────────────────────────────────────────

fn non_empty(raw: &str) -> Result<&str, LegalDocError> {
    if raw.trim().is_empty() {
        Err(LegalDocError::EmptyResponse)
    } else {
        Ok(raw)
    }
}

static RE_OUTER_FENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)^```[A-Za-z]*[ \t]*\r?\n(.*?)\r?\n```\s*$").unwrap());

/// Remove a single code fence wrapping the whole output, if present.
fn strip_outer_fence(input: &str) -> &str {
    let trimmed = input.trim();
    match RE_OUTER_FENCE.captures(trimmed).and_then(|c| c.get(1)) {
        Some(m) => m.as_str(),
        None => input,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::DiffKind;
    use pretty_assertions::assert_eq;

    #[test]
    fn extraction_single_clause() {
        let raw = r#"{"clauses":[{"clauseType":"Confidentiality","summary":"s","verbatimText":"v"}]}"#;
        let result = decode_extraction(raw).unwrap();
        assert_eq!(
            result.clauses,
            vec![Clause {
                clause_type: "Confidentiality".into(),
                summary: "s".into(),
                verbatim_text: "v".into(),
            }]
        );
    }

    #[test]
    fn extraction_empty_or_absent_array_is_empty_result() {
        assert!(decode_extraction(r#"{"clauses":[]}"#).unwrap().is_empty());
        assert!(decode_extraction("{}").unwrap().is_empty());
        assert!(decode_extraction(r#"{"clauses":null}"#).unwrap().is_empty());
    }

    #[test]
    fn extraction_missing_field_is_malformed() {
        let raw = r#"{"clauses":[{"clauseType":"Confidentiality","summary":"s"}]}"#;
        match decode_extraction(raw) {
            Err(LegalDocError::MalformedResponse(msg)) => assert!(msg.contains("verbatimText"), "{msg}"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn extraction_empty_field_is_malformed() {
        let raw = r#"{"clauses":[{"clauseType":" ","summary":"s","verbatimText":"v"}]}"#;
        assert!(matches!(
            decode_extraction(raw),
            Err(LegalDocError::MalformedResponse(_))
        ));
    }

    #[test]
    fn extraction_rejects_wrong_types_and_shapes() {
        for raw in [
            "not json",
            r#"[{"clauseType":"a","summary":"b","verbatimText":"c"}]"#,
            r#"{"clauses":{"clauseType":"a"}}"#,
            r#"{"clauses":[{"clauseType":1,"summary":"b","verbatimText":"c"}]}"#,
            r#"{"clauses":["Confidentiality"]}"#,
        ] {
            assert!(
                matches!(decode_extraction(raw), Err(LegalDocError::MalformedResponse(_))),
                "should reject {raw}"
            );
        }
    }

    #[test]
    fn extraction_accepts_snake_case_aliases_and_fences() {
        let raw = "```json\n{\"clauses\":[{\"clause_type\":\"Governing Law\",\"summary\":\"s\",\"verbatim_text\":\"v\"}]}\n```";
        let result = decode_extraction(raw).unwrap();
        assert_eq!(result.clauses[0].clause_type, "Governing Law");
    }

    #[test]
    fn extraction_preserves_order() {
        let raw = r#"{"clauses":[
            {"clauseType":"A","summary":"1","verbatimText":"x"},
            {"clauseType":"B","summary":"2","verbatimText":"y"},
            {"clauseType":"C","summary":"3","verbatimText":"z"}]}"#;
        let types: Vec<_> = decode_extraction(raw)
            .unwrap()
            .clauses
            .into_iter()
            .map(|c| c.clause_type)
            .collect();
        assert_eq!(types, vec!["A", "B", "C"]);
    }

    #[test]
    fn comparison_classifies_lines_in_order() {
        let raw = "Summary line\n- old text\n+ new text\n  unchanged text\n";
        let result = decode_comparison(raw).unwrap();
        assert_eq!(
            result.lines,
            vec![
                DiffLine::unchanged("Summary line"),
                DiffLine::removed("old text"),
                DiffLine::added("new text"),
                DiffLine::unchanged("unchanged text"),
            ]
        );
    }

    #[test]
    fn comparison_passes_unmarked_lines_through() {
        let raw = "**Key changes:** term extended\n\n-no space marker\n+ added";
        let result = decode_comparison(raw).unwrap();
        assert_eq!(result.lines.len(), 4);
        assert_eq!(result.lines[0], DiffLine::unchanged("**Key changes:** term extended"));
        assert_eq!(result.lines[1], DiffLine::unchanged(""));
        assert_eq!(result.lines[2], DiffLine::unchanged("-no space marker"));
        assert_eq!(result.lines[3].kind, DiffKind::Added);
    }

    #[test]
    fn comparison_handles_crlf_and_fences() {
        let raw = "```diff\r\nSummary\r\n- a\r\n+ b\r\n```";
        let result = decode_comparison(raw).unwrap();
        assert_eq!(
            result.lines,
            vec![
                DiffLine::unchanged("Summary"),
                DiffLine::removed("a"),
                DiffLine::added("b"),
            ]
        );
    }

    #[test]
    fn comparison_without_markers_has_no_changes() {
        let result = decode_comparison("The two versions are identical.").unwrap();
        assert!(!result.has_changes());
    }

    #[test]
    fn generation_is_identity() {
        let raw = "MUTUAL NDA\n\n[Disclosing Party Name] ...\n  indented  \n";
        assert_eq!(decode_generation(raw).unwrap().as_str(), raw);
    }

    #[test]
    fn every_decoder_rejects_empty_output() {
        for raw in ["", "   \n\t"] {
            assert_eq!(decode_extraction(raw), Err(LegalDocError::EmptyResponse));
            assert_eq!(decode_comparison(raw), Err(LegalDocError::EmptyResponse));
            assert_eq!(decode_generation(raw), Err(LegalDocError::EmptyResponse));
        }
    }

    #[test]
    fn decode_dispatches_by_request_mode() {
        let req = OperationRequest::Generate {
            template: Default::default(),
            details: "d".into(),
        };
        assert!(matches!(
            decode(&req, "draft"),
            Ok(OperationResult::Generation(_))
        ));
    }
}
