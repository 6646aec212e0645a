//! Result types produced by a successful pipeline run.

use serde::{Deserialize, Serialize};

/// A contractual provision identified by the extraction tool.
///
/// All three fields are non-empty; the response decoder rejects anything else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Clause {
    pub clause_type: String,
    pub summary: String,
    pub verbatim_text: String,
}

/// Ordered clauses found in a document. Empty is a valid outcome.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtractionResult {
    pub clauses: Vec<Clause>,
}

impl ExtractionResult {
    pub fn is_empty(&self) -> bool {
        self.clauses.is_empty()
    }

    pub fn len(&self) -> usize {
        self.clauses.len()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffKind {
    Added,
    Removed,
    Unchanged,
}

/// One line of a comparison, marker already stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiffLine {
    pub kind: DiffKind,
    pub text: String,
}

impl DiffLine {
    pub fn added(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Added,
            text: text.into(),
        }
    }

    pub fn removed(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Removed,
            text: text.into(),
        }
    }

    pub fn unchanged(text: impl Into<String>) -> Self {
        Self {
            kind: DiffKind::Unchanged,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub lines: Vec<DiffLine>,
}

impl ComparisonResult {
    /// True when at least one line was added or removed.
    pub fn has_changes(&self) -> bool {
        self.lines.iter().any(|l| l.kind != DiffKind::Unchanged)
    }

    pub fn count(&self, kind: DiffKind) -> usize {
        self.lines.iter().filter(|l| l.kind == kind).count()
    }
}

/// A generated contract draft, verbatim from the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GenerationResult(pub String);

impl GenerationResult {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// The result of one pipeline run, tagged by mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "result", rename_all = "lowercase")]
pub enum OperationResult {
    Extraction(ExtractionResult),
    Comparison(ComparisonResult),
    Generation(GenerationResult),
}

impl OperationResult {
    /// True for an empty extraction or a comparison without changes.
    pub fn is_nothing_found(&self) -> bool {
        match self {
            OperationResult::Extraction(r) => r.is_empty(),
            OperationResult::Comparison(r) => !r.has_changes(),
            OperationResult::Generation(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clause_serialises_camel_case() {
        let c = Clause {
            clause_type: "Governing Law".into(),
            summary: "s".into(),
            verbatim_text: "v".into(),
        };
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["clauseType"], "Governing Law");
        assert_eq!(json["verbatimText"], "v");
    }

    #[test]
    fn nothing_found_semantics() {
        assert!(OperationResult::Extraction(ExtractionResult::default()).is_nothing_found());
        let only_context = ComparisonResult {
            lines: vec![DiffLine::unchanged("No differences found.")],
        };
        assert!(OperationResult::Comparison(only_context).is_nothing_found());
        let changed = ComparisonResult {
            lines: vec![DiffLine::removed("a"), DiffLine::added("b")],
        };
        assert!(!OperationResult::Comparison(changed).is_nothing_found());
        assert!(!OperationResult::Generation(GenerationResult("draft".into())).is_nothing_found());
    }
}
