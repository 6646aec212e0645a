//! Request building: wrap user text in mode-specific instructions.
//!
//! [`build`] maps an [`OperationRequest`] to a [`ModelRequest`]: the
//! instruction text plus, for extraction only, a [`ResponseShape`] asking the
//! service to constrain its output. The builder adds framing around the user
//! text and nothing else.

use crate::pipeline::input::NormalizedText;
use crate::prompts;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// Contract templates offered by the draft generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TemplateKind {
    /// Non-Disclosure Agreement (default).
    #[default]
    Nda,
    /// Statement of Work.
    Sow,
    /// Master Service Agreement.
    Msa,
}

impl TemplateKind {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            TemplateKind::Nda => "NDA",
            TemplateKind::Sow => "SOW",
            TemplateKind::Msa => "MSA",
        }
    }

    pub fn full_name(&self) -> &'static str {
        match self {
            TemplateKind::Nda => "Non-Disclosure Agreement",
            TemplateKind::Sow => "Statement of Work",
            TemplateKind::Msa => "Master Service Agreement",
        }
    }

    /// Placeholder tokens suggested for fields the user did not fill in.
    pub fn placeholders(&self) -> &'static [&'static str] {
        match self {
            TemplateKind::Nda => &[
                "Disclosing Party Name",
                "Receiving Party Name",
                "Effective Date",
                "Term of Agreement",
            ],
            TemplateKind::Sow => &[
                "Client Name",
                "Service Provider Name",
                "Project Start Date",
                "Deliverables",
                "Payment Terms",
            ],
            TemplateKind::Msa => &[
                "Customer Name",
                "Provider Name",
                "Effective Date",
                "Governing Law Jurisdiction",
            ],
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.abbreviation())
    }
}

impl FromStr for TemplateKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nda" => Ok(TemplateKind::Nda),
            "sow" => Ok(TemplateKind::Sow),
            "msa" => Ok(TemplateKind::Msa),
            other => Err(format!("unknown template '{other}' (expected nda, sow, or msa)")),
        }
    }
}

/// One operation to run against the generation service.
///
/// Each variant owns its text; requests never share buffers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationRequest {
    Extract {
        source: NormalizedText,
    },
    Compare {
        before: NormalizedText,
        after: NormalizedText,
    },
    Generate {
        template: TemplateKind,
        details: NormalizedText,
    },
}

impl OperationRequest {
    /// The texts subject to the size guard.
    pub fn texts(&self) -> Vec<&NormalizedText> {
        match self {
            OperationRequest::Extract { source } => vec![source],
            OperationRequest::Compare { before, after } => vec![before, after],
            OperationRequest::Generate { details, .. } => vec![details],
        }
    }

    pub fn mode_name(&self) -> &'static str {
        match self {
            OperationRequest::Extract { .. } => "extract",
            OperationRequest::Compare { .. } => "compare",
            OperationRequest::Generate { .. } => "generate",
        }
    }
}

/// Output-shape constraint forwarded to the service in structured-output mode.
///
/// The schema uses the service's OpenAPI-subset dialect (`OBJECT`, `ARRAY`,
/// `STRING`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResponseShape(Value);

impl ResponseShape {
    /// `{ clauses: [{ clauseType, summary, verbatimText }] }`, all three required.
    pub fn clause_list() -> Self {
        Self(json!({
            "type": "OBJECT",
            "properties": {
                "clauses": {
                    "type": "ARRAY",
                    "items": {
                        "type": "OBJECT",
                        "properties": {
                            "clauseType": { "type": "STRING" },
                            "summary": { "type": "STRING" },
                            "verbatimText": { "type": "STRING" }
                        },
                        "required": ["clauseType", "summary", "verbatimText"]
                    }
                }
            }
        }))
    }

    pub fn as_json(&self) -> &Value {
        &self.0
    }
}

/// What the transport client sends: an instruction and an optional shape.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelRequest {
    pub instruction: String,
    pub response_shape: Option<ResponseShape>,
}

/// Build the model request for an operation.
pub fn build(request: &OperationRequest) -> ModelRequest {
    let built = match request {
        OperationRequest::Extract { source } => ModelRequest {
            instruction: prompts::extraction_instruction(source.as_str()),
            response_shape: Some(ResponseShape::clause_list()),
        },
        OperationRequest::Compare { before, after } => ModelRequest {
            instruction: prompts::comparison_instruction(before.as_str(), after.as_str()),
            response_shape: None,
        },
        OperationRequest::Generate { template, details } => ModelRequest {
            instruction: prompts::generation_instruction(
                template.full_name(),
                template.abbreviation(),
                template.placeholders(),
                details.as_str(),
            ),
            response_shape: None,
        },
    };

    debug!(
        "Built {} request: {} instruction chars, shape={}",
        request.mode_name(),
        built.instruction.chars().count(),
        built.response_shape.is_some()
    );
    built
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts::GENERATION_DISCLAIMER;

    #[test]
    fn extract_attaches_clause_shape() {
        let req = build(&OperationRequest::Extract {
            source: "Clause 1. The Receiving Party shall...".into(),
        });
        assert!(req.instruction.contains("Clause 1. The Receiving Party shall..."));
        let shape = req.response_shape.expect("extraction must carry a shape");
        let required = &shape.as_json()["properties"]["clauses"]["items"]["required"];
        assert_eq!(required, &json!(["clauseType", "summary", "verbatimText"]));
    }

    #[test]
    fn compare_embeds_both_versions_without_shape() {
        let req = build(&OperationRequest::Compare {
            before: "old terms".into(),
            after: "new terms".into(),
        });
        assert!(req.response_shape.is_none());
        let a = req.instruction.find("old terms").unwrap();
        let b = req.instruction.find("new terms").unwrap();
        assert!(a < b, "Version A must precede Version B");
    }

    #[test]
    fn generate_names_template_and_keeps_details_verbatim() {
        let details = "Parties: 'Innovate Corp' & \"Data Solutions LLC\"\n  Purpose: {software}";
        let req = build(&OperationRequest::Generate {
            template: TemplateKind::Msa,
            details: details.into(),
        });
        assert!(req.response_shape.is_none());
        assert!(req.instruction.contains("Master Service Agreement"));
        assert!(req.instruction.contains(details));
        assert!(req.instruction.contains(GENERATION_DISCLAIMER));
        assert!(req.instruction.contains("[Customer Name]"));
    }

    #[test]
    fn builder_never_truncates_large_input() {
        let big = "x".repeat(100_000);
        let req = build(&OperationRequest::Extract {
            source: big.clone().into(),
        });
        assert!(req.instruction.contains(&big));
    }

    #[test]
    fn template_kind_parses_case_insensitively() {
        assert_eq!("NDA".parse::<TemplateKind>().unwrap(), TemplateKind::Nda);
        assert_eq!("sow".parse::<TemplateKind>().unwrap(), TemplateKind::Sow);
        assert_eq!(" Msa ".parse::<TemplateKind>().unwrap(), TemplateKind::Msa);
        assert!("lease".parse::<TemplateKind>().is_err());
    }

    #[test]
    fn request_texts_cover_every_side() {
        let req = OperationRequest::Compare {
            before: "a".into(),
            after: "b".into(),
        };
        assert_eq!(req.texts().len(), 2);
    }
}
