//! Instruction templates for the three operation modes.
//!
//! All fixed framing text lives here so the request builder only does
//! substitution, and unit tests can inspect the wording directly. User text is
//! inserted verbatim between the framing; it is never truncated or rewritten.

/// Example clause categories named in the extraction instruction.
///
/// The list is open-ended: the model may report other categories.
pub const CLAUSE_CATEGORY_EXAMPLES: &[&str] = &[
    "Limitation of Liability",
    "Confidentiality",
    "Term and Termination",
    "Governing Law",
    "Indemnification",
];

/// Marker for lines only in the first document.
pub const DIFF_REMOVED_MARKER: &str = "- ";
/// Marker for lines only in the second document.
pub const DIFF_ADDED_MARKER: &str = "+ ";
/// Marker for context lines present in both documents.
pub const DIFF_CONTEXT_MARKER: &str = "  ";

/// Closing sentence every generated draft must end with.
pub const GENERATION_DISCLAIMER: &str = "This is an AI-generated draft and not legal advice. \
Consult with a qualified legal professional before use.";

/// Build the clause-extraction instruction.
pub fn extraction_instruction(contract_text: &str) -> String {
    let examples = CLAUSE_CATEGORY_EXAMPLES
        .iter()
        .map(|c| format!("\"{c}\""))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "Analyze the following legal contract text. Identify and extract key clauses. \
For each clause, provide:\n\
1. The type of clause (e.g., {examples}).\n\
2. A brief, one-sentence summary of the clause's core purpose.\n\
3. The exact verbatim text of the clause.\n\
\n\
If the text does not appear to be a contract or is too short, return an empty list.\n\
\n\
Contract Text:\n\
---\n\
{contract_text}\n\
---"
    )
}

/// Build the version-comparison instruction.
pub fn comparison_instruction(before: &str, after: &str) -> String {
    format!(
        "You are a legal contract comparison tool. Compare the two contract versions below \
(Version A and Version B).\n\
Identify and list the differences in a \"diff\" format.\n\
- Start each line removed from Version A with \"{removed}\" (a minus sign and a space).\n\
- Start each line added in Version B with \"{added}\" (a plus sign and a space).\n\
- Start each unchanged line shown for context with two spaces.\n\
- Provide a brief summary of the key changes at the very top, before the diff lines.\n\
\n\
--- VERSION A ---\n\
{before}\n\
\n\
--- VERSION B ---\n\
{after}",
        removed = DIFF_REMOVED_MARKER,
        added = DIFF_ADDED_MARKER,
    )
}

/// Build the draft-generation instruction.
pub fn generation_instruction(
    full_name: &str,
    abbreviation: &str,
    placeholders: &[&str],
    details: &str,
) -> String {
    let placeholders = placeholders
        .iter()
        .map(|p| format!("[{p}]"))
        .collect::<Vec<_>>()
        .join(", ");

    format!(
        "You are a basic contract generation assistant. Generate a simple {abbreviation} \
({full_name}).\n\
Incorporate the following details provided by the user.\n\
The output should be a complete, well-formatted contract draft.\n\
Use clear bracketed placeholders like {placeholders}, etc., wherever specific \
information is needed and was not provided.\n\
Add a clear disclaimer at the very bottom stating: \"{GENERATION_DISCLAIMER}\"\n\
\n\
User-provided details:\n\
---\n\
{details}\n\
---"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_names_every_example_category() {
        let p = extraction_instruction("x");
        for c in CLAUSE_CATEGORY_EXAMPLES {
            assert!(p.contains(c), "missing {c}");
        }
        assert!(p.contains("return an empty list"));
    }

    #[test]
    fn comparison_describes_all_three_markers() {
        let p = comparison_instruction("a", "b");
        assert!(p.contains("\"- \""));
        assert!(p.contains("\"+ \""));
        assert!(p.contains("two spaces"));
        assert!(p.contains("summary"));
    }

    #[test]
    fn generation_mandates_disclaimer() {
        let p = generation_instruction("Statement of Work", "SOW", &["Client Name"], "d");
        assert!(p.contains(GENERATION_DISCLAIMER));
        assert!(p.contains("[Client Name]"));
        assert!(p.contains("Statement of Work"));
    }
}
