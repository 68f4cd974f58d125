//! The `explain` use case: look up check/code documentation.

use auditgate_types::explain::{self, Explanation};

#[derive(Clone, Debug)]
pub enum ExplainOutput {
    Found(Explanation),
    /// Unknown identifier; carries what would have been accepted.
    NotFound {
        identifier: String,
        available_check_ids: &'static [&'static str],
        available_codes: &'static [&'static str],
    },
}

/// Look up an explanation for a check_id or code. Surrounding whitespace is ignored.
pub fn run_explain(identifier: &str) -> ExplainOutput {
    let identifier = identifier.trim();
    match explain::lookup_explanation(identifier) {
        Some(exp) => ExplainOutput::Found(exp),
        None => ExplainOutput::NotFound {
            identifier: identifier.to_string(),
            available_check_ids: explain::all_check_ids(),
            available_codes: explain::all_codes(),
        },
    }
}

fn heading(out: &mut String, title: &str, underline: char) {
    out.push_str(title);
    out.push('\n');
    out.extend(std::iter::repeat_n(underline, title.chars().count()));
    out.push('\n');
}

fn fenced(out: &mut String, label: &str, body: &str) {
    out.push_str(label);
    out.push_str(":\n```toml\n");
    out.push_str(body);
    out.push_str("\n```\n");
}

/// Format an explanation for terminal display.
pub fn format_explanation(exp: &Explanation) -> String {
    let mut out = String::new();

    heading(&mut out, exp.title, '=');
    out.push('\n');
    out.push_str(exp.description);
    out.push_str("\n\n");

    heading(&mut out, "Remediation", '-');
    out.push_str(exp.remediation);
    out.push_str("\n\n");

    heading(&mut out, "Configuration", '-');
    out.push('\n');
    fenced(&mut out, "Before", exp.examples.before);
    out.push('\n');
    fenced(&mut out, "After", exp.examples.after);

    out
}

/// Format the "not found" error message for terminal display.
pub fn format_not_found(identifier: &str, check_ids: &[&str], codes: &[&str]) -> String {
    let mut out = format!("Unknown check_id or code: {identifier}\n\n");

    out.push_str("Available check_ids:\n");
    for id in check_ids {
        out.push_str(&format!("  - {id}\n"));
    }
    out.push_str("\nAvailable codes:\n");
    for code in codes {
        out.push_str(&format!("  - {code}\n"));
    }

    out
}
