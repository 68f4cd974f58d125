//! Normalize `cargo audit --json` output into problem tuples.

use crate::problem::Problem;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

#[derive(Debug, thiserror::Error)]
pub enum ExtractError {
    #[error("scanner output is not a cargo-audit JSON report: {0}")]
    Malformed(#[from] serde_json::Error),
    #[error("scanner output is not a cargo-audit JSON report: expected an object, got {0}")]
    NotAnObject(&'static str),
}

#[derive(Debug, Deserialize)]
struct AuditJson {
    /// Warning kind (`unmaintained`, `yanked`, ...) -> warnings of that kind.
    #[serde(default)]
    warnings: Option<BTreeMap<String, Vec<Entry>>>,
    /// Always present in a cargo-audit report, even a clean one.
    vulnerabilities: Vulnerabilities,
}

#[derive(Debug, Deserialize)]
struct Vulnerabilities {
    list: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    advisory: Option<Advisory>,
}

#[derive(Debug, Deserialize)]
struct Advisory {
    #[serde(default)]
    package: Option<String>,
    #[serde(default)]
    id: Option<String>,
}

/// Flatten the warnings and vulnerabilities of one scan into a set of problems.
///
/// Entries without an advisory become `(repository, None, None)`. Anything
/// that is not a cargo-audit report (an array, `{}`, an error payload) is
/// `Err`, never an empty set.
pub fn extract_problems(
    repository: &str,
    scanner_json: &str,
) -> Result<BTreeSet<Problem>, ExtractError> {
    let value: serde_json::Value = serde_json::from_str(scanner_json)?;
    if !value.is_object() {
        return Err(ExtractError::NotAnObject(json_kind(&value)));
    }
    let report: AuditJson = serde_json::from_value(value)?;

    let warnings = report
        .warnings
        .into_iter()
        .flat_map(|by_kind| by_kind.into_values())
        .flatten();
    let vulnerabilities = report.vulnerabilities.list.into_iter();

    Ok(warnings
        .chain(vulnerabilities)
        .map(|entry| match entry.advisory {
            Some(adv) => Problem::new(repository, adv.package.as_deref(), adv.id.as_deref()),
            None => Problem::unidentified(repository),
        })
        .collect())
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
