//! Developer tasks (schema generation, report validation, explain coverage).
//!
//! Keeping this separate avoids bloating the end-user CLI.

use anyhow::{Context, bail};
use auditgate_test_util::normalize_nondeterministic;
use auditgate_types::{explain, ids};
use schemars::schema_for;
use std::fs;
use std::path::{Path, PathBuf};

/// The workspace root (parent of the xtask directory).
fn project_root() -> anyhow::Result<PathBuf> {
    let manifest_dir = match std::env::var("CARGO_MANIFEST_DIR") {
        Ok(dir) => PathBuf::from(dir),
        Err(_) => std::env::current_dir().context("cannot determine current directory")?,
    };

    if manifest_dir.ends_with("xtask") {
        manifest_dir
            .parent()
            .map(Path::to_path_buf)
            .context("xtask has no parent directory")
    } else {
        Ok(manifest_dir)
    }
}

fn schemas_dir() -> anyhow::Result<PathBuf> {
    Ok(project_root()?.join("schemas"))
}

struct SchemaTarget {
    filename: &'static str,
    generate: fn() -> schemars::Schema,
}

fn generate_report_schema() -> schemars::Schema {
    schema_for!(auditgate_types::AuditReport)
}

fn generate_config_schema() -> schemars::Schema {
    schema_for!(auditgate_settings::AuditgateConfigV1)
}

fn schema_targets() -> Vec<SchemaTarget> {
    vec![
        SchemaTarget {
            filename: "auditgate.report.v1.json",
            generate: generate_report_schema,
        },
        SchemaTarget {
            filename: "auditgate.config.v1.json",
            generate: generate_config_schema,
        },
    ]
}

/// Pretty-printed JSON with a trailing newline.
fn serialize_schema(schema: &schemars::Schema) -> anyhow::Result<String> {
    let mut json = serde_json::to_string_pretty(schema).context("Failed to serialize schema")?;
    json.push('\n');
    Ok(json)
}

fn emit_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    fs::create_dir_all(&dir).context("Failed to create schemas directory")?;

    for target in schema_targets() {
        let json = serialize_schema(&(target.generate)())?;
        let path = dir.join(target.filename);
        fs::write(&path, &json)
            .with_context(|| format!("Failed to write schema to {}", path.display()))?;
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Fail if `schemas/` is missing a file or differs from what the types generate.
fn validate_schemas() -> anyhow::Result<()> {
    let dir = schemas_dir()?;
    let mut stale = Vec::new();

    for target in schema_targets() {
        let path = dir.join(target.filename);
        let expected = serialize_schema(&(target.generate)())?;
        match fs::read_to_string(&path) {
            Ok(actual) if actual == expected => {}
            Ok(_) => stale.push(format!("{} (out of date)", target.filename)),
            Err(_) => stale.push(format!("{} (missing)", target.filename)),
        }
    }

    if stale.is_empty() {
        println!("All schemas are up to date.");
        return Ok(());
    }
    for name in &stale {
        eprintln!("  - {}", name);
    }
    eprintln!("\nRun `cargo xtask emit-schemas` to regenerate.");
    bail!("Schema validation failed")
}

fn is_sha256_hex(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

/// Problems with a report beyond what its JSON schema can express.
fn report_hygiene(report: &serde_json::Value) -> Vec<String> {
    let mut errors = Vec::new();
    let findings = report
        .get("findings")
        .and_then(|f| f.as_array())
        .cloned()
        .unwrap_or_default();

    for (i, f) in findings.iter().enumerate() {
        let check_id = f.get("check_id").and_then(|v| v.as_str()).unwrap_or_default();
        let code = f.get("code").and_then(|v| v.as_str()).unwrap_or_default();

        if check_id == ids::CHECK_TOOL_RUNTIME {
            continue;
        }
        if explain::lookup_explanation(check_id).is_none() {
            errors.push(format!("findings[{i}]: unknown check_id {check_id:?}"));
        }
        if explain::lookup_explanation(code).is_none() {
            errors.push(format!("findings[{i}]: unknown code {code:?}"));
        }
        match f.get("fingerprint").and_then(|v| v.as_str()) {
            Some(fp) if is_sha256_hex(fp) => {}
            Some(fp) => errors.push(format!("findings[{i}]: malformed fingerprint {fp:?}")),
            None => errors.push(format!("findings[{i}]: missing fingerprint")),
        }
    }

    errors
}

/// Validate a report file against the generated report schema plus hygiene rules.
fn validate_report(path: &Path) -> anyhow::Result<()> {
    let text =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let report: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not JSON", path.display()))?;

    let schema = serde_json::to_value(generate_report_schema())?;
    let validator = jsonschema::validator_for(&schema)
        .map_err(|e| anyhow::anyhow!("Failed to compile report schema: {e}"))?;

    let mut errors: Vec<String> = validator
        .iter_errors(&report)
        .map(|e| format!("schema: {e}"))
        .collect();
    errors.extend(report_hygiene(&report));

    if errors.is_empty() {
        let normalized = normalize_nondeterministic(report);
        println!("{} is a valid auditgate report", path.display());
        println!("{}", serde_json::to_string_pretty(&normalized)?);
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {}", error);
    }
    bail!("{} has {} problems", path.display(), errors.len())
}

/// Every check id and code must have a complete explanation.
fn explain_coverage() -> anyhow::Result<()> {
    let mut errors = Vec::new();

    for id in explain::all_check_ids().iter().chain(explain::all_codes()) {
        match explain::lookup_explanation(id) {
            Some(exp) => {
                for (field, value) in [
                    ("title", exp.title),
                    ("description", exp.description),
                    ("remediation", exp.remediation),
                ] {
                    if value.trim().is_empty() {
                        errors.push(format!("'{id}' has empty {field}"));
                    }
                }
            }
            None => errors.push(format!("'{id}' has no explanation")),
        }
    }

    if errors.is_empty() {
        println!(
            "{} check IDs and {} codes have explanations",
            explain::all_check_ids().len(),
            explain::all_codes().len()
        );
        return Ok(());
    }
    for error in &errors {
        eprintln!("  - {}", error);
    }
    bail!("Explain coverage failed with {} errors", errors.len())
}

fn print_help() {
    eprintln!("xtask commands:");
    eprintln!("  help                    Show this message");
    eprintln!("  emit-schemas            Generate JSON schemas from Rust types to schemas/");
    eprintln!("  validate-schemas        Check if schemas/ matches generated output (for CI)");
    eprintln!("  validate-report <path>  Validate a report against the report schema");
    eprintln!("  print-schema-ids        Print known schema IDs");
    eprintln!("  explain-coverage        Validate all check IDs and codes have explanations");
}

fn main() -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().collect();
    let cmd = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match cmd {
        "help" | "--help" | "-h" => {
            print_help();
            Ok(())
        }
        "emit-schemas" => emit_schemas(),
        "validate-schemas" => validate_schemas(),
        "validate-report" => match args.get(2) {
            Some(path) => validate_report(Path::new(path)),
            None => bail!("usage: cargo xtask validate-report <path>"),
        },
        "explain-coverage" => explain_coverage(),
        "print-schema-ids" => {
            for target in schema_targets() {
                println!("{}", target.filename.trim_end_matches(".json"));
            }
            Ok(())
        }
        other => bail!("unknown xtask command: {other}\n\nRun `cargo xtask help` for usage."),
    }
    .context("xtask failed")
}
