//! Explain registry for checks and codes.
//!
//! Maps check IDs and codes to human-readable explanations with remediation guidance.

use crate::ids;

/// Explanation entry for a check or code.
#[derive(Debug, Clone)]
pub struct Explanation {
    /// Short description of the check/code.
    pub title: &'static str,
    /// What the check does and why it exists.
    pub description: &'static str,
    /// How to resolve findings.
    pub remediation: &'static str,
    /// Before/after `auditgate.toml` examples.
    pub examples: ExamplePair,
}

/// Before and after configuration examples.
#[derive(Debug, Clone)]
pub struct ExamplePair {
    /// Configuration that produces a finding.
    pub before: &'static str,
    /// Configuration that resolves it.
    pub after: &'static str,
}

/// Look up an explanation by check_id or code.
///
/// Returns `None` if the identifier is not recognized.
pub fn lookup_explanation(identifier: &str) -> Option<Explanation> {
    match identifier {
        // Check IDs
        ids::CHECK_AUDIT_ADVISORIES => Some(explain_advisories()),
        ids::CHECK_AUDIT_EXCEPTIONS => Some(explain_exceptions()),
        ids::CHECK_AUDIT_SCAN => Some(explain_scan()),

        // Codes
        ids::CODE_UNMATCHED_ADVISORY => Some(explain_unmatched_advisory()),
        ids::CODE_SKIPPED_ADVISORY => Some(explain_skipped_advisory()),
        ids::CODE_EXPIRED_EXCEPTION => Some(explain_expired_exception()),
        ids::CODE_UNUSED_EXCEPTION => Some(explain_unused_exception()),
        ids::CODE_CHECKOUT_FAILED => Some(explain_checkout_failed()),
        ids::CODE_NO_MANIFEST => Some(explain_no_manifest()),
        ids::CODE_SCAN_FAILED => Some(explain_scan_failed()),

        _ => None,
    }
}

/// List all known check IDs.
pub fn all_check_ids() -> &'static [&'static str] {
    &[
        ids::CHECK_AUDIT_ADVISORIES,
        ids::CHECK_AUDIT_EXCEPTIONS,
        ids::CHECK_AUDIT_SCAN,
    ]
}

/// List all known codes.
pub fn all_codes() -> &'static [&'static str] {
    &[
        ids::CODE_UNMATCHED_ADVISORY,
        ids::CODE_SKIPPED_ADVISORY,
        ids::CODE_EXPIRED_EXCEPTION,
        ids::CODE_UNUSED_EXCEPTION,
        ids::CODE_CHECKOUT_FAILED,
        ids::CODE_NO_MANIFEST,
        ids::CODE_SCAN_FAILED,
    ]
}

const EXCEPTION_BEFORE: &str = r#"# no exception configured"#;

const EXCEPTION_AFTER: &str = r#"[[skip_advisories]]
repository = "grmtools"
package = "chrono"
advisory = "RUSTSEC-2020-0159"
expires = "2021-12-01"
reason = "no patched release yet""#;

// --- Check-level explanations ---

fn explain_advisories() -> Explanation {
    Explanation {
        title: "Unresolved Advisories",
        description: "\
Runs `cargo audit -D warnings` in every audited repository and reports each
distinct advisory (vulnerability or warning) surfaced by the scanner.

Any advisory without a matching exception fails the repository, and a single
failing repository fails the run.",
        remediation: "\
Upgrade or replace the affected dependency so the advisory no longer applies.
If that is not possible yet, add a time-bounded entry to `skip_advisories`.",
        examples: ExamplePair {
            before: EXCEPTION_BEFORE,
            after: EXCEPTION_AFTER,
        },
    }
}

fn explain_exceptions() -> Explanation {
    Explanation {
        title: "Advisory Exceptions",
        description: "\
Tracks the lifecycle of configured exceptions (`skip_advisories`).

Each exception is a (repository, package, advisory) pattern with an expiry
date. Any field may be `*`. An exact match is preferred over wildcard rules;
among wildcard rules the first one in configuration order wins.

- an active exception skips the advisory
- an expired exception (expiry on or before today) fails the repository
- an exception that matched nothing is reported as unused",
        remediation: "\
Renew expired exceptions only after re-checking the advisory. Remove unused
exceptions: they usually mean the dependency was already fixed.",
        examples: ExamplePair {
            before: r#"[[skip_advisories]]
repository = "*"
package = "*"
advisory = "*"
expires = "2030-01-01""#,
            after: EXCEPTION_AFTER,
        },
    }
}

fn explain_scan() -> Explanation {
    Explanation {
        title: "Repository Scan",
        description: "\
Covers everything that has to work before advisories can be matched: updating
the checkout, finding a Cargo manifest in each audit directory, and parsing the
scanner's JSON output.

These failures bypass exception matching entirely; no exception can skip them.",
        remediation: "\
Check the log output for the failing repository. Fix credentials or network
access for checkout failures, configure `audit_dirs` for repositories whose
manifest is not at the top level, and make sure `cargo audit` is installed.",
        examples: ExamplePair {
            before: r#"# repository keeps its workspace in a sub-directory"#,
            after: r#"[[audit_dirs]]
owner = "ykjit"
name = "ykcbf"
dirs = ["lang_tests"]"#,
        },
    }
}

// --- Code-level explanations ---

fn explain_unmatched_advisory() -> Explanation {
    Explanation {
        title: "Advisory Without Exception",
        description: "\
The scanner reported an advisory and no configured exception matches it.

Advisories the scanner reports without package or id information are
compared as missing values and only match rules using `*` for that field or
omitting the field.",
        remediation: "\
Upgrade the dependency, or add a time-bounded exception while a fix is pending.",
        examples: ExamplePair {
            before: EXCEPTION_BEFORE,
            after: EXCEPTION_AFTER,
        },
    }
}

fn explain_skipped_advisory() -> Explanation {
    Explanation {
        title: "Advisory Skipped",
        description: "\
An advisory matched an active exception and did not fail the repository.

This is informational. The exception stops applying on its expiry date.",
        remediation: "\
Nothing to do now. Track the upstream fix so the exception can be removed
before it expires.",
        examples: ExamplePair {
            before: EXCEPTION_AFTER,
            after: "# exception removed once the dependency is upgraded",
        },
    }
}

fn explain_expired_exception() -> Explanation {
    Explanation {
        title: "Expired Exception",
        description: "\
An advisory matched an exception whose expiry date is today or in the past.

Expired exceptions fail the repository. They are reported separately from
advisories without any exception so it is clear the problem was known and
postponed too long.",
        remediation: "\
Fix the dependency and remove the exception, or, after re-evaluating the
advisory, move the expiry date forward.",
        examples: ExamplePair {
            before: r#"[[skip_advisories]]
repository = "snare"
package = "time"
advisory = "RUSTSEC-2020-0071"
expires = "2021-12-01""#,
            after: r#"[[skip_advisories]]
repository = "snare"
package = "time"
advisory = "RUSTSEC-2020-0071"
expires = "2022-06-01"
reason = "re-evaluated: not reachable from snare""#,
        },
    }
}

fn explain_unused_exception() -> Explanation {
    Explanation {
        title: "Unused Exception",
        description: "\
A configured exception matched no advisory during the whole run.

This does not fail the run unless `fail_on_unused_exceptions = true`.
Single-repository runs only consider exceptions that can apply to that
repository.",
        remediation: "\
Remove the exception from `skip_advisories`.",
        examples: ExamplePair {
            before: EXCEPTION_AFTER,
            after: EXCEPTION_BEFORE,
        },
    }
}

fn explain_checkout_failed() -> Explanation {
    Explanation {
        title: "Checkout Failed",
        description: "\
`git clone`, `git pull`, or `git submodule update` failed for the repository.",
        remediation: "\
Inspect the working copy under `work_dir`. Local changes or a rewritten
upstream history usually require deleting the directory so it is cloned afresh.",
        examples: ExamplePair {
            before: r#"work_dir = "work""#,
            after: r#"work_dir = "work"  # rm -rf work/<owner>/<name> and re-run"#,
        },
    }
}

fn explain_no_manifest() -> Explanation {
    Explanation {
        title: "No Cargo Manifest",
        description: "\
An audit directory of the repository does not contain a `Cargo.toml`, so
there is nothing to audit there.",
        remediation: "\
Point `audit_dirs` at the directories that contain the Cargo workspaces, or
add the repository to `skip_repos`.",
        examples: ExamplePair {
            before: r#"# audits the checkout root by default"#,
            after: r#"[[audit_dirs]]
owner = "softdevteam"
name = "error_recovery_experiment"
dirs = ["runner/java_parser"]"#,
        },
    }
}

fn explain_scan_failed() -> Explanation {
    Explanation {
        title: "Scan Failed",
        description: "\
The scanner could not be started, or its output was not the JSON document
`cargo audit --json` produces.",
        remediation: "\
Run `auditgate install-scanner`, or set `cargo` to a toolchain that has
`cargo-audit` installed. The scanner's stderr is logged for the failing repository.",
        examples: ExamplePair {
            before: r#"cargo = "cargo""#,
            after: r#"cargo = ".cargo/bin/cargo""#,
        },
    }
}
