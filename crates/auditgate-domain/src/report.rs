use crate::aggregate::{AuditOutcome, HardFailure, RepositoryOutcome};
use crate::fingerprint::fingerprint_for_finding;
use crate::matcher::{Classification, Verdict};
use crate::registry::ExceptionRule;
use auditgate_types::{AuditData, Finding, Severity, Verdict as ReportVerdict, format_iso_date, ids};
use serde_json::json;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReportPolicy {
    /// Treat exceptions that matched nothing as errors.
    pub fail_on_unused_exceptions: bool,
}

#[derive(Clone, Debug, Default)]
pub struct SeverityCounts {
    pub info: u32,
    pub warning: u32,
    pub error: u32,
}

impl SeverityCounts {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut counts = SeverityCounts::default();
        for f in findings {
            match f.severity {
                Severity::Info => counts.info += 1,
                Severity::Warning => counts.warning += 1,
                Severity::Error => counts.error += 1,
            }
        }
        counts
    }
}

#[derive(Clone, Debug)]
pub struct DomainReport {
    pub verdict: ReportVerdict,
    pub findings: Vec<Finding>,
    pub data: AuditData,
    pub counts: SeverityCounts,
}

pub fn build_report(outcome: &AuditOutcome, policy: ReportPolicy) -> DomainReport {
    let mut findings: Vec<Finding> = Vec::new();

    for repo in &outcome.repositories {
        push_repository_findings(repo, &mut findings);
    }
    for rule in &outcome.unused_exceptions {
        findings.push(unused_exception_finding(rule, policy));
    }

    findings.sort_by(compare_findings);

    let verdict = if outcome.passed(policy.fail_on_unused_exceptions) {
        ReportVerdict::Pass
    } else {
        ReportVerdict::Fail
    };
    let counts = SeverityCounts::from_findings(&findings);

    let data = AuditData {
        repositories_scanned: count(outcome.repositories.len()),
        repositories_failed: outcome
            .failing_repositories
            .iter()
            .map(ToString::to_string)
            .collect(),
        problems_total: count(outcome.problems_total()),
        exceptions_configured: count(outcome.exceptions_configured),
        exceptions_unused: outcome
            .unused_exceptions
            .iter()
            .map(ExceptionRule::summary)
            .collect(),
    };

    DomainReport {
        verdict,
        findings,
        data,
        counts,
    }
}

fn count(n: usize) -> u32 {
    u32::try_from(n).unwrap_or(u32::MAX)
}

fn push_repository_findings(repo: &RepositoryOutcome, out: &mut Vec<Finding>) {
    let repository = repo.id.to_string();
    for failure in &repo.hard_failures {
        out.push(hard_failure_finding(&repository, failure));
    }
    for c in &repo.classifications {
        out.push(classification_finding(&repository, c));
    }
}

fn finding(
    severity: Severity,
    check_id: &str,
    code: &str,
    message: String,
    repository: Option<&str>,
    package: Option<&str>,
    advisory_id: Option<&str>,
) -> Finding {
    Finding {
        severity,
        check_id: check_id.to_string(),
        code: code.to_string(),
        message,
        repository: repository.map(str::to_string),
        package: package.map(str::to_string),
        advisory_id: advisory_id.map(str::to_string),
        help: None,
        url: None,
        fingerprint: Some(fingerprint_for_finding(
            check_id,
            code,
            repository,
            package,
            advisory_id,
            None,
        )),
        data: serde_json::Value::Null,
    }
}

/// `repository` is the `owner/name` of the outcome the problem was recorded under.
fn classification_finding(repository: &str, c: &Classification) -> Finding {
    let p = &c.problem;
    let (severity, check_id, code) = match c.verdict {
        Verdict::Unmatched => (
            Severity::Error,
            ids::CHECK_AUDIT_ADVISORIES,
            ids::CODE_UNMATCHED_ADVISORY,
        ),
        Verdict::SkippedExpired => (
            Severity::Error,
            ids::CHECK_AUDIT_EXCEPTIONS,
            ids::CODE_EXPIRED_EXCEPTION,
        ),
        Verdict::SkippedActive => (
            Severity::Info,
            ids::CHECK_AUDIT_EXCEPTIONS,
            ids::CODE_SKIPPED_ADVISORY,
        ),
    };

    let mut f = finding(
        severity,
        check_id,
        code,
        c.note(),
        Some(repository),
        p.package.as_deref(),
        p.advisory_id.as_deref(),
    );
    match &c.rule {
        None => {
            f.help = Some(
                "Upgrade the dependency, or add a time-bounded entry to skip_advisories."
                    .to_string(),
            );
            f.url = p
                .advisory_id
                .as_deref()
                .filter(|id| id.starts_with("RUSTSEC-"))
                .map(|id| format!("https://rustsec.org/advisories/{id}"));
        }
        Some(rule) => {
            f.data = json!({
                "rule": rule.key.to_string(),
                "expires": format_iso_date(rule.expires),
            });
            if c.verdict == Verdict::SkippedExpired {
                f.help = Some("Fix the dependency or renew the exception.".to_string());
            }
        }
    }
    f
}

fn hard_failure_finding(repository: &str, failure: &HardFailure) -> Finding {
    let code = failure.kind.code();
    let mut f = finding(
        Severity::Error,
        ids::CHECK_AUDIT_SCAN,
        code,
        failure.message.clone(),
        Some(repository),
        None,
        None,
    );
    if let Some(dir) = &failure.dir {
        f.fingerprint = Some(fingerprint_for_finding(
            ids::CHECK_AUDIT_SCAN,
            code,
            Some(repository),
            None,
            None,
            Some(dir.as_str()),
        ));
        f.data = json!({ "dir": dir.as_str() });
    }
    f
}

fn unused_exception_finding(rule: &ExceptionRule, policy: ReportPolicy) -> Finding {
    let severity = if policy.fail_on_unused_exceptions {
        Severity::Error
    } else {
        Severity::Warning
    };
    let summary = rule.summary();
    let mut f = finding(
        severity,
        ids::CHECK_AUDIT_EXCEPTIONS,
        ids::CODE_UNUSED_EXCEPTION,
        format!("exception {} matched no advisory", rule.key),
        None,
        Some(&summary.package),
        Some(&summary.advisory),
    );
    // Unused rules are identified by their pattern, so the repository pattern
    // has to be part of the fingerprint.
    f.fingerprint = Some(fingerprint_for_finding(
        ids::CHECK_AUDIT_EXCEPTIONS,
        ids::CODE_UNUSED_EXCEPTION,
        Some(&summary.repository),
        Some(&summary.package),
        Some(&summary.advisory),
        None,
    ));
    f.help = Some("Remove the exception from skip_advisories.".to_string());
    f.data = json!({
        "rule": rule.key.to_string(),
        "expires": format_iso_date(rule.expires),
    });
    f
}

pub(crate) fn compare_findings(a: &Finding, b: &Finding) -> std::cmp::Ordering {
    // Ordering priority:
    // 1) severity (error -> warning -> info)
    // 2) repository (run-level last)
    // 3) check_id
    // 4) code
    // 5) package, advisory id
    // 6) message
    let severity_rank = |sev: Severity| match sev {
        Severity::Error => 0,
        Severity::Warning => 1,
        Severity::Info => 2,
    };
    let repo = |f: &Finding| (f.repository.is_none(), f.repository.clone());

    severity_rank(a.severity)
        .cmp(&severity_rank(b.severity))
        .then(repo(a).cmp(&repo(b)))
        .then(a.check_id.cmp(&b.check_id))
        .then(a.code.cmp(&b.code))
        .then(a.package.cmp(&b.package))
        .then(a.advisory_id.cmp(&b.advisory_id))
        .then(a.message.cmp(&b.message))
}
