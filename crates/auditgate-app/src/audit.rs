//! The `run` use case: audit every selected repository and produce a report.

use anyhow::Context;
use auditgate_domain::{
    AuditAggregator, Classification, ExceptionRegistry, ExceptionRule, HardFailure,
    HardFailureKind, ReportPolicy, Verdict as Classified, build_report, classify_all,
    extract_problems, repository_passes,
};
use auditgate_repo::{RemoteRepo, RepoSource, Scanner, Workspace};
use auditgate_settings::EffectiveConfig;
use auditgate_types::{AuditDir, AuditReport, SCHEMA_REPORT_V1};
use time::{Date, OffsetDateTime};
use tracing::{info, warn};

use crate::report::tool_meta;

#[derive(Clone, Debug)]
pub struct AuditInput<'a> {
    pub config: &'a EffectiveConfig,
    /// The date exception expiry is evaluated against.
    pub today: Date,
    /// Restrict the run to the repository with this name.
    pub single_repo: Option<&'a str>,
}

#[derive(Clone, Debug)]
pub struct AuditOutput {
    pub report: AuditReport,
    /// `owner/name` of every repository that did not pass.
    pub failing_repositories: Vec<String>,
    pub unused_exceptions: Vec<ExceptionRule>,
}

/// Audit every repository `source` selects, one at a time.
///
/// Problems with a single repository (checkout, manifest, scanner output) are
/// recorded as failures of that repository and the run carries on. Only a
/// failure to list repositories aborts.
pub fn run_audit<S, W, C>(
    input: AuditInput<'_>,
    source: &S,
    workspace: &W,
    scanner: &C,
) -> anyhow::Result<AuditOutput>
where
    S: RepoSource + ?Sized,
    W: Workspace + ?Sized,
    C: Scanner + ?Sized,
{
    let started_at = OffsetDateTime::now_utc();
    let config = input.config;

    let mut registry = config.registry();
    if let Some(name) = input.single_repo {
        registry.retain_repository(name);
    }

    let mut repos = source.list().context("list repositories")?;
    if let Some(name) = input.single_repo {
        repos.retain(|r| r.name() == name);
        if repos.is_empty() {
            anyhow::bail!("repository {name:?} is not among the repositories selected for audit");
        }
    }

    let mut aggregator = AuditAggregator::new();
    let mut auditor = RepositoryAuditor {
        config,
        today: input.today,
        registry: &mut registry,
        aggregator: &mut aggregator,
        workspace,
        scanner,
    };
    for repo in &repos {
        auditor.audit(repo);
    }

    let outcome = aggregator.finish(&registry);
    let policy = ReportPolicy {
        fail_on_unused_exceptions: config.fail_on_unused_exceptions,
    };
    let domain = build_report(&outcome, policy);

    for rule in &outcome.unused_exceptions {
        warn!(rule = %rule.key, "exception matched no advisory");
    }
    info!(
        repositories = outcome.repositories.len(),
        failing = outcome.failing_repositories.len(),
        errors = domain.counts.error,
        warnings = domain.counts.warning,
        "audit finished"
    );

    let report = AuditReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at,
        finished_at: OffsetDateTime::now_utc(),
        today: input.today,
        verdict: domain.verdict,
        findings: domain.findings,
        data: domain.data,
    };

    Ok(AuditOutput {
        report,
        failing_repositories: outcome
            .failing_repositories
            .iter()
            .map(ToString::to_string)
            .collect(),
        unused_exceptions: outcome.unused_exceptions,
    })
}

struct RepositoryAuditor<'a, W: ?Sized, C: ?Sized> {
    config: &'a EffectiveConfig,
    today: Date,
    registry: &'a mut ExceptionRegistry,
    aggregator: &'a mut AuditAggregator,
    workspace: &'a W,
    scanner: &'a C,
}

impl<W, C> RepositoryAuditor<'_, W, C>
where
    W: Workspace + ?Sized,
    C: Scanner + ?Sized,
{
    fn fail(&mut self, repo: &RemoteRepo, kind: HardFailureKind, message: String) {
        warn!(repository = %repo.id, code = kind.code(), "{message}");
        self.aggregator
            .record_hard_failure(&repo.id, HardFailure::new(kind, message));
    }

    fn fail_dir(
        &mut self,
        repo: &RemoteRepo,
        dir: &AuditDir,
        kind: HardFailureKind,
        message: String,
    ) {
        warn!(repository = %repo.id, dir = %dir, code = kind.code(), "{message}");
        self.aggregator.record_hard_failure(
            &repo.id,
            HardFailure::new(kind, message).in_dir(dir.clone()),
        );
    }

    fn audit(&mut self, repo: &RemoteRepo) {
        info!(repository = %repo.id, url = %repo.clone_url, "checking");
        // A repository is reported even if it turns out clean.
        self.aggregator.record_classified(&repo.id, Vec::new());

        let checkout = match self.workspace.prepare(repo) {
            Ok(c) => c,
            Err(err) => {
                self.fail(repo, HardFailureKind::Checkout, format!("{err:#}"));
                return;
            }
        };

        for dir in self.config.audit_dirs_for(&repo.id) {
            let path = dir.resolve(&checkout.root);
            info!(repository = %repo.id, dir = %dir, "running audit");

            if !path.join("Cargo.toml").is_file() {
                self.fail_dir(
                    repo,
                    &dir,
                    HardFailureKind::NoManifest,
                    format!("no Cargo.toml in {dir}; cannot audit"),
                );
                continue;
            }

            if !checkout.fresh {
                let lock = path.join("Cargo.lock");
                if lock.is_file() {
                    let refreshed = self.workspace.is_tracked(&lock).and_then(|tracked| {
                        if tracked {
                            Ok(())
                        } else {
                            self.scanner.update_lockfile(&path)
                        }
                    });
                    if let Err(err) = refreshed {
                        self.fail_dir(
                            repo,
                            &dir,
                            HardFailureKind::Scan,
                            format!("could not refresh untracked Cargo.lock in {dir}: {err:#}"),
                        );
                        continue;
                    }
                }
            }

            let output = match self.scanner.scan(&path) {
                Ok(o) => o,
                Err(err) => {
                    self.fail_dir(repo, &dir, HardFailureKind::Scan, format!("{err:#}"));
                    continue;
                }
            };

            let problems = match extract_problems(repo.name(), &output.stdout) {
                Ok(p) => p,
                Err(err) => {
                    warn!(
                        repository = %repo.id,
                        dir = %dir,
                        status = ?output.status,
                        stdout = %output.stdout,
                        stderr = %output.stderr,
                        "unreadable scanner output"
                    );
                    self.fail_dir(repo, &dir, HardFailureKind::Scan, format!("{err} (in {dir})"));
                    continue;
                }
            };

            let classifications = classify_all(self.registry, &problems, self.today);
            log_notes(repo, &classifications);
            let passed = repository_passes(&classifications);
            self.aggregator.record_classified(&repo.id, classifications);

            if !passed {
                match self.scanner.human_readable(&path) {
                    Ok(text) => info!(repository = %repo.id, dir = %dir, "scanner report:\n{text}"),
                    Err(err) => warn!(repository = %repo.id, dir = %dir, "no scanner report: {err:#}"),
                }
            }
        }
    }
}

fn log_notes(repo: &RemoteRepo, classifications: &[Classification]) {
    for c in classifications {
        let package = c.problem.package.as_deref().unwrap_or("?");
        let advisory = c.problem.advisory_id.as_deref().unwrap_or("?");
        match c.verdict {
            Classified::SkippedActive => {
                info!(repository = %repo.id, package, advisory, "{}", c.note())
            }
            Classified::SkippedExpired | Classified::Unmatched => {
                warn!(repository = %repo.id, package, advisory, "{}", c.note())
            }
        }
    }
}
