//! Combine per-repository verdicts into the run's outcome.

use crate::matcher::Classification;
use crate::registry::{ExceptionRegistry, ExceptionRule};
use auditgate_types::{AuditDir, RepoId, ids};

/// A repository passes iff every problem was skipped by an active exception.
/// No problems at all is a pass.
pub fn repository_passes(classifications: &[Classification]) -> bool {
    classifications.iter().all(|c| c.verdict.is_pass())
}

/// Failures that happen before exception matching can run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HardFailureKind {
    Checkout,
    NoManifest,
    Scan,
}

impl HardFailureKind {
    pub fn code(self) -> &'static str {
        match self {
            HardFailureKind::Checkout => ids::CODE_CHECKOUT_FAILED,
            HardFailureKind::NoManifest => ids::CODE_NO_MANIFEST,
            HardFailureKind::Scan => ids::CODE_SCAN_FAILED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HardFailure {
    pub kind: HardFailureKind,
    pub message: String,
    /// Audit directory the failure belongs to; `None` for the whole checkout.
    pub dir: Option<AuditDir>,
}

impl HardFailure {
    pub fn new(kind: HardFailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            dir: None,
        }
    }

    pub fn in_dir(mut self, dir: AuditDir) -> Self {
        self.dir = Some(dir);
        self
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryOutcome {
    /// Owner and name: accounts may hold repositories of the same name.
    pub id: RepoId,
    pub classifications: Vec<Classification>,
    pub hard_failures: Vec<HardFailure>,
}

impl RepositoryOutcome {
    fn new(id: &RepoId) -> Self {
        Self {
            id: id.clone(),
            classifications: Vec::new(),
            hard_failures: Vec::new(),
        }
    }

    pub fn passed(&self) -> bool {
        self.hard_failures.is_empty() && repository_passes(&self.classifications)
    }
}

/// Collects outcomes as repositories are processed, one at a time.
///
/// Recording the same repository twice (one per audit directory) merges into
/// a single outcome; the repository keeps the position of its first record.
#[derive(Clone, Debug, Default)]
pub struct AuditAggregator {
    repositories: Vec<RepositoryOutcome>,
}

impl AuditAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(&mut self, repository: &RepoId) -> &mut RepositoryOutcome {
        let pos = match self.repositories.iter().position(|r| &r.id == repository) {
            Some(pos) => pos,
            None => {
                self.repositories.push(RepositoryOutcome::new(repository));
                self.repositories.len() - 1
            }
        };
        &mut self.repositories[pos]
    }

    pub fn record_classified(&mut self, repository: &RepoId, classifications: Vec<Classification>) {
        self.entry(repository).classifications.extend(classifications);
    }

    pub fn record_hard_failure(&mut self, repository: &RepoId, failure: HardFailure) {
        self.entry(repository).hard_failures.push(failure);
    }

    pub fn failing_repositories(&self) -> Vec<&RepoId> {
        self.repositories
            .iter()
            .filter(|r| !r.passed())
            .map(|r| &r.id)
            .collect()
    }

    /// Close the run. `registry` supplies the exceptions that never matched.
    pub fn finish(self, registry: &ExceptionRegistry) -> AuditOutcome {
        let failing_repositories: Vec<RepoId> = self
            .failing_repositories()
            .into_iter()
            .cloned()
            .collect();
        AuditOutcome {
            repositories: self.repositories,
            failing_repositories,
            unused_exceptions: registry.unused().into_iter().cloned().collect(),
            exceptions_configured: registry.len(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AuditOutcome {
    pub repositories: Vec<RepositoryOutcome>,
    pub failing_repositories: Vec<RepoId>,
    pub unused_exceptions: Vec<ExceptionRule>,
    pub exceptions_configured: usize,
}

impl AuditOutcome {
    /// Failing repositories always fail the run. Unused exceptions only do
    /// when the operator asked for it.
    pub fn passed(&self, fail_on_unused: bool) -> bool {
        self.failing_repositories.is_empty() && !(fail_on_unused && !self.unused_exceptions.is_empty())
    }

    pub fn problems_total(&self) -> usize {
        self.repositories
            .iter()
            .map(|r| r.classifications.len())
            .sum()
    }
}
