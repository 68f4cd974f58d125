//! Repository adapters: list hosted repositories, keep git checkouts current,
//! and run `cargo audit`.
//!
//! Everything that touches the network, the filesystem or a child process lives
//! here, behind the [`RepoSource`], [`Workspace`] and [`Scanner`] traits so the
//! audit use case can be driven by fakes in tests.

#![forbid(unsafe_code)]

mod cargo_audit;
mod git;
mod github;
mod process;

use auditgate_types::RepoId;
use camino::{Utf8Path, Utf8PathBuf};

pub use cargo_audit::CargoAudit;
pub use git::GitWorkspace;
pub use github::{
    GithubSource, ListedRepo, Owner, RepoFilter, parse_languages, parse_repo_page,
    select_repositories,
};

/// A repository selected for auditing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RemoteRepo {
    pub id: RepoId,
    pub clone_url: String,
}

impl RemoteRepo {
    pub fn new(id: RepoId, clone_url: impl Into<String>) -> Self {
        Self {
            id,
            clone_url: clone_url.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.id.name
    }
}

/// A local checkout, ready to audit.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Checkout {
    pub root: Utf8PathBuf,
    /// Cloned during this run (as opposed to updated with `git pull`).
    pub fresh: bool,
}

/// Raw result of one scanner invocation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScanOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was killed by a signal.
    pub status: Option<i32>,
}

pub trait RepoSource {
    /// Repositories to audit, after account, language, archive and skip filtering.
    fn list(&self) -> anyhow::Result<Vec<RemoteRepo>>;
}

pub trait Workspace {
    /// Clone `repo` if absent, otherwise update it; then update submodules.
    fn prepare(&self, repo: &RemoteRepo) -> anyhow::Result<Checkout>;

    /// Whether `file` is tracked by the git checkout containing it.
    fn is_tracked(&self, file: &Utf8Path) -> anyhow::Result<bool>;
}

pub trait Scanner {
    /// Run the machine-readable audit in `dir`.
    ///
    /// A non-zero exit is not an error: the scanner exits non-zero whenever it
    /// reports something. Only a failure to run at all is.
    fn scan(&self, dir: &Utf8Path) -> anyhow::Result<ScanOutput>;

    /// Refresh an untracked lockfile so a reused checkout resolves the same
    /// dependencies a fresh clone would.
    fn update_lockfile(&self, dir: &Utf8Path) -> anyhow::Result<()>;

    /// The scanner's human-readable report for `dir`.
    fn human_readable(&self, dir: &Utf8Path) -> anyhow::Result<String>;
}
