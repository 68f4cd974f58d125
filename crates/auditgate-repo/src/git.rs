//! Checkouts under a work directory, kept current with the `git` CLI.

use crate::process::{capture, run_checked};
use crate::{Checkout, RemoteRepo, Workspace};
use anyhow::Context;
use camino::{Utf8Path, Utf8PathBuf};
use std::process::Command;

/// Checkouts live at `<work_dir>/<owner>/<name>`.
#[derive(Clone, Debug)]
pub struct GitWorkspace {
    work_dir: Utf8PathBuf,
    git: String,
}

impl GitWorkspace {
    pub fn new(work_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
            git: "git".to_string(),
        }
    }

    /// Use a different `git` binary.
    pub fn with_git(mut self, git: impl Into<String>) -> Self {
        self.git = git.into();
        self
    }

    pub fn checkout_path(&self, repo: &RemoteRepo) -> Utf8PathBuf {
        self.work_dir.join(&repo.id.owner).join(&repo.id.name)
    }

    fn git(&self, dir: &Utf8Path) -> Command {
        let mut cmd = Command::new(&self.git);
        cmd.current_dir(dir);
        cmd
    }
}

impl Workspace for GitWorkspace {
    fn prepare(&self, repo: &RemoteRepo) -> anyhow::Result<Checkout> {
        let root = self.checkout_path(repo);
        let fresh = !root.exists();

        if fresh {
            let parent = root
                .parent()
                .with_context(|| format!("checkout path {root} has no parent"))?;
            std::fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {parent}"))?;
            tracing::info!(repository = %repo.id, url = %repo.clone_url, "cloning");
            run_checked(
                self.git(parent)
                    .args(["clone", "--quiet"])
                    .arg(&repo.clone_url)
                    .arg(root.as_str()),
            )?;
        } else {
            tracing::info!(repository = %repo.id, path = %root, "pulling");
            run_checked(self.git(&root).args(["pull", "--quiet"]))?;
        }

        run_checked(self.git(&root).args(["submodule", "update"]))?;

        Ok(Checkout { root, fresh })
    }

    fn is_tracked(&self, file: &Utf8Path) -> anyhow::Result<bool> {
        let dir = file.parent().unwrap_or(Utf8Path::new("."));
        let name = file
            .file_name()
            .with_context(|| format!("{file} does not name a file"))?;
        let output = capture(
            self.git(dir)
                .args(["ls-files", "--error-unmatch", "--"])
                .arg(name),
        )?;
        Ok(output.status.success())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use auditgate_types::RepoId;

    fn repo() -> RemoteRepo {
        RemoteRepo::new(
            RepoId::new("ykjit", "yk"),
            "https://github.com/ykjit/yk.git",
        )
    }

    #[test]
    fn checkouts_are_namespaced_by_owner() {
        let ws = GitWorkspace::new("work");
        assert_eq!(ws.checkout_path(&repo()), Utf8PathBuf::from("work/ykjit/yk"));
    }

    #[test]
    fn missing_git_is_an_error() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let work = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
        let ws = GitWorkspace::new(work).with_git("auditgate-no-such-git");
        let err = ws.prepare(&repo()).unwrap_err();
        assert!(err.to_string().contains("auditgate-no-such-git"));
    }

    #[cfg(unix)]
    mod fake_git {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// A `git` that clones by creating the target directory and logs every call.
        fn install(dir: &Utf8Path, fail_on: Option<&str>) -> Utf8PathBuf {
            let log = dir.join("git.log");
            let script = dir.join("git");
            let fail = fail_on
                .map(|sub| format!("[ \"$1\" = \"{sub}\" ] && {{ echo boom >&2; exit 1; }}\n"))
                .unwrap_or_default();
            std::fs::write(
                &script,
                format!(
                    "#!/bin/sh\necho \"$@\" >> '{log}'\n{fail}\
                     if [ \"$1\" = clone ]; then mkdir -p \"$4\"; fi\n\
                     if [ \"$1\" = ls-files ]; then [ \"$4\" = Cargo.lock ]; exit $?; fi\n\
                     exit 0\n"
                ),
            )
            .expect("write script");
            let mut perms = std::fs::metadata(&script).expect("meta").permissions();
            perms.set_mode(0o755);
            std::fs::set_permissions(&script, perms).expect("chmod");
            script
        }

        fn scratch() -> (tempfile::TempDir, Utf8PathBuf) {
            let tmp = tempfile::tempdir().expect("tempdir");
            let path = Utf8PathBuf::from_path_buf(tmp.path().to_path_buf()).expect("utf8");
            (tmp, path)
        }

        #[test]
        fn clones_once_then_pulls() {
            let (_tmp, dir) = scratch();
            let git = install(&dir, None);
            let ws = GitWorkspace::new(dir.join("work")).with_git(git.as_str());

            let first = ws.prepare(&repo()).expect("clone");
            assert!(first.fresh);
            assert!(first.root.is_dir());

            let second = ws.prepare(&repo()).expect("pull");
            assert!(!second.fresh);
            assert_eq!(first.root, second.root);

            let log = std::fs::read_to_string(dir.join("git.log")).expect("log");
            let verbs: Vec<&str> = log
                .lines()
                .filter_map(|l| l.split_whitespace().next())
                .collect();
            assert_eq!(verbs, vec!["clone", "submodule", "pull", "submodule"]);
        }

        #[test]
        fn failed_submodule_update_fails_prepare() {
            let (_tmp, dir) = scratch();
            let git = install(&dir, Some("submodule"));
            let ws = GitWorkspace::new(dir.join("work")).with_git(git.as_str());
            let err = ws.prepare(&repo()).unwrap_err();
            assert!(err.to_string().contains("boom"), "{err}");
        }

        #[test]
        fn tracked_files_follow_git_exit_status() {
            let (_tmp, dir) = scratch();
            let git = install(&dir, None);
            let ws = GitWorkspace::new(dir.join("work")).with_git(git.as_str());
            assert!(ws.is_tracked(&dir.join("Cargo.lock")).expect("tracked"));
            assert!(!ws.is_tracked(&dir.join("Cargo.toml")).expect("untracked"));
        }
    }
}
