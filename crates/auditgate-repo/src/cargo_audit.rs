use crate::process::{capture, run_checked};
use crate::{ScanOutput, Scanner};
use camino::Utf8Path;
use std::process::{Command, Stdio};

/// `cargo audit`, denying warnings so unmaintained and yanked crates are reported too.
#[derive(Clone, Debug)]
pub struct CargoAudit {
    cargo: String,
}

impl Default for CargoAudit {
    fn default() -> Self {
        Self::new("cargo")
    }
}

impl CargoAudit {
    pub fn new(cargo: impl Into<String>) -> Self {
        Self {
            cargo: cargo.into(),
        }
    }

    fn cargo(&self, dir: &Utf8Path) -> Command {
        let mut cmd = Command::new(&self.cargo);
        cmd.current_dir(dir);
        cmd
    }

    /// `cargo install cargo-audit`, streaming cargo's own output.
    pub fn install(&self) -> anyhow::Result<()> {
        let mut cmd = Command::new(&self.cargo);
        cmd.args(["install", "cargo-audit"])
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        tracing::info!(cargo = %self.cargo, "installing cargo-audit");
        run_checked(&mut cmd)?;
        Ok(())
    }
}

impl Scanner for CargoAudit {
    fn scan(&self, dir: &Utf8Path) -> anyhow::Result<ScanOutput> {
        let output = capture(
            self.cargo(dir)
                .args(["audit", "-D", "warnings", "--json"])
                .stdin(Stdio::null()),
        )?;
        Ok(ScanOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            status: output.status.code(),
        })
    }

    fn update_lockfile(&self, dir: &Utf8Path) -> anyhow::Result<()> {
        tracing::info!(dir = %dir, "Cargo.lock is not tracked; running cargo update");
        run_checked(self.cargo(dir).arg("update").stdin(Stdio::null()))?;
        Ok(())
    }

    fn human_readable(&self, dir: &Utf8Path) -> anyhow::Result<String> {
        let output = capture(
            self.cargo(dir)
                .args(["audit", "-D", "warnings"])
                .stdin(Stdio::null()),
        )?;
        let mut text = String::from_utf8_lossy(&output.stdout).into_owned();
        text.push_str(&String::from_utf8_lossy(&output.stderr));
        Ok(text)
    }
}
