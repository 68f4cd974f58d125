use anyhow::Context;
use std::process::{Command, Output};

pub(crate) fn describe(cmd: &Command) -> String {
    let mut out = cmd.get_program().to_string_lossy().into_owned();
    for arg in cmd.get_args() {
        out.push(' ');
        out.push_str(&arg.to_string_lossy());
    }
    out
}

/// Run to completion and capture output. Fails only if the process could not be spawned.
pub(crate) fn capture(cmd: &mut Command) -> anyhow::Result<Output> {
    let what = describe(cmd);
    tracing::debug!(command = %what, "spawning");
    cmd.output().with_context(|| format!("failed to run `{what}`"))
}

/// Like [`capture`], but a non-zero exit is an error carrying stderr.
pub(crate) fn run_checked(cmd: &mut Command) -> anyhow::Result<Output> {
    let output = capture(cmd)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        anyhow::bail!(
            "`{}` failed ({}): {}",
            describe(cmd),
            output.status,
            stderr.trim()
        );
    }
    Ok(output)
}
