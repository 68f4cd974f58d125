//! Render use cases: markdown and GitHub annotations from in-memory reports,
//! plus artifact writers.

use crate::report::{serialize_report, to_renderable};
use anyhow::Context;
use auditgate_types::AuditReport;
use camino::Utf8Path;

pub fn render_markdown(report: &AuditReport) -> String {
    auditgate_render::render_markdown(&to_renderable(report))
}

pub fn render_annotations(report: &AuditReport, max: usize) -> Vec<String> {
    auditgate_render::render_github_annotations(&to_renderable(report))
        .into_iter()
        .take(max)
        .collect()
}

pub fn write_report(path: &Utf8Path, report: &AuditReport) -> anyhow::Result<()> {
    let data = serialize_report(report)?;
    write_bytes(path, &data).with_context(|| format!("write report: {}", path))
}

pub fn write_text(path: &Utf8Path, text: &str) -> anyhow::Result<()> {
    write_bytes(path, text.as_bytes()).with_context(|| format!("write text: {}", path))
}

fn write_bytes(path: &Utf8Path, data: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_str().is_empty()
    {
        std::fs::create_dir_all(parent).with_context(|| format!("create directory: {}", parent))?;
    }
    std::fs::write(path, data)?;
    Ok(())
}
