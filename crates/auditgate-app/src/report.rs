use anyhow::Context;
use auditgate_render::{
    RenderableData, RenderableFinding, RenderableReport, RenderableSeverity,
    RenderableVerdictStatus,
};
use auditgate_types::{
    AuditData, AuditReport, ExceptionSummary, Finding, SCHEMA_REPORT_V1, Severity, ToolMeta,
    Verdict, format_iso_date, ids,
};
use time::{Date, OffsetDateTime};

pub(crate) fn tool_meta() -> ToolMeta {
    ToolMeta {
        name: "auditgate".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }
}

pub fn parse_report_json(text: &str) -> anyhow::Result<AuditReport> {
    let value: serde_json::Value = serde_json::from_str(text).context("parse report json")?;

    let schema = value
        .get("schema")
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();
    if schema != SCHEMA_REPORT_V1 {
        anyhow::bail!("unknown report schema: {schema:?} (expected {SCHEMA_REPORT_V1})");
    }

    serde_json::from_value(value).context("parse auditgate report")
}

pub fn serialize_report(report: &AuditReport) -> anyhow::Result<Vec<u8>> {
    serde_json::to_vec_pretty(report).context("serialize report")
}

/// Map verdict to exit code: 0 = pass, 2 = fail.
pub fn verdict_exit_code(verdict: Verdict) -> i32 {
    match verdict {
        Verdict::Pass => 0,
        Verdict::Fail => 2,
    }
}

pub fn to_renderable(report: &AuditReport) -> RenderableReport {
    RenderableReport {
        verdict: match report.verdict {
            Verdict::Pass => RenderableVerdictStatus::Pass,
            Verdict::Fail => RenderableVerdictStatus::Fail,
        },
        findings: report.findings.iter().map(renderable_finding).collect(),
        data: RenderableData {
            today: format_iso_date(report.today),
            repositories_scanned: report.data.repositories_scanned,
            repositories_failed: report.data.repositories_failed.clone(),
            problems_total: report.data.problems_total,
            exceptions_configured: report.data.exceptions_configured,
            exceptions_unused: report
                .data
                .exceptions_unused
                .iter()
                .map(describe_exception)
                .collect(),
        },
    }
}

fn renderable_finding(f: &Finding) -> RenderableFinding {
    RenderableFinding {
        severity: match f.severity {
            Severity::Info => RenderableSeverity::Info,
            Severity::Warning => RenderableSeverity::Warning,
            Severity::Error => RenderableSeverity::Error,
        },
        check_id: f.check_id.clone(),
        code: f.code.clone(),
        message: f.message.clone(),
        repository: f.repository.clone(),
        help: f.help.clone(),
        url: f.url.clone(),
    }
}

pub(crate) fn describe_exception(e: &ExceptionSummary) -> String {
    let mut line = format!(
        "({}, {}, {}) expires {}",
        e.repository,
        e.package,
        e.advisory,
        format_iso_date(e.expires)
    );
    if let Some(reason) = &e.reason {
        line.push_str(&format!(": {reason}"));
    }
    line
}

/// A failing report with a single `tool.runtime` finding, written when the run
/// could not complete.
pub fn runtime_error_report(message: &str, today: Date) -> AuditReport {
    let now = OffsetDateTime::now_utc();
    AuditReport {
        schema: SCHEMA_REPORT_V1.to_string(),
        tool: tool_meta(),
        started_at: now,
        finished_at: now,
        today,
        verdict: Verdict::Fail,
        findings: vec![Finding {
            severity: Severity::Error,
            check_id: ids::CHECK_TOOL_RUNTIME.to_string(),
            code: ids::CODE_RUNTIME_ERROR.to_string(),
            message: message.to_string(),
            repository: None,
            package: None,
            advisory_id: None,
            help: Some("Fix the tool error and re-run auditgate.".to_string()),
            url: None,
            fingerprint: None,
            data: serde_json::Value::Null,
        }],
        data: AuditData::default(),
    }
}
