//! Use case orchestration for auditgate.
//!
//! This crate provides the application layer: use cases that coordinate the domain, repo, and
//! render layers. It is intentionally thin and delegates heavy lifting to the appropriate layers.
//!
//! The CLI crate depends on this; it only handles argument parsing and I/O.

#![forbid(unsafe_code)]

mod audit;
mod check_config;
mod explain;
mod render;
mod report;

pub use audit::{AuditInput, AuditOutput, run_audit};
pub use check_config::{ConfigCheck, RuleStatus, check_config, format_config_check};
pub use explain::{ExplainOutput, format_explanation, format_not_found, run_explain};
pub use render::{render_annotations, render_markdown, write_report, write_text};
pub use report::{
    parse_report_json, runtime_error_report, serialize_report, to_renderable, verdict_exit_code,
};
