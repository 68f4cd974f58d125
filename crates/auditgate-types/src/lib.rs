//! Stable DTOs and IDs used across the auditgate workspace.
//!
//! This crate is intentionally boring:
//! - data types for the emitted report
//! - stable string IDs and codes
//! - canonical checkout-relative directory handling
//! - explain registry for remediation guidance

#![forbid(unsafe_code)]

pub mod date;
pub mod explain;
pub mod ids;
pub mod path;
pub mod receipt;
pub mod repo_id;

pub use date::{format_iso_date, parse_iso_date};
pub use explain::{lookup_explanation, ExamplePair, Explanation};
pub use path::AuditDir;
pub use receipt::{
    AuditData, AuditReport, ExceptionSummary, Finding, ReportEnvelope, Severity, ToolMeta,
    Verdict, SCHEMA_REPORT_V1,
};
pub use repo_id::RepoId;
