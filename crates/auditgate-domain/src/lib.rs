//! Pure advisory exception matching (no IO, no clock).
//!
//! Input: scanner output per repository, configured exceptions, and today's date.
//! Output: per-problem verdicts, per-repository pass/fail, findings + summary data.

#![forbid(unsafe_code)]

pub mod aggregate;
pub mod extract;
pub mod matcher;
pub mod pattern;
pub mod problem;
pub mod registry;
pub mod report;

mod fingerprint;

#[cfg(test)]
mod proptest;

pub use aggregate::{
    repository_passes, AuditAggregator, AuditOutcome, HardFailure, HardFailureKind,
    RepositoryOutcome,
};
pub use extract::{extract_problems, ExtractError};
pub use matcher::{classify, classify_all, Classification, Verdict};
pub use pattern::FieldPattern;
pub use problem::Problem;
pub use registry::{ExceptionRegistry, ExceptionRule, RuleKey};
pub use report::{build_report, DomainReport, ReportPolicy};
