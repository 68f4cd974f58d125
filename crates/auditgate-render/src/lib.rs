//! Rendering utilities for CI surfaces (Markdown, GitHub annotations).

#![forbid(unsafe_code)]

mod gha;
mod markdown;
mod model;

pub use gha::render_github_annotations;
pub use markdown::render_markdown;
pub use model::{
    RenderableData, RenderableFinding, RenderableReport, RenderableSeverity,
    RenderableVerdictStatus,
};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::*;

    pub fn failing_report() -> RenderableReport {
        RenderableReport {
            verdict: RenderableVerdictStatus::Fail,
            findings: vec![
                RenderableFinding {
                    severity: RenderableSeverity::Error,
                    check_id: "audit.advisories".to_string(),
                    code: "unmatched_advisory".to_string(),
                    message: "libfoo/RUSTSEC-2099-0001 has no exception".to_string(),
                    repository: Some("reponame".to_string()),
                    help: Some("Upgrade the dependency.".to_string()),
                    url: Some("https://rustsec.org/advisories/RUSTSEC-2099-0001".to_string()),
                },
                RenderableFinding {
                    severity: RenderableSeverity::Warning,
                    check_id: "audit.exceptions".to_string(),
                    code: "unused_exception".to_string(),
                    message: "exception (*, chrono, RUSTSEC-2020-0159) matched no advisory"
                        .to_string(),
                    repository: None,
                    help: None,
                    url: None,
                },
                RenderableFinding {
                    severity: RenderableSeverity::Info,
                    check_id: "audit.exceptions".to_string(),
                    code: "skipped_advisory".to_string(),
                    message: "time/RUSTSEC-2020-0071 was skipped (exception expires 2030-01-01)"
                        .to_string(),
                    repository: Some("snare".to_string()),
                    help: None,
                    url: None,
                },
            ],
            data: RenderableData {
                today: "2023-02-01".to_string(),
                repositories_scanned: 2,
                repositories_failed: vec!["reponame".to_string()],
                problems_total: 2,
                exceptions_configured: 2,
                exceptions_unused: vec![
                    "(*, chrono, RUSTSEC-2020-0159) expires 2023-03-01".to_string(),
                ],
            },
        }
    }
}
