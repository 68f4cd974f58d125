use crate::{RenderableFinding, RenderableReport, RenderableSeverity, RenderableVerdictStatus};

pub fn render_markdown(report: &RenderableReport) -> String {
    let mut out = String::new();
    let data = &report.data;

    out.push_str("# auditgate report\n\n");
    let verdict = match report.verdict {
        RenderableVerdictStatus::Pass => "PASS",
        RenderableVerdictStatus::Fail => "FAIL",
    };
    out.push_str(&format!(
        "- Verdict: **{}**\n- Date: {}\n- Repositories: {} scanned / {} failing\n- Advisories: {}\n- Exceptions: {} configured / {} unused\n\n",
        verdict,
        data.today,
        data.repositories_scanned,
        data.repositories_failed.len(),
        data.problems_total,
        data.exceptions_configured,
        data.exceptions_unused.len(),
    ));

    if !data.repositories_failed.is_empty() {
        out.push_str("## Failing repositories\n\n");
        for repo in &data.repositories_failed {
            out.push_str(&format!("- `{}`\n", repo));
        }
        out.push('\n');
    }

    if !data.exceptions_unused.is_empty() {
        out.push_str("## Unused exceptions\n\n");
        for e in &data.exceptions_unused {
            out.push_str(&format!("- {}\n", e));
        }
        out.push('\n');
    }

    if report.findings.is_empty() {
        out.push_str("No findings.\n");
        return out;
    }

    out.push_str("## Findings\n\n");

    // Findings arrive sorted by severity then repository; group by repository
    // only when consecutive.
    let mut current: Option<Option<&str>> = None;
    for f in &report.findings {
        let repo = f.repository.as_deref();
        if current != Some(repo) {
            out.push_str(&format!("### {}\n\n", repo.unwrap_or("(run)")));
            current = Some(repo);
        }
        push_finding(&mut out, f);
    }

    out
}

fn push_finding(out: &mut String, f: &RenderableFinding) {
    let sev = match f.severity {
        RenderableSeverity::Info => "INFO",
        RenderableSeverity::Warning => "WARN",
        RenderableSeverity::Error => "ERROR",
    };
    out.push_str(&format!(
        "- [{}] `{}` / `{}`: {}\n",
        sev, f.check_id, f.code, f.message
    ));
    if let Some(help) = &f.help {
        out.push_str(&format!("  - help: {}\n", help));
    }
    if let Some(url) = &f.url {
        out.push_str(&format!("  - url: {}\n", url));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RenderableData;
    use crate::fixtures::failing_report;

    #[test]
    fn renders_empty_report() {
        let report = RenderableReport {
            verdict: RenderableVerdictStatus::Pass,
            findings: Vec::new(),
            data: RenderableData {
                today: "2023-02-01".to_string(),
                repositories_scanned: 3,
                repositories_failed: Vec::new(),
                problems_total: 0,
                exceptions_configured: 0,
                exceptions_unused: Vec::new(),
            },
        };
        let md = render_markdown(&report);
        assert!(md.contains("Verdict: **PASS**"));
        assert!(md.contains("Repositories: 3 scanned / 0 failing"));
        assert!(md.contains("No findings"));
        assert!(!md.contains("## Failing repositories"));
    }

    #[test]
    fn renders_failures_unused_exceptions_and_findings() {
        let md = render_markdown(&failing_report());
        assert!(md.contains("Verdict: **FAIL**"));
        assert!(md.contains("## Failing repositories\n\n- `reponame`"));
        assert!(md.contains("## Unused exceptions\n\n- (*, chrono, RUSTSEC-2020-0159) expires 2023-03-01"));
        assert!(md.contains("[ERROR] `audit.advisories` / `unmatched_advisory`"));
        assert!(md.contains("help: Upgrade the dependency."));
        assert!(md.contains("url: https://rustsec.org/advisories/RUSTSEC-2099-0001"));
        assert!(md.contains("[INFO]"));
    }

    #[test]
    fn groups_consecutive_findings_by_repository() {
        let md = render_markdown(&failing_report());
        let reponame = md.find("### reponame").expect("reponame heading");
        let run = md.find("### (run)").expect("run heading");
        let snare = md.find("### snare").expect("snare heading");
        assert!(reponame < run && run < snare);
    }
}
