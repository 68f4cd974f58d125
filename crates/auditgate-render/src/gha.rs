use crate::{RenderableReport, RenderableSeverity};

/// Render findings as GitHub Actions workflow command annotations.
///
/// Format:
/// `::{level} title={repository}::[{check_id}:{code}] {message}`
///
/// Findings have no file location; the repository goes in the title.
pub fn render_github_annotations(report: &RenderableReport) -> Vec<String> {
    let mut out = Vec::new();

    for f in &report.findings {
        let level = match f.severity {
            RenderableSeverity::Error => "error",
            RenderableSeverity::Warning => "warning",
            RenderableSeverity::Info => "notice",
        };

        let message = escape_data(&format!("[{}:{}] {}", f.check_id, f.code, f.message));

        match &f.repository {
            Some(repo) => out.push(format!("::{} title={}::{}", level, escape_property(repo), message)),
            None => out.push(format!("::{}::{}", level, message)),
        }
    }

    out
}

fn escape_data(s: &str) -> String {
    s.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

fn escape_property(s: &str) -> String {
    escape_data(s).replace(':', "%3A").replace(',', "%2C")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::failing_report;

    #[test]
    fn levels_follow_severity() {
        let lines = render_github_annotations(&failing_report());
        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("::error title=reponame::"));
        assert!(lines[1].starts_with("::warning::"));
        assert!(lines[2].starts_with("::notice title=snare::"));
    }

    #[test]
    fn message_carries_check_and_code() {
        let lines = render_github_annotations(&failing_report());
        assert!(lines[0].ends_with(
            "[audit.advisories:unmatched_advisory] libfoo/RUSTSEC-2099-0001 has no exception"
        ));
    }

    #[test]
    fn escapes_workflow_command_syntax() {
        let mut report = failing_report();
        report.findings.truncate(1);
        report.findings[0].message = "50% broken\nsecond line".to_string();
        report.findings[0].repository = Some("a:b,c".to_string());
        let lines = render_github_annotations(&report);
        assert_eq!(
            lines[0],
            "::error title=a%3Ab%2Cc::[audit.advisories:unmatched_advisory] 50%25 broken%0Asecond line"
        );
    }
}
