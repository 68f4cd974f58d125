//! The `check-config` use case: validate configuration and show what each
//! exception would do today.

use anyhow::Context;
use auditgate_domain::ExceptionRule;
use auditgate_settings::{EffectiveConfig, Overrides};
use auditgate_types::format_iso_date;
use time::Date;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RuleStatus {
    pub rule: ExceptionRule,
    pub expired: bool,
    /// Matches every advisory in every repository.
    pub broad: bool,
}

#[derive(Clone, Debug)]
pub struct ConfigCheck {
    pub effective: EffectiveConfig,
    pub today: Date,
    pub rules: Vec<RuleStatus>,
}

impl ConfigCheck {
    pub fn expired(&self) -> usize {
        self.rules.iter().filter(|r| r.expired).count()
    }
}

/// Parse and resolve `config_text`, then evaluate every exception against `today`.
pub fn check_config(config_text: &str, today: Date) -> anyhow::Result<ConfigCheck> {
    let cfg = auditgate_settings::parse_config_toml(config_text).context("parse config")?;
    let effective = auditgate_settings::resolve_config(cfg, Overrides::default())
        .context("resolve config")?
        .effective;

    let rules = effective
        .exceptions
        .iter()
        .map(|rule| RuleStatus {
            rule: rule.clone(),
            expired: rule.is_expired(today),
            broad: rule.key.is_catch_all(),
        })
        .collect();

    Ok(ConfigCheck {
        effective,
        today,
        rules,
    })
}

pub fn format_config_check(check: &ConfigCheck) -> String {
    let eff = &check.effective;
    let mut out = String::new();

    out.push_str(&format!("accounts: {}\n", eff.accounts.join(", ")));
    out.push_str(&format!("language: {}\n", eff.language));
    out.push_str(&format!("skipped repositories: {}\n", eff.skip_repos.len()));
    for (repo, dirs) in &eff.audit_dirs {
        let dirs: Vec<&str> = dirs.iter().map(|d| d.as_str()).collect();
        out.push_str(&format!("audit dirs for {repo}: {}\n", dirs.join(", ")));
    }

    out.push_str(&format!(
        "\nexceptions ({}, evaluated on {}):\n",
        check.rules.len(),
        format_iso_date(check.today)
    ));
    if check.rules.is_empty() {
        out.push_str("  (none)\n");
    }
    for status in &check.rules {
        let state = if status.expired { "expired" } else { "active" };
        out.push_str(&format!(
            "  {:<7} {} until {}",
            state,
            status.rule.key,
            format_iso_date(status.rule.expires)
        ));
        if status.broad {
            out.push_str(" [broad]");
        }
        if let Some(reason) = &status.rule.reason {
            out.push_str(&format!(" ({reason})"));
        }
        out.push('\n');
    }

    out
}
