use crate::defaults;
use crate::model::{AuditgateConfigV1, SkipAdvisoryConfig};
use anyhow::Context;
use auditgate_domain::{ExceptionRegistry, ExceptionRule, FieldPattern, RuleKey};
use auditgate_types::{AuditDir, RepoId, parse_iso_date};
use std::collections::{BTreeMap, BTreeSet};

/// Values given on the command line. Each one wins over the config file.
#[derive(Clone, Debug, Default)]
pub struct Overrides {
    pub work_dir: Option<String>,
    pub cargo: Option<String>,
    pub api_url: Option<String>,
    pub fail_on_unused_exceptions: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EffectiveConfig {
    pub accounts: Vec<String>,
    pub language: String,
    pub work_dir: String,
    pub cargo: String,
    pub api_url: String,
    pub fail_on_unused_exceptions: bool,
    pub skip_repos: BTreeSet<RepoId>,
    pub audit_dirs: BTreeMap<RepoId, Vec<AuditDir>>,
    /// In configuration order.
    pub exceptions: Vec<ExceptionRule>,
}

impl EffectiveConfig {
    /// Directories to audit in `repo`; the checkout root unless configured.
    pub fn audit_dirs_for(&self, repo: &RepoId) -> Vec<AuditDir> {
        self.audit_dirs
            .get(repo)
            .cloned()
            .unwrap_or_else(|| vec![AuditDir::root()])
    }

    /// A fresh registry with every exception unused.
    pub fn registry(&self) -> ExceptionRegistry {
        ExceptionRegistry::configure(self.exceptions.iter().cloned())
    }
}

#[derive(Clone, Debug)]
pub struct ResolvedConfig {
    pub effective: EffectiveConfig,
}

pub fn resolve_config(
    cfg: AuditgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    let accounts: Vec<String> = cfg
        .accounts
        .iter()
        .map(|a| a.trim().to_string())
        .filter(|a| !a.is_empty())
        .collect();
    if accounts.is_empty() {
        anyhow::bail!("accounts must name at least one GitHub user or organization");
    }

    let skip_repos = cfg
        .skip_repos
        .iter()
        .map(|s| RepoId::new(&s.owner, &s.name))
        .collect();

    let mut audit_dirs: BTreeMap<RepoId, Vec<AuditDir>> = BTreeMap::new();
    for entry in &cfg.audit_dirs {
        let repo = RepoId::new(&entry.owner, &entry.name);
        if entry.dirs.is_empty() {
            anyhow::bail!("audit_dirs for {repo} lists no directories");
        }
        let dirs = audit_dirs.entry(repo.clone()).or_default();
        for raw in &entry.dirs {
            let dir = AuditDir::new(raw);
            if !dir.is_contained() {
                anyhow::bail!("audit dir {raw:?} for {repo} escapes the checkout");
            }
            if !dirs.contains(&dir) {
                dirs.push(dir);
            }
        }
    }

    let mut exceptions: Vec<ExceptionRule> = Vec::with_capacity(cfg.skip_advisories.len());
    for (idx, entry) in cfg.skip_advisories.iter().enumerate() {
        let rule = exception_rule(entry)
            .with_context(|| format!("invalid skip_advisories entry #{}", idx + 1))?;
        if exceptions.iter().any(|r| r.key == rule.key) {
            anyhow::bail!("duplicate exception for {}", rule.key);
        }
        exceptions.push(rule);
    }

    let effective = EffectiveConfig {
        accounts,
        language: cfg
            .language
            .unwrap_or_else(|| defaults::LANGUAGE.to_string()),
        work_dir: overrides
            .work_dir
            .or(cfg.work_dir)
            .unwrap_or_else(|| defaults::WORK_DIR.to_string()),
        cargo: overrides
            .cargo
            .or(cfg.cargo)
            .unwrap_or_else(|| defaults::CARGO.to_string()),
        api_url: overrides
            .api_url
            .or(cfg.api_url)
            .unwrap_or_else(|| defaults::API_URL.to_string())
            .trim_end_matches('/')
            .to_string(),
        fail_on_unused_exceptions: overrides
            .fail_on_unused_exceptions
            .or(cfg.fail_on_unused_exceptions)
            .unwrap_or(defaults::FAIL_ON_UNUSED_EXCEPTIONS),
        skip_repos,
        audit_dirs,
        exceptions,
    };

    Ok(ResolvedConfig { effective })
}

fn exception_rule(entry: &SkipAdvisoryConfig) -> anyhow::Result<ExceptionRule> {
    let repository = entry
        .repository
        .as_deref()
        .context("repository is required (use \"*\" for every repository)")?;
    if repository.trim().is_empty() {
        anyhow::bail!("repository must not be empty");
    }
    let expires = parse_iso_date(&entry.expires)
        .with_context(|| format!("invalid expires date {:?} (expected YYYY-MM-DD)", entry.expires))?;

    let key = RuleKey::new(
        FieldPattern::from_config(Some(repository)),
        FieldPattern::from_config(entry.package.as_deref()),
        FieldPattern::from_config(entry.advisory.as_deref()),
    );
    let rule = ExceptionRule::new(key, expires);
    Ok(match entry.reason.as_deref() {
        Some(reason) => rule.with_reason(reason),
        None => rule,
    })
}
