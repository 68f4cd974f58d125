use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// `auditgate.toml` schema v1.
///
/// This is a *user-facing* config model: top-level keys are permissive so
/// forward-compat is easy. Exception entries are strict, because a misspelt
/// field would silently change what an exception matches.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditgateConfigV1 {
    /// Optional schema string for tooling (`auditgate.config.v1`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    /// GitHub accounts (users or organizations) whose repositories are audited.
    #[serde(default)]
    pub accounts: Vec<String>,

    /// Only repositories GitHub reports this language for are audited (default `Rust`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Where checkouts live (default `work`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_dir: Option<String>,

    /// The cargo binary used to run `cargo audit` (default `cargo`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cargo: Option<String>,

    /// GitHub REST API base URL (default `https://api.github.com`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Fail the run when an exception matched nothing (default `false`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fail_on_unused_exceptions: Option<bool>,

    #[serde(default)]
    pub skip_repos: Vec<SkipRepoConfig>,

    #[serde(default)]
    pub skip_advisories: Vec<SkipAdvisoryConfig>,

    #[serde(default)]
    pub audit_dirs: Vec<AuditDirsConfig>,
}

/// A repository that is never audited.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SkipRepoConfig {
    pub owner: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// A time-bounded exception for an advisory.
///
/// `"*"` matches anything. Omitting `package` or `advisory` matches only
/// advisories the scanner reported without that information.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SkipAdvisoryConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub advisory: Option<String>,
    /// `YYYY-MM-DD`. The exception stops applying on this date.
    pub expires: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Directories (relative to the checkout) to audit instead of the top level.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AuditDirsConfig {
    pub owner: String,
    pub name: String,
    pub dirs: Vec<String>,
}
