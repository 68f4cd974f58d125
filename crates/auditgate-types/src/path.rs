use camino::{Utf8Path, Utf8PathBuf};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Directory inside a repository checkout where an audit runs.
///
/// Normalization rules are intentionally simple and deterministic:
/// - always forward slashes (`/`)
/// - no leading `./`
/// - no trailing `/`
/// - the checkout root is `.`
#[derive(
    Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(transparent)]
pub struct AuditDir(String);

impl Default for AuditDir {
    fn default() -> Self {
        AuditDir::root()
    }
}

impl AuditDir {
    pub fn new<S: AsRef<str>>(s: S) -> Self {
        let mut v = s.as_ref().replace('\\', "/");
        while v.starts_with("./") {
            v = v.trim_start_matches("./").to_string();
        }
        while v.len() > 1 && v.ends_with('/') {
            v.pop();
        }
        if v.is_empty() {
            v = ".".to_string();
        }
        Self(v)
    }

    pub fn root() -> Self {
        Self(".".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_root(&self) -> bool {
        self.0 == "."
    }

    /// Absolute paths and `..` components would let an audit escape its checkout.
    pub fn is_contained(&self) -> bool {
        !(self.0.starts_with('/')
            || self.0.split('/').any(|c| c == "..")
            || (self.0.len() >= 2 && self.0.as_bytes()[1] == b':'))
    }

    /// Resolve against a checkout directory.
    pub fn resolve(&self, checkout: &Utf8Path) -> Utf8PathBuf {
        if self.is_root() {
            checkout.to_path_buf()
        } else {
            checkout.join(&self.0)
        }
    }
}

impl std::fmt::Display for AuditDir {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
