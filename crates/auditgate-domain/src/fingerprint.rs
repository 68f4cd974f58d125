use sha2::{Digest, Sha256};

/// Compute a stable SHA-256 fingerprint for an audit finding.
///
/// Identity fields:
/// - check_id
/// - code
/// - repository (empty for run-level findings)
/// - package and advisory id (empty when unknown)
/// - audit directory, appended only when known
pub fn fingerprint_for_finding(
    check_id: &str,
    code: &str,
    repository: Option<&str>,
    package: Option<&str>,
    advisory_id: Option<&str>,
    dir: Option<&str>,
) -> String {
    let parts = [
        check_id,
        code,
        repository.unwrap_or(""),
        package.unwrap_or(""),
        advisory_id.unwrap_or(""),
    ];
    let mut canonical = parts.join("|");
    if let Some(dir) = dir {
        canonical.push('|');
        canonical.push_str(dir);
    }

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    let digest = hasher.finalize();
    hex::encode(digest)
}
