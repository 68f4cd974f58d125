//! Stable identifiers for checks and finding codes.
//!
//! `check_id` is a dotted namespace. `code` is a short snake_case discriminator.

// Checks
pub const CHECK_AUDIT_ADVISORIES: &str = "audit.advisories";
pub const CHECK_AUDIT_EXCEPTIONS: &str = "audit.exceptions";
pub const CHECK_AUDIT_SCAN: &str = "audit.scan";

// Codes: audit.advisories
pub const CODE_UNMATCHED_ADVISORY: &str = "unmatched_advisory";

// Codes: audit.exceptions
pub const CODE_SKIPPED_ADVISORY: &str = "skipped_advisory";
pub const CODE_EXPIRED_EXCEPTION: &str = "expired_exception";
pub const CODE_UNUSED_EXCEPTION: &str = "unused_exception";

// Codes: audit.scan
pub const CODE_CHECKOUT_FAILED: &str = "checkout_failed";
pub const CODE_NO_MANIFEST: &str = "no_manifest";
pub const CODE_SCAN_FAILED: &str = "scan_failed";

// Tool-level
pub const CHECK_TOOL_RUNTIME: &str = "tool.runtime";
pub const CODE_RUNTIME_ERROR: &str = "runtime_error";
