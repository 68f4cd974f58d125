//! Config parsing and resolution.
//!
//! This crate is intentionally IO-free: it parses and resolves configuration provided as strings.

#![forbid(unsafe_code)]

mod defaults;
mod model;
mod resolve;

pub use model::{AuditDirsConfig, AuditgateConfigV1, SkipAdvisoryConfig, SkipRepoConfig};
pub use resolve::{EffectiveConfig, Overrides, ResolvedConfig};

/// Schema identifier accepted in the optional `schema` key.
pub const SCHEMA_CONFIG_V1: &str = "auditgate.config.v1";

/// Parse `auditgate.toml` (or equivalent) into a typed model.
pub fn parse_config_toml(input: &str) -> anyhow::Result<AuditgateConfigV1> {
    let cfg: AuditgateConfigV1 = toml::from_str(input)?;
    if let Some(schema) = cfg.schema.as_deref()
        && schema != SCHEMA_CONFIG_V1
    {
        anyhow::bail!("unsupported config schema {schema:?} (expected {SCHEMA_CONFIG_V1})");
    }
    Ok(cfg)
}

/// Resolve the effective config used by the audit run (file values + overrides).
pub fn resolve_config(
    cfg: AuditgateConfigV1,
    overrides: Overrides,
) -> anyhow::Result<ResolvedConfig> {
    resolve::resolve_config(cfg, overrides)
}
