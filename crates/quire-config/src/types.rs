//! Configuration schema.
//!
//! Every section implements `Default` with the same values as the embedded
//! `defaults.toml`, and every field is optional in files.

use serde::{Deserialize, Serialize};

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Policy evaluation settings.
    pub engine: EngineConfig,
    /// Nearest-ACL cache settings.
    pub cache: CacheConfig,
    /// Decision audit settings.
    pub audit: AuditConfig,
    /// Log output settings.
    pub logging: LoggingConfig,
}

/// Policy evaluation settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Wire token for the everyone pseudo-principal in stored ACL entries.
    pub everyone_principal: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            everyone_principal: "everyone".to_owned(),
        }
    }
}

/// Nearest-ACL cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Whether decisions go through the cache.
    pub enabled: bool,
    /// Maximum number of cached resource paths.
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            max_entries: 10_000,
        }
    }
}

/// Where decision audit records go.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSinkKind {
    /// Structured `tracing` events on the `quire::audit` target.
    #[default]
    Tracing,
    /// Discard.
    None,
}

/// Decision audit settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Whether records are emitted at all.
    pub enabled: bool,
    /// Destination when enabled.
    pub sink: AuditSinkKind,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sink: AuditSinkKind::Tracing,
        }
    }
}

/// Log output settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `trace`, `debug`, `info`, `warn` or `error`.
    pub level: String,
    /// `pretty`, `compact`, `json` or `full`.
    pub format: String,
    /// Per-target overrides, e.g. `quire_authz=debug`.
    pub directives: Vec<String>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_owned(),
            format: "compact".to_owned(),
            directives: Vec::new(),
        }
    }
}
