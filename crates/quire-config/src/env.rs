//! `QUIRE_*` environment overrides.
//!
//! Applied after every file layer, so an environment variable always wins
//! over files.

use std::collections::HashMap;

use tracing::debug;

use crate::error::{ConfigError, ConfigResult};
use crate::merge::set_path;

#[derive(Clone, Copy)]
enum Kind {
    Str,
    Bool,
    Count,
}

struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: Kind,
}

const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "QUIRE_LOG_LEVEL",
        field_path: "logging.level",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "QUIRE_LOG_FORMAT",
        field_path: "logging.format",
        kind: Kind::Str,
    },
    EnvMapping {
        var_name: "QUIRE_CACHE_ENABLED",
        field_path: "cache.enabled",
        kind: Kind::Bool,
    },
    EnvMapping {
        var_name: "QUIRE_CACHE_MAX_ENTRIES",
        field_path: "cache.max_entries",
        kind: Kind::Count,
    },
    EnvMapping {
        var_name: "QUIRE_AUDIT_ENABLED",
        field_path: "audit.enabled",
        kind: Kind::Bool,
    },
];

/// Snapshot of the `QUIRE_*` variables in the process environment.
#[must_use]
pub(crate) fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars()
        .filter(|(key, _)| key.starts_with("QUIRE_"))
        .collect()
}

/// Apply every known override present in `env_vars` to `merged`.
///
/// Returns the names of the variables applied.
///
/// # Errors
///
/// Returns [`ConfigError::EnvError`] if a boolean or numeric variable does
/// not parse.
pub(crate) fn apply_env_overrides<S: std::hash::BuildHasher>(
    merged: &mut toml::Value,
    env_vars: &HashMap<String, String, S>,
) -> ConfigResult<Vec<String>> {
    let mut applied = Vec::new();
    for mapping in ENV_MAPPINGS {
        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };
        let value = coerce(mapping, raw)?;
        if !set_path(merged, mapping.field_path, value) {
            return Err(ConfigError::EnvError {
                var_name: mapping.var_name.to_owned(),
                message: format!("cannot set '{}'", mapping.field_path),
            });
        }
        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applied environment override"
        );
        applied.push(mapping.var_name.to_owned());
    }
    Ok(applied)
}

fn coerce(mapping: &EnvMapping, raw: &str) -> ConfigResult<toml::Value> {
    let trimmed = raw.trim();
    let invalid = |expected: &str| ConfigError::EnvError {
        var_name: mapping.var_name.to_owned(),
        message: format!("expected {expected}, got '{raw}'"),
    };
    match mapping.kind {
        Kind::Str => Ok(toml::Value::String(trimmed.to_owned())),
        Kind::Bool => match trimmed.to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Ok(toml::Value::Boolean(false)),
            _ => Err(invalid("a boolean")),
        },
        Kind::Count => trimmed
            .parse::<u32>()
            .map(|n| toml::Value::Integer(i64::from(n)))
            .map_err(|_| invalid("a non-negative integer")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn test_overrides_applied() {
        let mut merged: toml::Value = toml::from_str("[cache]\nenabled = false\n").unwrap();
        let applied = apply_env_overrides(
            &mut merged,
            &env(&[
                ("QUIRE_CACHE_ENABLED", "yes"),
                ("QUIRE_CACHE_MAX_ENTRIES", " 42 "),
                ("QUIRE_LOG_LEVEL", "debug"),
                ("QUIRE_UNRELATED", "x"),
            ]),
        )
        .unwrap();

        assert_eq!(applied.len(), 3);
        assert_eq!(merged["cache"]["enabled"].as_bool(), Some(true));
        assert_eq!(merged["cache"]["max_entries"].as_integer(), Some(42));
        assert_eq!(merged["logging"]["level"].as_str(), Some("debug"));
    }

    #[test]
    fn test_bad_bool() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        let err = apply_env_overrides(&mut merged, &env(&[("QUIRE_AUDIT_ENABLED", "maybe")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::EnvError { .. }), "got: {err}");
    }

    #[test]
    fn test_negative_count() {
        let mut merged = toml::Value::Table(toml::map::Map::new());
        assert!(
            apply_env_overrides(&mut merged, &env(&[("QUIRE_CACHE_MAX_ENTRIES", "-1")])).is_err()
        );
    }
}
