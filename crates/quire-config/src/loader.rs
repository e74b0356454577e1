//! Layered configuration loading.
//!
//! 1. Parse the embedded `defaults.toml`
//! 2. Merge `/etc/quire/config.toml` (system), if present
//! 3. Merge `~/.quire/config.toml` (user), if present
//! 4. Merge the explicit file, which must exist when given
//! 5. Apply `QUIRE_*` environment overrides
//! 6. Deserialize and validate

use serde::Serialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_overrides, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::deep_merge;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Maximum accepted config file size (1 MiB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

const SYSTEM_CONFIG_PATH: &str = "/etc/quire/config.toml";

/// Where [`load_with`] looks for layers.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// System-wide file. Skipped if `None` or missing.
    pub system_file: Option<PathBuf>,
    /// Home directory holding `.quire/config.toml`. Skipped if `None` or missing.
    pub user_home: Option<PathBuf>,
    /// File named on the command line. An error if missing.
    pub explicit_file: Option<PathBuf>,
    /// Environment variables to consider for overrides.
    pub env: HashMap<String, String>,
}

impl LoadOptions {
    /// The standard layers for this process: the system file, the current
    /// user's home, `explicit_file` and the `QUIRE_*` environment.
    #[must_use]
    pub fn from_environment(explicit_file: Option<&Path>) -> Self {
        Self {
            system_file: Some(PathBuf::from(SYSTEM_CONFIG_PATH)),
            user_home: directories::BaseDirs::new().map(|d| d.home_dir().to_path_buf()),
            explicit_file: explicit_file.map(Path::to_path_buf),
            env: collect_env_vars(),
        }
    }

    /// No files and no environment: embedded defaults only.
    #[must_use]
    pub fn isolated() -> Self {
        Self::default()
    }

    /// Use `path` as the explicit file.
    #[must_use]
    pub fn with_explicit_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.explicit_file = Some(path.into());
        self
    }

    /// Use `home` as the user home directory.
    #[must_use]
    pub fn with_user_home(mut self, home: impl Into<PathBuf>) -> Self {
        self.user_home = Some(home.into());
        self
    }

    /// Use `path` as the system file.
    #[must_use]
    pub fn with_system_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.system_file = Some(path.into());
        self
    }

    /// Add an environment variable.
    #[must_use]
    pub fn with_env(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(name.into(), value.into());
        self
    }
}

/// A loaded configuration and where it came from.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedConfig {
    /// The final, validated configuration.
    pub config: Config,
    /// Files merged, lowest precedence first.
    pub loaded_files: Vec<String>,
    /// Environment variables applied.
    pub env_overrides: Vec<String>,
}

impl ResolvedConfig {
    /// Render the configuration as TOML.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::SerializeError`] if rendering fails.
    pub fn to_toml(&self) -> ConfigResult<String> {
        Ok(toml::to_string_pretty(&self.config)?)
    }
}

/// Load configuration with the standard layers for this process.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any file is unreadable or malformed, an
/// environment override does not parse, or validation fails.
pub fn load(explicit_file: Option<&Path>) -> ConfigResult<ResolvedConfig> {
    load_with(&LoadOptions::from_environment(explicit_file))
}

/// Load configuration from the layers in `options`.
///
/// # Errors
///
/// See [`load`].
pub fn load_with(options: &LoadOptions) -> ConfigResult<ResolvedConfig> {
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;
    let mut loaded_files = Vec::new();

    let user_file = options
        .user_home
        .as_ref()
        .map(|home| home.join(".quire").join("config.toml"));

    let optional_layers = [
        ("system", options.system_file.as_ref()),
        ("user", user_file.as_ref()),
    ];
    for (layer, path) in optional_layers {
        let Some(path) = path else { continue };
        if let Some(overlay) = try_load_file(path)? {
            deep_merge(&mut merged, &overlay);
            loaded_files.push(path.display().to_string());
            info!(layer, path = %path.display(), "loaded config");
        }
    }

    if let Some(path) = &options.explicit_file {
        let overlay = try_load_file(path)?.ok_or_else(|| ConfigError::ReadError {
            path: path.display().to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        })?;
        deep_merge(&mut merged, &overlay);
        loaded_files.push(path.display().to_string());
        info!(layer = "explicit", path = %path.display(), "loaded config");
    }

    let env_overrides = apply_env_overrides(&mut merged, &options.env)?;
    if !env_overrides.is_empty() {
        debug!(count = env_overrides.len(), "applied environment overrides");
    }

    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        loaded_files,
        env_overrides,
    })
}

/// Load a single file on top of the defaults, with no other layers.
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file is missing, unreadable, malformed,
/// or fails validation.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    load_with(&LoadOptions::isolated().with_explicit_file(path)).map(|resolved| resolved.config)
}

/// Read a TOML file, returning `None` if it does not exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };

    if u64::try_from(content.len()).unwrap_or(u64::MAX) > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {MAX_CONFIG_FILE_SIZE} byte limit",
                content.len()
            ),
        });
    }

    let value = toml::from_str(&content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AuditSinkKind;
    use std::fs;

    #[test]
    fn test_defaults_match_default_impls() {
        let parsed: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(parsed, Config::default());
    }

    #[test]
    fn test_isolated_load_is_defaults() {
        let resolved = load_with(&LoadOptions::isolated()).unwrap();
        assert_eq!(resolved.config, Config::default());
        assert!(resolved.loaded_files.is_empty());
        assert!(resolved.env_overrides.is_empty());
    }

    #[test]
    fn test_layer_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let system = dir.path().join("system.toml");
        fs::write(
            &system,
            "[cache]\nenabled = true\nmax_entries = 50\n[logging]\nlevel = \"info\"\n",
        )
        .unwrap();

        let home = dir.path().join("home");
        fs::create_dir_all(home.join(".quire")).unwrap();
        fs::write(home.join(".quire").join("config.toml"), "[cache]\nmax_entries = 75\n").unwrap();

        let explicit = dir.path().join("explicit.toml");
        fs::write(&explicit, "[audit]\nsink = \"none\"\n[logging]\nlevel = \"debug\"\n").unwrap();

        let resolved = load_with(
            &LoadOptions::isolated()
                .with_system_file(&system)
                .with_user_home(&home)
                .with_explicit_file(&explicit)
                .with_env("QUIRE_LOG_LEVEL", "error"),
        )
        .unwrap();

        let config = &resolved.config;
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, 75);
        assert_eq!(config.audit.sink, AuditSinkKind::None);
        assert!(config.audit.enabled);
        assert_eq!(config.logging.level, "error");
        assert_eq!(resolved.loaded_files.len(), 3);
        assert_eq!(resolved.env_overrides, vec!["QUIRE_LOG_LEVEL"]);
    }

    #[test]
    fn test_missing_optional_layers_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_with(
            &LoadOptions::isolated()
                .with_system_file(dir.path().join("nope.toml"))
                .with_user_home(dir.path()),
        )
        .unwrap();
        assert!(resolved.loaded_files.is_empty());
    }

    #[test]
    fn test_missing_explicit_file_is_an_error() {
        let result = load_file(Path::new("/nonexistent/quire.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.toml");
        fs::write(&path, "[cache\nenabled = true\n").unwrap();
        assert!(matches!(load_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_wrong_type_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("typed.toml");
        fs::write(&path, "[cache]\nmax_entries = \"lots\"\n").unwrap();
        assert!(matches!(load_file(&path), Err(ConfigError::ParseError { .. })));
    }

    #[test]
    fn test_oversized_file_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("huge.toml");
        let padding = "#".repeat(1_048_577);
        fs::write(&path, padding).unwrap();
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_invalid_value_fails_validation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("invalid.toml");
        fs::write(&path, "[engine]\neveryone_principal = \"\"\n").unwrap();
        assert!(matches!(
            load_file(&path),
            Err(ConfigError::ValidationError { .. })
        ));
    }

    #[test]
    fn test_to_toml_round_trips() {
        let resolved = load_with(&LoadOptions::isolated().with_env("QUIRE_CACHE_ENABLED", "true"))
            .unwrap();
        let rendered = resolved.to_toml().unwrap();
        assert!(rendered.contains("[cache]"));
        let reparsed: Config = toml::from_str(&rendered).unwrap();
        assert_eq!(reparsed, resolved.config);
    }
}
