//! Config command - inspect the resolved configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, bail};
use quire_config::{LoadOptions, ResolvedConfig};

use crate::theme::Theme;

/// Print the resolved configuration, optionally one section only.
pub(crate) fn show_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> anyhow::Result<()> {
    println!("{}", render_config(resolved, format, section)?);
    Ok(())
}

fn render_config(
    resolved: &ResolvedConfig,
    format: &str,
    section: Option<&str>,
) -> anyhow::Result<String> {
    let mut value = toml::Value::try_from(&resolved.config)
        .context("failed to serialize configuration")?;
    if let Some(name) = section {
        let Some(found) = value.get(name).cloned() else {
            bail!("unknown section '{name}'; expected one of: engine, cache, audit, logging");
        };
        let mut table = toml::map::Map::new();
        table.insert(name.to_owned(), found);
        value = toml::Value::Table(table);
    }

    match format {
        "json" => Ok(serde_json::to_string_pretty(&value)?),
        "toml" => {
            let mut out = String::new();
            for file in &resolved.loaded_files {
                out.push_str(&format!("# loaded: {file}\n"));
            }
            for var in &resolved.env_overrides {
                out.push_str(&format!("# env: {var}\n"));
            }
            out.push_str(&toml::to_string_pretty(&value)?);
            Ok(out)
        },
        other => bail!("unknown format '{other}'; expected toml or json"),
    }
}

/// Report a configuration that loaded and validated.
pub(crate) fn report_valid(resolved: &ResolvedConfig) {
    println!("{}", Theme::info("Configuration is valid"));
    for file in &resolved.loaded_files {
        println!("  {}", Theme::dimmed(file));
    }
}

/// Print every file layer that would be consulted and whether it exists.
pub(crate) fn show_paths(explicit: Option<&Path>) {
    let options = LoadOptions::from_environment(explicit);
    let user_file = options
        .user_home
        .as_ref()
        .map(|home| home.join(".quire").join("config.toml"));

    println!("\n{}", Theme::header("Configuration Files"));
    println!("{}", Theme::separator());
    print_layer("system", options.system_file.as_ref());
    print_layer("user", user_file.as_ref());
    print_layer("explicit", options.explicit_file.as_ref());
    println!();
}

fn print_layer(layer: &str, path: Option<&PathBuf>) {
    match path {
        Some(path) if path.exists() => println!("{layer:>9}  {}", path.display()),
        Some(path) => println!(
            "{layer:>9}  {}",
            Theme::dimmed(&format!("{} (not found)", path.display()))
        ),
        None => println!("{layer:>9}  {}", Theme::dimmed("-")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quire_config::load_with;

    fn resolved() -> ResolvedConfig {
        load_with(&LoadOptions::isolated().with_env("QUIRE_CACHE_ENABLED", "true")).unwrap()
    }

    #[test]
    fn test_render_toml_annotates_sources() {
        let out = render_config(&resolved(), "toml", None).unwrap();
        assert!(out.starts_with("# env: QUIRE_CACHE_ENABLED\n"));
        assert!(out.contains("[cache]"));
        assert!(out.contains("enabled = true"));
    }

    #[test]
    fn test_render_single_section_as_json() {
        let out = render_config(&resolved(), "json", Some("logging")).unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(parsed["logging"]["level"], "warn");
        assert!(parsed.get("cache").is_none());
    }

    #[test]
    fn test_render_rejects_unknowns() {
        assert!(render_config(&resolved(), "toml", Some("network")).is_err());
        assert!(render_config(&resolved(), "yaml", None).is_err());
    }
}
