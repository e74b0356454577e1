//! Quire CLI - repository authorization decisions from the command line.
//!
//! Loads a repository snapshot, builds a decision engine from the layered
//! configuration, and answers "may this requester perform this operation
//! on this resource".
//!
//! Exit codes for `check`: 0 for ALLOW, 1 for DENY, 2 when no decision
//! could be made. Every other command exits 0 on success and 2 on error.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use quire_config::Config;
use quire_core::Decision;

mod commands;
mod config_bridge;
mod formatter;
mod theme;

use commands::{check, config, matrix};
use formatter::OutputFormat;
use theme::Theme;

/// Exit code for a DENY from `check`.
const EXIT_DENY: u8 = 1;
/// Exit code when no decision could be made.
const EXIT_ERROR: u8 = 2;

/// Quire - hierarchical repository authorization
#[derive(Parser)]
#[command(name = "quire")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format: pretty (default) or json
    #[arg(long, global = true, default_value = "pretty")]
    format: String,

    /// Path to a configuration file, merged over the system and user files
    #[arg(short, long, global = true, env = "QUIRE_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decide a single request
    Check {
        /// Repository snapshot (TOML)
        #[arg(short, long)]
        repo: PathBuf,
        /// Resource path
        #[arg(short, long)]
        path: String,
        /// Operation, e.g. READ, CREATE_CHILD, add-acl
        #[arg(short, long)]
        op: String,
        /// Requester identity; anonymous if omitted
        #[arg(short, long)]
        user: Option<String>,
        /// Group membership of the requester (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },

    /// Decide every operation on every resource
    Matrix {
        /// Repository snapshot (TOML)
        #[arg(short, long)]
        repo: PathBuf,
        /// Requester identity; anonymous if omitted
        #[arg(short, long)]
        user: Option<String>,
        /// Group membership of the requester (repeatable)
        #[arg(short, long = "group")]
        groups: Vec<String>,
    },

    /// View and validate configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show resolved configuration with source annotations
    Show {
        /// Output format (toml or json)
        #[arg(short, long, default_value = "toml")]
        format: String,
        /// Show only a specific section (engine, cache, audit, logging)
        #[arg(short, long)]
        section: Option<String>,
    },
    /// Validate the current configuration
    Validate,
    /// Show config file paths being checked
    Paths,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Load config for logging setup; commands that need it report the error.
    let loaded = quire_config::load(cli.config.as_deref());

    let log_config = match &loaded {
        Ok(resolved) => {
            let mut lc = config_bridge::to_log_config(&resolved.config);
            if cli.verbose {
                "debug".clone_into(&mut lc.level);
            }
            lc
        },
        Err(_) => {
            let level = if cli.verbose { "debug" } else { "warn" };
            quire_telemetry::LogConfig::new(level)
                .with_format(quire_telemetry::LogFormat::Compact)
        },
    };
    let _log_guard = match quire_telemetry::setup_logging(&log_config) {
        Ok(guard) => Some(guard),
        Err(e) => {
            eprintln!("Failed to initialize logging: {e}");
            None
        },
    };

    let format = OutputFormat::from_flag(&cli.format);
    match run(cli.command, loaded, cli.config.as_deref(), format).await {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{}", Theme::error(&format!("{e:#}")));
            ExitCode::from(EXIT_ERROR)
        },
    }
}

async fn run(
    command: Commands,
    loaded: quire_config::ConfigResult<quire_config::ResolvedConfig>,
    config_path: Option<&Path>,
    format: OutputFormat,
) -> Result<ExitCode> {
    match command {
        Commands::Check {
            repo,
            path,
            op,
            user,
            groups,
        } => {
            let cfg = loaded?.config;
            let decision = handle_check(&cfg, &repo, &path, &op, user.as_deref(), &groups, format)
                .await?;
            Ok(match decision {
                Decision::Allow => ExitCode::SUCCESS,
                Decision::Deny => ExitCode::from(EXIT_DENY),
            })
        },
        Commands::Matrix { repo, user, groups } => {
            let cfg = loaded?.config;
            let requester = commands::requester(user.as_deref(), &groups)?;
            let repo = commands::load_repository(&repo)?;
            let engine = config_bridge::build_engine(&cfg, &repo);
            matrix::run_matrix(&engine, &repo, &requester, format).await?;
            Ok(ExitCode::SUCCESS)
        },
        Commands::Config { command } => {
            handle_config(command, loaded, config_path)?;
            Ok(ExitCode::SUCCESS)
        },
    }
}

async fn handle_check(
    cfg: &Config,
    repo: &Path,
    path: &str,
    op: &str,
    user: Option<&str>,
    groups: &[String],
    format: OutputFormat,
) -> Result<Decision> {
    let requester = commands::requester(user, groups)?;
    let repo = commands::load_repository(repo)?;
    let engine = config_bridge::build_engine(cfg, &repo);
    check::run_check(&engine, &requester, path, op, format).await
}

fn handle_config(
    command: ConfigCommands,
    loaded: quire_config::ConfigResult<quire_config::ResolvedConfig>,
    config_path: Option<&Path>,
) -> Result<()> {
    match command {
        ConfigCommands::Show { format, section } => {
            config::show_config(&loaded?, &format, section.as_deref())
        },
        ConfigCommands::Validate => {
            config::report_valid(&loaded?);
            Ok(())
        },
        ConfigCommands::Paths => {
            config::show_paths(config_path);
            Ok(())
        },
    }
}
