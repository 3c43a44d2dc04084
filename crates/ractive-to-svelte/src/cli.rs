//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Converts Ractive components to Svelte components.
#[derive(Debug, Parser)]
#[command(name = "ractive-to-svelte")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Project root that configured directories are relative to
    #[arg(long, default_value = ".")]
    pub workspace: Utf8PathBuf,

    /// Path to the configuration file (default: <workspace>/ractive-to-svelte.json)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Path to a rule table file, overriding the configured one
    #[arg(long)]
    pub rules: Option<Utf8PathBuf>,

    /// Glob patterns to skip, matched against workspace-relative paths
    #[arg(long)]
    pub skip: Vec<String>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Transform and report without writing any file
    #[arg(long = "dry-run")]
    pub dry_run: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}
