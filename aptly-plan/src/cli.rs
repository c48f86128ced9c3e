//! CLI argument definitions for aptly-plan.
//!
//! Separated from `main.rs` so library code (`pipeline::ExecutionPlan::from_cli`)
//! can reference these types.

use clap::{Args, Parser, Subcommand};
use directories::BaseDirs;
use std::path::PathBuf;

use crate::commands;

/// Environment variable naming the default manifest.
pub const MANIFEST_ENV: &str = "APTLY_MANIFEST";

#[derive(Debug, Parser)]
#[command(name = "aptly-plan")]
#[command(about = "Declare aptly mirrors and repos, then render or apply them")]
#[command(version)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Show what would be done without making changes
    #[arg(long, short = 'n', global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Check every declaration in a manifest
    Validate(commands::validate::ValidateArgs),

    /// Print the resources a manifest declares, in application order
    Render(commands::render::RenderArgs),

    /// Apply a manifest to this host
    ///
    /// Each command runs only if its guard fails, so applying twice is a no-op.
    Apply(commands::apply::ApplyArgs),

    /// Print the JSON schema of the manifest format
    Schema(commands::schema::SchemaArgs),
}

/// Manifest selection shared by the manifest-reading commands.
#[derive(Debug, Clone, Args)]
pub struct ManifestArgs {
    /// Manifest file (.json for JSON, anything else is YAML)
    ///
    /// Defaults to $APTLY_MANIFEST, then ~/.config/aptly-plan/manifest.yaml.
    pub manifest: Option<PathBuf>,
}

impl ManifestArgs {
    pub fn resolve(&self) -> PathBuf {
        resolve_manifest_path(self.manifest.clone())
    }
}

/// Explicit path, then `$APTLY_MANIFEST`, then the user config directory.
pub fn resolve_manifest_path(explicit: Option<PathBuf>) -> PathBuf {
    if let Some(path) = explicit {
        return path;
    }
    if let Some(path) = std::env::var_os(MANIFEST_ENV).filter(|p| !p.is_empty()) {
        return PathBuf::from(path);
    }
    let config_dir = BaseDirs::new()
        .map(|d| d.config_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from(".config"));
    config_dir.join("aptly-plan").join("manifest.yaml")
}
