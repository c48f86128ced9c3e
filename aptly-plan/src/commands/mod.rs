//! Subcommand implementations.

pub mod apply;
pub mod render;
pub mod schema;
pub mod validate;

use anyhow::{Context, Result};
use aptly_common::manifest::{AptlyManifest, ValidatedManifest};
use std::path::Path;
use tracing::debug;

use crate::catalog::Catalog;
use crate::facts;

/// Load and validate a manifest.
pub fn load_validated(path: &Path) -> Result<ValidatedManifest> {
    let manifest = AptlyManifest::load_from(path)
        .with_context(|| format!("Failed to load manifest {}", path.display()))?;
    let validated = manifest
        .validate()
        .with_context(|| format!("Invalid manifest {}", path.display()))?;
    debug!(
        path = %path.display(),
        mirrors = validated.mirrors.len(),
        repos = validated.repos.len(),
        "Manifest validated"
    );
    Ok(validated)
}

/// Load a manifest and assemble its catalog for this host.
pub fn load_catalog(path: &Path, codename: Option<&str>) -> Result<Catalog> {
    let validated = load_validated(path)?;
    let facts = facts::detect(codename)?;
    Ok(Catalog::from_manifest(&validated, &facts)?)
}
