//! Host fact detection.

use anyhow::{Context, Result};
use aptly_common::Facts;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::CatalogError;

const OS_RELEASE_PATHS: &[&str] = &["/etc/os-release", "/usr/lib/os-release"];

/// Candidate os-release files; `APTLY_OS_RELEASE` overrides the system ones.
fn os_release_paths() -> Vec<PathBuf> {
    match std::env::var_os("APTLY_OS_RELEASE") {
        Some(path) => vec![PathBuf::from(path)],
        None => OS_RELEASE_PATHS.iter().map(PathBuf::from).collect(),
    }
}

fn read_facts(path: &Path) -> Result<Option<Facts>> {
    if !path.exists() {
        return Ok(None);
    }
    let content =
        std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(Facts::from_os_release(&content))
}

/// Resolve facts, preferring an explicit codename.
pub fn detect(codename: Option<&str>) -> Result<Facts> {
    if let Some(codename) = codename {
        return Ok(Facts::new(codename));
    }
    for path in os_release_paths() {
        if let Some(facts) = read_facts(&path)? {
            debug!(path = %path.display(), codename = %facts.codename, "Detected codename");
            return Ok(facts);
        }
    }
    Err(CatalogError::MissingCodename.into())
}
