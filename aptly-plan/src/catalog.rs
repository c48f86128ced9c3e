//! The set of resources to apply and the order they apply in.
//!
//! Builders declare dependencies as `require` lists; the catalog checks that
//! every reference resolves, rejects duplicate declarations, and produces a
//! stable topological order (declaration order wherever dependencies allow).

use aptly_common::manifest::ValidatedManifest;
use aptly_common::{ExecResource, Facts, PackageResource, ResourceRef};
use serde::Serialize;
use std::collections::HashSet;
use tracing::debug;

use crate::error::CatalogError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Resource {
    Package(PackageResource),
    Exec(ExecResource),
}

impl Resource {
    pub fn reference(&self) -> ResourceRef {
        match self {
            Resource::Package(p) => p.reference(),
            Resource::Exec(e) => e.reference(),
        }
    }

    pub fn requires(&self) -> &[ResourceRef] {
        match self {
            Resource::Package(_) => &[],
            Resource::Exec(e) => &e.require,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Catalog {
    resources: Vec<Resource>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assemble the package resource plus every rendered exec.
    pub fn from_manifest(manifest: &ValidatedManifest, facts: &Facts) -> Result<Self, CatalogError> {
        let mut catalog = Catalog::new();
        catalog.add(Resource::Package(PackageResource::installed(
            &manifest.settings.package,
        )))?;
        for exec in manifest.render(facts) {
            catalog.add(Resource::Exec(exec))?;
        }
        debug!(resources = catalog.len(), "Catalog assembled");
        Ok(catalog)
    }

    pub fn add(&mut self, resource: Resource) -> Result<(), CatalogError> {
        let reference = resource.reference();
        if self.resources.iter().any(|r| r.reference() == reference) {
            return Err(CatalogError::DuplicateResource {
                reference: reference.to_string(),
            });
        }
        self.resources.push(resource);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resources in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &Resource> {
        self.resources.iter()
    }

    /// Resources in an order where every resource follows its requirements.
    pub fn ordered(&self) -> Result<Vec<&Resource>, CatalogError> {
        let declared: HashSet<ResourceRef> = self.resources.iter().map(Resource::reference).collect();
        for resource in &self.resources {
            if let Some(missing) = resource.requires().iter().find(|d| !declared.contains(d)) {
                return Err(CatalogError::UnknownDependency {
                    resource: resource.reference().to_string(),
                    dependency: missing.to_string(),
                });
            }
        }

        let mut placed: HashSet<ResourceRef> = HashSet::new();
        let mut remaining: Vec<&Resource> = self.resources.iter().collect();
        let mut ordered = Vec::with_capacity(remaining.len());

        while !remaining.is_empty() {
            let ready = remaining
                .iter()
                .position(|r| r.requires().iter().all(|d| placed.contains(d)));
            let Some(index) = ready else {
                return Err(CatalogError::DependencyCycle {
                    members: remaining.iter().map(|r| r.reference().to_string()).collect(),
                });
            };
            let resource = remaining.remove(index);
            placed.insert(resource.reference());
            ordered.push(resource);
        }

        Ok(ordered)
    }
}
