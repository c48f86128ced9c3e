//! Errors raised while assembling and ordering a catalog.

use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Duplicate declaration: {reference} is declared more than once")]
    DuplicateResource { reference: String },

    #[error("{resource} requires {dependency}, which is not declared")]
    UnknownDependency {
        resource: String,
        dependency: String,
    },

    #[error("Dependency cycle between: {}", .members.join(", "))]
    DependencyCycle { members: Vec<String> },

    #[error("Could not determine the distribution codename; pass --codename")]
    MissingCodename,
}
