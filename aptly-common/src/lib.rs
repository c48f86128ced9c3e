//! Declarations for aptly mirrors and local repositories.
//!
//! Each declaration is validated and rendered into [`resource::ExecResource`]s:
//! shell commands paired with an idempotency guard. Nothing here runs a
//! process; applying the resources is left to the caller.

pub mod error;
pub mod manifest;
pub mod mirror;
pub mod params;
pub mod repo;
pub mod resource;
pub mod settings;

pub use error::{CommonError, ValidationError};
pub use mirror::{build_mirror_commands, MirrorCommands, MirrorParams, MirrorSpec};
pub use params::{CliOptions, CliValue, OneOrMany, ParamValue};
pub use repo::{build_repo_command, RepoParams, RepoSpec};
pub use resource::{ExecResource, PackageResource, ResourceRef};
pub use settings::{Facts, GlobalSettings};
