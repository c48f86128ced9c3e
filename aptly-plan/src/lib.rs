//! aptly-plan: render and apply aptly mirror and repo declarations.
//!
//! A manifest declares mirrors and local repositories. Each declaration is
//! validated and rendered by `aptly-common` into guarded exec resources; this
//! crate assembles them into a [`catalog::Catalog`] together with the aptly
//! package, orders them by their requirements, and applies them.
//!
//! ## Phases
//!
//! - **Plan**: load, validate, detect the codename, order the catalog
//! - **Execute**: for each resource run its guard, then the command if needed
//!
//! `--dry-run` stops after the plan is described.

pub mod apply;
pub mod catalog;
pub mod cli;
pub mod command_runner;
pub mod commands;
pub mod error;
pub mod facts;
pub mod output;
pub mod pipeline;
pub mod plan;

pub use cli::{Cli, Commands};
