//! Global execution options shared by every command.

use std::fmt;
use std::sync::Arc;

use crate::Cli;
use crate::command_runner::{CommandRunner, RealCommandRunner};

/// Execution plan for an aptly-plan command.
///
/// Captures the global options that affect how a command executes.
#[derive(Clone)]
pub struct ExecutionPlan {
    /// Whether to perform a dry run
    pub dry_run: bool,
    runner: Arc<dyn CommandRunner>,
}

impl ExecutionPlan {
    /// Create an execution plan from CLI arguments.
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            dry_run: cli.dry_run,
            runner: Arc::new(RealCommandRunner),
        }
    }

    /// Use a different runner (tests substitute a mock here).
    pub fn with_runner(mut self, runner: Arc<dyn CommandRunner>) -> Self {
        self.runner = runner;
        self
    }

    pub fn runner(&self) -> Arc<dyn CommandRunner> {
        Arc::clone(&self.runner)
    }

    /// Check if this plan allows local execution.
    pub fn should_execute(&self) -> bool {
        !self.dry_run
    }
}

impl Default for ExecutionPlan {
    fn default() -> Self {
        Self {
            dry_run: false,
            runner: Arc::new(RealCommandRunner),
        }
    }
}

impl fmt::Debug for ExecutionPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExecutionPlan")
            .field("dry_run", &self.dry_run)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_from_cli_dry_run() {
        let cli = Cli::parse_from(["aptly-plan", "--dry-run", "schema"]);
        let plan = ExecutionPlan::from_cli(&cli);
        assert!(plan.dry_run);
        assert!(!plan.should_execute());
    }

    #[test]
    fn test_default_executes() {
        let plan = ExecutionPlan::default();
        assert!(plan.should_execute());
        assert_eq!(format!("{:?}", plan), "ExecutionPlan { dry_run: false, .. }");
    }
}
