//! Plan-centric command infrastructure.
//!
//! Commands are split into two phases:
//! 1. **Planning**: load the manifest, validate it and assemble an immutable
//!    plan (no side effects)
//! 2. **Execution**: apply the plan's operations (all side effects happen here)
//!
//! Dry-run is simply "describe, then stop".

use anyhow::Result;
use owo_colors::OwoColorize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use crate::command_runner::CommandRunner;
use crate::pipeline::ExecutionPlan;

// ============================================================================
// Core Traits
// ============================================================================

/// A command that can produce a plan without side effects.
pub trait Plannable {
    /// The plan type this command produces.
    type Plan: Plan;

    /// Analyze the current state and produce a plan.
    ///
    /// May read files and detect facts, must not modify anything.
    fn plan(&self, ctx: &PlanContext) -> Result<Self::Plan>;
}

/// An immutable description of operations to perform.
pub trait Plan: Sized {
    /// Get a structured description of this plan for display.
    fn describe(&self) -> PlanSummary;

    /// Execute the plan, performing all side effects.
    fn execute(self, ctx: &mut ExecuteContext) -> Result<ExecutionReport>;

    /// Returns true if this plan has no operations to perform.
    fn is_empty(&self) -> bool;
}

// ============================================================================
// Context Types
// ============================================================================

/// Context for the planning phase.
pub struct PlanContext {
    manifest_path: PathBuf,
    codename: Option<String>,
}

impl PlanContext {
    pub fn new(manifest_path: PathBuf, codename: Option<String>) -> Self {
        Self {
            manifest_path,
            codename,
        }
    }

    pub fn manifest_path(&self) -> &PathBuf {
        &self.manifest_path
    }

    /// Codename given on the command line, if any.
    pub fn codename(&self) -> Option<&str> {
        self.codename.as_deref()
    }
}

/// Context for the execution phase.
pub struct ExecuteContext {
    runner: Arc<dyn CommandRunner>,
    current_user: String,
}

impl ExecuteContext {
    pub fn new(execution_plan: &ExecutionPlan) -> Self {
        Self {
            runner: execution_plan.runner(),
            current_user: whoami::username(),
        }
    }

    /// Pretend to be running as `user` (commands for that user are not wrapped).
    pub fn with_current_user(mut self, user: impl Into<String>) -> Self {
        self.current_user = user.into();
        self
    }

    pub fn runner(&self) -> &dyn CommandRunner {
        self.runner.as_ref()
    }

    pub fn current_user(&self) -> &str {
        &self.current_user
    }
}

// ============================================================================
// Operation Types
// ============================================================================

/// A verb describing an operation type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    /// Install a package
    Install,
    /// Run a guarded command
    Run,
    /// Skip (already in desired state)
    Skip,
}

impl Verb {
    pub fn as_str(&self) -> &'static str {
        match self {
            Verb::Install => "Install",
            Verb::Run => "Run",
            Verb::Skip => "Skip",
        }
    }

    pub fn colored(&self) -> String {
        match self {
            Verb::Install => self.as_str().green().to_string(),
            Verb::Run => self.as_str().yellow().to_string(),
            Verb::Skip => self.as_str().dimmed().to_string(),
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single operation in a plan.
#[derive(Debug, Clone)]
pub struct Operation {
    pub verb: Verb,
    /// The target of the operation (e.g., "Exec[aptly_repo_create-main]").
    pub target: String,
    pub details: Option<String>,
}

impl Operation {
    pub fn new(verb: Verb, target: impl Into<String>) -> Self {
        Self {
            verb,
            target: target.into(),
            details: None,
        }
    }

    pub fn with_details(verb: Verb, target: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            verb,
            target: target.into(),
            details: Some(details.into()),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.verb.colored(), self.target)?;
        if let Some(ref details) = self.details {
            write!(f, " ({})", details.dimmed())?;
        }
        Ok(())
    }
}

// ============================================================================
// Plan Summary
// ============================================================================

/// Structured description of a plan for display.
#[derive(Debug, Clone)]
pub struct PlanSummary {
    pub summary: String,
    pub operations: Vec<Operation>,
}

impl PlanSummary {
    pub fn new(summary: impl Into<String>) -> Self {
        Self {
            summary: summary.into(),
            operations: Vec::new(),
        }
    }

    pub fn add_operation(&mut self, op: Operation) {
        self.operations.push(op);
    }

    /// Get count of non-skip operations.
    pub fn action_count(&self) -> usize {
        self.operations
            .iter()
            .filter(|o| o.verb != Verb::Skip)
            .count()
    }
}

impl fmt::Display for PlanSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary.bold())?;

        if self.operations.is_empty() {
            writeln!(f, "  {}", "No operations".dimmed())?;
        } else {
            for op in &self.operations {
                writeln!(f, "  ▸ {}", op)?;
            }
        }

        let action_count = self.action_count();
        if action_count > 0 {
            writeln!(f, "\n{} resource(s), each applied unless its guard passes", action_count)?;
        }

        Ok(())
    }
}

// ============================================================================
// Execution Report
// ============================================================================

/// Result of a single operation execution.
#[derive(Debug, Clone)]
pub struct OperationResult {
    pub operation: Operation,
    pub success: bool,
    pub error: Option<String>,
}

impl OperationResult {
    pub fn success(operation: Operation) -> Self {
        Self {
            operation,
            success: true,
            error: None,
        }
    }

    pub fn failure(operation: Operation, error: impl Into<String>) -> Self {
        Self {
            operation,
            success: false,
            error: Some(error.into()),
        }
    }
}

/// Report of plan execution.
#[derive(Debug, Clone, Default)]
pub struct ExecutionReport {
    pub results: Vec<OperationResult>,
}

impl ExecutionReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&mut self, verb: Verb, target: impl Into<String>) {
        self.results
            .push(OperationResult::success(Operation::new(verb, target)));
    }

    pub fn record_failure(
        &mut self,
        verb: Verb,
        target: impl Into<String>,
        error: impl Into<String>,
    ) {
        self.results.push(OperationResult::failure(
            Operation::new(verb, target),
            error,
        ));
    }

    pub fn success_count(&self) -> usize {
        self.results.iter().filter(|r| r.success).count()
    }

    /// Successful operations that actually changed something.
    pub fn changed_count(&self) -> usize {
        self.results
            .iter()
            .filter(|r| r.success && r.operation.verb != Verb::Skip)
            .count()
    }

    pub fn failure_count(&self) -> usize {
        self.results.iter().filter(|r| !r.success).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.results.iter().all(|r| r.success)
    }

    pub fn has_failures(&self) -> bool {
        self.results.iter().any(|r| !r.success)
    }

    /// Find the result for a target.
    pub fn result_for(&self, target: &str) -> Option<&OperationResult> {
        self.results.iter().find(|r| r.operation.target == target)
    }
}

impl fmt::Display for ExecutionReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let success = self.success_count();
        let failed = self.failure_count();

        if failed == 0 {
            writeln!(
                f,
                "{}",
                format!(
                    "✓ {} resource(s) in sync, {} changed",
                    success,
                    self.changed_count()
                )
                .green()
            )?;
        } else {
            writeln!(
                f,
                "{}",
                format!("⚠ {} succeeded, {} failed", success, failed).yellow()
            )?;
            writeln!(f)?;
            writeln!(f, "Failures:")?;
            for result in &self.results {
                if !result.success {
                    writeln!(
                        f,
                        "  {} {}: {}",
                        "✗".red(),
                        result.operation.target,
                        result.error.as_deref().unwrap_or("Unknown error")
                    )?;
                }
            }
        }

        Ok(())
    }
}
