//! `aptly-plan apply`: bring the host in line with a manifest.

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::apply::CatalogPlan;
use crate::cli::ManifestArgs;
use crate::output::Output;
use crate::pipeline::ExecutionPlan;
use crate::plan::{ExecuteContext, Plan, PlanContext, Plannable};

#[derive(Debug, Args)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Distribution codename (detected from os-release if omitted)
    #[arg(long)]
    pub codename: Option<String>,

    /// Apply without prompting for confirmation
    #[arg(long)]
    pub confirm: bool,
}

/// Command to apply a manifest.
pub struct ApplyCommand;

impl Plannable for ApplyCommand {
    type Plan = CatalogPlan;

    fn plan(&self, ctx: &PlanContext) -> Result<Self::Plan> {
        let catalog = super::load_catalog(ctx.manifest_path(), ctx.codename())?;
        Ok(CatalogPlan::new(&catalog)?)
    }
}

pub fn run(args: ApplyArgs, exec_plan: &ExecutionPlan) -> Result<()> {
    let plan_ctx = PlanContext::new(args.manifest.resolve(), args.codename.clone());
    let plan = ApplyCommand.plan(&plan_ctx)?;

    if plan.is_empty() {
        Output::success("Nothing to apply.");
        return Ok(());
    }

    // Always show the plan
    print!("{}", plan.describe());

    if !exec_plan.should_execute() {
        Output::dry_run("No commands were run.");
        Output::hint("Run without --dry-run to apply these resources.");
        return Ok(());
    }

    if !args.confirm {
        let confirmed = cliclack::confirm("Apply these resources?")
            .initial_value(false)
            .interact()
            .context("Failed to read confirmation")?;
        if !confirmed {
            Output::info("Cancelled.");
            return Ok(());
        }
    }

    Output::info("Applying...");
    let mut exec_ctx = ExecuteContext::new(exec_plan);
    let report = plan.execute(&mut exec_ctx)?;
    print!("{}", report);

    if report.has_failures() {
        bail!("{} resource(s) failed", report.failure_count());
    }
    Ok(())
}
