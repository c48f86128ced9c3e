use anyhow::Result;
use clap::Parser;
use tracing_subscriber::EnvFilter;

use aptly_plan::commands;
use aptly_plan::pipeline;
use aptly_plan::{Cli, Commands};

fn main() -> Result<()> {
    // Initialize tracing with RUST_LOG env filter
    // e.g., RUST_LOG=aptly_plan=debug
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let plan = pipeline::ExecutionPlan::from_cli(&cli);
    tracing::debug!(dry_run = plan.dry_run, "Execution plan created");

    match cli.command {
        Commands::Validate(args) => commands::validate::run(args),
        Commands::Render(args) => commands::render::run(args),
        Commands::Apply(args) => commands::apply::run(args, &plan),
        Commands::Schema(args) => commands::schema::run(args),
    }
}
