//! `aptly-plan render`: print the catalog in application order.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use crate::catalog::Resource;
use crate::cli::ManifestArgs;
use crate::output::Output;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum RenderFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Args)]
pub struct RenderArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,

    /// Distribution codename (detected from os-release if omitted)
    #[arg(long)]
    pub codename: Option<String>,

    /// Output format
    #[arg(long, value_enum, default_value_t = RenderFormat::Text)]
    pub format: RenderFormat,
}

fn print_resource(resource: &Resource) {
    Output::subheader(resource.reference().to_string());
    match resource {
        Resource::Package(p) => Output::kv("ensure", &p.ensure),
        Resource::Exec(e) => {
            Output::kv("command", &e.command);
            Output::kv("unless", &e.unless);
            Output::kv("user", &e.user);
            if !e.environment.is_empty() {
                Output::kv("environment", e.environment.join(" "));
            }
            if !e.require.is_empty() {
                let require: Vec<String> = e.require.iter().map(|r| r.to_string()).collect();
                Output::kv("require", require.join(", "));
            }
        }
    }
}

pub fn run(args: RenderArgs) -> Result<()> {
    let path = args.manifest.resolve();
    let catalog = super::load_catalog(&path, args.codename.as_deref())?;
    let ordered = catalog.ordered()?;

    match args.format {
        RenderFormat::Json => {
            let json =
                serde_json::to_string_pretty(&ordered).context("Failed to serialize catalog")?;
            println!("{}", json);
        }
        RenderFormat::Text => {
            for (i, resource) in ordered.iter().enumerate() {
                if i > 0 {
                    Output::blank();
                }
                print_resource(resource);
            }
        }
    }
    Ok(())
}
