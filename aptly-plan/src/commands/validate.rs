//! `aptly-plan validate`

use anyhow::Result;
use clap::Args;

use crate::cli::ManifestArgs;
use crate::output::Output;

#[derive(Debug, Args)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub manifest: ManifestArgs,
}

pub fn run(args: ValidateArgs) -> Result<()> {
    let path = args.manifest.resolve();
    let validated = super::load_validated(&path)?;
    if validated.declaration_count() == 0 {
        Output::warning(format!(
            "{} declares no mirrors or repos; apply will only install {}",
            path.display(),
            validated.settings.package
        ));
        return Ok(());
    }
    Output::success(format!(
        "{}: {} mirror(s), {} repo(s) valid",
        path.display(),
        validated.mirrors.len(),
        validated.repos.len()
    ));
    Ok(())
}
