//! Applying a catalog to the running host.
//!
//! Each exec runs its `unless` guard first and only runs the command when the
//! guard fails. A resource whose requirement failed is not attempted.

use anyhow::{Result, bail};
use aptly_common::{ExecResource, PackageResource, ResourceRef};
use nix::unistd::User;
use std::collections::HashSet;
use std::path::Path;
use std::process::Output;
use tracing::{debug, info, warn};

use crate::catalog::{Catalog, Resource};
use crate::command_runner::CommandOptions;
use crate::error::CatalogError;
use crate::plan::{ExecuteContext, ExecutionReport, Operation, Plan, PlanSummary, Verb};

/// Status line dpkg reports for an installed package.
const DPKG_INSTALLED: &str = "install ok installed";

/// Where `runuser` is installed on Debian-family systems (root only, outside a
/// plain user's PATH).
const RUNUSER_PATHS: &[&str] = &["/usr/sbin/runuser", "/sbin/runuser", "/usr/bin/runuser"];

fn runuser_program() -> String {
    RUNUSER_PATHS
        .iter()
        .find(|path| Path::new(path).exists())
        .map(|path| path.to_string())
        .unwrap_or_else(|| "runuser".to_string())
}

/// Home directory of `user`, if the account exists.
fn home_dir(user: &str) -> Option<String> {
    User::from_name(user)
        .ok()
        .flatten()
        .map(|u| u.dir.display().to_string())
}

/// A process to start and the environment it gets.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub program: String,
    pub args: Vec<String>,
    pub env: Vec<(String, String)>,
}

/// Run `script` with `sh -c` as `user`, with `env` applied to the shell.
///
/// A script for another user goes through `runuser`, and its environment
/// (plus that user's `HOME`) is set inside it with `env`. The exec's `PATH`
/// then only governs the script, never the lookup of `runuser` itself.
pub fn shell_invocation(
    user: &str,
    current_user: &str,
    home: Option<&str>,
    env: Vec<(String, String)>,
    script: &str,
) -> Invocation {
    if user == current_user {
        return Invocation {
            program: "sh".to_string(),
            args: vec!["-c".to_string(), script.to_string()],
            env,
        };
    }

    let mut args = vec!["-u".to_string(), user.to_string(), "--".to_string(), "env".to_string()];
    args.extend(home.map(|h| format!("HOME={}", h)));
    args.extend(env.iter().map(|(k, v)| format!("{}={}", k, v)));
    args.extend(["sh", "-c", script].map(String::from));
    Invocation {
        program: runuser_program(),
        args,
        env: Vec::new(),
    }
}

fn failure_message(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    match stderr.lines().rev().find(|l| !l.trim().is_empty()) {
        Some(line) => format!("{} ({})", output.status, line.trim()),
        None => output.status.to_string(),
    }
}

/// The catalog, checked and in application order.
pub struct CatalogPlan {
    resources: Vec<Resource>,
}

impl CatalogPlan {
    pub fn new(catalog: &Catalog) -> Result<Self, CatalogError> {
        let resources = catalog.ordered()?.into_iter().cloned().collect();
        Ok(Self { resources })
    }

    fn run_script(
        ctx: &ExecuteContext,
        exec: &ExecResource,
        script: &str,
    ) -> Result<Output> {
        let mut env = exec.env_pairs();
        env.push(("PATH".to_string(), exec.path.clone()));
        let home = if exec.user == ctx.current_user() {
            None
        } else {
            home_dir(&exec.user)
        };
        let invocation =
            shell_invocation(&exec.user, ctx.current_user(), home.as_deref(), env, script);
        let args: Vec<&str> = invocation.args.iter().map(String::as_str).collect();
        ctx.runner().run_output(
            &invocation.program,
            &args,
            &CommandOptions::with_env(invocation.env),
        )
    }

    fn apply_exec(ctx: &ExecuteContext, exec: &ExecResource) -> Result<Verb> {
        let guard = Self::run_script(ctx, exec, &exec.unless)?;
        if guard.status.success() {
            debug!(title = %exec.title, "Guard passed, skipping");
            return Ok(Verb::Skip);
        }

        info!(title = %exec.title, user = %exec.user, "Running command");
        let output = Self::run_script(ctx, exec, &exec.command)?;
        if !output.status.success() {
            bail!("{}", failure_message(&output));
        }
        Ok(Verb::Run)
    }

    fn apply_package(ctx: &ExecuteContext, package: &PackageResource) -> Result<Verb> {
        let status = ctx.runner().run_output(
            "dpkg-query",
            &["-W", "-f=${Status}", package.name.as_str()],
            &CommandOptions::default(),
        )?;
        if status.status.success() && String::from_utf8_lossy(&status.stdout).trim() == DPKG_INSTALLED
        {
            debug!(package = %package.name, "Package already installed");
            return Ok(Verb::Skip);
        }

        info!(package = %package.name, "Installing package");
        let env = vec![("DEBIAN_FRONTEND".to_string(), "noninteractive".to_string())];
        let output = ctx.runner().run_output(
            "apt-get",
            &["install", "-y", package.name.as_str()],
            &CommandOptions::with_env(env),
        )?;
        if !output.status.success() {
            bail!("{}", failure_message(&output));
        }
        Ok(Verb::Install)
    }
}

fn intended_verb(resource: &Resource) -> Verb {
    match resource {
        Resource::Package(_) => Verb::Install,
        Resource::Exec(_) => Verb::Run,
    }
}

impl Plan for CatalogPlan {
    fn describe(&self) -> PlanSummary {
        let mut summary = PlanSummary::new("Apply Plan");
        for resource in &self.resources {
            let target = resource.reference().to_string();
            let op = match resource {
                Resource::Package(p) => {
                    Operation::with_details(Verb::Install, target, format!("ensure {}", p.ensure))
                }
                Resource::Exec(e) => {
                    Operation::with_details(Verb::Run, target, format!("as {}: {}", e.user, e.command))
                }
            };
            summary.add_operation(op);
        }
        summary
    }

    fn execute(self, ctx: &mut ExecuteContext) -> Result<ExecutionReport> {
        let mut report = ExecutionReport::new();
        let mut failed: HashSet<ResourceRef> = HashSet::new();

        for resource in &self.resources {
            let reference = resource.reference();
            let target = reference.to_string();

            if let Some(dep) = resource.requires().iter().find(|d| failed.contains(*d)) {
                warn!(resource = %target, dependency = %dep, "Skipping, requirement failed");
                report.record_failure(
                    intended_verb(resource),
                    target,
                    format!("not attempted: {} failed", dep),
                );
                failed.insert(reference);
                continue;
            }

            let outcome = match resource {
                Resource::Package(p) => Self::apply_package(ctx, p),
                Resource::Exec(e) => Self::apply_exec(ctx, e),
            };
            match outcome {
                Ok(verb) => report.record_success(verb, target),
                Err(e) => {
                    warn!(resource = %target, error = %e, "Resource failed");
                    report.record_failure(intended_verb(resource), target, format!("{:#}", e));
                    failed.insert(reference);
                }
            }
        }

        Ok(report)
    }

    fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}
