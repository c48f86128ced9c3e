//! `aptly repo` declarations.

use crate::error::ValidationError;
use crate::params::{CliOptions, ParamValue};
use crate::resource::{ExecResource, ResourceRef};
use crate::settings::GlobalSettings;
use serde::{Deserialize, Serialize};

pub fn create_title(name: &str) -> String {
    format!("aptly_repo_create-{}", name)
}

/// Local repository parameters as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct RepoParams {
    /// `aptly repo create` flags such as -component, -distribution or -config
    #[serde(default, alias = "cliOptions", skip_serializing_if = "Option::is_none")]
    pub cli_options: Option<ParamValue>,
}

impl RepoParams {
    pub fn cli_options(mut self, options: impl Into<ParamValue>) -> Self {
        self.cli_options = Some(options.into());
        self
    }

    pub fn validate(self, name: &str) -> Result<RepoSpec, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "name".to_string(),
            });
        }
        let cli_options = match &self.cli_options {
            Some(value) => CliOptions::from_param("cli_options", value)?,
            None => CliOptions::new(),
        };
        Ok(RepoSpec {
            name: name.to_string(),
            cli_options,
        })
    }

    pub fn build(self, name: &str, settings: &GlobalSettings) -> Result<ExecResource, ValidationError> {
        let spec = self.validate(name)?;
        Ok(build_repo_command(&spec, settings))
    }
}

/// A validated repo declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoSpec {
    pub name: String,
    pub cli_options: CliOptions,
}

pub fn build_repo_command(spec: &RepoSpec, settings: &GlobalSettings) -> ExecResource {
    let mut command = vec!["aptly".to_string(), "repo".to_string(), "create".to_string()];
    command.extend(spec.cli_options.to_flags());
    command.push(spec.name.clone());

    let mut create = ExecResource::new(
        create_title(&spec.name),
        command.join(" "),
        format!("aptly repo show {} >/dev/null", spec.name),
        settings.user.clone(),
    );
    create.require.push(ResourceRef::package(&settings.package));
    create
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_option(flag: &str, value: &str) -> ExecResource {
        RepoParams::default()
            .cli_options(ParamValue::hash([(flag, value.into())]))
            .build("example", &GlobalSettings::default())
            .unwrap()
    }

    fn assert_common(exec: &ExecResource, user: &str) {
        assert_eq!(exec.title, "aptly_repo_create-example");
        assert!(exec.unless.ends_with("aptly repo show example >/dev/null"));
        assert_eq!(exec.user, user);
        assert_eq!(exec.require, [ResourceRef::package("aptly")]);
    }

    #[test]
    fn param_defaults() {
        let exec = RepoParams::default()
            .build("example", &GlobalSettings::default())
            .unwrap();
        assert_eq!(exec.command, "aptly repo create example");
        assert_common(&exec, "root");
    }

    #[test]
    fn user_defined_component() {
        let exec = with_option("-component", "third-party");
        assert!(exec.command.ends_with("aptly repo create -component=third-party example"));
        assert_common(&exec, "root");
    }

    #[test]
    fn component_with_custom_user() {
        let exec = RepoParams::default()
            .cli_options(ParamValue::hash([("-component", "third-party".into())]))
            .build("example", &GlobalSettings::with_user("custom_user"))
            .unwrap();
        assert!(exec.command.ends_with("aptly repo create -component=third-party example"));
        assert_common(&exec, "custom_user");
    }

    #[test]
    fn user_defined_architectures() {
        let exec = with_option("-architectures", "i386,amd64");
        assert!(exec.command.ends_with("aptly repo create -architectures=i386,amd64 example"));
        assert_common(&exec, "root");
    }

    #[test]
    fn user_defined_comment() {
        let exec = with_option("-comment", "example comment");
        assert!(exec.command.ends_with("aptly repo create -comment=example comment example"));
        assert_common(&exec, "root");
    }

    #[test]
    fn user_defined_distribution() {
        let exec = with_option("-distribution", "example_distribution");
        assert!(exec
            .command
            .ends_with("aptly repo create -distribution=example_distribution example"));
        assert_common(&exec, "root");
    }

    #[test]
    fn options_keep_declared_order() {
        let exec = RepoParams::default()
            .cli_options(ParamValue::hash([
                ("-distribution", "stable".into()),
                ("-component", "main".into()),
            ]))
            .build("example", &GlobalSettings::default())
            .unwrap();
        assert_eq!(
            exec.command,
            "aptly repo create -distribution=stable -component=main example"
        );
    }

    #[test]
    fn cli_options_not_a_hash() {
        let err = RepoParams::default()
            .cli_options("this is a string")
            .validate("example")
            .unwrap_err();
        assert_eq!(err.field(), "cli_options");
        assert!(err.to_string().contains("is not a Hash"));
    }

    #[test]
    fn repo_has_no_environment() {
        let exec = with_option("-component", "main");
        assert!(exec.environment.is_empty());
    }
}
