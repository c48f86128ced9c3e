//! `aptly mirror` declarations.
//!
//! A mirror declaration becomes up to two exec resources: a GPG key import
//! into the keyring aptly verifies against, and the `aptly mirror create`
//! call that depends on it.

use crate::error::ValidationError;
use crate::params::{string_array, CliOptions, OneOrMany, ParamValue};
use crate::resource::{quote, quote_all, ExecResource, ResourceRef};
use crate::settings::{Facts, GlobalSettings};
use serde::{Deserialize, Serialize};

pub const DEFAULT_KEYSERVER: &str = "keyserver.ubuntu.com";

/// gpg invocation operating on the keyring aptly reads.
pub const GPG_CMD: &str = "gpg --no-default-keyring --keyring trustedkeys.gpg";

/// Flags every mirror is created with unless overridden.
pub fn default_cli_options() -> CliOptions {
    [
        ("-with-sources", false),
        ("-with-udebs", false),
        ("-force-components", false),
    ]
    .into_iter()
    .collect()
}

pub fn gpg_title(name: &str) -> String {
    format!("aptly_mirror_gpg-{}", name)
}

pub fn create_title(name: &str) -> String {
    format!("aptly_mirror_create-{}", name)
}

/// Mirror parameters as declared, before validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
#[serde(deny_unknown_fields)]
pub struct MirrorParams {
    /// URL of the upstream archive
    pub location: String,

    /// Signing key id, or list of ids
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<ParamValue>,

    /// Keyserver the keys are fetched from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keyserver: Option<String>,

    /// Components to mirror (e.g. main, contrib)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repos: Option<ParamValue>,

    /// KEY=VALUE entries exported to `aptly mirror create`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<ParamValue>,

    /// Extra `aptly mirror create` flags, merged over the defaults
    #[serde(default, alias = "cliOptions", skip_serializing_if = "Option::is_none")]
    pub cli_options: Option<ParamValue>,
}

impl MirrorParams {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    pub fn key(mut self, key: impl Into<ParamValue>) -> Self {
        self.key = Some(key.into());
        self
    }

    pub fn keyserver(mut self, keyserver: impl Into<String>) -> Self {
        self.keyserver = Some(keyserver.into());
        self
    }

    pub fn repos(mut self, repos: impl Into<ParamValue>) -> Self {
        self.repos = Some(repos.into());
        self
    }

    pub fn environment(mut self, environment: impl Into<ParamValue>) -> Self {
        self.environment = Some(environment.into());
        self
    }

    pub fn cli_options(mut self, options: impl Into<ParamValue>) -> Self {
        self.cli_options = Some(options.into());
        self
    }

    /// Check every parameter and produce the canonical spec.
    pub fn validate(self, name: &str) -> Result<MirrorSpec, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::Empty {
                field: "name".to_string(),
            });
        }
        if self.location.is_empty() {
            return Err(ValidationError::Empty {
                field: "location".to_string(),
            });
        }

        let key = match &self.key {
            Some(value) => OneOrMany::from_param("key", value)?.into_vec(),
            None => Vec::new(),
        };
        let repos = match &self.repos {
            Some(value) => string_array("repos", value)?,
            None => Vec::new(),
        };
        let user_options = match &self.cli_options {
            Some(value) => CliOptions::from_param("cli_options", value)?,
            None => CliOptions::new(),
        };
        let environment = match &self.environment {
            Some(value) => string_array("environment", value)?,
            None => Vec::new(),
        };

        Ok(MirrorSpec {
            name: name.to_string(),
            location: self.location,
            key,
            keyserver: self
                .keyserver
                .filter(|k| !k.is_empty())
                .unwrap_or_else(|| DEFAULT_KEYSERVER.to_string()),
            repos,
            environment,
            cli_options: user_options.merged_over(default_cli_options()),
        })
    }

    /// Validate and render in one step.
    pub fn build(
        self,
        name: &str,
        settings: &GlobalSettings,
        facts: &Facts,
    ) -> Result<MirrorCommands, ValidationError> {
        let spec = self.validate(name)?;
        Ok(build_mirror_commands(&spec, settings, facts))
    }
}

/// A validated mirror declaration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MirrorSpec {
    pub name: String,
    pub location: String,
    pub key: Vec<String>,
    pub keyserver: String,
    pub repos: Vec<String>,
    pub environment: Vec<String>,
    /// Effective options: defaults with user overrides applied.
    pub cli_options: CliOptions,
}

/// Resources rendered for one mirror.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MirrorCommands {
    pub gpg: Option<ExecResource>,
    pub create: ExecResource,
}

impl MirrorCommands {
    /// Resources in application order.
    pub fn into_resources(self) -> Vec<ExecResource> {
        self.gpg.into_iter().chain(std::iter::once(self.create)).collect()
    }
}

pub fn build_mirror_commands(
    spec: &MirrorSpec,
    settings: &GlobalSettings,
    facts: &Facts,
) -> MirrorCommands {
    let gpg = (!spec.key.is_empty()).then(|| {
        let keys = quote_all(&spec.key);
        ExecResource::new(
            gpg_title(&spec.name),
            format!(
                "{} --keyserver {} --recv-keys {}",
                GPG_CMD,
                quote(&spec.keyserver),
                keys
            ),
            format!("echo {} | xargs -n1 {} --list-keys", keys, GPG_CMD),
            settings.user.clone(),
        )
    });

    let mut command = vec!["aptly".to_string(), "mirror".to_string(), "create".to_string()];
    command.extend(spec.cli_options.to_flags());
    command.push(spec.name.clone());
    command.push(spec.location.clone());
    command.push(facts.codename.clone());
    command.extend(spec.repos.iter().cloned());

    // the existence check must read the same config file the mirror lives in
    let mut show = vec!["aptly".to_string(), "mirror".to_string(), "show".to_string()];
    show.extend(spec.cli_options.flag("-config"));
    show.push(spec.name.clone());

    let mut create = ExecResource::new(
        create_title(&spec.name),
        command.join(" "),
        format!("{} >/dev/null", show.join(" ")),
        settings.user.clone(),
    );
    create.environment = spec.environment.clone();
    create.require.push(ResourceRef::package(&settings.package));
    if let Some(gpg) = &gpg {
        create.require.push(gpg.reference());
    }

    MirrorCommands { gpg, create }
}
