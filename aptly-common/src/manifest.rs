//! The manifest file: settings plus named mirror and repo declarations.
//!
//! Declarations keep file order, which is the order their resources render in.

use crate::error::CommonError;
use crate::mirror::{build_mirror_commands, MirrorParams, MirrorSpec};
use crate::repo::{build_repo_command, RepoParams, RepoSpec};
use crate::resource::ExecResource;
use crate::settings::{Facts, GlobalSettings};
use serde::de::{self, Deserialize, Deserializer, MapAccess, Visitor};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::fs;
use std::marker::PhantomData;
use std::path::Path;

/// Named declarations in the order they appear in the file.
#[derive(Debug, Clone, PartialEq)]
pub struct Declarations<T>(Vec<(String, T)>);

impl<T> Default for Declarations<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T> Declarations<T> {
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.0.iter().map(|(name, params)| (name.as_str(), params))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Add or replace a declaration; new names go last.
    pub fn upsert(&mut self, name: impl Into<String>, params: T) {
        let name = name.into();
        if let Some(existing) = self.0.iter_mut().find(|(n, _)| *n == name) {
            existing.1 = params;
        } else {
            self.0.push((name, params));
        }
    }
}

impl<T: Serialize> Serialize for Declarations<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, params) in &self.0 {
            map.serialize_entry(name, params)?;
        }
        map.end()
    }
}

struct DeclarationsVisitor<T>(PhantomData<T>);

impl<'de, T: Deserialize<'de>> Visitor<'de> for DeclarationsVisitor<T> {
    type Value = Declarations<T>;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a mapping from name to parameters")
    }

    fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
        Ok(Declarations::default())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Self::Value, A::Error> {
        let mut entries: Vec<(String, T)> = Vec::new();
        while let Some((name, params)) = map.next_entry::<String, T>()? {
            if entries.iter().any(|(n, _)| *n == name) {
                return Err(de::Error::custom(format!("duplicate declaration '{}'", name)));
            }
            entries.push((name, params));
        }
        Ok(Declarations(entries))
    }
}

impl<'de, T: Deserialize<'de>> Deserialize<'de> for Declarations<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(DeclarationsVisitor(PhantomData))
    }
}

#[cfg(feature = "schema")]
impl<T: schemars::JsonSchema> schemars::JsonSchema for Declarations<T> {
    fn schema_name() -> std::borrow::Cow<'static, str> {
        format!("Declarations_for_{}", T::schema_name()).into()
    }

    fn json_schema(generator: &mut schemars::SchemaGenerator) -> schemars::Schema {
        let params = generator.subschema_for::<T>();
        schemars::json_schema!({
            "type": "object",
            "additionalProperties": params
        })
    }
}

/// The mirrors/repos manifest (`manifest.yaml` or `manifest.json`).
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct AptlyManifest {
    #[serde(rename = "$schema", default, skip_serializing_if = "Option::is_none")]
    pub schema: Option<String>,

    #[serde(default)]
    pub settings: GlobalSettings,

    /// Mirrors keyed by name
    #[serde(default)]
    pub mirrors: Declarations<MirrorParams>,

    /// Local repositories keyed by name
    #[serde(default)]
    pub repos: Declarations<RepoParams>,
}

impl AptlyManifest {
    /// Parse manifest content; `json` selects JSON, otherwise YAML.
    pub fn parse(content: &str, json: bool) -> Result<Self, CommonError> {
        if json {
            Ok(serde_json::from_str(content)?)
        } else if content.trim().is_empty() {
            Ok(Self::default())
        } else {
            Ok(serde_yaml::from_str(content)?)
        }
    }

    /// Load a manifest from a path. The `.json` extension selects JSON.
    pub fn load_from(path: &Path) -> Result<Self, CommonError> {
        let content = fs::read_to_string(path)?;
        let json = path.extension().is_some_and(|ext| ext == "json");
        Self::parse(&content, json)
    }

    /// Validate every declaration, collecting all failures.
    pub fn validate(&self) -> Result<ValidatedManifest, CommonError> {
        let mut errors = Vec::new();

        let mut mirrors = Vec::with_capacity(self.mirrors.len());
        for (name, params) in self.mirrors.iter() {
            match params.clone().validate(name) {
                Ok(spec) => mirrors.push(spec),
                Err(source) => errors.push(CommonError::Declaration {
                    kind: "mirror",
                    name: name.to_string(),
                    source,
                }),
            }
        }

        let mut repos = Vec::with_capacity(self.repos.len());
        for (name, params) in self.repos.iter() {
            match params.clone().validate(name) {
                Ok(spec) => repos.push(spec),
                Err(source) => errors.push(CommonError::Declaration {
                    kind: "repo",
                    name: name.to_string(),
                    source,
                }),
            }
        }

        if !errors.is_empty() {
            return Err(CommonError::InvalidDeclarations(errors));
        }

        Ok(ValidatedManifest {
            settings: self.settings.clone(),
            mirrors,
            repos,
        })
    }
}

/// A manifest whose declarations all passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedManifest {
    pub settings: GlobalSettings,
    pub mirrors: Vec<MirrorSpec>,
    pub repos: Vec<RepoSpec>,
}

impl ValidatedManifest {
    pub fn declaration_count(&self) -> usize {
        self.mirrors.len() + self.repos.len()
    }

    /// Every exec resource: mirrors first, then repos, in manifest order.
    pub fn render(&self, facts: &Facts) -> Vec<ExecResource> {
        let mut resources = Vec::new();
        for spec in &self.mirrors {
            resources.extend(build_mirror_commands(spec, &self.settings, facts).into_resources());
        }
        for spec in &self.repos {
            resources.push(build_repo_command(spec, &self.settings));
        }
        resources
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::ParamValue;
    use tempfile::TempDir;

    const YAML: &str = r#"
settings:
  user: aptly
mirrors:
  zz-last:
    location: http://deb.debian.org/debian
    key: ABC123
    repos: [main, contrib]
  aa-first:
    location: http://security.debian.org
repos:
  internal:
    cli_options:
      -component: third-party
"#;

    #[test]
    fn parses_yaml_in_declaration_order() {
        let manifest = AptlyManifest::parse(YAML, false).unwrap();
        assert_eq!(manifest.settings.user, "aptly");
        assert_eq!(manifest.settings.package, "aptly");
        let names: Vec<&str> = manifest.mirrors.iter().map(|(n, _)| n).collect();
        assert_eq!(names, ["zz-last", "aa-first"]);
        assert_eq!(manifest.repos.len(), 1);
    }

    #[test]
    fn empty_document_is_empty_manifest() {
        let manifest = AptlyManifest::parse("", false).unwrap();
        assert!(manifest.mirrors.is_empty());
        assert!(manifest.repos.is_empty());
    }

    #[test]
    fn null_sections_are_empty() {
        let manifest = AptlyManifest::parse("mirrors:\nrepos:\n", false).unwrap();
        assert!(manifest.mirrors.is_empty());
    }

    #[test]
    fn rejects_duplicate_names_in_json() {
        let json = r#"{"repos": {"a": {}, "a": {}}}"#;
        let err = AptlyManifest::parse(json, true).unwrap_err();
        assert!(err.to_string().contains("duplicate declaration 'a'"));
    }

    #[test]
    fn rejects_unknown_parameters() {
        let err = AptlyManifest::parse("repos:\n  a:\n    colour: red\n", false).unwrap_err();
        assert!(matches!(err, CommonError::Yaml(_)));
    }

    #[test]
    fn renders_mirrors_then_repos() {
        let manifest = AptlyManifest::parse(YAML, false).unwrap();
        let validated = manifest.validate().unwrap();
        assert_eq!(validated.declaration_count(), 3);
        let titles: Vec<String> = validated
            .render(&Facts::new("bookworm"))
            .into_iter()
            .map(|r| r.title)
            .collect();
        assert_eq!(
            titles,
            [
                "aptly_mirror_gpg-zz-last",
                "aptly_mirror_create-zz-last",
                "aptly_mirror_create-aa-first",
                "aptly_repo_create-internal",
            ]
        );
    }

    #[test]
    fn validate_reports_every_bad_entry() {
        let mut manifest = AptlyManifest::default();
        manifest.mirrors.upsert(
            "one",
            MirrorParams::new("http://a").repos("main"),
        );
        manifest.mirrors.upsert(
            "two",
            MirrorParams::new("http://b").environment("FOO=bar"),
        );
        manifest
            .repos
            .upsert("three", RepoParams::default().cli_options(ParamValue::Bool(true)));

        let CommonError::InvalidDeclarations(errors) = manifest.validate().unwrap_err() else {
            panic!("expected InvalidDeclarations");
        };
        assert_eq!(errors.len(), 3);
        let text: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
        assert!(text[0].starts_with("mirror 'one': repos"));
        assert!(text[1].starts_with("mirror 'two': environment"));
        assert!(text[2].starts_with("repo 'three': cli_options"));
        assert!(text[2].ends_with("is not a Hash"));
    }

    #[test]
    fn loads_json_by_extension() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("manifest.json");
        fs::write(
            &path,
            r#"{"mirrors": {"example": {"location": "http://repo.example.com", "key": "ABC123"}}}"#,
        )
        .unwrap();

        let loaded = AptlyManifest::load_from(&path).unwrap();
        let mut expected = Declarations::default();
        expected.upsert("example", MirrorParams::new("http://repo.example.com").key("ABC123"));
        assert_eq!(loaded.mirrors, expected);
    }

    #[test]
    fn load_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = AptlyManifest::load_from(&dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, CommonError::Io(_)));
    }
}
