//! Declarative resources emitted by the builders.

use serde::{Serialize, Serializer};
use std::fmt;

/// Search path every exec runs with.
pub const EXEC_PATH: &str = "/bin:/usr/bin";

/// Reference to another resource that must be applied first.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceRef {
    Package(String),
    Exec(String),
}

impl ResourceRef {
    pub fn package(name: impl Into<String>) -> Self {
        ResourceRef::Package(name.into())
    }

    pub fn exec(title: impl Into<String>) -> Self {
        ResourceRef::Exec(title.into())
    }
}

impl fmt::Display for ResourceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceRef::Package(name) => write!(f, "Package[{}]", name),
            ResourceRef::Exec(title) => write!(f, "Exec[{}]", title),
        }
    }
}

impl Serialize for ResourceRef {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A shell command guarded by an idempotency check.
///
/// `command` runs only when `unless` exits non-zero.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExecResource {
    pub title: String,
    pub command: String,
    pub unless: String,
    pub user: String,
    pub path: String,
    pub environment: Vec<String>,
    pub require: Vec<ResourceRef>,
}

impl ExecResource {
    pub fn new(
        title: impl Into<String>,
        command: impl Into<String>,
        unless: impl Into<String>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            command: command.into(),
            unless: unless.into(),
            user: user.into(),
            path: EXEC_PATH.to_string(),
            environment: Vec::new(),
            require: Vec::new(),
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::Exec(self.title.clone())
    }

    /// Split `KEY=VALUE` entries; entries without `=` get an empty value.
    pub fn env_pairs(&self) -> Vec<(String, String)> {
        self.environment
            .iter()
            .map(|entry| match entry.split_once('=') {
                Some((k, v)) => (k.to_string(), v.to_string()),
                None => (entry.clone(), String::new()),
            })
            .collect()
    }
}

/// The package that provides the aptly binary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PackageResource {
    pub name: String,
    pub ensure: String,
}

impl PackageResource {
    pub fn installed(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ensure: "installed".to_string(),
        }
    }

    pub fn reference(&self) -> ResourceRef {
        ResourceRef::Package(self.name.clone())
    }
}

/// Wrap a value in single quotes for `sh`.
pub fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', r"'\''"))
}

/// Quote each value and join with spaces.
pub fn quote_all<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| quote(v.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}
