//! Settings shared by every declaration, and facts about the target host.

use serde::{Deserialize, Serialize};

pub const DEFAULT_USER: &str = "root";
pub const DEFAULT_PACKAGE: &str = "aptly";

/// Process-wide settings threaded into both command builders.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "schema", derive(schemars::JsonSchema))]
pub struct GlobalSettings {
    /// User every aptly command runs as
    #[serde(default = "default_user")]
    pub user: String,

    /// Name of the package that provides the aptly binary
    #[serde(default = "default_package")]
    pub package: String,
}

fn default_user() -> String {
    DEFAULT_USER.to_string()
}

fn default_package() -> String {
    DEFAULT_PACKAGE.to_string()
}

impl Default for GlobalSettings {
    fn default() -> Self {
        Self {
            user: default_user(),
            package: default_package(),
        }
    }
}

impl GlobalSettings {
    pub fn with_user(user: impl Into<String>) -> Self {
        Self {
            user: user.into(),
            ..Self::default()
        }
    }
}

/// Facts about the host the commands will run on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Facts {
    /// Distribution codename, e.g. `bookworm` or `precise`.
    pub codename: String,
}

impl Facts {
    pub fn new(codename: impl Into<String>) -> Self {
        Self {
            codename: codename.into(),
        }
    }

    /// Read the codename from `os-release` content.
    ///
    /// `VERSION_CODENAME` wins over `UBUNTU_CODENAME`.
    pub fn from_os_release(content: &str) -> Option<Self> {
        let mut version = None;
        let mut ubuntu = None;
        for line in content.lines() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if value.is_empty() {
                continue;
            }
            match key {
                "VERSION_CODENAME" => version = Some(value.to_string()),
                "UBUNTU_CODENAME" => ubuntu = Some(value.to_string()),
                _ => {}
            }
        }
        version.or(ubuntu).map(Self::new)
    }
}
