use std::fmt;

use serde::{Deserialize, Serialize};

/// Installed package identifier, e.g. `akismet/akismet.php`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PluginBasename(pub String);

impl PluginBasename {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PluginBasename {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Header data of one installed plugin package.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PluginPackage {
    pub basename: PluginBasename,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub version: Option<String>,
}

impl PluginPackage {
    pub fn new(basename: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            basename: PluginBasename::new(basename),
            display_name: display_name.into(),
            version: None,
        }
    }
}
