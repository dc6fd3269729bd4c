use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable tenant site identifier (the host's numeric blog id).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SiteId(pub u64);

impl fmt::Display for SiteId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One tenant site as reported by the site registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Site {
    pub id: SiteId,
    pub display_name: String,
    pub home_url: String,
}

impl Site {
    pub fn new(id: u64, display_name: impl Into<String>, home_url: impl Into<String>) -> Self {
        Self {
            id: SiteId(id),
            display_name: display_name.into(),
            home_url: home_url.into(),
        }
    }
}
