use std::cell::Cell;
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::host::{HostError, NetworkHost};
use crate::model::site::{Site, SiteId};
use crate::plugin::{PluginBasename, PluginPackage};

#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default = "default_true")]
    multisite: bool,
    #[serde(default)]
    super_admins: Vec<String>,
    #[serde(default)]
    network_active: Vec<PluginBasename>,
    #[serde(default)]
    plugins: Vec<PluginPackage>,
    #[serde(default)]
    sites: Vec<SiteRecord>,
}

#[derive(Debug, Deserialize)]
struct SiteRecord {
    id: SiteId,
    name: String,
    home_url: String,
    #[serde(default)]
    active_plugins: Vec<PluginBasename>,
    /// `false` makes every settings read for this site fail.
    #[serde(default = "default_true")]
    reachable: bool,
}

fn default_true() -> bool {
    true
}

/// Network host backed by a TOML snapshot of the registry and settings.
#[derive(Debug)]
pub struct SnapshotHost {
    snapshot: SnapshotFile,
    current: Cell<Option<SiteId>>,
}

impl SnapshotHost {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading snapshot {}", path.display()))?;
        Self::from_toml_str(&raw)
            .with_context(|| format!("parsing snapshot {}", path.display()))
    }

    pub fn from_toml_str(raw: &str) -> Result<Self> {
        let snapshot: SnapshotFile = toml::from_str(raw)?;
        tracing::debug!(
            sites = snapshot.sites.len(),
            plugins = snapshot.plugins.len(),
            "snapshot loaded"
        );

        Ok(Self {
            snapshot,
            current: Cell::new(None),
        })
    }

    pub fn current_site(&self) -> Option<SiteId> {
        self.current.get()
    }

    fn site_record(&self, site: SiteId) -> Option<&SiteRecord> {
        self.snapshot.sites.iter().find(|record| record.id == site)
    }
}

impl NetworkHost for SnapshotHost {
    fn is_multisite(&self) -> bool {
        self.snapshot.multisite
    }

    fn is_super_admin(&self, login: &str) -> bool {
        self.snapshot.super_admins.iter().any(|admin| admin == login)
    }

    fn list_sites(&self) -> Result<Vec<Site>, HostError> {
        let mut sites: Vec<Site> = self
            .snapshot
            .sites
            .iter()
            .map(|record| Site {
                id: record.id,
                display_name: record.name.clone(),
                home_url: record.home_url.clone(),
            })
            .collect();

        // Registry order is ascending site id.
        sites.sort_by_key(|site| site.id);
        Ok(sites)
    }

    fn list_installed_plugins(
        &self,
    ) -> Result<BTreeMap<PluginBasename, PluginPackage>, HostError> {
        let mut catalog = BTreeMap::new();
        for package in &self.snapshot.plugins {
            if let Some(replaced) = catalog.insert(package.basename.clone(), package.clone()) {
                tracing::warn!(
                    "duplicate plugin basename {} in catalog, keeping {:?} over {:?}",
                    package.basename,
                    package.display_name,
                    replaced.display_name
                );
            }
        }
        Ok(catalog)
    }

    fn list_network_activated_plugins(&self) -> Result<BTreeSet<PluginBasename>, HostError> {
        Ok(self.snapshot.network_active.iter().cloned().collect())
    }

    fn switch_to_site(&self, site: SiteId) -> Result<Option<SiteId>, HostError> {
        if self.site_record(site).is_none() {
            return Err(HostError::UnknownSite(site));
        }
        Ok(self.current.replace(Some(site)))
    }

    fn restore_site(&self, previous: Option<SiteId>) {
        self.current.set(previous);
    }

    fn list_active_plugins_for_current_site(&self) -> Result<BTreeSet<PluginBasename>, HostError> {
        let site = self
            .current
            .get()
            .ok_or_else(|| HostError::unavailable("site settings", "no site context"))?;
        let record = self.site_record(site).ok_or(HostError::UnknownSite(site))?;

        if !record.reachable {
            return Err(HostError::unavailable(
                "site settings",
                format!("site {site} did not respond"),
            ));
        }

        Ok(record.active_plugins.iter().cloned().collect())
    }

    fn site_home_url(&self, site: SiteId) -> Option<String> {
        self.site_record(site).map(|record| record.home_url.clone())
    }
}
