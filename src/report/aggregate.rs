use std::collections::{BTreeMap, BTreeSet};

use crate::model::site::{Site, SiteId};
use crate::plugin::{PluginBasename, PluginPackage};
use crate::report::slug::anchor_slug;

/// Activation summary for one installed plugin.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluginReportEntry {
    pub basename: PluginBasename,
    pub display_name: String,
    pub version: Option<String>,
    pub anchor_slug: String,
    pub active_count: usize,
    /// Sites with the plugin active, in registry order.
    pub active_site_ids: Vec<SiteId>,
    pub network_active: bool,
}

impl PluginReportEntry {
    fn new(package: &PluginPackage, active_site_ids: Vec<SiteId>, network_active: bool) -> Self {
        Self {
            basename: package.basename.clone(),
            display_name: package.display_name.clone(),
            version: package.version.clone(),
            anchor_slug: anchor_slug(&package.display_name),
            active_count: active_site_ids.len(),
            active_site_ids,
            network_active,
        }
    }
}

/// Builds one entry per installed package.
///
/// Network activation wins over whatever the per-site settings say. Sites
/// missing from `per_site` count as having nothing active.
pub fn aggregate(
    sites: &[Site],
    packages: &BTreeMap<PluginBasename, PluginPackage>,
    network_active: &BTreeSet<PluginBasename>,
    per_site: &BTreeMap<SiteId, BTreeSet<PluginBasename>>,
) -> BTreeMap<PluginBasename, PluginReportEntry> {
    packages
        .iter()
        .map(|(basename, package)| {
            let entry = if network_active.contains(basename) {
                let all_sites = sites.iter().map(|site| site.id).collect();
                PluginReportEntry::new(package, all_sites, true)
            } else {
                let active_sites = sites
                    .iter()
                    .filter(|site| {
                        per_site
                            .get(&site.id)
                            .is_some_and(|active| active.contains(basename))
                    })
                    .map(|site| site.id)
                    .collect();
                PluginReportEntry::new(package, active_sites, false)
            };

            (basename.clone(), entry)
        })
        .collect()
}
