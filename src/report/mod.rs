//! Plugin activation report pipeline.
//!
//! The host is queried once for the registry, the catalog and the network
//! activations, then once per site inside a scoped site context. Everything
//! after that is pure: [`aggregate`] merges, [`sort_entries`] orders,
//! [`assign_anchors`] picks unique anchors and [`render`] writes HTML.

pub mod aggregate;
pub mod json;
pub mod render;
pub mod slug;
pub mod sort;

use std::collections::{BTreeMap, BTreeSet};

use clap::ValueEnum;
use serde::Deserialize;
use thiserror::Error;

use crate::host::{HostError, NetworkHost};
use crate::model::site::{Site, SiteId};
use crate::plugin::PluginBasename;

pub use aggregate::{PluginReportEntry, aggregate};
pub use render::{Document, RenderOptions, render};
pub use slug::anchor_slug;
pub use sort::{ReportRow, assign_anchors, sort_entries};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("Access denied.")]
    AccessDenied,
    #[error("not a multisite network")]
    NotMultisite,
    #[error("accessor unavailable: {0}")]
    AccessorUnavailable(#[from] HostError),
}

/// Admin screen the report was requested from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum AdminContext {
    #[default]
    Network,
    Site,
}

/// Who asked for the report, and from where.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    pub login: String,
    pub context: AdminContext,
}

impl Invocation {
    pub fn network(login: impl Into<String>) -> Self {
        Self {
            login: login.into(),
            context: AdminContext::Network,
        }
    }
}

/// What to do when one site's settings cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SiteErrorPolicy {
    /// Treat the site as having nothing active.
    #[default]
    Skip,
    /// Fail the whole report.
    Abort,
}

/// Sorted report rows plus the site data needed to render them.
#[derive(Debug, Clone)]
pub struct Report {
    pub rows: Vec<ReportRow>,
    pub sites: BTreeMap<SiteId, Site>,
}

impl Report {
    pub fn to_document(&self, options: &RenderOptions) -> Document {
        render(&self.rows, &self.sites, options)
    }

    pub fn to_json(&self, title: &str) -> serde_json::Result<String> {
        json::render_json(title, &self.rows, &self.sites)
    }
}

/// Checks the caller may see network-wide data. Touches nothing but the
/// authorization collaborators.
pub fn authorize<H: NetworkHost>(host: &H, invocation: &Invocation) -> Result<(), ReportError> {
    if invocation.context != AdminContext::Network || !host.is_super_admin(&invocation.login) {
        tracing::warn!(
            login = %invocation.login,
            context = ?invocation.context,
            "plugin report denied"
        );
        return Err(ReportError::AccessDenied);
    }
    Ok(())
}

pub fn build_report<H: NetworkHost>(
    host: &H,
    invocation: &Invocation,
    on_site_error: SiteErrorPolicy,
) -> Result<Report, ReportError> {
    if !host.is_multisite() {
        return Err(ReportError::NotMultisite);
    }
    authorize(host, invocation)?;

    let sites = host.list_sites()?;
    let packages = host.list_installed_plugins()?;
    let network_active = host.list_network_activated_plugins()?;
    tracing::info!(
        sites = sites.len(),
        plugins = packages.len(),
        network_active = network_active.len(),
        "building plugin report"
    );

    let per_site = collect_site_activations(host, &sites, on_site_error)?;
    let entries = aggregate(&sites, &packages, &network_active, &per_site);
    let rows = assign_anchors(sort_entries(entries));

    let sites = sites
        .into_iter()
        .map(|mut site| {
            if let Some(url) = host.site_home_url(site.id) {
                site.home_url = url;
            }
            (site.id, site)
        })
        .collect();

    Ok(Report { rows, sites })
}

/// Authorizes, aggregates and renders in one call.
pub fn generate_report<H: NetworkHost>(
    host: &H,
    invocation: &Invocation,
    on_site_error: SiteErrorPolicy,
    options: &RenderOptions,
) -> Result<Document, ReportError> {
    build_report(host, invocation, on_site_error)
        .map(|report| report.to_document(options))
}

/// Reads each site's active plugins in registry order, one context at a time.
pub fn collect_site_activations<H: NetworkHost>(
    host: &H,
    sites: &[Site],
    on_site_error: SiteErrorPolicy,
) -> Result<BTreeMap<SiteId, BTreeSet<PluginBasename>>, ReportError> {
    let mut per_site = BTreeMap::new();

    for site in sites {
        let read = host.with_site_context(site.id, |h| h.list_active_plugins_for_current_site());
        let active = match read {
            Ok(active) => active,
            Err(err) if on_site_error == SiteErrorPolicy::Skip => {
                tracing::warn!("skipping site {} ({}): {err}", site.id, site.display_name);
                BTreeSet::new()
            }
            Err(err) => return Err(err.into()),
        };

        tracing::debug!("site {}: {} active plugins", site.id, active.len());
        per_site.insert(site.id, active);
    }

    Ok(per_site)
}
