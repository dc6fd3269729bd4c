//! Host capabilities the report is built from.
//!
//! The host owns the site registry, the plugin catalog and the per-site
//! settings store. Reading a site's settings requires switching the host's
//! process-wide "current site" context; [`NetworkHost::with_site_context`]
//! wraps that switch in a guard so the previous context always comes back.

pub mod snapshot;

use std::collections::{BTreeMap, BTreeSet};

use thiserror::Error;

use crate::model::site::{Site, SiteId};
use crate::plugin::{PluginBasename, PluginPackage};

pub use snapshot::SnapshotHost;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    #[error("{accessor} unavailable: {reason}")]
    Unavailable {
        accessor: &'static str,
        reason: String,
    },
    #[error("unknown site {0}")]
    UnknownSite(SiteId),
}

impl HostError {
    pub fn unavailable(accessor: &'static str, reason: impl Into<String>) -> Self {
        Self::Unavailable {
            accessor,
            reason: reason.into(),
        }
    }
}

pub trait NetworkHost {
    fn is_multisite(&self) -> bool;

    fn is_super_admin(&self, login: &str) -> bool;

    /// All tenant sites in registry order.
    fn list_sites(&self) -> Result<Vec<Site>, HostError>;

    fn list_installed_plugins(&self)
    -> Result<BTreeMap<PluginBasename, PluginPackage>, HostError>;

    fn list_network_activated_plugins(&self) -> Result<BTreeSet<PluginBasename>, HostError>;

    /// Makes `site` current and returns the context it replaced. On error the
    /// current context must be left untouched.
    fn switch_to_site(&self, site: SiteId) -> Result<Option<SiteId>, HostError>;

    fn restore_site(&self, previous: Option<SiteId>);

    fn list_active_plugins_for_current_site(&self) -> Result<BTreeSet<PluginBasename>, HostError>;

    fn site_home_url(&self, site: SiteId) -> Option<String>;

    /// Runs `f` with `site` as the current context. The previous context is
    /// restored when `f` returns, fails or panics.
    fn with_site_context<T, F>(&self, site: SiteId, f: F) -> Result<T, HostError>
    where
        Self: Sized,
        F: FnOnce(&Self) -> Result<T, HostError>,
    {
        let guard = SiteContextGuard::enter(self, site)?;
        f(guard.host())
    }
}

/// Holds a switched site context; restores the previous one on drop.
pub struct SiteContextGuard<'a, H: NetworkHost + ?Sized> {
    host: &'a H,
    previous: Option<SiteId>,
}

impl<'a, H: NetworkHost + ?Sized> SiteContextGuard<'a, H> {
    pub fn enter(host: &'a H, site: SiteId) -> Result<Self, HostError> {
        let previous = host.switch_to_site(site)?;
        tracing::trace!("switched to site {site} (previous: {previous:?})");
        Ok(Self { host, previous })
    }

    pub fn host(&self) -> &'a H {
        self.host
    }
}

impl<H: NetworkHost + ?Sized> Drop for SiteContextGuard<'_, H> {
    fn drop(&mut self) {
        self.host.restore_site(self.previous);
    }
}
