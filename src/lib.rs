//! Network-wide plugin activation report for multi-tenant site networks.
//!
//! Lists every installed plugin with the number of tenant sites it is active
//! on, then details which sites those are. Read-only: the host is queried,
//! never written to.

pub mod app;
pub mod host;
pub mod model;
pub mod plugin;
pub mod report;

pub use app::App;
pub use host::{HostError, NetworkHost, SnapshotHost};
pub use report::{
    AdminContext, Document, Invocation, Report, ReportError, SiteErrorPolicy, build_report,
    generate_report,
};
