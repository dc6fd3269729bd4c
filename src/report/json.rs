use std::collections::BTreeMap;

use serde::Serialize;

use crate::model::site::{Site, SiteId};
use crate::report::sort::ReportRow;

#[derive(Serialize)]
struct JsonReport<'a> {
    title: &'a str,
    plugin_count: usize,
    site_count: usize,
    plugins: Vec<JsonPlugin<'a>>,
}

#[derive(Serialize)]
struct JsonPlugin<'a> {
    basename: &'a str,
    name: &'a str,
    version: Option<&'a str>,
    anchor: &'a str,
    network_active: bool,
    active_count: usize,
    sites: Vec<JsonSite<'a>>,
}

#[derive(Serialize)]
struct JsonSite<'a> {
    id: SiteId,
    name: Option<&'a str>,
    home_url: Option<&'a str>,
}

/// Machine-readable form of the report, in the same order as the HTML one.
pub fn render_json(
    title: &str,
    rows: &[ReportRow],
    sites: &BTreeMap<SiteId, Site>,
) -> serde_json::Result<String> {
    let plugins = rows
        .iter()
        .map(|row| JsonPlugin {
            basename: row.entry.basename.as_str(),
            name: &row.entry.display_name,
            version: row.entry.version.as_deref(),
            anchor: &row.anchor,
            network_active: row.entry.network_active,
            active_count: row.entry.active_count,
            sites: row
                .entry
                .active_site_ids
                .iter()
                .map(|id| {
                    let site = sites.get(id);
                    JsonSite {
                        id: *id,
                        name: site.map(|s| s.display_name.as_str()),
                        home_url: site.map(|s| s.home_url.as_str()),
                    }
                })
                .collect(),
        })
        .collect();

    serde_json::to_string_pretty(&JsonReport {
        title,
        plugin_count: rows.len(),
        site_count: sites.len(),
        plugins,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::plugin::PluginBasename;
    use crate::report::aggregate::PluginReportEntry;

    #[test]
    fn serializes_rows_in_order_with_site_details() {
        let rows = vec![ReportRow {
            entry: PluginReportEntry {
                basename: PluginBasename::new("akismet/akismet.php"),
                display_name: "Akismet".to_string(),
                version: None,
                anchor_slug: "akismet".to_string(),
                active_count: 2,
                active_site_ids: vec![SiteId(1), SiteId(5)],
                network_active: true,
            },
            anchor: "akismet".to_string(),
        }];
        let sites = BTreeMap::from([(SiteId(1), Site::new(1, "Main", "https://example.com"))]);

        let raw = render_json("Plugins", &rows, &sites);
        let raw = raw.expect("serializable");
        let value: serde_json::Value = serde_json::from_str(&raw).expect("valid json");

        assert_eq!(value["plugin_count"], 1);
        assert_eq!(value["site_count"], 1);
        assert_eq!(value["plugins"][0]["basename"], "akismet/akismet.php");
        assert_eq!(value["plugins"][0]["sites"][0]["name"], "Main");
        assert_eq!(value["plugins"][0]["sites"][1]["id"], 5);
        assert!(value["plugins"][0]["sites"][1]["name"].is_null());
    }
}
