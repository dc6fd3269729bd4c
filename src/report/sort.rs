use std::collections::{BTreeMap, HashMap};

use crate::plugin::PluginBasename;
use crate::report::aggregate::PluginReportEntry;

/// A sorted entry together with the unique in-page anchor it is rendered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRow {
    pub entry: PluginReportEntry,
    pub anchor: String,
}

/// Orders entries by display name (byte order), ties broken by basename.
pub fn sort_entries(
    entries: BTreeMap<PluginBasename, PluginReportEntry>,
) -> Vec<PluginReportEntry> {
    let mut sorted: Vec<PluginReportEntry> = entries.into_values().collect();
    sorted.sort_by(|a, b| {
        a.display_name
            .cmp(&b.display_name)
            .then_with(|| a.basename.cmp(&b.basename))
    });
    sorted
}

/// Gives every entry a distinct anchor. The first holder of a slug keeps it;
/// later ones get `-2`, `-3`, ... in sort order.
pub fn assign_anchors(sorted: Vec<PluginReportEntry>) -> Vec<ReportRow> {
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut taken: Vec<String> = Vec::with_capacity(sorted.len());

    sorted
        .into_iter()
        .map(|entry| {
            let occurrence = seen.entry(entry.anchor_slug.clone()).or_insert(0);
            let mut anchor = entry.anchor_slug.clone();
            // "foo-2" may also be a real slug, keep counting until free.
            while taken.contains(&anchor) {
                *occurrence += 1;
                anchor = format!("{}-{}", entry.anchor_slug, *occurrence + 1);
            }
            taken.push(anchor.clone());
            ReportRow { entry, anchor }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::slug::anchor_slug;

    fn entry(basename: &str, name: &str) -> PluginReportEntry {
        PluginReportEntry {
            basename: PluginBasename::new(basename),
            display_name: name.to_string(),
            version: None,
            anchor_slug: anchor_slug(name),
            active_count: 0,
            active_site_ids: Vec::new(),
            network_active: false,
        }
    }

    fn keyed(entries: Vec<PluginReportEntry>) -> BTreeMap<PluginBasename, PluginReportEntry> {
        entries
            .into_iter()
            .map(|entry| (entry.basename.clone(), entry))
            .collect()
    }

    #[test]
    fn sorts_by_display_name_bytes() {
        let sorted = sort_entries(keyed(vec![
            entry("z.php", "akismet"),
            entry("a.php", "Yoast"),
            entry("m.php", "Akismet"),
        ]));

        let names: Vec<&str> = sorted.iter().map(|e| e.display_name.as_str()).collect();
        assert_eq!(names, vec!["Akismet", "Yoast", "akismet"]);
    }

    #[test]
    fn identical_names_are_adjacent_and_ordered_by_basename() {
        let sorted = sort_entries(keyed(vec![
            entry("zeta-cache/cache.php", "Cache Plugin"),
            entry("b.php", "Backup"),
            entry("alpha-cache/cache.php", "Cache Plugin"),
            entry("d.php", "Debug Bar"),
        ]));

        let basenames: Vec<&str> = sorted.iter().map(|e| e.basename.as_str()).collect();
        assert_eq!(
            basenames,
            vec![
                "b.php",
                "alpha-cache/cache.php",
                "zeta-cache/cache.php",
                "d.php"
            ]
        );
    }

    #[test]
    fn output_is_non_decreasing_and_reproducible() {
        let input = vec![
            entry("3.php", "Gamma"),
            entry("1.php", "alpha"),
            entry("2.php", "Beta"),
            entry("4.php", "Beta"),
        ];

        let first = sort_entries(keyed(input.clone()));
        let second = sort_entries(keyed(input.into_iter().rev().collect()));

        assert_eq!(first, second);
        assert!(
            first
                .windows(2)
                .all(|pair| pair[0].display_name <= pair[1].display_name)
        );
    }

    #[test]
    fn colliding_slugs_get_numbered_anchors() {
        let rows = assign_anchors(sort_entries(keyed(vec![
            entry("a/cache.php", "Cache Plugin"),
            entry("b/cache.php", "Cache Plugin"),
            entry("c/cache.php", "cache plugin!"),
        ])));

        let anchors: Vec<&str> = rows.iter().map(|row| row.anchor.as_str()).collect();
        assert_eq!(
            anchors,
            vec!["cache-plugin", "cache-plugin-2", "cache-plugin-3"]
        );
        assert!(rows.iter().all(|row| row.entry.anchor_slug == "cache-plugin"));
    }

    #[test]
    fn numbered_anchor_skips_existing_slug() {
        let rows = assign_anchors(sort_entries(keyed(vec![
            entry("a.php", "Foo"),
            entry("b.php", "Foo 2"),
            entry("c.php", "foo"),
        ])));

        let anchors: Vec<&str> = rows.iter().map(|row| row.anchor.as_str()).collect();
        assert_eq!(anchors, vec!["foo", "foo-2", "foo-3"]);
    }

    #[test]
    fn unique_slugs_are_kept() {
        let rows = assign_anchors(sort_entries(keyed(vec![
            entry("a.php", "Alpha"),
            entry("b.php", "Beta"),
        ])));

        assert!(rows.iter().all(|row| row.anchor == row.entry.anchor_slug));
    }
}
