//! HTML rendering of a sorted activation report.
//!
//! Display names come from plugin headers and site settings, so every piece
//! of text goes through HTML escaping and every link through URL escaping.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use pulldown_cmark_escape::{escape_href, escape_html};
use regex::Regex;

use crate::model::site::{Site, SiteId};
use crate::report::sort::ReportRow;

// `//host/...` is protocol-relative, not root-relative.
static LINKABLE_URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^(https?://|/[^/]|/$)").expect("url regex"));

const PAGE_STYLE: &str = "\
body { font-family: -apple-system, BlinkMacSystemFont, \"Segoe UI\", sans-serif; margin: 2em; }
.plugin-summary { list-style: none; padding: 0; max-width: 600px; }
.plugin-summary li { border-bottom: 1px solid #c7c7c7; }
.plugin-summary .row { display: grid; grid-template-columns: 3fr 1fr; padding: 0.5em 0; }
.plugin-summary .count { text-align: right; }
";

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub title: String,
    pub open_links_in_new_tab: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title: "Multisite Plugin List".to_string(),
            open_links_in_new_tab: true,
        }
    }
}

/// A rendered report: the title and an HTML fragment for embedding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    pub title: String,
    pub body: String,
}

impl Document {
    /// Wraps the fragment in a self-contained HTML page.
    pub fn to_html_page(&self) -> String {
        let mut page = String::from("<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n");
        page.push_str("<meta charset=\"UTF-8\">\n<title>");
        push_escaped(&mut page, &self.title);
        page.push_str("</title>\n<style>\n");
        page.push_str(PAGE_STYLE);
        page.push_str("</style>\n</head>\n<body>\n");
        page.push_str(&self.body);
        page.push_str("</body>\n</html>\n");
        page
    }
}

pub fn render(
    rows: &[ReportRow],
    sites: &BTreeMap<SiteId, Site>,
    options: &RenderOptions,
) -> Document {
    let mut body = String::from("<div class=\"wrap\">\n<h1>");
    push_escaped(&mut body, &options.title);
    body.push_str("</h1>\n");

    render_summary(&mut body, rows);
    render_details(&mut body, rows, sites, options);

    body.push_str("</div>\n");
    Document {
        title: options.title.clone(),
        body,
    }
}

fn render_summary(out: &mut String, rows: &[ReportRow]) {
    out.push_str("<h2>Summary</h2>\n<ul class=\"plugin-summary\">\n");
    out.push_str(
        "<li class=\"header\"><span class=\"row\"><span class=\"name\">Plugin Name</span>\
         <span class=\"count\">Active Sites</span></span></li>\n",
    );

    for row in rows {
        out.push_str("<li><a class=\"row\" href=\"#");
        push_escaped(out, &row.anchor);
        out.push_str("\"><span class=\"name\">");
        push_escaped(out, &row.entry.display_name);
        out.push_str("</span><span class=\"count\">");
        out.push_str(&row.entry.active_count.to_string());
        out.push_str("</span></a></li>\n");
    }

    out.push_str("</ul>\n");
}

fn render_details(
    out: &mut String,
    rows: &[ReportRow],
    sites: &BTreeMap<SiteId, Site>,
    options: &RenderOptions,
) {
    out.push_str("<h2>Details</h2>\n<div class=\"plugin-details\">\n");

    for row in rows {
        out.push_str("<h3 id=\"");
        push_escaped(out, &row.anchor);
        out.push_str("\">");
        push_escaped(out, &row.entry.display_name);
        out.push_str("</h3>\n");

        if row.entry.active_count == 0 {
            out.push_str("<p>Not active on any sites.</p>\n");
            continue;
        }

        out.push_str(&format!(
            "<p>Active on {} site(s):</p>\n<ul>\n",
            row.entry.active_count
        ));
        for site_id in &row.entry.active_site_ids {
            render_site_item(out, *site_id, sites.get(site_id), options);
        }
        out.push_str("</ul>\n");
    }

    out.push_str("</div>\n");
}

fn render_site_item(out: &mut String, id: SiteId, site: Option<&Site>, options: &RenderOptions) {
    let label = match site {
        Some(site) => format!("{} (ID: {id})", site.display_name),
        None => format!("Site ID {id} (ID: {id})"),
    };

    let Some(href) = site.and_then(|site| safe_href(&site.home_url)) else {
        out.push_str("<li>");
        push_escaped(out, &label);
        out.push_str("</li>\n");
        return;
    };

    out.push_str("<li><a href=\"");
    out.push_str(&href);
    out.push('"');
    if options.open_links_in_new_tab {
        out.push_str(" target=\"_blank\" rel=\"noopener noreferrer\"");
    }
    out.push('>');
    push_escaped(out, &label);
    out.push_str("</a></li>\n");
}

/// Escaped href for `http(s)` and root-relative URLs; `None` for anything else.
pub fn safe_href(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if !LINKABLE_URL_RE.is_match(trimmed) {
        return None;
    }

    let mut href = String::with_capacity(trimmed.len());
    escape_href(&mut href, trimmed).expect("writing to a String cannot fail");
    Some(href)
}

fn push_escaped(out: &mut String, text: &str) {
    escape_html(&mut *out, text).expect("writing to a String cannot fail");
}
