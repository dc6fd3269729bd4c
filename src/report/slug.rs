use std::sync::LazyLock;

use regex::Regex;

static SEPARATOR_RUN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-z0-9]+").expect("valid separator regex"));

const EMPTY_SLUG: &str = "plugin";

/// Fragment-safe anchor slug for a plugin display name.
///
/// Lowercases, collapses every run of characters outside `[a-z0-9]` into a
/// single `-` and trims separators from both ends. Names with nothing left
/// after normalization map to `plugin`.
pub fn anchor_slug(display_name: &str) -> String {
    let lowered = display_name.to_lowercase();
    let slug = SEPARATOR_RUN_RE.replace_all(&lowered, "-");
    let slug = slug.trim_matches('-');

    if slug.is_empty() {
        EMPTY_SLUG.to_string()
    } else {
        slug.to_string()
    }
}
