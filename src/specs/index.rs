// src/specs/index.rs
//! Reader for the continental index pages: which per-country pages exist.

use url::Url;

use super::content_root;
use crate::core::Document;

const SUBPAGE_MARKER: &str = "/wiki/List_of_twin_towns_and_sister_cities_in_";
const CONTINENT_SUFFIXES: [&str; 6] = [
    "in_Europe",
    "in_North_America",
    "in_South_America",
    "in_Asia",
    "in_Africa",
    "in_Oceania",
];

/// Absolute URLs of the per-country pages linked from an index page,
/// fragments removed, first occurrence kept. `base` resolves relative links.
pub fn subpage_urls(doc: &Document, base: &str) -> Vec<String> {
    let Some(root) = content_root(doc) else { return Vec::new() };
    let Ok(base) = Url::parse(base) else { return Vec::new() };

    let mut out: Vec<String> = Vec::new();
    for a in doc.find_all(root, "a") {
        let Some(href) = doc.attr(a, "href") else { continue };
        if !href.contains(SUBPAGE_MARKER) || CONTINENT_SUFFIXES.iter().any(|c| href.contains(c)) {
            continue;
        }
        let Ok(mut url) = base.join(href) else { continue };
        url.set_fragment(None);
        let url = url.to_string();
        if !out.contains(&url) {
            out.push(url);
        }
    }
    out
}
