// src/specs/twins.rs
//! Reader for one per-country "twin towns and sister cities" page.
//!
//! Page shape this targets (loosely; real pages vary a lot):
//! ```text
//! <div class="mw-parser-output">
//!   <p><b><a href="/wiki/Springfield">Springfield</a></b></p>      ← host city
//!   <div class="div-col"><ul>                                       ← twin list
//!     <li><span class="flagicon">…</span> <a href="/wiki/Anytown">Anytown</a>, Ruritania</li>
//!   </ul></div>
//!   …
//!   <h2>References</h2>                                             ← stop here
//! ```
//! Host city = first real link of the nearest `<p>` before a list. Lists are
//! found two ways (multi-column containers, and bare `<ul>` that look like twin
//! lists) and anything after the first boilerplate heading is ignored.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::content_root;
use crate::core::sanitize::{char_len, strip_citations, strip_parentheticals};
use crate::core::{Document, NodeId};
use crate::model::RawPair;

const STOP_HEADINGS: [&str; 5] = ["see also", "references", "external links", "notes", "bibliography"];
const HEADING_TAGS: [&str; 2] = ["h2", "h3"];

const MULTI_COLUMN_CLASS: &str = "div-col";
const FLAG_CLASS: &str = "flagicon";
/// Containers whose lists are navigation, never twin lists.
const SKIP_CLASSES: [&str; 5] = ["toc", "hlist", "horizontal-toc", "navbox", "hatnote"];

const SAMPLE_ITEMS: usize = 3;
const LINK_ONLY_MAX_ITEMS: usize = 50;
const HOST_PARAGRAPH_MAX_CHARS: usize = 200;
const MIN_NAME_CHARS: usize = 2;

static HINT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)sister cities in (?:the )?(.+)").expect("static regex")
});

/// Country named by the page title ("… sister cities in the Netherlands" → "Netherlands").
/// Empty when the title does not follow that phrasing.
pub fn country_hint(doc: &Document) -> String {
    let Some(h1) = doc
        .find_all(doc.root(), "h1")
        .find(|&h| doc.attr(h, "id") == Some("firstHeading"))
    else {
        return s!();
    };
    hint_from_title(&doc.text(h1))
}

pub fn hint_from_title(title: &str) -> String {
    HINT_RE
        .captures(title)
        .and_then(|c| c.get(1))
        .map(|m| s!(m.as_str().trim()))
        .unwrap_or_default()
}

/// All (host, twin) rows on the page. Unrecognised structure gives an empty Vec.
pub fn extract(doc: &Document, region_hint: &str) -> Vec<RawPair> {
    let Some(root) = content_root(doc) else {
        debug!("no content root; page skipped");
        return Vec::new();
    };
    let boundary = stop_boundary(doc, root);

    let mut pairs = Vec::new();
    for list in candidate_lists(doc, root, boundary) {
        let Some(host) = doc.preceding(list, "p").and_then(|p| host_city(doc, p)) else {
            continue;
        };
        for li in list_items(doc, list) {
            if let Some((city, country)) = parse_item(doc, li) {
                pairs.push(RawPair::new(&host, region_hint, &city, &country));
            }
        }
    }

    debug!(hint = region_hint, pairs = pairs.len(), "page extracted");
    pairs
}

/* ---------------- Heuristics (one predicate each) ---------------- */

/// A section heading that starts the page's boilerplate tail.
pub fn is_stop_heading(doc: &Document, id: NodeId) -> bool {
    let Some(tag) = doc.tag(id) else { return false };
    if !HEADING_TAGS.contains(&tag) {
        return false;
    }
    // older markup puts "[edit]" inside the heading
    let text = strip_citations(&doc.text(id)).to_lowercase();
    STOP_HEADINGS.contains(&text.trim())
}

/// First boilerplate heading under `root`, if any.
pub fn stop_boundary(doc: &Document, root: NodeId) -> Option<NodeId> {
    doc.descendants(root).find(|&id| is_stop_heading(doc, id))
}

/// Navigation, table-of-contents and hatnote wrappers.
pub fn is_skipped_container(doc: &Document, id: NodeId) -> bool {
    doc.is_tag(id, "nav")
        || (doc.is_tag(id, "div") && SKIP_CLASSES.iter().any(|c| doc.has_class(id, c)))
}

/// A bare `<ul>` whose first items look like places: a flag icon, or links to
/// other articles (the latter only for short lists).
pub fn is_candidate_list(doc: &Document, ul: NodeId) -> bool {
    let items = list_items(doc, ul);
    if items.is_empty() {
        return false;
    }
    let sample = &items[..items.len().min(SAMPLE_ITEMS)];
    let has_flag = sample
        .iter()
        .any(|&li| doc.find_all(li, "span").any(|s| doc.has_class(s, FLAG_CLASS)));
    let has_article_link = sample.iter().any(|&li| has_article_link(doc, li));

    has_flag || (has_article_link && items.len() <= LINK_ONLY_MAX_ITEMS)
}

/// A short paragraph with an article link: reads as "this is the host city".
pub fn is_host_paragraph(doc: &Document, p: NodeId) -> bool {
    has_article_link(doc, p) && char_len(&doc.text(p)) < HOST_PARAGRAPH_MAX_CHARS
}

fn has_article_link(doc: &Document, id: NodeId) -> bool {
    doc.find_all(id, "a")
        .any(|a| doc.attr(a, "href").is_some_and(|h| h.starts_with("/wiki/")))
}

/* ---------------- Candidate lists ---------------- */

/// Twin-list containers before `boundary`, deduplicated, in document order.
pub fn candidate_lists(doc: &Document, root: NodeId, boundary: Option<NodeId>) -> Vec<NodeId> {
    let before = |id: NodeId| boundary.is_none_or(|b| id < b);
    let in_multi_column = |id: NodeId| {
        doc.has_ancestor(id, |a| doc.is_tag(a, "div") && doc.has_class(a, MULTI_COLUMN_CLASS))
    };

    // Scan A: multi-column containers
    let mut lists: Vec<NodeId> = doc
        .find_all(root, "div")
        .filter(|&d| doc.has_class(d, MULTI_COLUMN_CLASS) && before(d))
        .collect();

    // Scan B: bare lists that look like twin lists under a host paragraph
    lists.extend(doc.find_all(root, "ul").filter(|&ul| {
        before(ul)
            && !in_multi_column(ul)
            && !doc.has_ancestor(ul, |a| is_skipped_container(doc, a))
            && is_candidate_list(doc, ul)
            && doc.preceding(ul, "p").is_some_and(|p| is_host_paragraph(doc, p))
    }));

    lists.sort_unstable();
    lists.dedup();
    lists
}

/// Items of a list container: all `<li>` inside a multi-column `<div>`,
/// direct `<li>` children otherwise.
pub fn list_items(doc: &Document, list: NodeId) -> Vec<NodeId> {
    if doc.is_tag(list, "div") {
        doc.find_all(list, "li").collect()
    } else {
        doc.element_children(list).filter(|&c| doc.is_tag(c, "li")).collect()
    }
}

/* ---------------- Names ---------------- */

/// Host city named by a paragraph.
pub fn host_city(doc: &Document, p: NodeId) -> Option<String> {
    first_link_text(doc, p)
        .map(|t| strip_citations(&t))
        .filter(|t| !t.is_empty())
}

/// First link that is not an in-page anchor and has more than one character of text.
fn first_link_text(doc: &Document, id: NodeId) -> Option<String> {
    doc.find_all(id, "a")
        .filter(|&a| !doc.attr(a, "href").unwrap_or("").starts_with('#'))
        .map(|a| doc.text(a))
        .find(|t| char_len(t) > 1)
}

/// (twin city, twin country) from one list item.
pub fn parse_item(doc: &Document, li: NodeId) -> Option<(String, String)> {
    let text = doc.text(li);
    if char_len(&text) < MIN_NAME_CHARS {
        return None;
    }
    let text = strip_citations(&text);
    if text.is_empty() {
        return None;
    }

    let city = match first_link_text(doc, li) {
        Some(link) => strip_citations(&link),
        None => s!(text.split(',').next().unwrap_or("").trim()),
    };
    if char_len(&city) < MIN_NAME_CHARS {
        return None;
    }

    let country = match text.find(&city) {
        Some(idx) => {
            let after = text[idx + city.len()..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
            s!(strip_parentheticals(after).trim_end_matches(',').trim())
        }
        None => s!(),
    };

    Some((city, country))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hint_handles_optional_article() {
        assert_eq!(hint_from_title("List of twin towns and sister cities in the Netherlands"), "Netherlands");
        assert_eq!(hint_from_title("List of twin towns and Sister Cities in Ruritania"), "Ruritania");
        assert_eq!(hint_from_title("Twin towns of Ruritania"), "");
    }
}
