// src/names.rs
//! Name normalization: candidate spellings for a scraped place name, and a
//! canonical country name for lookup queries.
//!
//! Everything here is pure. Variant order matters: the resolver tries
//! variants in sequence and stops at the first hit, so the name as scraped
//! comes first and broader rewrites come later.

use std::collections::HashMap;

use crate::core::sanitize::{strip_citations, strip_parentheticals, trim_name_punct};

/// Compound-name separators, most specific first.
const COMPOUND_SEPS: [&str; 2] = [" -- ", " - "];

/// Administrative qualifiers that confuse lookups. Matched case-insensitively at the end.
const ADMIN_SUFFIXES: [&str; 12] = [
    " (rural gmina)",
    " (urban gmina)",
    " (city)",
    " (commune)",
    " (municipality)",
    " (district)",
    " (province)",
    " (county)",
    " (town)",
    " (village)",
    " Oblast",
    " Raion",
];

/// Ordered, de-duplicated lookup candidates for a raw city name.
pub fn variants(raw_city: &str) -> Vec<String> {
    let city = clean(raw_city);
    let mut out: Vec<String> = Vec::new();

    out.push(city.clone());

    // "Esch (Haaren)" -> "Esch"
    out.push(strip_parentheticals(&city));

    // "Haaren -- Esch" -> "Haaren", "Esch"
    for sep in COMPOUND_SEPS {
        if city.contains(sep) {
            out.extend(city.split(sep).map(strip_parentheticals));
        }
    }

    for suffix in ADMIN_SUFFIXES {
        if let Some(stem) = strip_suffix_ci(&city, suffix) {
            out.push(s!(stem.trim()));
        }
    }

    let mut unique: Vec<String> = Vec::with_capacity(out.len());
    for v in out {
        let v = trim_name_punct(&v);
        if !v.is_empty() && !unique.iter().any(|u| u == v) {
            unique.push(s!(v));
        }
    }
    unique
}

/// Country name for lookup queries, using the built-in alias table.
pub fn clean_country(raw_country: &str) -> String {
    CountryAliases::default().clean(raw_country)
}

fn clean(raw: &str) -> String {
    s!(trim_name_punct(&strip_citations(raw)))
}

fn strip_suffix_ci<'a>(s: &'a str, suffix: &str) -> Option<&'a str> {
    let cut = s.len().checked_sub(suffix.len())?;
    if !s.is_char_boundary(cut) {
        return None;
    }
    s[cut..].eq_ignore_ascii_case(suffix).then(|| &s[..cut])
}

/// Substitutions for country spellings that lookups handle badly.
///
/// The defaults encode choices about contested and renamed territories.
/// They are data, not logic: callers can override or extend them from config.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CountryAliases {
    table: HashMap<String, String>,
}

impl Default for CountryAliases {
    fn default() -> Self {
        let pairs = [
            ("Georgia (country)", "Georgia"),
            ("Republic of Ireland", "Ireland"),
            ("Republic of Korea", "South Korea"),
            ("Democratic Republic of the Congo", "DR Congo"),
            ("Republic of the Congo", "Republic of Congo"),
            ("People's Republic of China", "China"),
            ("Republic of China", "Taiwan"),
            ("Palestinian territories", "Palestine"),
            ("Transnistria", "Moldova"),
            ("Northern Cyprus", "Cyprus"),
            ("Kosovo", "Kosovo"),
        ];
        Self {
            table: pairs.iter().map(|(k, v)| (s!(*k), s!(*v))).collect(),
        }
    }
}

impl CountryAliases {
    pub fn empty() -> Self {
        Self { table: HashMap::new() }
    }

    pub fn insert(&mut self, from: &str, to: &str) {
        self.table.insert(s!(from), s!(to));
    }

    pub fn get(&self, country: &str) -> Option<&str> {
        self.table.get(country).map(|s| s.as_str())
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// `"Algarve, Portugal"` → `"Portugal"`; `"Republic of Ireland"` → `"Ireland"`.
    pub fn clean(&self, raw_country: &str) -> String {
        let country = clean(raw_country);
        if let Some((_, last)) = country.rsplit_once(',') {
            return s!(last.trim());
        }
        match self.get(&country) {
            Some(alias) => s!(alias),
            None => country,
        }
    }
}
