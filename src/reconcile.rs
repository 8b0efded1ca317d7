// src/reconcile.rs
//! Joins extracted pairs against resolved coordinates.
//!
//! Pairs are undirected: `(A, B)` and `(B, A)` collapse to one. Each distinct
//! place is resolved once no matter how many pairs mention it, and a pair
//! survives only when both ends have coordinates.

use std::collections::{BTreeMap, HashMap, HashSet};

use crate::core::sanitize::char_len;
use crate::error::Result;
use crate::model::{GeocodeResult, PlaceRef, RawPair, ResolvedPair, TwinPair};

/// Names shorter than this are scraping noise.
const MIN_NAME_CHARS: usize = 2;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Deduped {
    /// First occurrence of each undirected pair, in input order.
    pub pairs: Vec<TwinPair>,
    /// Rows dropped for an empty or too-short city name.
    pub invalid: usize,
}

/// Collapse duplicate and reversed rows; drop rows with unusable names.
pub fn dedup_pairs(raw: &[RawPair]) -> Deduped {
    let mut seen = HashSet::new();
    let mut out = Deduped::default();
    for row in raw {
        let pair = row.to_pair();
        if char_len(&pair.city1.name) < MIN_NAME_CHARS || char_len(&pair.city2.name) < MIN_NAME_CHARS {
            out.invalid += 1;
            continue;
        }
        if seen.insert(pair.key()) {
            out.pairs.push(pair);
        }
    }
    out
}

/// Pair counts per host country, most frequent first, at most `n`.
pub fn top_countries(pairs: &[TwinPair], n: usize) -> Vec<(String, usize)> {
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for p in pairs.iter().filter(|p| !p.city1.country.is_empty()) {
        *counts.entry(p.city1.country.as_str()).or_default() += 1;
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().map(|(c, n)| (s!(c), n)).collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.truncate(n);
    ranked
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CoverageStats {
    /// Rows handed in.
    pub raw: usize,
    pub invalid: usize,
    /// Distinct undirected pairs.
    pub unique: usize,
    /// Pairs with both ends located.
    pub resolved: usize,
    pub skipped: usize,
    /// Distinct places across the unique pairs.
    pub places: usize,
    pub places_resolved: usize,
}

impl CoverageStats {
    /// Resolved share of unique pairs, 0.0 for an empty corpus.
    pub fn coverage(&self) -> f64 {
        if self.unique == 0 {
            0.0
        } else {
            self.resolved as f64 / self.unique as f64
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Reconciliation {
    pub pairs: Vec<ResolvedPair>,
    pub stats: CoverageStats,
    /// Places that did not resolve, with the number of unique pairs they block,
    /// most-referenced first.
    pub unresolved: Vec<(PlaceRef, usize)>,
}

/// Distinct places, most-mentioned first, ties by `PlaceRef` order.
/// An interrupted run has then spent its calls where they unlock the most pairs.
pub fn by_reference_count(pairs: &[TwinPair]) -> Vec<&PlaceRef> {
    let mut counts: HashMap<&PlaceRef, usize> = HashMap::new();
    for pair in pairs {
        *counts.entry(&pair.city1).or_default() += 1;
        if pair.city2 != pair.city1 {
            *counts.entry(&pair.city2).or_default() += 1;
        }
    }
    let mut ranked: Vec<(&PlaceRef, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));
    ranked.into_iter().map(|(p, _)| p).collect()
}

/// Dedup, resolve every distinct place once through `resolve`, keep located pairs.
/// Places are resolved in `by_reference_count` order. Only errors from
/// `resolve` itself propagate.
pub fn reconcile<F>(raw: &[RawPair], mut resolve: F) -> Result<Reconciliation>
where
    F: FnMut(&PlaceRef) -> Result<GeocodeResult>,
{
    let deduped = dedup_pairs(raw);

    let mut places: BTreeMap<PlaceRef, GeocodeResult> = BTreeMap::new();
    for place in by_reference_count(&deduped.pairs) {
        let result = resolve(place)?;
        places.insert(place.clone(), result);
    }

    let mut pairs = Vec::with_capacity(deduped.pairs.len());
    let mut blocked: HashMap<&PlaceRef, usize> = HashMap::new();
    for pair in &deduped.pairs {
        let c1 = places.get(&pair.city1).and_then(|r| r.coord());
        let c2 = places.get(&pair.city2).and_then(|r| r.coord());
        match (c1, c2) {
            (Some(coord1), Some(coord2)) => pairs.push(ResolvedPair {
                city1: pair.city1.clone(),
                coord1,
                city2: pair.city2.clone(),
                coord2,
            }),
            _ => {
                if c1.is_none() {
                    *blocked.entry(&pair.city1).or_default() += 1;
                }
                if c2.is_none() {
                    *blocked.entry(&pair.city2).or_default() += 1;
                }
            }
        }
    }

    let mut unresolved: Vec<(PlaceRef, usize)> =
        blocked.into_iter().map(|(p, n)| (p.clone(), n)).collect();
    unresolved.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let stats = CoverageStats {
        raw: raw.len(),
        invalid: deduped.invalid,
        unique: deduped.pairs.len(),
        resolved: pairs.len(),
        skipped: deduped.pairs.len() - pairs.len(),
        places: places.len(),
        places_resolved: places.values().filter(|r| r.is_resolved()).count(),
    };

    Ok(Reconciliation { pairs, stats, unresolved })
}
