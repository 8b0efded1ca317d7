// tests/reconcile.rs
//
// Dedup, one resolution per place, coverage accounting.
//
use std::collections::HashMap;

use twin_scrape::model::{Coord, GeocodeResult, PlaceRef, RawPair};
use twin_scrape::reconcile::{by_reference_count, dedup_pairs, reconcile, top_countries};

fn town(i: usize) -> String {
    format!("Town {i:02}")
}

#[test]
fn reversed_rows_collapse_to_one_pair() {
    let raw = vec![
        RawPair::new("Alpha", "Ruritania", "Beta", "Freedonia"),
        RawPair::new("Beta", "Freedonia", "Alpha", "Ruritania"),
        RawPair::new("Alpha[1]", "Ruritania", "Beta", "Freedonia"),
    ];
    let out = reconcile(&raw, |_| Ok(GeocodeResult::Resolved(Coord::new(0.5, 0.5)))).unwrap();
    assert_eq!(out.pairs.len(), 1);
    assert_eq!(out.stats.raw, 3);
    assert_eq!(out.stats.unique, 1);
}

#[test]
fn short_names_are_invalid() {
    let raw = vec![
        RawPair::new("A", "Ruritania", "Beta", "Freedonia"),
        RawPair::new("Alpha", "Ruritania", "", "Freedonia"),
        RawPair::new("Alpha", "Ruritania", "Beta", "Freedonia"),
    ];
    let d = dedup_pairs(&raw);
    assert_eq!(d.invalid, 2);
    assert_eq!(d.pairs.len(), 1);
}

#[test]
fn same_name_different_country_is_a_different_place() {
    let raw = vec![
        RawPair::new("Alpha", "Ruritania", "Springfield", "Freedonia"),
        RawPair::new("Alpha", "Ruritania", "Springfield", "Sylvania"),
    ];
    assert_eq!(dedup_pairs(&raw).pairs.len(), 2);
}

#[test]
fn coverage_counts_add_up() {
    // 95 places in a chain (94 pairs) + one chord = 95 unique pairs;
    // 5 reversed duplicates bring the raw count to 100.
    let mut raw: Vec<RawPair> = (0..94)
        .map(|i| RawPair::new(&town(i), "Ruritania", &town(i + 1), "Ruritania"))
        .collect();
    raw.push(RawPair::new(&town(0), "Ruritania", &town(2), "Ruritania"));
    for i in 0..5 {
        raw.push(RawPair::new(&town(i + 1), "Ruritania", &town(i), "Ruritania"));
    }
    assert_eq!(raw.len(), 100);

    let mut calls: HashMap<PlaceRef, usize> = HashMap::new();
    let out = reconcile(&raw, |p| {
        *calls.entry(p.clone()).or_default() += 1;
        let n: usize = p.name.trim_start_matches("Town ").parse().unwrap();
        Ok(if n < 90 {
            GeocodeResult::Resolved(Coord::new(n as f64, 0.0))
        } else {
            GeocodeResult::Unresolved
        })
    })
    .unwrap();

    assert_eq!(calls.len(), 95);
    assert!(calls.values().all(|&n| n == 1));

    let s = &out.stats;
    assert_eq!(s.raw, 100);
    assert_eq!(s.unique, 95);
    assert_eq!(s.places, 95);
    assert_eq!(s.places_resolved, 90);
    assert_eq!(s.resolved, 90);
    assert_eq!(s.skipped, 5);
    assert_eq!(s.resolved + s.skipped, s.unique);
    assert!((s.coverage() - 90.0 / 95.0).abs() < 1e-9);
}

#[test]
fn unresolved_ranked_by_blocked_pairs() {
    let raw = vec![
        RawPair::new("Hub", "Ruritania", "Alpha", "Ruritania"),
        RawPair::new("Hub", "Ruritania", "Beta", "Ruritania"),
        RawPair::new("Hub", "Ruritania", "Gamma", "Ruritania"),
        RawPair::new("Lonely", "Ruritania", "Alpha", "Ruritania"),
        RawPair::new("Zeta", "Ruritania", "Alpha", "Ruritania"),
    ];
    let missing = ["Hub", "Lonely", "Zeta"];
    let out = reconcile(&raw, |p| {
        Ok(if missing.contains(&p.name.as_str()) {
            GeocodeResult::Unresolved
        } else {
            GeocodeResult::Resolved(Coord::new(1.0, 1.0))
        })
    })
    .unwrap();

    let ranked: Vec<(&str, usize)> = out.unresolved.iter().map(|(p, n)| (p.name.as_str(), *n)).collect();
    assert_eq!(ranked, vec![("Hub", 3), ("Lonely", 1), ("Zeta", 1)]);
    assert!(out.pairs.is_empty());
}

#[test]
fn most_mentioned_places_resolve_first() {
    let raw = vec![
        RawPair::new("Gamma", "Ruritania", "Hub", "Freedonia"),
        RawPair::new("Beta", "Ruritania", "Hub", "Freedonia"),
        RawPair::new("Alpha", "Ruritania", "Hub", "Freedonia"),
        RawPair::new("Delta", "Sylvania", "Beta", "Ruritania"),
    ];
    let mut order: Vec<String> = Vec::new();
    reconcile(&raw, |place| {
        order.push(place.name.clone());
        Ok(GeocodeResult::Unresolved)
    })
    .unwrap();
    assert_eq!(order, ["Hub", "Beta", "Alpha", "Delta", "Gamma"]);

    let pairs = dedup_pairs(&raw).pairs;
    let ranked: Vec<&str> = by_reference_count(&pairs).iter().map(|p| p.name.as_str()).collect();
    assert_eq!(ranked, order);
}

#[test]
fn resolver_errors_propagate() {
    let raw = vec![RawPair::new("Alpha", "Ruritania", "Beta", "Freedonia")];
    let err = reconcile(&raw, |_| Err(twin_scrape::Error::Config("boom".into())));
    assert!(err.is_err());
}

#[test]
fn empty_corpus_has_zero_coverage() {
    let out = reconcile(&[], |_| unreachable!()).unwrap();
    assert_eq!(out.stats.coverage(), 0.0);
}

#[test]
fn top_countries_by_host() {
    let raw = vec![
        RawPair::new("Alpha", "Ruritania", "Beta", "Freedonia"),
        RawPair::new("Gamma", "Ruritania", "Delta", "Freedonia"),
        RawPair::new("Beta", "Freedonia", "Epsilon", "Sylvania"),
        RawPair::new("Zeta", "", "Eta", "Sylvania"),
    ];
    let pairs = dedup_pairs(&raw).pairs;
    assert_eq!(
        top_countries(&pairs, 5),
        vec![("Ruritania".to_string(), 2), ("Freedonia".to_string(), 1)]
    );
    assert_eq!(top_countries(&pairs, 1).len(), 1);
}
