// src/runner.rs
//! The phases a run is made of. Frontends (the CLI, tests) call these with
//! whatever sources they like; nothing here builds an HTTP client itself.

use std::collections::BTreeSet;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::config::consts::TOP_COUNTRIES;
use crate::config::{AppOptions, ExportOptions};
use crate::csv;
use crate::error::Result;
use crate::geocode::{Geocoder, Resolver, ResolverStats, TitleSource};
use crate::model::{PlaceRef, RawPair};
use crate::progress::Progress;
use crate::reconcile::{self, Reconciliation};
use crate::specs::{index, twins, DocumentSource};

/* ---------------- Scrape ---------------- */

/// What the scrape phase produced.
#[derive(Debug, Default)]
pub struct ScrapeSummary {
    pub pages: usize,
    /// Pages (index or country) that could not be fetched.
    pub failed: Vec<String>,
    /// Rows before de-duplication.
    pub extracted: usize,
    pub invalid: usize,
    /// De-duplicated rows, as written to the raw CSV.
    pub pairs: Vec<RawPair>,
    pub top_countries: Vec<(String, usize)>,
}

/// Country sub-pages linked from the index pages, sorted and de-duplicated.
/// An index page that fails to load is logged and skipped.
pub fn discover_pages(
    source: &dyn DocumentSource,
    index_urls: &[String],
    failed: &mut Vec<String>,
) -> Vec<String> {
    let mut pages = BTreeSet::new();
    for url in index_urls {
        match source.fetch(url) {
            Ok(doc) => {
                let found = index::subpage_urls(&doc, url);
                info!(url = %url, subpages = found.len(), "scanned index page");
                pages.extend(found);
            }
            Err(e) => {
                warn!(url = %url, error = %e, "index page skipped");
                failed.push(url.clone());
            }
        }
    }
    pages.into_iter().collect()
}

/// Fetch and read every page in `urls`, then de-duplicate the rows.
pub fn scrape_pages(
    source: &dyn DocumentSource,
    urls: &[String],
    mut progress: Option<&mut dyn Progress>,
) -> ScrapeSummary {
    let mut summary = ScrapeSummary::default();
    let mut rows: Vec<RawPair> = Vec::new();

    if let Some(p) = progress.as_deref_mut() {
        p.begin(urls.len());
    }

    for url in urls {
        match source.fetch(url) {
            Ok(doc) => {
                let hint = twins::country_hint(&doc);
                let found = twins::extract(&doc, &hint);
                info!(url = %url, country = %hint, pairs = found.len(), "scraped page");
                rows.extend(found);
                summary.pages += 1;
                if let Some(p) = progress.as_deref_mut() {
                    p.item_done(url);
                }
            }
            Err(e) => {
                warn!(url = %url, error = %e, "page skipped");
                summary.failed.push(url.clone());
                if let Some(p) = progress.as_deref_mut() {
                    p.item_failed(url);
                }
            }
        }
    }

    let deduped = reconcile::dedup_pairs(&rows);
    summary.extracted = rows.len();
    summary.invalid = deduped.invalid;
    summary.top_countries = reconcile::top_countries(&deduped.pairs, TOP_COUNTRIES);
    summary.pairs = deduped.pairs.iter().map(|p| p.to_raw()).collect();

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    summary
}

/// Full scrape: index crawl, per-page extraction, raw CSV.
pub fn scrape(
    source: &dyn DocumentSource,
    opts: &AppOptions,
    mut progress: Option<&mut dyn Progress>,
) -> Result<ScrapeSummary> {
    let mut failed = Vec::new();
    let pages = discover_pages(source, &opts.scrape.index_urls, &mut failed);
    if let Some(p) = progress.as_deref_mut() {
        p.log(&format!("Found {} country pages", pages.len()));
    }

    let mut summary = scrape_pages(source, &pages, progress);
    failed.append(&mut summary.failed);
    summary.failed = failed;

    csv::save_raw_pairs(&opts.export.raw_path(), &summary.pairs)?;
    info!(
        pages = summary.pages,
        failed = summary.failed.len(),
        unique = summary.pairs.len(),
        "scrape finished"
    );
    Ok(summary)
}

/* ---------------- Geocode ---------------- */

#[derive(Debug)]
pub struct GeocodeSummary {
    pub reconciliation: Reconciliation,
    pub resolver: ResolverStats,
    pub dataset_path: PathBuf,
    pub missing_path: PathBuf,
}

/// Distinct places over the de-duplicated pairs, in stable order.
pub fn distinct_places(raw: &[RawPair]) -> Vec<PlaceRef> {
    let deduped = reconcile::dedup_pairs(raw);
    let places: BTreeSet<PlaceRef> = deduped
        .pairs
        .into_iter()
        .flat_map(|p| [p.city1, p.city2])
        .collect();
    places.into_iter().collect()
}

/// Resolve every place and reconcile. The title tier is warmed in shared
/// batches first; the cache is flushed at the end of the phase.
pub fn geocode_pairs<T: TitleSource, G: Geocoder>(
    raw: &[RawPair],
    resolver: &mut Resolver<'_, T, G>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<Reconciliation> {
    let places = distinct_places(raw);
    info!(places = places.len(), "geocoding");

    if let Some(p) = progress.as_deref_mut() {
        p.log("Batch title lookup");
    }
    resolver.prefetch(&places)?;
    resolver.checkpoint()?;

    if let Some(p) = progress.as_deref_mut() {
        p.begin(places.len());
    }
    let result = reconcile::reconcile(raw, |place| {
        let r = resolver.resolve_place(place)?;
        if let Some(p) = progress.as_deref_mut() {
            let label = place.to_string();
            if r.is_resolved() {
                p.item_done(&label);
            } else {
                p.item_failed(&label);
            }
        }
        Ok(r)
    });
    // Persist what was learned even when the phase is cut short.
    resolver.checkpoint()?;
    let result = result?;

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }

    let s = &result.stats;
    info!(
        raw = s.raw,
        unique = s.unique,
        resolved = s.resolved,
        skipped = s.skipped,
        coverage = %format!("{:.1}%", s.coverage() * 100.0),
        "geocode finished"
    );
    Ok(result)
}

/// Dataset + missing-city report into the export directory.
pub fn export(result: &Reconciliation, opts: &ExportOptions) -> Result<(PathBuf, PathBuf)> {
    let dataset = opts.dataset_path();
    let missing = opts.missing_path();
    csv::save_dataset(&dataset, &result.pairs, opts.decimals)?;
    csv::save_missing(&missing, &result.unresolved)?;
    Ok((dataset, missing))
}

/// Load raw pairs, geocode, export.
pub fn geocode<T: TitleSource, G: Geocoder>(
    opts: &AppOptions,
    resolver: &mut Resolver<'_, T, G>,
    progress: Option<&mut dyn Progress>,
) -> Result<GeocodeSummary> {
    let raw = csv::load_raw_pairs(&opts.export.raw_path())?;
    let reconciliation = geocode_pairs(&raw, resolver, progress)?;
    let (dataset_path, missing_path) = export(&reconciliation, &opts.export)?;
    Ok(GeocodeSummary {
        reconciliation,
        resolver: resolver.stats().clone(),
        dataset_path,
        missing_path,
    })
}
