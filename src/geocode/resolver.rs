// src/geocode/resolver.rs
//! The lookup cascade.
//!
//! For one (city, country) the resolver walks the enabled tiers in fixed order
//! and stops at the first coordinate. Within a tier, name variants are tried in
//! order. Every query goes through the cache first; every answer (including
//! "nothing found" and "service failed twice") is written back, so a rerun
//! never repeats a query.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::cache::{GeocodeCache, KeySpace};
use super::sources::{Geocoder, TitleBatch, TitleSource};
use super::Tier;
use crate::config::GeocodeOptions;
use crate::error::{LookupError, Result};
use crate::model::{Coord, GeocodeResult, PlaceRef};
use crate::names::{self, CountryAliases};

#[derive(Clone, Debug, PartialEq)]
pub struct ResolverOptions {
    pub tiers: Vec<Tier>,
    pub batch_size: usize,
    pub search_limit: usize,
    pub search_variants: usize,
    pub geocode_variants: usize,
    pub bare_variants: usize,
    pub retry_pause: Duration,
    pub geocoder_place_limit: Option<usize>,
    pub offline: bool,
}

impl Default for ResolverOptions {
    fn default() -> Self {
        Self::from(&GeocodeOptions::default())
    }
}

impl From<&GeocodeOptions> for ResolverOptions {
    fn from(o: &GeocodeOptions) -> Self {
        Self {
            tiers: o.tiers.clone(),
            batch_size: o.batch_size.max(1),
            search_limit: o.search_limit,
            search_variants: o.search_variants,
            geocode_variants: o.geocode_variants,
            bare_variants: o.bare_variants,
            retry_pause: o.retry_pause(),
            geocoder_place_limit: o.geocoder_place_limit,
            offline: o.offline,
        }
    }
}

/// Where answers came from, for the end-of-run summary.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ResolverStats {
    /// Indexed by `Tier::index()`.
    pub resolved_by: [usize; 5],
    pub unresolved: usize,
    /// Calls that failed twice and were recorded as unresolved.
    pub failed_calls: usize,
    /// Places that reached the geocoder tiers.
    pub geocoded_places: usize,
}

impl ResolverStats {
    pub fn resolved(&self) -> usize {
        self.resolved_by.iter().sum()
    }
}

pub struct Resolver<'c, T, G> {
    titles: T,
    geocoder: G,
    cache: &'c mut GeocodeCache,
    aliases: CountryAliases,
    opts: ResolverOptions,
    stats: ResolverStats,
    /// Geocoder budget spent for this run; cache hits only from here on.
    geocoder_cache_only: bool,
}

impl<'c, T: TitleSource, G: Geocoder> Resolver<'c, T, G> {
    pub fn new(titles: T, geocoder: G, cache: &'c mut GeocodeCache, opts: ResolverOptions) -> Self {
        Self {
            titles,
            geocoder,
            cache,
            aliases: CountryAliases::default(),
            opts,
            stats: ResolverStats::default(),
            geocoder_cache_only: false,
        }
    }

    pub fn with_aliases(mut self, aliases: CountryAliases) -> Self {
        self.aliases = aliases;
        self
    }

    pub fn stats(&self) -> &ResolverStats {
        &self.stats
    }

    fn enabled(&self, tier: Tier) -> bool {
        self.opts.tiers.contains(&tier)
    }

    /// Batch the title tier for many places up front, so the per-place cascade
    /// mostly hits the cache.
    pub fn prefetch(&mut self, places: &[PlaceRef]) -> Result<()> {
        if !self.enabled(Tier::Titles) {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let titles: Vec<String> = places
            .iter()
            .flat_map(|p| names::variants(&p.name))
            .filter(|v| seen.insert(v.clone()))
            .collect();
        self.lookup_titles_cached(&titles)
    }

    pub fn resolve_place(&mut self, place: &PlaceRef) -> Result<GeocodeResult> {
        self.resolve(&place.name, &place.country)
    }

    /// Coordinates for one place, or `Unresolved` once every enabled tier is exhausted.
    /// Only cache persistence failures are errors.
    pub fn resolve(&mut self, city: &str, country: &str) -> Result<GeocodeResult> {
        let variants = names::variants(city);
        if variants.is_empty() {
            self.stats.unresolved += 1;
            return Ok(GeocodeResult::Unresolved);
        }
        let country = self.aliases.clean(country);
        let mut counted = false;

        for tier in Tier::ALL {
            if !self.enabled(tier) {
                continue;
            }
            if tier.uses_geocoder() && !counted {
                counted = true;
                self.count_geocoded_place();
            }
            if let Some(coord) = self.run_tier(tier, &variants, &country)? {
                debug!(city, country = %country, ?tier, "resolved");
                self.stats.resolved_by[tier.index()] += 1;
                return Ok(GeocodeResult::Resolved(coord));
            }
        }

        debug!(city, country = %country, "unresolved");
        self.stats.unresolved += 1;
        Ok(GeocodeResult::Unresolved)
    }

    /// Persist whatever is pending.
    pub fn checkpoint(&mut self) -> Result<()> {
        self.cache.flush()
    }

    fn count_geocoded_place(&mut self) {
        self.stats.geocoded_places += 1;
        if let Some(limit) = self.opts.geocoder_place_limit {
            if self.stats.geocoded_places > limit && !self.geocoder_cache_only {
                info!(limit, "geocoder place limit reached, using cached answers only");
                self.geocoder_cache_only = true;
            }
        }
    }

    fn run_tier(&mut self, tier: Tier, variants: &[String], country: &str) -> Result<Option<Coord>> {
        match tier {
            Tier::Titles => self.titles_tier(variants),
            Tier::TitlesWithCountry => {
                if country.is_empty() {
                    return Ok(None);
                }
                let keyed: Vec<String> = variants.iter().map(|v| format!("{v}, {country}")).collect();
                self.titles_tier(&keyed)
            }
            Tier::Search => {
                for v in variants.iter().take(self.opts.search_variants) {
                    let query = format!("{v} {country}");
                    if let Some(c) = self.search_cached(query.trim())? {
                        return Ok(Some(c));
                    }
                }
                Ok(None)
            }
            Tier::GeocodeWithCountry => {
                // No country: the bare variant stands in for the qualified query.
                for v in variants.iter().take(self.opts.geocode_variants) {
                    let query = if country.is_empty() { v.clone() } else { format!("{v}, {country}") };
                    if let Some(c) = self.geocode_cached(&query)? {
                        return Ok(Some(c));
                    }
                }
                Ok(None)
            }
            Tier::GeocodeBare => {
                for v in variants.iter().take(self.opts.bare_variants) {
                    if let Some(c) = self.geocode_cached(v)? {
                        return Ok(Some(c));
                    }
                }
                Ok(None)
            }
        }
    }

    /// First title (in order) whose cached answer is a coordinate.
    fn titles_tier(&mut self, titles: &[String]) -> Result<Option<Coord>> {
        self.lookup_titles_cached(titles)?;
        Ok(titles
            .iter()
            .find_map(|t| self.cache.get(&KeySpace::Title.key(t)).and_then(|r| r.coord())))
    }

    /// Make sure every title has a cache entry, batching the ones that don't.
    fn lookup_titles_cached(&mut self, titles: &[String]) -> Result<()> {
        if self.opts.offline {
            return Ok(());
        }
        let mut seen = HashSet::new();
        let todo: Vec<String> = titles
            .iter()
            .filter(|t| !self.cache.contains(&KeySpace::Title.key(t)))
            .filter(|t| seen.insert(t.as_str()))
            .cloned()
            .collect();

        for chunk in todo.chunks(self.opts.batch_size) {
            let batch = self.retry_once(
                "title lookup",
                || self.titles.lookup_titles(chunk),
                || self.titles.lookup_titles(chunk),
            );
            if batch.is_none() {
                self.stats.failed_calls += 1;
            }
            self.record_titles(chunk, batch)?;
        }
        Ok(())
    }

    fn record_titles(&mut self, asked: &[String], batch: Option<TitleBatch>) -> Result<()> {
        let mut recorded: HashSet<String> = HashSet::new();

        if let Some(batch) = &batch {
            for (title, coord) in &batch.pages {
                let result = GeocodeResult::from(*coord);
                for from in batch.requested_as(title) {
                    self.cache.record(&KeySpace::Title.key(from), result)?;
                    recorded.insert(s!(from));
                }
                if asked.iter().any(|a| a == title) || coord.is_some() {
                    self.cache.record(&KeySpace::Title.key(title), result)?;
                    recorded.insert(title.clone());
                }
            }
        }

        // Anything the batch did not mention (or the whole batch, if it failed).
        for title in asked {
            if !recorded.contains(title) {
                self.cache.record(&KeySpace::Title.key(title), GeocodeResult::Unresolved)?;
            }
        }
        Ok(())
    }

    fn search_cached(&mut self, query: &str) -> Result<Option<Coord>> {
        let key = KeySpace::Search.key(query);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.coord());
        }
        if self.opts.offline {
            return Ok(None);
        }

        let limit = self.opts.search_limit;
        let Some(hits) =
            self.retry_once("title search", || self.titles.search(query, limit), || self.titles.search(query, limit))
        else {
            self.stats.failed_calls += 1;
            self.cache.record(&key, GeocodeResult::Unresolved)?;
            return Ok(None);
        };

        let coord = if hits.is_empty() {
            None
        } else {
            let batch = self.retry_once(
                "title lookup",
                || self.titles.lookup_titles(&hits),
                || self.titles.lookup_titles(&hits),
            );
            if batch.is_none() {
                self.stats.failed_calls += 1;
            }
            batch.and_then(|batch| first_located(&hits, &batch))
        };

        self.cache.record(&key, coord.into())?;
        Ok(coord)
    }

    fn geocode_cached(&mut self, query: &str) -> Result<Option<Coord>> {
        let key = KeySpace::Geocode.key(query);
        if let Some(hit) = self.cache.get(&key) {
            return Ok(hit.coord());
        }
        if self.opts.offline || self.geocoder_cache_only {
            return Ok(None);
        }

        let outcome =
            self.retry_once("geocode", || self.geocoder.geocode(query), || self.geocoder.geocode_retry(query));
        if outcome.is_none() {
            self.stats.failed_calls += 1;
        }
        let coord = outcome.flatten();

        self.cache.record(&key, coord.into())?;
        Ok(coord)
    }

    /// One call, and one more after a pause if the first failed.
    /// `None` when both failed.
    fn retry_once<R>(
        &self,
        what: &str,
        first: impl FnOnce() -> std::result::Result<R, LookupError>,
        second: impl FnOnce() -> std::result::Result<R, LookupError>,
    ) -> Option<R> {
        match first() {
            Ok(r) => return Some(r),
            Err(e) => warn!(what, error = %e, "lookup failed, retrying"),
        }
        if !self.opts.retry_pause.is_zero() {
            thread::sleep(self.opts.retry_pause);
        }
        match second() {
            Ok(r) => Some(r),
            Err(e) => {
                warn!(what, error = %e, "lookup failed twice, giving up");
                None
            }
        }
    }
}

/// Search hits in rank order; the first one whose page has coordinates.
fn first_located(hits: &[String], batch: &TitleBatch) -> Option<Coord> {
    hits.iter().find_map(|hit| {
        let server_title = batch
            .normalized
            .iter()
            .find(|(from, _)| from == hit)
            .map(|(_, to)| to.as_str())
            .unwrap_or(hit.as_str());
        batch
            .pages
            .iter()
            .find(|(title, _)| title == server_title)
            .and_then(|(_, coord)| *coord)
    })
}
