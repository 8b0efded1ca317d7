// src/config/options.rs
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;

use super::consts::*;
use crate::error::{Error, Result};
use crate::geocode::Tier;
use crate::names::CountryAliases;

/// Everything a run needs. Defaults come from `consts`; a TOML file may
/// override any subset, then CLI flags override that.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppOptions {
    pub scrape: ScrapeOptions,
    pub geocode: GeocodeOptions,
    pub export: ExportOptions,
    /// Extra or replacement entries for the country alias table.
    pub country_aliases: BTreeMap<String, String>,
}

impl AppOptions {
    /// Load from a TOML file. Missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::Config(format!("cannot read {}: {e}", path.display()))
        })?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Built-in alias table with the configured overrides applied on top.
    pub fn aliases(&self) -> CountryAliases {
        let mut table = CountryAliases::default();
        for (from, to) in &self.country_aliases {
            table.insert(from, to);
        }
        table
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrapeOptions {
    /// Continental index pages (full URLs) to discover country sub-pages from.
    pub index_urls: Vec<String>,
    pub pause_ms: u64,
    pub retries: u32,
    pub backoff_ms: u64,
    pub timeout_secs: u64,
}

impl Default for ScrapeOptions {
    fn default() -> Self {
        Self {
            index_urls: CONTINENT_PAGES
                .iter()
                .map(|page| join!(WIKI_BASE, "/wiki/", page))
                .collect(),
            pause_ms: PAGE_PAUSE_MS,
            retries: PAGE_RETRIES,
            backoff_ms: PAGE_BACKOFF_MS,
            timeout_secs: PAGE_TIMEOUT_SECS,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct GeocodeOptions {
    pub cache_path: PathBuf,
    pub flush_every: usize,
    pub tiers: Vec<Tier>,
    pub batch_size: usize,
    pub search_limit: usize,
    pub search_variants: usize,
    pub geocode_variants: usize,
    pub bare_variants: usize,
    pub title_pause_ms: u64,
    pub geocoder_pause_ms: u64,
    pub retry_pause_ms: u64,
    /// How many places may go on to the geocoder tiers. Later places only see cached answers.
    pub geocoder_place_limit: Option<usize>,
    /// Consult the cache only; never call a remote source.
    pub offline: bool,
}

impl Default for GeocodeOptions {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from(STORE_DIR).join(CACHE_FILE),
            flush_every: FLUSH_EVERY,
            tiers: Tier::ALL.to_vec(),
            batch_size: TITLE_BATCH,
            search_limit: SEARCH_LIMIT,
            search_variants: SEARCH_VARIANTS,
            geocode_variants: GEOCODE_VARIANTS,
            bare_variants: BARE_VARIANTS,
            title_pause_ms: TITLE_PAUSE_MS,
            geocoder_pause_ms: GEOCODER_PAUSE_MS,
            retry_pause_ms: RETRY_PAUSE_MS,
            geocoder_place_limit: None,
            offline: false,
        }
    }
}

impl GeocodeOptions {
    pub fn retry_pause(&self) -> Duration {
        Duration::from_millis(self.retry_pause_ms)
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ExportOptions {
    pub out_dir: PathBuf,
    pub raw_file: String,
    pub dataset_file: String,
    pub missing_file: String,
    pub decimals: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            raw_file: s!(RAW_FILE),
            dataset_file: s!(DATASET_FILE),
            missing_file: s!(MISSING_FILE),
            decimals: COORD_DECIMALS,
        }
    }
}

impl ExportOptions {
    pub fn raw_path(&self) -> PathBuf {
        self.out_dir.join(&self.raw_file)
    }
    pub fn dataset_path(&self) -> PathBuf {
        self.out_dir.join(&self.dataset_file)
    }
    pub fn missing_path(&self) -> PathBuf {
        self.out_dir.join(&self.missing_file)
    }
}
