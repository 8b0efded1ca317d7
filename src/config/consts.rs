// src/config/consts.rs

// Net config
pub const USER_AGENT: &str = concat!(
    "twin_scrape/", env!("CARGO_PKG_VERSION"), " (sister-city dataset builder)"
);
pub const WIKI_BASE: &str = "https://en.wikipedia.org";
pub const WIKI_API: &str = "https://en.wikipedia.org/w/api.php";
pub const NOMINATIM_API: &str = "https://nominatim.openstreetmap.org/search";

pub const CONTINENT_PAGES: [&str; 6] = [
    "List_of_twin_towns_and_sister_cities_in_Europe",
    "List_of_twin_towns_and_sister_cities_in_North_America",
    "List_of_twin_towns_and_sister_cities_in_South_America",
    "List_of_twin_towns_and_sister_cities_in_Asia",
    "List_of_twin_towns_and_sister_cities_in_Africa",
    "List_of_twin_towns_and_sister_cities_in_Oceania",
];

// Document fetch
pub const PAGE_PAUSE_MS: u64 = 300; // be polite
pub const PAGE_RETRIES: u32 = 3;
pub const PAGE_BACKOFF_MS: u64 = 2_000;
pub const PAGE_TIMEOUT_SECS: u64 = 15;

// Lookups
pub const TITLE_BATCH: usize = 50; // API hard limit per request
pub const TITLE_PAUSE_MS: u64 = 300;
pub const TITLE_TIMEOUT_SECS: u64 = 15;
pub const SEARCH_LIMIT: usize = 3;
pub const SEARCH_VARIANTS: usize = 2;
pub const GEOCODE_VARIANTS: usize = 2;
pub const BARE_VARIANTS: usize = 1;
pub const GEOCODER_PAUSE_MS: u64 = 1_050; // strictest source: 1 req/s
pub const GEOCODER_TIMEOUT_SECS: u64 = 10;
pub const GEOCODER_RETRY_TIMEOUT_SECS: u64 = 15;
pub const RETRY_PAUSE_MS: u64 = 2_000;

// Local cache
pub const STORE_DIR: &str = ".store";
pub const CACHE_FILE: &str = "geocode_cache.json";
pub const FLUSH_EVERY: usize = 100;

// Export
pub const DEFAULT_OUT_DIR: &str = "out";
pub const RAW_FILE: &str = "twin_cities_raw.csv";
pub const DATASET_FILE: &str = "twin_cities.csv";
pub const MISSING_FILE: &str = "missing_cities.csv";
pub const COORD_DECIMALS: u32 = 4;
pub const TOP_COUNTRIES: usize = 20;
