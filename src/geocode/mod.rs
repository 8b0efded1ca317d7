// src/geocode/mod.rs
//! Turning (city, country) into coordinates.
//!
//! - `cache`     – the durable query → result store; the only state that survives a run.
//! - `sources`   – the two remote capabilities, as traits.
//! - `wikipedia` – title lookup + title search over the MediaWiki API.
//! - `nominatim` – free-text geocoder.
//! - `resolver`  – the tiered cascade tying the above together.

use serde::Deserialize;

pub mod cache;
pub mod nominatim;
pub mod resolver;
pub mod sources;
pub mod wikipedia;

pub use cache::{GeocodeCache, KeySpace};
pub use nominatim::NominatimClient;
pub use resolver::{Resolver, ResolverOptions, ResolverStats};
pub use sources::{Geocoder, TitleBatch, TitleSource};
pub use wikipedia::WikipediaClient;

/// One strategy of the cascade. Declaration order is the order they run in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    /// Article titles = name variants, batched.
    Titles,
    /// Article titles = "variant, country".
    TitlesWithCountry,
    /// Title search for "variant country", then coordinates of the top hits.
    Search,
    /// Geocoder on "variant, country".
    GeocodeWithCountry,
    /// Geocoder on the bare variant.
    GeocodeBare,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Titles,
        Tier::TitlesWithCountry,
        Tier::Search,
        Tier::GeocodeWithCountry,
        Tier::GeocodeBare,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn uses_geocoder(self) -> bool {
        matches!(self, Tier::GeocodeWithCountry | Tier::GeocodeBare)
    }
}
