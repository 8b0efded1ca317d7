// src/model.rs
//! Shared data types: places, pairs, coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::core::sanitize::strip_citations;

/// Identity of a place: (name, country) after citation markers are stripped.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PlaceRef {
    pub name: String,
    pub country: String,
}

impl PlaceRef {
    pub fn new(name: &str, country: &str) -> Self {
        Self {
            name: strip_citations(name),
            country: strip_citations(country),
        }
    }
}

impl fmt::Display for PlaceRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.country.is_empty() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{}, {}", self.name, self.country)
        }
    }
}

/// One extracted row, as the page states it: host city, page country, twin, twin country.
/// Also the row shape of the raw pairs CSV.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RawPair {
    pub city1: String,
    pub country1: String,
    pub city2: String,
    pub country2: String,
}

impl RawPair {
    pub fn new(city1: &str, country1: &str, city2: &str, country2: &str) -> Self {
        Self {
            city1: s!(city1),
            country1: s!(country1),
            city2: s!(city2),
            country2: s!(country2),
        }
    }

    pub fn to_pair(&self) -> TwinPair {
        TwinPair {
            city1: PlaceRef::new(&self.city1, &self.country1),
            city2: PlaceRef::new(&self.city2, &self.country2),
        }
    }
}

/// Undirected relationship: (A, B) and (B, A) share one `key()`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TwinPair {
    pub city1: PlaceRef,
    pub city2: PlaceRef,
}

impl TwinPair {
    pub fn key(&self) -> (PlaceRef, PlaceRef) {
        if self.city1 <= self.city2 {
            (self.city1.clone(), self.city2.clone())
        } else {
            (self.city2.clone(), self.city1.clone())
        }
    }

    pub fn to_raw(&self) -> RawPair {
        RawPair::new(&self.city1.name, &self.city1.country, &self.city2.name, &self.city2.country)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coord {
    pub lat: f64,
    pub lng: f64,
}

impl Coord {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn rounded(self, decimals: u32) -> Self {
        let f = 10f64.powi(decimals as i32);
        Self {
            lat: (self.lat * f).round() / f,
            lng: (self.lng * f).round() / f,
        }
    }
}

/// Outcome of one lookup. `Unresolved` is a remembered negative answer,
/// distinct from "not yet attempted" (which is simply absence from the cache).
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum GeocodeResult {
    Resolved(Coord),
    Unresolved,
}

impl GeocodeResult {
    pub fn coord(&self) -> Option<Coord> {
        match self {
            GeocodeResult::Resolved(c) => Some(*c),
            GeocodeResult::Unresolved => None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self, GeocodeResult::Resolved(_))
    }
}

impl From<Option<Coord>> for GeocodeResult {
    fn from(c: Option<Coord>) -> Self {
        match c {
            Some(c) => GeocodeResult::Resolved(c),
            None => GeocodeResult::Unresolved,
        }
    }
}

/// A pair with both endpoints located; one row of the final dataset.
#[derive(Clone, Debug, PartialEq)]
pub struct ResolvedPair {
    pub city1: PlaceRef,
    pub coord1: Coord,
    pub city2: PlaceRef,
    pub coord2: Coord,
}
