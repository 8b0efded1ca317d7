// src/csv.rs
//! Typed CSV files: raw scraped pairs, the final dataset, and the missing-city report.

use std::io::{Read, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{Error, Result};
use crate::file::ensure_parent;
use crate::model::{PlaceRef, RawPair, ResolvedPair};

/* ---------------- Raw pairs ---------------- */

pub fn write_raw_pairs<W: Write>(w: W, pairs: &[RawPair]) -> Result<()> {
    let mut out = ::csv::Writer::from_writer(w);
    if pairs.is_empty() {
        out.write_record(["city1", "country1", "city2", "country2"])?;
    }
    for p in pairs {
        out.serialize(p)?;
    }
    out.flush()?;
    Ok(())
}

pub fn read_raw_pairs<R: Read>(r: R) -> Result<Vec<RawPair>> {
    let mut rdr = ::csv::Reader::from_reader(r);
    let rows = rdr.deserialize().collect::<std::result::Result<Vec<RawPair>, _>>()?;
    Ok(rows)
}

pub fn save_raw_pairs(path: &Path, pairs: &[RawPair]) -> Result<()> {
    ensure_parent(path)?;
    write_raw_pairs(std::fs::File::create(path)?, pairs)?;
    info!(path = %path.display(), rows = pairs.len(), "wrote raw pairs");
    Ok(())
}

pub fn load_raw_pairs(path: &Path) -> Result<Vec<RawPair>> {
    let file = std::fs::File::open(path).map_err(|e| {
        Error::Config(format!("cannot open raw pairs {}: {e}", path.display()))
    })?;
    read_raw_pairs(file)
}

/* ---------------- Dataset ---------------- */

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct DatasetRow {
    pub city1: String,
    pub country1: String,
    pub lat1: f64,
    pub lng1: f64,
    pub city2: String,
    pub country2: String,
    pub lat2: f64,
    pub lng2: f64,
}

impl DatasetRow {
    pub fn from_pair(p: &ResolvedPair, decimals: u32) -> Self {
        let c1 = p.coord1.rounded(decimals);
        let c2 = p.coord2.rounded(decimals);
        Self {
            city1: p.city1.name.clone(),
            country1: p.city1.country.clone(),
            lat1: c1.lat,
            lng1: c1.lng,
            city2: p.city2.name.clone(),
            country2: p.city2.country.clone(),
            lat2: c2.lat,
            lng2: c2.lng,
        }
    }
}

pub fn write_dataset<W: Write>(w: W, pairs: &[ResolvedPair], decimals: u32) -> Result<()> {
    let mut out = ::csv::Writer::from_writer(w);
    // Header even for zero rows: serialize only emits it with the first record.
    if pairs.is_empty() {
        out.write_record(["city1", "country1", "lat1", "lng1", "city2", "country2", "lat2", "lng2"])?;
    }
    for p in pairs {
        out.serialize(DatasetRow::from_pair(p, decimals))?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_dataset(path: &Path, pairs: &[ResolvedPair], decimals: u32) -> Result<()> {
    ensure_parent(path)?;
    write_dataset(std::fs::File::create(path)?, pairs, decimals)?;
    info!(path = %path.display(), rows = pairs.len(), "wrote dataset");
    Ok(())
}

/* ---------------- Missing-city report ---------------- */

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct MissingRow {
    pub city: String,
    pub country: String,
    pub pairs: usize,
}

pub fn write_missing<W: Write>(w: W, unresolved: &[(PlaceRef, usize)]) -> Result<()> {
    let mut out = ::csv::Writer::from_writer(w);
    if unresolved.is_empty() {
        out.write_record(["city", "country", "pairs"])?;
    }
    for (place, n) in unresolved {
        out.serialize(MissingRow {
            city: place.name.clone(),
            country: place.country.clone(),
            pairs: *n,
        })?;
    }
    out.flush()?;
    Ok(())
}

pub fn save_missing(path: &Path, unresolved: &[(PlaceRef, usize)]) -> Result<()> {
    ensure_parent(path)?;
    write_missing(std::fs::File::create(path)?, unresolved)?;
    info!(path = %path.display(), rows = unresolved.len(), "wrote missing-city report");
    Ok(())
}
