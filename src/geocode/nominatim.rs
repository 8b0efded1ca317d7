// src/geocode/nominatim.rs
//! OpenStreetMap Nominatim `/search`, one result per query.
//! The public instance allows one request per second; the throttle enforces it.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::sources::Geocoder;
use crate::config::consts::{GEOCODER_RETRY_TIMEOUT_SECS, GEOCODER_TIMEOUT_SECS, NOMINATIM_API};
use crate::config::GeocodeOptions;
use crate::core::net::{self, Throttle};
use crate::error::{LookupError, Result};
use crate::model::Coord;

pub struct NominatimClient {
    client: Client,
    /// Longer timeout, used for the retry.
    patient: Client,
    api: String,
    throttle: Throttle,
}

impl NominatimClient {
    pub fn new(opts: &GeocodeOptions) -> Result<Self> {
        Self::with_api(NOMINATIM_API, opts.geocoder_pause_ms)
    }

    pub fn with_api(api: &str, pause_ms: u64) -> Result<Self> {
        Ok(Self {
            client: net::build_client(Duration::from_secs(GEOCODER_TIMEOUT_SECS))?,
            patient: net::build_client(Duration::from_secs(GEOCODER_RETRY_TIMEOUT_SECS))?,
            api: s!(api),
            throttle: Throttle::from_millis(pause_ms),
        })
    }

    fn query(&self, client: &Client, q: &str) -> std::result::Result<Option<Coord>, LookupError> {
        self.throttle.wait();
        debug!(query = q, "geocode");
        let req = client
            .get(&self.api)
            .query(&[("q", q), ("format", "json"), ("limit", "1")]);
        let body = net::send(req)?.text()?;
        parse_search_results(&body)
    }
}

impl Geocoder for NominatimClient {
    fn geocode(&self, query: &str) -> std::result::Result<Option<Coord>, LookupError> {
        self.query(&self.client, query)
    }

    fn geocode_retry(&self, query: &str) -> std::result::Result<Option<Coord>, LookupError> {
        self.query(&self.patient, query)
    }
}

/// Nominatim sends coordinates as decimal strings.
#[derive(Deserialize)]
struct Place {
    lat: String,
    lon: String,
}

/// First hit, or `None` for an empty list.
pub fn parse_search_results(body: &str) -> std::result::Result<Option<Coord>, LookupError> {
    let places: Vec<Place> =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    let Some(first) = places.first() else {
        return Ok(None);
    };
    let lat = first.lat.trim().parse::<f64>();
    let lng = first.lon.trim().parse::<f64>();
    match (lat, lng) {
        (Ok(lat), Ok(lng)) => Ok(Some(Coord::new(lat, lng))),
        _ => Err(LookupError::Decode(format!("bad coordinates: {} / {}", first.lat, first.lon))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_hit_wins() {
        let body = r#"[
            {"place_id": 1, "lat": "50.0619474", "lon": "19.9368564", "display_name": "Kraków"},
            {"place_id": 2, "lat": "1.0", "lon": "2.0"}
        ]"#;
        assert_eq!(parse_search_results(body).unwrap(), Some(Coord::new(50.0619474, 19.9368564)));
    }

    #[test]
    fn empty_list_is_not_found() {
        assert_eq!(parse_search_results("[]").unwrap(), None);
    }

    #[test]
    fn unparsable_number_is_decode_error() {
        let body = r#"[{"lat": "north", "lon": "19.9"}]"#;
        assert!(matches!(parse_search_results(body), Err(LookupError::Decode(_))));
    }
}
