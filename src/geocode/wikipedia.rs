// src/geocode/wikipedia.rs
//! MediaWiki action API: `prop=coordinates` for title batches, `list=search`
//! for free-text title search.

use std::collections::HashMap;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::debug;

use super::sources::{TitleBatch, TitleSource};
use crate::config::consts::{TITLE_BATCH, TITLE_TIMEOUT_SECS, WIKI_API};
use crate::config::GeocodeOptions;
use crate::core::net::{self, Throttle};
use crate::error::{LookupError, Result};
use crate::model::Coord;

pub struct WikipediaClient {
    client: Client,
    api: String,
    throttle: Throttle,
}

impl WikipediaClient {
    pub fn new(opts: &GeocodeOptions) -> Result<Self> {
        Self::with_api(WIKI_API, opts.title_pause_ms)
    }

    /// Point at another MediaWiki install (or a local mock).
    pub fn with_api(api: &str, pause_ms: u64) -> Result<Self> {
        Ok(Self {
            client: net::build_client(Duration::from_secs(TITLE_TIMEOUT_SECS))?,
            api: s!(api),
            throttle: Throttle::from_millis(pause_ms),
        })
    }

    fn get(&self, params: &[(&str, &str)]) -> std::result::Result<String, LookupError> {
        self.throttle.wait();
        let resp = net::send(self.client.get(&self.api).query(params))?;
        Ok(resp.text()?)
    }
}

impl TitleSource for WikipediaClient {
    fn lookup_titles(&self, titles: &[String]) -> std::result::Result<TitleBatch, LookupError> {
        if titles.is_empty() {
            return Ok(TitleBatch::default());
        }
        let joined = titles.join("|");
        let limit = TITLE_BATCH.to_string();
        debug!(count = titles.len(), "title lookup");
        let body = self.get(&[
            ("action", "query"),
            ("titles", joined.as_str()),
            ("prop", "coordinates"),
            ("colimit", limit.as_str()),
            ("format", "json"),
        ])?;
        parse_titles_response(&body)
    }

    fn search(&self, query: &str, limit: usize) -> std::result::Result<Vec<String>, LookupError> {
        let limit = limit.to_string();
        debug!(query, "title search");
        let body = self.get(&[
            ("action", "query"),
            ("list", "search"),
            ("srsearch", query),
            ("srlimit", limit.as_str()),
            ("format", "json"),
        ])?;
        parse_search_response(&body)
    }
}

/* ---------------- Wire format ---------------- */

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    query: Option<ApiQuery>,
    #[serde(default)]
    error: Option<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    #[serde(default)]
    code: String,
    #[serde(default)]
    info: String,
}

#[derive(Deserialize, Default)]
struct ApiQuery {
    #[serde(default)]
    normalized: Vec<ApiNormalized>,
    #[serde(default)]
    pages: HashMap<String, ApiPage>,
    #[serde(default)]
    search: Vec<ApiSearchHit>,
}

#[derive(Deserialize)]
struct ApiNormalized {
    from: String,
    to: String,
}

#[derive(Deserialize)]
struct ApiPage {
    #[serde(default)]
    title: String,
    #[serde(default)]
    coordinates: Vec<ApiCoordinate>,
}

#[derive(Deserialize)]
struct ApiCoordinate {
    lat: f64,
    lon: f64,
}

#[derive(Deserialize)]
struct ApiSearchHit {
    title: String,
}

fn decode(body: &str) -> std::result::Result<ApiQuery, LookupError> {
    let resp: ApiResponse =
        serde_json::from_str(body).map_err(|e| LookupError::Decode(e.to_string()))?;
    if let Some(err) = resp.error {
        return Err(LookupError::Service(join!(err.code, ": ", &err.info)));
    }
    Ok(resp.query.unwrap_or_default())
}

/// Pages without a `coordinates` list (missing pages, articles with no
/// location) come back as `None`.
pub fn parse_titles_response(body: &str) -> std::result::Result<TitleBatch, LookupError> {
    let query = decode(body)?;
    let mut pages: Vec<(String, Option<Coord>)> = query
        .pages
        .into_values()
        .filter(|p| !p.title.is_empty())
        .map(|p| {
            let coord = p.coordinates.first().map(|c| Coord::new(c.lat, c.lon));
            (p.title, coord)
        })
        .collect();
    pages.sort_by(|a, b| a.0.cmp(&b.0));

    Ok(TitleBatch {
        normalized: query.normalized.into_iter().map(|n| (n.from, n.to)).collect(),
        pages,
    })
}

/// Hit titles in rank order.
pub fn parse_search_response(body: &str) -> std::result::Result<Vec<String>, LookupError> {
    Ok(decode(body)?.search.into_iter().map(|h| h.title).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn titles_with_normalization_and_missing_pages() {
        let body = r#"{
            "batchcomplete": "",
            "query": {
                "normalized": [{"from": "springfield, illinois", "to": "Springfield, Illinois"}],
                "pages": {
                    "-1": {"ns": 0, "title": "Nowhere Town", "missing": ""},
                    "28431": {"pageid": 28431, "ns": 0, "title": "Springfield, Illinois",
                              "coordinates": [{"lat": 39.8, "lon": -89.65, "primary": "", "globe": "earth"}]}
                }
            }
        }"#;
        let batch = parse_titles_response(body).unwrap();
        assert_eq!(batch.normalized, vec![(s!("springfield, illinois"), s!("Springfield, Illinois"))]);
        assert_eq!(
            batch.pages,
            vec![
                (s!("Nowhere Town"), None),
                (s!("Springfield, Illinois"), Some(Coord::new(39.8, -89.65))),
            ]
        );
    }

    #[test]
    fn search_keeps_rank_order() {
        let body = r#"{"query": {"searchinfo": {"totalhits": 2},
            "search": [{"ns": 0, "title": "Kraków"}, {"ns": 0, "title": "Kraków County"}]}}"#;
        assert_eq!(parse_search_response(body).unwrap(), vec![s!("Kraków"), s!("Kraków County")]);
    }

    #[test]
    fn api_error_is_a_service_error() {
        let body = r#"{"error": {"code": "ratelimited", "info": "slow down"}}"#;
        assert!(matches!(parse_search_response(body), Err(LookupError::Service(_))));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(parse_titles_response("<html>"), Err(LookupError::Decode(_))));
    }
}
