// src/geocode/sources.rs
use crate::error::LookupError;
use crate::model::Coord;

/// Answer to one batched title lookup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TitleBatch {
    /// Server-side renames: (requested title, title the server used).
    pub normalized: Vec<(String, String)>,
    /// Every page the server answered for, under the server's title.
    pub pages: Vec<(String, Option<Coord>)>,
}

impl TitleBatch {
    /// Titles the caller asked for that became `server_title`.
    pub fn requested_as<'a>(&'a self, server_title: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.normalized
            .iter()
            .filter(move |(_, to)| to == server_title)
            .map(|(from, _)| from.as_str())
    }
}

/// Structured lookups against an encyclopedia: coordinates by exact title, and
/// title search.
pub trait TitleSource {
    /// Coordinates for up to one batch of titles.
    fn lookup_titles(&self, titles: &[String]) -> Result<TitleBatch, LookupError>;

    /// Best matching titles for a free-text query, best first.
    fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError>;
}

/// Free-text geocoding. `Ok(None)` is "not found", never an error.
pub trait Geocoder {
    fn geocode(&self, query: &str) -> Result<Option<Coord>, LookupError>;

    /// Second attempt after a failure; implementations may be more patient here.
    fn geocode_retry(&self, query: &str) -> Result<Option<Coord>, LookupError> {
        self.geocode(query)
    }
}

impl<T: TitleSource + ?Sized> TitleSource for &T {
    fn lookup_titles(&self, titles: &[String]) -> Result<TitleBatch, LookupError> {
        (**self).lookup_titles(titles)
    }
    fn search(&self, query: &str, limit: usize) -> Result<Vec<String>, LookupError> {
        (**self).search(query, limit)
    }
}

impl<G: Geocoder + ?Sized> Geocoder for &G {
    fn geocode(&self, query: &str) -> Result<Option<Coord>, LookupError> {
        (**self).geocode(query)
    }
    fn geocode_retry(&self, query: &str) -> Result<Option<Coord>, LookupError> {
        (**self).geocode_retry(query)
    }
}
