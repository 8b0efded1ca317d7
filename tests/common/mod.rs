// tests/common/mod.rs
//
// In-memory stand-ins for the remote sources, with call logs.
//
#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use twin_scrape::core::Document;
use twin_scrape::error::{Error, LookupError, Result};
use twin_scrape::geocode::{Geocoder, ResolverOptions, TitleBatch, TitleSource};
use twin_scrape::model::Coord;
use twin_scrape::specs::DocumentSource;

pub fn fast_opts() -> ResolverOptions {
    ResolverOptions { retry_pause: Duration::ZERO, ..ResolverOptions::default() }
}

#[derive(Default)]
pub struct MockTitles {
    pub coords: HashMap<String, Coord>,
    /// requested → server title
    pub normalize: HashMap<String, String>,
    pub hits: HashMap<String, Vec<String>>,
    /// Fail this many calls (of either kind) before answering.
    pub failures: Cell<usize>,
    pub title_calls: RefCell<Vec<Vec<String>>>,
    pub search_calls: RefCell<Vec<String>>,
}

impl MockTitles {
    pub fn with_coord(mut self, title: &str, lat: f64, lng: f64) -> Self {
        self.coords.insert(title.into(), Coord::new(lat, lng));
        self
    }

    pub fn with_hits(mut self, query: &str, titles: &[&str]) -> Self {
        self.hits.insert(query.into(), titles.iter().map(|t| t.to_string()).collect());
        self
    }

    pub fn with_normalize(mut self, from: &str, to: &str) -> Self {
        self.normalize.insert(from.into(), to.into());
        self
    }

    pub fn failing(self, n: usize) -> Self {
        self.failures.set(n);
        self
    }

    pub fn calls(&self) -> usize {
        self.title_calls.borrow().len() + self.search_calls.borrow().len()
    }

    fn maybe_fail(&self) -> std::result::Result<(), LookupError> {
        let left = self.failures.get();
        if left > 0 {
            self.failures.set(left - 1);
            return Err(LookupError::Timeout);
        }
        Ok(())
    }
}

impl TitleSource for MockTitles {
    fn lookup_titles(&self, titles: &[String]) -> std::result::Result<TitleBatch, LookupError> {
        self.title_calls.borrow_mut().push(titles.to_vec());
        self.maybe_fail()?;
        let mut batch = TitleBatch::default();
        for t in titles {
            let server = self.normalize.get(t).cloned().unwrap_or_else(|| t.clone());
            if &server != t {
                batch.normalized.push((t.clone(), server.clone()));
            }
            batch.pages.push((server.clone(), self.coords.get(&server).copied()));
        }
        Ok(batch)
    }

    fn search(&self, query: &str, limit: usize) -> std::result::Result<Vec<String>, LookupError> {
        self.search_calls.borrow_mut().push(query.to_string());
        self.maybe_fail()?;
        Ok(self.hits.get(query).cloned().unwrap_or_default().into_iter().take(limit).collect())
    }
}

#[derive(Default)]
pub struct MockGeocoder {
    pub coords: HashMap<String, Coord>,
    pub failures: Cell<usize>,
    pub calls: RefCell<Vec<String>>,
}

impl MockGeocoder {
    pub fn with_coord(mut self, query: &str, lat: f64, lng: f64) -> Self {
        self.coords.insert(query.into(), Coord::new(lat, lng));
        self
    }

    pub fn failing(self, n: usize) -> Self {
        self.failures.set(n);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl Geocoder for MockGeocoder {
    fn geocode(&self, query: &str) -> std::result::Result<Option<Coord>, LookupError> {
        self.calls.borrow_mut().push(query.to_string());
        let left = self.failures.get();
        if left > 0 {
            self.failures.set(left - 1);
            return Err(LookupError::Service("HTTP 503".into()));
        }
        Ok(self.coords.get(query).copied())
    }
}

/// Pages served from memory; unknown URLs fail like a dead link.
#[derive(Default)]
pub struct MockPages {
    pub pages: HashMap<String, String>,
    pub fetched: RefCell<Vec<String>>,
}

impl MockPages {
    pub fn with_page(mut self, url: &str, html: &str) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }
}

impl DocumentSource for MockPages {
    fn fetch(&self, url: &str) -> Result<Document> {
        self.fetched.borrow_mut().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(Document::parse(html)),
            None => Err(Error::Fetch { url: url.into(), message: "HTTP 404".into() }),
        }
    }
}

/// Wrap body markup the way article pages are wrapped.
pub fn article(title: &str, body: &str) -> String {
    format!(
        r#"<html><body><h1 id="firstHeading">{title}</h1>
<div id="mw-content-text"><div class="mw-parser-output">{body}</div></div></body></html>"#
    )
}
