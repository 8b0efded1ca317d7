// src/specs/mod.rs
//! # Page readers
//!
//! This module knows *how to read the pages*. Each reader focuses on one kind of
//! page and encodes where the ground truth lives in the markup and how to get it
//! out tolerantly.
//!
//! - `index`  – continental index pages → URLs of the per-country sub-pages.
//! - `twins`  – a per-country page → raw (host city, twin city) rows.
//!
//! ## What does **not** live here
//! - Caching, geocoding, de-duplication, export. Readers only extract.
//!
//! ## Conventions
//! - Readers take an already parsed [`Document`] and never fail: markup they do
//!   not recognise yields an empty result.
//! - Every structural guess is a small public predicate so it can be tested on a
//!   hand-written fragment.
//! - Fetching goes through [`DocumentSource`] so tests and benches run offline.

use std::time::Duration;

use reqwest::blocking::Client;
use tracing::info;

use crate::config::ScrapeOptions;
use crate::core::net::{self, Throttle};
use crate::core::Document;
use crate::error::Result;

pub mod index;
pub mod twins;

/// Anything that can hand back a parsed page for a URL.
pub trait DocumentSource {
    fn fetch(&self, url: &str) -> Result<Document>;
}

/// Live pages over HTTP: polite pause, a few retries with backoff.
pub struct HttpDocumentSource {
    client: Client,
    throttle: Throttle,
    retries: u32,
    backoff: Duration,
}

impl HttpDocumentSource {
    pub fn new(opts: &ScrapeOptions) -> Result<Self> {
        Ok(Self {
            client: net::build_client(Duration::from_secs(opts.timeout_secs))?,
            throttle: Throttle::from_millis(opts.pause_ms),
            retries: opts.retries,
            backoff: Duration::from_millis(opts.backoff_ms),
        })
    }
}

impl DocumentSource for HttpDocumentSource {
    fn fetch(&self, url: &str) -> Result<Document> {
        let body = net::get_text_with_retry(&self.client, &self.throttle, url, self.retries, self.backoff)?;
        info!(url, bytes = body.len(), "fetched page");
        Ok(Document::parse(&body))
    }
}

/// Content root shared by every page kind.
pub(crate) const CONTENT_CLASS: &str = "mw-parser-output";

pub(crate) fn content_root(doc: &Document) -> Option<crate::core::NodeId> {
    doc.find_with_class(doc.root(), "div", CONTENT_CLASS)
}
