// src/core/net.rs
// Blocking HTTP over reqwest, one request at a time, with a polite pause between calls.

use std::cell::Cell;
use std::thread;
use std::time::{Duration, Instant};

use reqwest::blocking::{Client, RequestBuilder, Response};
use tracing::{debug, warn};

use crate::config::consts::USER_AGENT;
use crate::error::{Error, LookupError, Result};

/// Minimum gap between consecutive calls to one remote source.
#[derive(Debug)]
pub struct Throttle {
    gap: Duration,
    last: Cell<Option<Instant>>,
}

impl Throttle {
    pub fn new(gap: Duration) -> Self {
        Self { gap, last: Cell::new(None) }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }

    /// Sleep until the gap since the previous call has passed, then mark a new call.
    pub fn wait(&self) {
        if let Some(prev) = self.last.get() {
            let elapsed = prev.elapsed();
            if elapsed < self.gap {
                thread::sleep(self.gap - elapsed);
            }
        }
        self.last.set(Some(Instant::now()));
    }
}

/// Build the shared blocking client. `timeout` is per request.
pub fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| Error::Http(e.to_string()))
}

/// Send once, classify the outcome. Non-2xx is a service error.
pub fn send(req: RequestBuilder) -> std::result::Result<Response, LookupError> {
    let resp = req.send()?;
    let status = resp.status();
    if !status.is_success() {
        return Err(LookupError::Service(format!("HTTP {}", status.as_u16())));
    }
    Ok(resp)
}

/// GET a page body as text with up to `attempts` tries and a fixed backoff.
pub fn get_text_with_retry(
    client: &Client,
    throttle: &Throttle,
    url: &str,
    attempts: u32,
    backoff: Duration,
) -> Result<String> {
    let attempts = attempts.max(1);
    let mut last_err = LookupError::Service(s!("no attempt made"));

    for attempt in 1..=attempts {
        throttle.wait();
        debug!(url, attempt, "GET");
        match send(client.get(url)).and_then(|r| r.text().map_err(LookupError::from)) {
            Ok(body) => return Ok(body),
            Err(e) => {
                warn!(url, attempt, error = %e, "page fetch failed");
                last_err = e;
                if attempt < attempts {
                    thread::sleep(backoff);
                }
            }
        }
    }

    Err(Error::Fetch { url: s!(url), message: last_err.to_string() })
}
