// src/lib.rs

#[macro_use]
pub mod macros;

#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod core;
pub mod csv;
pub mod error;
pub mod file;
pub mod geocode;
pub mod log;
pub mod model;
pub mod names;
pub mod progress;
pub mod reconcile;
pub mod runner;
pub mod specs;

pub use error::{Error, LookupError, Result};
