//! Schedule-change notification service.
//!
//! Monitors schedule web pages, detects semantic changes against the last
//! committed state in an object store, and posts a screenshot-bearing
//! notification when something changed.
//!
//! # Architecture
//!
//! - `models`: schedule data structures and their canonical JSON form
//! - `pipeline`: normalize → extract → diff → orchestrate
//! - `services`: capture and publishing seams (`PageCapture`, `Publisher`)
//! - `storage`: blob-addressed persistence (S3, local filesystem)
//! - `config`: YAML configuration surface
//! - `utils`: URL identifiers, timestamp rendering
//! - `error`: unified error handling
//! - `testing`: in-memory fakes for the three seams

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod testing;
pub mod utils;

// Re-export commonly used items
pub use error::{AppError, Result};
