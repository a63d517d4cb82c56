// src/pipeline/mod.rs

//! The change-detection pipeline.
//!
//! Pure transforms (normalize, extract, diff) feed the per-URL orchestrator,
//! which owns every side effect and their ordering.

pub mod diff;
pub mod extract;
pub mod guard;
pub mod mode;
pub mod normalize;
pub mod process;

pub use diff::{compare_schedules, ScheduleDiff};
pub use extract::extract_schedule;
pub use guard::{GuardVerdict, WipeGuard};
pub use mode::RunMode;
pub use normalize::normalize;
pub use process::{compose_message, process_url, ProcessOptions, ProcessOutcome};
