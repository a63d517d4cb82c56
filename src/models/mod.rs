// src/models/mod.rs

//! Data structures shared across the pipeline.

mod schedule;

pub use schedule::{
    deserialize_schedule, is_valid_day_of_month, serialize_schedule, Schedule, ScheduleEntry,
};
