//! ICAP statistics extraction.
//!
//! The statistics service answers with a free-form text page. [`StatisticsParser`]
//! reads the worker-pool and per-service counters out of it using the field
//! table in [`fields`]; the result of one collection cycle is a
//! [`MetricsSnapshot`].

pub mod fields;
mod parser;
mod snapshot;

pub use fields::{FieldRule, FieldTable, ServerField, Unit, WorkloadField, KILOBYTE};
pub use parser::{extract, StatisticsParser};
pub use snapshot::{MetricsSnapshot, ServerProcessCounters, WorkloadCounters};
