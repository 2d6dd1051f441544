//! Core data model: metric records, sketches, and shared error types

pub mod errors;
pub mod metric;
pub mod sketch;

pub use errors::{Error, Result, ResultExt};
pub use metric::{first_matching_metric, sort_metrics, validate_metrics, ExtraAttribs, Metric};
pub use sketch::{Sketch, ACTIVITIES_ATTRIB};
