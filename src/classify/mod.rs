//! Classification strategies: assign exactly one group label per sketch
//!
//! Two policies exist and plug into group-metric construction through the
//! [`SketchClassifier`] trait: attribute-threshold break groups
//! ([`break_group`]) and IUCN protection categories/levels ([`iucn`]).

pub mod break_group;
pub mod iucn;

use crate::core::{Metric, Result};

/// Maps a child sketch's overlap metric to a single group label
pub trait SketchClassifier {
    /// Group for the sketch that owns this metric. Missing classification
    /// inputs are an error, never silently defaulted.
    fn classify(&self, metric: &Metric) -> Result<String>;

    /// All groups this classifier can produce, in severity order
    /// (most severe first)
    fn group_ids(&self) -> Vec<String>;
}

pub use break_group::{break_group, BreakGroupClassifier, BreakThresholds};
pub use iucn::{
    category_for_activities, group_from_group_metrics, levels_for_sketches, AttributeClassifier,
    IucnCategory, IUCN_CATEGORY_NAMES, IUCN_LEVELS,
};
