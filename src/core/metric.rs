//! The atomic measurement record and helpers for working with flat metric lists
//!
//! Every number the report pipeline touches is carried as a [`Metric`]: one
//! overlap value per (sketch, class) from the geometry oracle, one tagged copy
//! per (sketch, class, group) after classification, and one reference total
//! per class from precalculated project data.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, HashSet};

use crate::core::errors::{Error, Result};

/// Open bag of auxiliary classification inputs attached at computation time
pub type ExtraAttribs = BTreeMap<String, Value>;

/// Atomic measurement record
///
/// `(metric_id, sketch_id, class_id, group_id)` uniquely identifies a record
/// within one report computation; duplicates are a caller error surfaced by
/// [`validate_metrics`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Metric {
    /// Measurement kind, e.g. area overlap or survey-value sum
    pub metric_id: String,

    /// Sketch (leaf) or sketch collection the value belongs to.
    /// Absent for precalculated reference totals.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sketch_id: Option<String>,

    /// Habitat/gear/sector subdivision. Absent means total across classes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,

    /// Protection-level or break-severity group assigned by classification.
    /// Absent means ungrouped.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_id: Option<String>,

    /// Geography the measurement was clipped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography_id: Option<String>,

    /// Non-negative measurement: area in square meters, survey-value sum,
    /// or a count
    pub value: f64,

    /// Consumed only by classification logic, never by the aggregation math
    #[serde(default, skip_serializing_if = "ExtraAttribs::is_empty")]
    pub extra: ExtraAttribs,
}

impl Metric {
    /// Create a metric with only the measurement kind and value set
    pub fn new(metric_id: impl Into<String>, value: f64) -> Self {
        Self {
            metric_id: metric_id.into(),
            sketch_id: None,
            class_id: None,
            group_id: None,
            geography_id: None,
            value,
            extra: ExtraAttribs::new(),
        }
    }

    /// Set the owning sketch
    pub fn with_sketch(mut self, sketch_id: impl Into<String>) -> Self {
        self.sketch_id = Some(sketch_id.into());
        self
    }

    /// Set the class subdivision
    pub fn with_class(mut self, class_id: impl Into<String>) -> Self {
        self.class_id = Some(class_id.into());
        self
    }

    /// Set the classified group
    pub fn with_group(mut self, group_id: impl Into<String>) -> Self {
        self.group_id = Some(group_id.into());
        self
    }

    /// Set the geography
    pub fn with_geography(mut self, geography_id: impl Into<String>) -> Self {
        self.geography_id = Some(geography_id.into());
        self
    }

    /// Attach an auxiliary classification input
    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Numeric extra attribute, if present and numeric
    pub fn extra_number(&self, key: &str) -> Option<f64> {
        self.extra.get(key).and_then(Value::as_f64)
    }

    /// Boolean extra attribute, if present and boolean
    pub fn extra_bool(&self, key: &str) -> Option<bool> {
        self.extra.get(key).and_then(Value::as_bool)
    }
}

/// First metric satisfying the predicate, or a fatal lookup error naming
/// what was searched for. Missing is never coerced to zero.
pub fn first_matching_metric<'a, F>(
    metrics: &'a [Metric],
    predicate: F,
    what: &str,
) -> Result<&'a Metric>
where
    F: Fn(&Metric) -> bool,
{
    metrics
        .iter()
        .find(|m| predicate(m))
        .ok_or_else(|| Error::lookup(format!("no metric matching {what}")))
}

/// Sort metrics for deterministic output: by metric, class, group, sketch
pub fn sort_metrics(mut metrics: Vec<Metric>) -> Vec<Metric> {
    metrics.sort_by(|a, b| {
        a.metric_id
            .cmp(&b.metric_id)
            .then_with(|| a.class_id.cmp(&b.class_id))
            .then_with(|| a.group_id.cmp(&b.group_id))
            .then_with(|| a.sketch_id.cmp(&b.sketch_id))
    });
    metrics
}

/// Validate caller-supplied metrics: non-negative values and a unique
/// (metric, sketch, class, group) tuple per record
pub fn validate_metrics(metrics: &[Metric]) -> Result<()> {
    let mut seen = HashSet::new();
    for m in metrics {
        if m.value < 0.0 || !m.value.is_finite() {
            return Err(Error::invalid_input(format!(
                "metric {} for sketch {:?} has non-finite or negative value {}",
                m.metric_id, m.sketch_id, m.value
            )));
        }
        let key = (
            m.metric_id.as_str(),
            m.sketch_id.as_deref(),
            m.class_id.as_deref(),
            m.group_id.as_deref(),
        );
        if !seen.insert(key) {
            return Err(Error::invalid_input(format!(
                "duplicate metric for ({}, {:?}, {:?}, {:?})",
                m.metric_id, m.sketch_id, m.class_id, m.group_id
            )));
        }
    }
    Ok(())
}
