//! Flatten group metrics into per-group and per-(group, sketch) aggregates
//!
//! Input is the tagged group-metric list for a collection and its children,
//! plus the precalculated reference totals for the metric group. The
//! collection's own per-(group, class) rows carry oracle-computed union
//! values, so summing them never double-counts spatially overlapping
//! children; this code only ever sums across classes, never re-derives a
//! union.
//!
//! Two variants: "with total" divides each group's combined value by the
//! grand reference total (the total with no class id); "no total" skips that
//! ratio for datasets with no meaningful single denominator, leaving the
//! per-class ratios in place.

use im::{OrdMap, Vector};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};

use crate::core::{Error, Metric, Result, Sketch};

/// Per-group aggregate for a sketch collection
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupAggregate {
    pub group_id: String,

    /// Count of child sketches classified into this group
    pub num_sketches: usize,

    /// The collection's union value summed across classes
    pub value: f64,

    /// `value` over the grand reference total; absent in the no-total
    /// variant
    #[serde(skip_serializing_if = "Option::is_none")]
    pub perc_value: Option<f64>,

    /// Per-class ratio of the collection's class value to the class
    /// reference total
    pub class_perc: BTreeMap<String, f64>,
}

/// Per-(group, sketch) aggregate, one row per child sketch seen in a group
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SketchGroupAggregate {
    pub group_id: String,
    pub sketch_id: String,

    /// The sketch's value summed across classes
    pub value: f64,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub perc_value: Option<f64>,

    pub class_perc: BTreeMap<String, f64>,
}

/// Collection-level flatten with the grand-total percent step
pub fn flatten_by_group_all_class(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
) -> Result<Vec<GroupAggregate>> {
    flatten_collection(collection, group_metrics, total_metrics, true)
}

/// Collection-level flatten without a grand total; callers normalize
/// combined values externally
pub fn flatten_by_group_all_class_no_total(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
) -> Result<Vec<GroupAggregate>> {
    flatten_collection(collection, group_metrics, total_metrics, false)
}

/// Per-sketch flatten with the grand-total percent step
pub fn flatten_by_group_sketch_all_class(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
) -> Result<Vec<SketchGroupAggregate>> {
    flatten_sketches(collection, group_metrics, total_metrics, true)
}

/// Per-sketch flatten without a grand total
pub fn flatten_by_group_sketch_all_class_no_total(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
) -> Result<Vec<SketchGroupAggregate>> {
    flatten_sketches(collection, group_metrics, total_metrics, false)
}

// Stratify group -> collection -> class, then flatten. Output rows are in
// lexicographic group order.
fn flatten_collection(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
    with_total: bool,
) -> Result<Vec<GroupAggregate>> {
    let grand = if with_total {
        Some(grand_total(total_metrics)?)
    } else {
        None
    };

    metrics_by_group(group_metrics)
        .iter()
        .map(|(group_id, metrics)| {
            let mut value = 0.0;
            let mut class_perc = BTreeMap::new();
            for m in metrics
                .iter()
                .filter(|m| m.sketch_id.as_deref() == Some(collection.id.as_str()))
            {
                let class_id = required_class(m)?;
                let total = class_total(total_metrics, class_id)?;
                value += m.value;
                class_perc.insert(class_id.to_string(), m.value / total);
            }

            let num_sketches = metrics
                .iter()
                .filter_map(|m| m.sketch_id.as_deref())
                .filter(|id| *id != collection.id)
                .collect::<BTreeSet<_>>()
                .len();

            Ok(GroupAggregate {
                group_id: group_id.clone(),
                num_sketches,
                value,
                perc_value: grand.map(|g| value / g),
                class_perc,
            })
        })
        .collect()
}

// Stratify group -> sketch -> class. Output rows are in lexicographic
// (group, sketch) order.
fn flatten_sketches(
    collection: &Sketch,
    group_metrics: &[Metric],
    total_metrics: &[Metric],
    with_total: bool,
) -> Result<Vec<SketchGroupAggregate>> {
    let grand = if with_total {
        Some(grand_total(total_metrics)?)
    } else {
        None
    };
    let leaf_ids: BTreeSet<&str> = collection.leaf_ids().into_iter().collect();

    let mut rows = Vec::new();
    for (group_id, metrics) in metrics_by_group(group_metrics) {
        let group_sketch_metrics: Vec<&Metric> = metrics
            .iter()
            .copied()
            .filter(|m| {
                m.sketch_id
                    .as_deref()
                    .is_some_and(|id| leaf_ids.contains(id))
            })
            .collect();

        let class_ids: BTreeSet<&str> = group_sketch_metrics
            .iter()
            .map(|m| required_class(m))
            .collect::<Result<_>>()?;
        let sketch_ids: BTreeSet<&str> = group_sketch_metrics
            .iter()
            .filter_map(|m| m.sketch_id.as_deref())
            .collect();

        for sketch_id in sketch_ids {
            let mut value = 0.0;
            let mut class_perc = BTreeMap::new();
            for class_id in &class_ids {
                let metric = group_sketch_metrics
                    .iter()
                    .find(|m| {
                        m.sketch_id.as_deref() == Some(sketch_id)
                            && m.class_id.as_deref() == Some(*class_id)
                    })
                    .ok_or_else(|| {
                        Error::lookup(format!(
                            "no metric for sketch {sketch_id} class {class_id} in group {group_id}"
                        ))
                    })?;
                let total = class_total(total_metrics, class_id)?;
                value += metric.value;
                class_perc.insert((*class_id).to_string(), metric.value / total);
            }

            rows.push(SketchGroupAggregate {
                group_id: group_id.clone(),
                sketch_id: sketch_id.to_string(),
                value,
                perc_value: grand.map(|g| value / g),
                class_perc,
            });
        }
    }
    Ok(rows)
}

/// Partition metrics by group id; ungrouped metrics belong to raw overlap
/// reporting and are ignored here. The ordered map makes output ordering
/// deterministic.
fn metrics_by_group(metrics: &[Metric]) -> OrdMap<String, Vector<&Metric>> {
    metrics
        .iter()
        .filter(|m| m.group_id.is_some())
        .fold(OrdMap::new(), |mut acc, m| {
            let group = m.group_id.clone().expect("filtered to grouped metrics");
            acc.entry(group).or_insert_with(Vector::new).push_back(m);
            acc
        })
}

fn required_class(metric: &Metric) -> Result<&str> {
    metric.class_id.as_deref().ok_or_else(|| {
        Error::invalid_input(format!(
            "group metric for sketch {:?} in group {:?} has no class id",
            metric.sketch_id, metric.group_id
        ))
    })
}

/// Reference total for a class. Missing and zero totals are both fatal
/// configuration errors: dividing by a silently-defaulted denominator would
/// misstate every percentage in the report.
fn class_total(total_metrics: &[Metric], class_id: &str) -> Result<f64> {
    let total = total_metrics
        .iter()
        .find(|m| m.class_id.as_deref() == Some(class_id))
        .ok_or_else(|| {
            Error::configuration(format!(
                "no precalculated total for class {class_id}; add it to the project precalc data"
            ))
        })?;
    nonzero_total(total.value, &format!("class {class_id}"))
}

/// Grand reference total: the total metric with no class id
fn grand_total(total_metrics: &[Metric]) -> Result<f64> {
    let total = total_metrics
        .iter()
        .find(|m| m.class_id.is_none())
        .ok_or_else(|| {
            Error::configuration("no grand total (total metric without class id) supplied")
        })?;
    nonzero_total(total.value, "grand total")
}

fn nonzero_total(value: f64, what: &str) -> Result<f64> {
    if value <= 0.0 || !value.is_finite() {
        return Err(Error::configuration(format!(
            "reference total for {what} is {value}; percentages are undefined"
        )));
    }
    Ok(value)
}
