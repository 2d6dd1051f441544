//! Protection report: IUCN category and protection-level grouping over the
//! planning boundary
//!
//! Emits two group-metric families from the same per-class overlap values:
//! one tagged with the sketch's IUCN category, one with the level the
//! category rolls up to. Report cards read whichever family they render;
//! the level family is what the network objective is scored against.

use crate::classify::AttributeClassifier;
use crate::config::ProjectConfig;
use crate::core::{sort_metrics, validate_metrics, Result, Sketch};
use crate::group::build_group_metrics;
use crate::report::{check_known_classes, OverlapResult, ReportResult};

pub fn protection_report(
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
) -> Result<ReportResult> {
    let group = config.metric_group("protection")?;
    validate_metrics(&overlap.class_metrics)?;
    check_known_classes(group.class_ids().as_slice(), &overlap.class_metrics)?;

    let leaves = sketch.leaves();
    let level_classifier = AttributeClassifier::iucn_levels(&leaves)?;
    let category_classifier = AttributeClassifier::iucn_categories(&leaves)?;

    let level_metrics = build_group_metrics(
        &group.metric_id,
        sketch,
        &overlap.class_metrics,
        &level_classifier,
        &overlap.group_unions,
    )?;
    let category_metrics = build_group_metrics(
        &group.metric_id,
        sketch,
        &overlap.class_metrics,
        &category_classifier,
        &overlap.group_unions,
    )?;

    let mut metrics = overlap.class_metrics.clone();
    metrics.extend(level_metrics);
    metrics.extend(category_metrics);
    Ok(ReportResult {
        metrics: sort_metrics(metrics),
        sketch: sketch.clone(),
    })
}
