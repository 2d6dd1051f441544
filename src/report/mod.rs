//! Report runners: orchestrate classification, group-metric construction,
//! and percent conversion into plain-data report results
//!
//! Each runner mirrors one report card of the planning tool. Runners consume
//! the geometry oracle's raw overlap output and the injected project
//! configuration; they produce sorted metric bundles and never touch
//! presentation. Independent reports in a bundle are computed in parallel —
//! the aggregation itself is pure and shares no mutable state.

pub mod nursery_habitat;
pub mod overlap;
pub mod platform_edge;
pub mod priority_areas;
pub mod protection;

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::classify::iucn::level_group_ids;
use crate::classify::SketchClassifier;
use crate::config::ProjectConfig;
use crate::core::{sort_metrics, validate_metrics, Error, Metric, Result, Sketch};
use crate::group::{
    build_group_metrics, flatten_by_group_all_class, flatten_by_group_all_class_no_total,
    flatten_by_group_sketch_all_class, flatten_by_group_sketch_all_class_no_total,
    GroupAggregate, GroupUnionValue, SketchGroupAggregate,
};

/// Raw output of the upstream geometry oracle for one report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OverlapResult {
    /// One metric per (sketch, class), including the collection's own
    /// union-of-children row
    pub class_metrics: Vec<Metric>,

    /// Union values per (group, class) for the collection's group rows
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub group_unions: Vec<GroupUnionValue>,
}

/// A computed report: the full sorted metric list plus the sketch it was
/// computed for
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportResult {
    pub metrics: Vec<Metric>,
    pub sketch: Sketch,
}

/// All reports computed for one sketch in one invocation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportBundle {
    pub generated_at: DateTime<Utc>,
    pub reports: BTreeMap<String, ReportResult>,
}

/// Flattened aggregates for one report, ready for a report-card table
#[derive(Debug, Clone, Serialize)]
pub struct FlattenedReport {
    pub report_id: String,
    pub groups: Vec<GroupAggregate>,
    pub sketches: Vec<SketchGroupAggregate>,
}

/// Run every report present in the oracle output, in parallel
pub fn run_reports(
    sketch: &Sketch,
    overlaps: &BTreeMap<String, OverlapResult>,
    config: &ProjectConfig,
    geography_id: Option<&str>,
) -> Result<ReportBundle> {
    let reports: BTreeMap<String, ReportResult> = overlaps
        .par_iter()
        .map(|(report_id, overlap)| {
            log::info!("computing report {report_id}");
            let result = run_report(report_id, sketch, overlap, config, geography_id)?;
            Ok((report_id.clone(), result))
        })
        .collect::<Result<_>>()?;

    Ok(ReportBundle {
        generated_at: Utc::now(),
        reports,
    })
}

/// Dispatch a single report by id; unknown ids run as generic class-overlap
/// reports against their configured metric group
pub fn run_report(
    report_id: &str,
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
    geography_id: Option<&str>,
) -> Result<ReportResult> {
    match report_id {
        "platform_edge" => platform_edge::platform_edge_report(sketch, overlap, config),
        "nursery_habitat" => nursery_habitat::nursery_habitat_report(sketch, overlap, config),
        "priority_areas" => {
            priority_areas::priority_areas_report(sketch, overlap, config, geography_id)
        }
        "protection" => protection::protection_report(sketch, overlap, config),
        other => self::overlap::class_overlap_report(other, sketch, overlap, config, geography_id),
    }
}

/// Flatten a computed report into group aggregates using the report's
/// conventions: priority areas skip the grand total, protection normalizes
/// level groups against the whole study region, everything else uses the
/// metric group's precalculated totals
pub fn flatten_report(
    report_id: &str,
    result: &ReportResult,
    config: &ProjectConfig,
    geography_id: Option<&str>,
) -> Result<FlattenedReport> {
    let group = config.metric_group(report_id)?;
    let group_metrics: Vec<Metric> = result
        .metrics
        .iter()
        .filter(|m| m.metric_id == group.metric_id && m.group_id.is_some())
        .cloned()
        .collect();

    match report_id {
        "priority_areas" => {
            let totals = config.precalc_totals(&group.metric_id, geography_id)?;
            Ok(FlattenedReport {
                report_id: report_id.to_string(),
                groups: flatten_by_group_all_class_no_total(
                    &result.sketch,
                    &group_metrics,
                    &totals,
                )?,
                sketches: flatten_by_group_sketch_all_class_no_total(
                    &result.sketch,
                    &group_metrics,
                    &totals,
                )?,
            })
        }
        "protection" => {
            let class_ids = group.class_ids();
            let totals = config.study_region_totals(&group.metric_id, &class_ids);
            let levels = level_group_ids();
            let level_metrics: Vec<Metric> = group_metrics
                .into_iter()
                .filter(|m| {
                    m.group_id
                        .as_deref()
                        .is_some_and(|g| levels.iter().any(|l| l.as_str() == g))
                })
                .collect();
            Ok(FlattenedReport {
                report_id: report_id.to_string(),
                groups: flatten_by_group_all_class(&result.sketch, &level_metrics, &totals)?,
                sketches: flatten_by_group_sketch_all_class(
                    &result.sketch,
                    &level_metrics,
                    &totals,
                )?,
            })
        }
        _ => {
            let totals = config.precalc_totals(&group.metric_id, geography_id)?;
            Ok(FlattenedReport {
                report_id: report_id.to_string(),
                groups: flatten_by_group_all_class(&result.sketch, &group_metrics, &totals)?,
                sketches: flatten_by_group_sketch_all_class(
                    &result.sketch,
                    &group_metrics,
                    &totals,
                )?,
            })
        }
    }
}

/// Shared runner body for the grouped reports: validate the oracle output,
/// tag groups via the classifier, and assemble the sorted metric list
pub(crate) fn grouped_report(
    report_id: &str,
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
    geography_id: Option<&str>,
    classifier: &dyn SketchClassifier,
) -> Result<ReportResult> {
    let group = config.metric_group(report_id)?;
    validate_metrics(&overlap.class_metrics)?;
    check_known_classes(group.class_ids().as_slice(), &overlap.class_metrics)?;

    let class_metrics = tag_geography(overlap.class_metrics.clone(), geography_id);
    let group_metrics = build_group_metrics(
        &group.metric_id,
        sketch,
        &class_metrics,
        classifier,
        &overlap.group_unions,
    )?;

    let mut metrics = class_metrics;
    metrics.extend(tag_geography(group_metrics, geography_id));
    Ok(ReportResult {
        metrics: sort_metrics(metrics),
        sketch: sketch.clone(),
    })
}

/// A metric whose class is not in the report's configured class list means
/// the oracle and the project config disagree; that is a configuration
/// error, not a skippable row
pub(crate) fn check_known_classes(known: &[&str], metrics: &[Metric]) -> Result<()> {
    for m in metrics {
        if let Some(class_id) = m.class_id.as_deref() {
            if !known.contains(&class_id) {
                return Err(Error::configuration(format!(
                    "overlap metric references class {class_id} not present in the metric group"
                )));
            }
        }
    }
    Ok(())
}

pub(crate) fn tag_geography(metrics: Vec<Metric>, geography_id: Option<&str>) -> Vec<Metric> {
    let Some(geography_id) = geography_id else {
        return metrics;
    };
    metrics
        .into_iter()
        .map(|mut m| {
            if m.geography_id.is_none() {
                m.geography_id = Some(geography_id.to_string());
            }
            m
        })
        .collect()
}
