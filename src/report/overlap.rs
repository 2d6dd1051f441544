//! Generic class-overlap report: raw values plus percent-of-total
//!
//! Covers the report family with no grouping step (ocean-use sectors and
//! gear types, habitat types, shipwrecks, existing protections): the oracle's
//! per-class values are validated, tagged, and paired with percentage
//! metrics computed against the precalculated totals.

use crate::config::ProjectConfig;
use crate::core::{sort_metrics, validate_metrics, Result, Sketch};
use crate::percent::{to_percent_metrics, PercentOptions};
use crate::report::{check_known_classes, tag_geography, OverlapResult, ReportResult};

/// Suffix appended to the metric id for the percentage companion metrics
pub const PERC_METRIC_SUFFIX: &str = "_perc";

pub fn class_overlap_report(
    report_id: &str,
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
    geography_id: Option<&str>,
) -> Result<ReportResult> {
    let group = config.metric_group(report_id)?;
    validate_metrics(&overlap.class_metrics)?;
    check_known_classes(group.class_ids().as_slice(), &overlap.class_metrics)?;

    let metrics = tag_geography(overlap.class_metrics.clone(), geography_id);
    let totals = config.precalc_totals(&group.metric_id, geography_id)?;
    let percent = to_percent_metrics(
        &metrics,
        &totals,
        &PercentOptions::with_metric_id(format!("{}{}", group.metric_id, PERC_METRIC_SUFFIX)),
    )?;

    let mut all = metrics;
    all.extend(percent);
    Ok(ReportResult {
        metrics: sort_metrics(all),
        sketch: sketch.clone(),
    })
}
