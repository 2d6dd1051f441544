//! Priority areas report: IUCN protection-level grouping, geography-tagged
//!
//! Same level classification as the nursery habitat report, but values are
//! clipped to a geography upstream and there is no meaningful grand total to
//! normalize combined values against; consumers flatten with the no-total
//! variant.

use crate::classify::AttributeClassifier;
use crate::config::ProjectConfig;
use crate::core::{Result, Sketch};
use crate::report::{grouped_report, OverlapResult, ReportResult};

pub fn priority_areas_report(
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
    geography_id: Option<&str>,
) -> Result<ReportResult> {
    let classifier = AttributeClassifier::iucn_levels(&sketch.leaves())?;
    grouped_report(
        "priority_areas",
        sketch,
        overlap,
        config,
        geography_id,
        &classifier,
    )
}
