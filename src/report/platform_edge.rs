//! Platform edge report: break-severity grouping of fishing access
//!
//! Each child sketch's declared activities are compared against the
//! restriction-relevant fishing activity codes; the count of activities the
//! sketch rules out, together with whether it overlaps edge habitat at all,
//! is stamped on its overlap metric and drives break-group classification.

use crate::classify::break_group::{
    BreakGroupClassifier, OVERLAP_ATTRIB, RESTRICTED_COUNT_ATTRIB,
};
use crate::config::ProjectConfig;
use crate::core::{Error, Metric, Result, Sketch};
use crate::report::{grouped_report, OverlapResult, ReportResult};

pub fn platform_edge_report(
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
) -> Result<ReportResult> {
    let group = config.metric_group("platform_edge")?;
    let class_id = group
        .classes
        .first()
        .map(|c| c.class_id.as_str())
        .ok_or_else(|| {
            Error::configuration("platform_edge metric group has no classes configured")
        })?;

    let stamped = OverlapResult {
        class_metrics: stamp_break_inputs(sketch, &overlap.class_metrics, class_id, config)?,
        group_unions: overlap.group_unions.clone(),
    };
    let classifier = BreakGroupClassifier::new(config.break_thresholds.clone());
    grouped_report("platform_edge", sketch, &stamped, config, None, &classifier)
}

/// Default the single class id and attach the break-classification extras to
/// every child sketch metric. The collection's own row gets the class tag
/// only; it is never classified.
fn stamp_break_inputs(
    sketch: &Sketch,
    class_metrics: &[Metric],
    class_id: &str,
    config: &ProjectConfig,
) -> Result<Vec<Metric>> {
    let leaves = sketch.leaves();
    class_metrics
        .iter()
        .map(|metric| {
            let mut m = metric.clone();
            if m.class_id.is_none() {
                m.class_id = Some(class_id.to_string());
            }
            let Some(owner) = leaves
                .iter()
                .find(|leaf| metric.sketch_id.as_deref() == Some(leaf.id.as_str()))
            else {
                return Ok(m);
            };
            if sketch.is_collection() && owner.id == sketch.id {
                return Ok(m);
            }

            let activities = owner.activities_or_default()?;
            let allowed = config
                .fishing_activities
                .iter()
                .filter(|a| activities.contains(a))
                .count();
            let restricted = config.fishing_activities.len() - allowed;
            m.extra
                .insert(RESTRICTED_COUNT_ATTRIB.into(), (restricted as u64).into());
            m.extra.insert(
                OVERLAP_ATTRIB.into(),
                (metric.value > 0.0 && restricted > 0).into(),
            );
            Ok(m)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::ACTIVITIES_ATTRIB;
    use crate::group::GroupUnionValue;

    fn sketch_with_activities(id: &str, activities: &str) -> Sketch {
        Sketch::new(id).with_attribute(ACTIVITIES_ATTRIB, activities)
    }

    fn edge_metric(sketch: &str, value: f64) -> Metric {
        Metric::new("edge_area", value).with_sketch(sketch)
    }

    #[test]
    fn restrictive_sketch_classifies_definite() {
        // no fishing activities declared: all three restriction-relevant
        // codes are ruled out
        let coll = Sketch::collection("net", vec![sketch_with_activities("a", "[]")]);
        let overlap = OverlapResult {
            class_metrics: vec![edge_metric("a", 10.0), edge_metric("net", 10.0)],
            group_unions: vec![GroupUnionValue {
                group_id: "definite".into(),
                class_id: "edge".into(),
                value: 10.0,
            }],
        };
        let result = platform_edge_report(&coll, &overlap, &ProjectConfig::default()).unwrap();

        let child = result
            .metrics
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("a") && m.group_id.is_some())
            .unwrap();
        assert_eq!(child.group_id.as_deref(), Some("definite"));
    }

    #[test]
    fn permissive_sketch_with_overlap_is_no_break() {
        // all restriction-relevant activities allowed: restricted count is 0
        let coll = Sketch::collection(
            "net",
            vec![sketch_with_activities(
                "a",
                "[\"FISH_COLLECT_REC\",\"FISH_COLLECT_LOCAL\",\"FISH_AQUA_INDUSTRIAL\"]",
            )],
        );
        let overlap = OverlapResult {
            class_metrics: vec![edge_metric("a", 10.0), edge_metric("net", 10.0)],
            group_unions: vec![GroupUnionValue {
                group_id: "no".into(),
                class_id: "edge".into(),
                value: 10.0,
            }],
        };
        let result = platform_edge_report(&coll, &overlap, &ProjectConfig::default()).unwrap();
        let child = result
            .metrics
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("a") && m.group_id.is_some())
            .unwrap();
        assert_eq!(child.group_id.as_deref(), Some("no"));
    }

    #[test]
    fn non_overlapping_sketch_is_no_break_despite_restrictions() {
        let coll = Sketch::collection("net", vec![sketch_with_activities("a", "[]")]);
        let overlap = OverlapResult {
            class_metrics: vec![edge_metric("a", 0.0), edge_metric("net", 0.0)],
            group_unions: Vec::new(),
        };
        let result = platform_edge_report(&coll, &overlap, &ProjectConfig::default()).unwrap();
        let child = result
            .metrics
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("a") && m.group_id.is_some())
            .unwrap();
        assert_eq!(child.group_id.as_deref(), Some("no"));
    }

    #[test]
    fn collection_rows_cover_every_break_group() {
        let coll = Sketch::collection("net", vec![sketch_with_activities("a", "[]")]);
        let overlap = OverlapResult {
            class_metrics: vec![edge_metric("a", 10.0), edge_metric("net", 10.0)],
            group_unions: vec![GroupUnionValue {
                group_id: "definite".into(),
                class_id: "edge".into(),
                value: 10.0,
            }],
        };
        let result = platform_edge_report(&coll, &overlap, &ProjectConfig::default()).unwrap();
        let mut groups: Vec<&str> = result
            .metrics
            .iter()
            .filter(|m| m.sketch_id.as_deref() == Some("net") && m.group_id.is_some())
            .filter_map(|m| m.group_id.as_deref())
            .collect();
        groups.sort_unstable();
        assert_eq!(groups, vec!["definite", "no", "partial"]);
    }
}
