//! Nursery habitat report: IUCN protection-level grouping across habitat
//! classes
//!
//! Each child sketch's protection level is derived from its declared
//! activities; the level then groups the sketch's per-habitat overlap
//! metrics. Absent activity attributes are a classification error here, not
//! a default.

use crate::classify::AttributeClassifier;
use crate::config::ProjectConfig;
use crate::core::{Result, Sketch};
use crate::report::{grouped_report, OverlapResult, ReportResult};

pub fn nursery_habitat_report(
    sketch: &Sketch,
    overlap: &OverlapResult,
    config: &ProjectConfig,
) -> Result<ReportResult> {
    let classifier = AttributeClassifier::iucn_levels(&sketch.leaves())?;
    grouped_report("nursery_habitat", sketch, overlap, config, None, &classifier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Metric, ACTIVITIES_ATTRIB};
    use crate::group::GroupUnionValue;

    #[test]
    fn groups_child_metrics_by_protection_level() {
        let coll = Sketch::collection(
            "net",
            vec![
                Sketch::new("a").with_attribute(ACTIVITIES_ATTRIB, "[]"),
                Sketch::new("b")
                    .with_attribute(ACTIVITIES_ATTRIB, "[\"FISH_COLLECT_LOCAL\"]"),
            ],
        );
        let overlap = OverlapResult {
            class_metrics: vec![
                Metric::new("nursery_area", 10.0)
                    .with_sketch("a")
                    .with_class("mangrove"),
                Metric::new("nursery_area", 5.0)
                    .with_sketch("b")
                    .with_class("mangrove"),
                Metric::new("nursery_area", 14.0)
                    .with_sketch("net")
                    .with_class("mangrove"),
            ],
            group_unions: vec![
                GroupUnionValue {
                    group_id: "full".into(),
                    class_id: "mangrove".into(),
                    value: 10.0,
                },
                GroupUnionValue {
                    group_id: "high".into(),
                    class_id: "mangrove".into(),
                    value: 5.0,
                },
            ],
        };
        let result =
            nursery_habitat_report(&coll, &overlap, &ProjectConfig::default()).unwrap();

        let a = result
            .metrics
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("a") && m.group_id.is_some())
            .unwrap();
        assert_eq!(a.group_id.as_deref(), Some("full"));
        let b = result
            .metrics
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("b") && m.group_id.is_some())
            .unwrap();
        assert_eq!(b.group_id.as_deref(), Some("high"));
    }

    #[test]
    fn missing_activities_attribute_is_fatal() {
        let coll = Sketch::collection("net", vec![Sketch::new("a")]);
        let overlap = OverlapResult {
            class_metrics: vec![Metric::new("nursery_area", 1.0)
                .with_sketch("a")
                .with_class("mangrove")],
            group_unions: Vec::new(),
        };
        assert!(nursery_habitat_report(&coll, &overlap, &ProjectConfig::default()).is_err());
    }
}
