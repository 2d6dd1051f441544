//! Construct the tagged group-metric list for a sketch or collection
//!
//! Child sketch metrics get the group their classifier assigns. The
//! collection's own per-(group, class) rows carry union values computed by
//! the upstream geometry oracle over each group's member sketches; this code
//! never derives a union itself, so overlapping children are counted once.

use im::OrdMap;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::classify::SketchClassifier;
use crate::core::{Error, Metric, Result, Sketch};

/// Oracle-computed union overlap for one (group, class): the area covered by
/// the union of the group's member sketches within the class
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupUnionValue {
    pub group_id: String,
    pub class_id: String,
    pub value: f64,
}

/// Tag child metrics with their classified group and emit the collection's
/// per-(group, class) union rows
///
/// Every group the classifier knows gets collection rows for every class
/// present, zero-valued when the group has no members. A group whose members
/// carry a nonzero class value but has no oracle union entry for that class
/// is a fatal lookup error; zero would silently undercount.
///
/// For a leaf sketch there is no collection row: the output is the sketch's
/// own metrics tagged with its single group.
pub fn build_group_metrics(
    metric_id: &str,
    sketch: &Sketch,
    class_metrics: &[Metric],
    classifier: &dyn SketchClassifier,
    unions: &[GroupUnionValue],
) -> Result<Vec<Metric>> {
    let leaf_ids: BTreeSet<&str> = sketch.leaf_ids().into_iter().collect();

    let mut tagged = Vec::new();
    let mut groups_by_sketch: HashMap<&str, String> = HashMap::new();
    for metric in class_metrics {
        let Some(sketch_id) = metric.sketch_id.as_deref() else {
            continue;
        };
        if !leaf_ids.contains(sketch_id) {
            continue;
        }
        if metric.class_id.is_none() {
            return Err(Error::invalid_input(format!(
                "overlap metric for sketch {sketch_id} has no class id"
            )));
        }
        let group = classifier.classify(metric)?;
        groups_by_sketch.insert(sketch_id, group.clone());
        let mut m = metric.clone();
        m.group_id = Some(group);
        tagged.push(m);
    }

    if !sketch.is_collection() {
        return Ok(tagged);
    }

    let class_ids: BTreeSet<&str> = tagged
        .iter()
        .filter_map(|m| m.class_id.as_deref())
        .collect();
    let unions_by_key: OrdMap<(String, String), f64> = unions
        .iter()
        .map(|u| ((u.group_id.clone(), u.class_id.clone()), u.value))
        .collect();

    let mut collection_rows = Vec::new();
    for group_id in classifier.group_ids() {
        let members: Vec<&str> = groups_by_sketch
            .iter()
            .filter(|(_, g)| **g == group_id)
            .map(|(id, _)| *id)
            .collect();

        for class_id in &class_ids {
            let key = (group_id.clone(), (*class_id).to_string());
            let value = match unions_by_key.get(&key) {
                Some(value) => *value,
                None => {
                    let member_sum: f64 = tagged
                        .iter()
                        .filter(|m| {
                            m.class_id.as_deref() == Some(*class_id)
                                && m.sketch_id
                                    .as_deref()
                                    .is_some_and(|id| members.contains(&id))
                        })
                        .map(|m| m.value)
                        .sum();
                    if member_sum > 0.0 {
                        return Err(Error::lookup(format!(
                            "no union value for group {group_id} class {class_id} although \
                             member sketches overlap it"
                        )));
                    }
                    0.0
                }
            };

            collection_rows.push(
                Metric::new(metric_id, value)
                    .with_sketch(&*sketch.id)
                    .with_class(*class_id)
                    .with_group(&*group_id),
            );
        }
    }

    tagged.extend(collection_rows);
    Ok(tagged)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::AttributeClassifier;

    fn classifier(assignments: &[(&str, &str)]) -> AttributeClassifier {
        AttributeClassifier::new(
            assignments
                .iter()
                .map(|(sk, g)| (sk.to_string(), g.to_string()))
                .collect(),
            vec!["full".into(), "high".into(), "low".into()],
        )
    }

    fn overlap(sketch: &str, class: &str, value: f64) -> Metric {
        Metric::new("area", value).with_sketch(sketch).with_class(class)
    }

    #[test]
    fn children_get_their_classified_group() {
        let coll = Sketch::collection("net", vec![Sketch::new("a"), Sketch::new("b")]);
        let metrics = vec![overlap("a", "reef", 10.0), overlap("b", "reef", 20.0)];
        let unions = vec![
            GroupUnionValue {
                group_id: "full".into(),
                class_id: "reef".into(),
                value: 10.0,
            },
            GroupUnionValue {
                group_id: "high".into(),
                class_id: "reef".into(),
                value: 20.0,
            },
        ];
        let out = build_group_metrics(
            "area",
            &coll,
            &metrics,
            &classifier(&[("a", "full"), ("b", "high")]),
            &unions,
        )
        .unwrap();

        let a = out
            .iter()
            .find(|m| m.sketch_id.as_deref() == Some("a"))
            .unwrap();
        assert_eq!(a.group_id.as_deref(), Some("full"));

        // one collection row per (group, class), zero where no members
        let coll_rows: Vec<_> = out
            .iter()
            .filter(|m| m.sketch_id.as_deref() == Some("net"))
            .collect();
        assert_eq!(coll_rows.len(), 3);
        let low = coll_rows
            .iter()
            .find(|m| m.group_id.as_deref() == Some("low"))
            .unwrap();
        assert_eq!(low.value, 0.0);
    }

    #[test]
    fn union_value_never_rederived_from_children() {
        // children overlap spatially: union (25) < sum of children (30)
        let coll = Sketch::collection("net", vec![Sketch::new("a"), Sketch::new("b")]);
        let metrics = vec![overlap("a", "reef", 10.0), overlap("b", "reef", 20.0)];
        let unions = vec![GroupUnionValue {
            group_id: "full".into(),
            class_id: "reef".into(),
            value: 25.0,
        }];
        let out = build_group_metrics(
            "area",
            &coll,
            &metrics,
            &classifier(&[("a", "full"), ("b", "full")]),
            &unions,
        )
        .unwrap();
        let coll_full = out
            .iter()
            .find(|m| {
                m.sketch_id.as_deref() == Some("net") && m.group_id.as_deref() == Some("full")
            })
            .unwrap();
        assert_eq!(coll_full.value, 25.0);
    }

    #[test]
    fn missing_union_for_overlapping_members_is_fatal() {
        let coll = Sketch::collection("net", vec![Sketch::new("a")]);
        let metrics = vec![overlap("a", "reef", 10.0)];
        let err = build_group_metrics(
            "area",
            &coll,
            &metrics,
            &classifier(&[("a", "full")]),
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Lookup(_)));
    }

    #[test]
    fn missing_union_for_zero_value_members_defaults_to_zero() {
        let coll = Sketch::collection("net", vec![Sketch::new("a")]);
        let metrics = vec![overlap("a", "reef", 0.0)];
        let out = build_group_metrics(
            "area",
            &coll,
            &metrics,
            &classifier(&[("a", "full")]),
            &[],
        )
        .unwrap();
        assert!(out
            .iter()
            .filter(|m| m.sketch_id.as_deref() == Some("net"))
            .all(|m| m.value == 0.0));
    }

    #[test]
    fn classification_miss_aborts_the_build() {
        let coll = Sketch::collection("net", vec![Sketch::new("a"), Sketch::new("b")]);
        let metrics = vec![overlap("a", "reef", 10.0), overlap("b", "reef", 5.0)];
        let err = build_group_metrics(
            "area",
            &coll,
            &metrics,
            &classifier(&[("a", "full")]), // no assignment for b
            &[],
        )
        .unwrap_err();
        assert!(matches!(err, Error::Classification(_)));
    }

    #[test]
    fn leaf_sketch_emits_only_its_own_tagged_metrics() {
        let leaf = Sketch::new("solo");
        let metrics = vec![overlap("solo", "reef", 10.0)];
        let out = build_group_metrics(
            "area",
            &leaf,
            &metrics,
            &classifier(&[("solo", "high")]),
            &[],
        )
        .unwrap();
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].group_id.as_deref(), Some("high"));
    }
}
