//! IUCN protection categories and levels
//!
//! A sketch's declared activities determine its IUCN category: scanning the
//! category table most protective first, the sketch gets the first category
//! whose allowed-activity set covers everything it declares. Categories roll
//! up to the three protection levels (`full`, `high`, `low`) used by the
//! group aggregation reports.

use once_cell::sync::Lazy;
use std::collections::HashMap;

use crate::classify::SketchClassifier;
use crate::core::{Error, Metric, Result, Sketch};

/// Protection levels in severity order, most protective first
pub const IUCN_LEVELS: [&str; 3] = ["full", "high", "low"];

/// Category assigned when no IUCN category admits the declared activities
pub const IUCN_NONE: &str = "None";

/// An IUCN protected-area management category
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IucnCategory {
    pub category: &'static str,
    pub name: &'static str,
    /// Protection level the category rolls up to
    pub level: &'static str,
    /// Activities a sketch may declare and still qualify for this category
    pub allowed_activities: &'static [&'static str],
}

static IUCN_CATEGORIES: Lazy<Vec<IucnCategory>> = Lazy::new(|| {
    vec![
        IucnCategory {
            category: "1a",
            name: "Strict Nature Reserve",
            level: "full",
            allowed_activities: &["RESEARCH_NE", "TRAD_USE_NE"],
        },
        IucnCategory {
            category: "1b",
            name: "Wilderness Area",
            level: "full",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
            ],
        },
        IucnCategory {
            category: "2",
            name: "National Park",
            level: "full",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
                "TOURISM",
                "RECREATE",
            ],
        },
        IucnCategory {
            category: "3",
            name: "Natural Monument or Feature",
            level: "high",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
                "TOURISM",
                "RECREATE",
                "SHIPPING",
            ],
        },
        IucnCategory {
            category: "4",
            name: "Habitat/Species Management Area",
            level: "high",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
                "TOURISM",
                "RECREATE",
                "SHIPPING",
                "FISH_COLLECT_REC",
                "FISH_COLLECT_LOCAL",
                "HABITAT_RESTORATION",
            ],
        },
        IucnCategory {
            category: "5",
            name: "Protected Seascape",
            level: "high",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
                "TOURISM",
                "RECREATE",
                "SHIPPING",
                "FISH_COLLECT_REC",
                "FISH_COLLECT_LOCAL",
                "HABITAT_RESTORATION",
                "AQUA_SMALL",
                "RENEWABLE_ENERGY",
            ],
        },
        IucnCategory {
            category: "6",
            name: "Protected Area with Sustainable Use",
            level: "high",
            allowed_activities: &[
                "RESEARCH_NE",
                "TRAD_USE_NE",
                "RESEARCH",
                "TRAD_FISH_COLLECT",
                "RECREATE_NE",
                "TOURISM",
                "RECREATE",
                "SHIPPING",
                "FISH_COLLECT_REC",
                "FISH_COLLECT_LOCAL",
                "HABITAT_RESTORATION",
                "AQUA_SMALL",
                "RENEWABLE_ENERGY",
                "WORKS",
            ],
        },
    ]
});

/// Category names in table order, without the fallback
pub static IUCN_CATEGORY_NAMES: Lazy<Vec<&'static str>> =
    Lazy::new(|| IUCN_CATEGORIES.iter().map(|c| c.category).collect());

/// Category ids plus the fallback, the full set of category group labels
pub fn category_group_ids() -> Vec<String> {
    IUCN_CATEGORY_NAMES
        .iter()
        .map(|c| c.to_string())
        .chain(std::iter::once(IUCN_NONE.to_string()))
        .collect()
}

/// Level group labels in severity order
pub fn level_group_ids() -> Vec<String> {
    IUCN_LEVELS.iter().map(|l| l.to_string()).collect()
}

/// Most protective category whose allowed-activity set covers every declared
/// activity; `None` (level `low`) when no category qualifies
pub fn category_for_activities(activities: &[String]) -> (&'static str, &'static str) {
    IUCN_CATEGORIES
        .iter()
        .find(|c| {
            activities
                .iter()
                .all(|a| c.allowed_activities.contains(&a.as_str()))
        })
        .map(|c| (c.category, c.level))
        .unwrap_or((IUCN_NONE, "low"))
}

/// Protection level per sketch id, decoded from each sketch's required
/// ACTIVITIES attribute
pub fn levels_for_sketches(sketches: &[&Sketch]) -> Result<HashMap<String, String>> {
    sketches
        .iter()
        .map(|sk| {
            let activities = sk.required_activities()?;
            let (_, level) = category_for_activities(&activities);
            Ok((sk.id.clone(), level.to_string()))
        })
        .collect()
}

/// IUCN category per sketch id, decoded the same way
pub fn categories_for_sketches(sketches: &[&Sketch]) -> Result<HashMap<String, String>> {
    sketches
        .iter()
        .map(|sk| {
            let activities = sk.required_activities()?;
            let (category, _) = category_for_activities(&activities);
            Ok((sk.id.clone(), category.to_string()))
        })
        .collect()
}

/// [`SketchClassifier`] backed by a precomputed sketch-to-group assignment
///
/// Used for both IUCN level and IUCN category grouping: the assignment is
/// derived once from sketch attributes, then looked up per metric. A metric
/// whose sketch has no assignment indicates an upstream classification bug
/// and is fatal.
#[derive(Debug, Clone)]
pub struct AttributeClassifier {
    by_sketch: HashMap<String, String>,
    groups: Vec<String>,
}

impl AttributeClassifier {
    pub fn new(by_sketch: HashMap<String, String>, groups: Vec<String>) -> Self {
        Self { by_sketch, groups }
    }

    /// Level classifier for the sketches of a collection
    pub fn iucn_levels(sketches: &[&Sketch]) -> Result<Self> {
        Ok(Self::new(levels_for_sketches(sketches)?, level_group_ids()))
    }

    /// Category classifier for the sketches of a collection
    pub fn iucn_categories(sketches: &[&Sketch]) -> Result<Self> {
        Ok(Self::new(
            categories_for_sketches(sketches)?,
            category_group_ids(),
        ))
    }
}

impl SketchClassifier for AttributeClassifier {
    fn classify(&self, metric: &Metric) -> Result<String> {
        let sketch_id = metric.sketch_id.as_deref().ok_or_else(|| {
            Error::classification("cannot classify a metric with no sketch id")
        })?;
        self.by_sketch.get(sketch_id).cloned().ok_or_else(|| {
            Error::classification(format!("no group assignment for sketch {sketch_id}"))
        })
    }

    fn group_ids(&self) -> Vec<String> {
        self.groups.clone()
    }
}

/// Metric-derived classification: among a sketch's group-tagged metrics,
/// the single group holding a nonzero value identifies the sketch's group
///
/// No nonzero group means the designated fallback (lowest protection). Two
/// or more nonzero groups violate the one-group-per-sketch invariant the
/// aggregation relies on and fail fast rather than picking one.
pub fn group_from_group_metrics<'a>(
    metrics: &'a [Metric],
    sketch_id: &str,
    fallback: &'a str,
) -> Result<&'a str> {
    let mut nonzero: Vec<&str> = metrics
        .iter()
        .filter(|m| m.sketch_id.as_deref() == Some(sketch_id) && m.value > 0.0)
        .filter_map(|m| m.group_id.as_deref())
        .collect();
    nonzero.sort_unstable();
    nonzero.dedup();
    match nonzero.as_slice() {
        [] => Ok(fallback),
        &[group] => Ok(group),
        groups => Err(Error::classification(format!(
            "sketch {sketch_id} has nonzero value in {} groups ({}), expected exactly one",
            groups.len(),
            groups.join(", ")
        ))),
    }
}
