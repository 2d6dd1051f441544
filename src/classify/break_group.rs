//! Attribute-threshold classification into break-severity groups
//!
//! A sketch "breaks" an ocean use (e.g. fishing access around platform edge
//! habitat) according to how many restriction-relevant activities it rules
//! out. Groups are ordered most severe first, each with a minimum qualifying
//! count; a sketch lands in the first group whose threshold its restricted
//! count meets. No spatial overlap at all short-circuits to the no-effect
//! group regardless of the count.

use serde::{Deserialize, Serialize};

use crate::classify::SketchClassifier;
use crate::core::{Error, Metric, Result};

/// Extra-attribute key: count of restriction-relevant activities the sketch
/// rules out
pub const RESTRICTED_COUNT_ATTRIB: &str = "restricted_count";

/// Extra-attribute key: whether the sketch spatially overlaps the feature
/// class at all
pub const OVERLAP_ATTRIB: &str = "overlap";

/// One severity group and its minimum qualifying restricted-activity count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakThreshold {
    pub group: String,
    pub min_count: u32,
}

/// Ordered break-severity groups, most severe first. The final group must
/// have a zero threshold so every count classifies somewhere.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BreakThresholds(Vec<BreakThreshold>);

impl Default for BreakThresholds {
    fn default() -> Self {
        Self(vec![
            BreakThreshold {
                group: "definite".into(),
                min_count: 3,
            },
            BreakThreshold {
                group: "partial".into(),
                min_count: 1,
            },
            BreakThreshold {
                group: "no".into(),
                min_count: 0,
            },
        ])
    }
}

impl BreakThresholds {
    pub fn new(thresholds: Vec<BreakThreshold>) -> Result<Self> {
        let t = Self(thresholds);
        t.validate()?;
        Ok(t)
    }

    pub fn validate(&self) -> Result<()> {
        if self.0.is_empty() {
            return Err(Error::configuration("break thresholds must not be empty"));
        }
        if !self.0.windows(2).all(|w| w[0].min_count > w[1].min_count) {
            return Err(Error::configuration(
                "break thresholds must be strictly descending, most severe first",
            ));
        }
        if self.0.last().map(|t| t.min_count) != Some(0) {
            return Err(Error::configuration(
                "last break threshold must be zero so every count classifies",
            ));
        }
        Ok(())
    }

    pub fn group_ids(&self) -> Vec<String> {
        self.0.iter().map(|t| t.group.clone()).collect()
    }

    /// The zero-threshold group a non-overlapping sketch always lands in
    pub fn no_effect_group(&self) -> &str {
        &self.0.last().expect("validated non-empty").group
    }

    fn iter(&self) -> impl Iterator<Item = &BreakThreshold> {
        self.0.iter()
    }
}

/// Classify a restricted-activity count into a break group
///
/// Both inputs must be supplied; a missing count or overlap flag indicates
/// the upstream overlap step never attached them and is fatal. A sketch with
/// no overlap is always the no-effect group. Otherwise the first group
/// (scanning most severe first) whose threshold the count meets wins.
pub fn break_group<'a>(
    thresholds: &'a BreakThresholds,
    restricted_count: Option<u32>,
    overlap: Option<bool>,
) -> Result<&'a str> {
    let count = restricted_count
        .ok_or_else(|| Error::classification("missing restricted-activity count"))?;
    let overlap = overlap.ok_or_else(|| Error::classification("missing overlap flag"))?;
    if !overlap {
        return Ok(thresholds.no_effect_group());
    }
    thresholds
        .iter()
        .find(|t| count >= t.min_count)
        .map(|t| t.group.as_str())
        .ok_or_else(|| {
            Error::classification(format!("no break group admits restricted count {count}"))
        })
}

/// [`SketchClassifier`] over the restricted-count and overlap extras stamped
/// on each child sketch metric by the platform edge report
#[derive(Debug, Clone)]
pub struct BreakGroupClassifier {
    thresholds: BreakThresholds,
}

impl BreakGroupClassifier {
    pub fn new(thresholds: BreakThresholds) -> Self {
        Self { thresholds }
    }
}

impl SketchClassifier for BreakGroupClassifier {
    fn classify(&self, metric: &Metric) -> Result<String> {
        let count = metric
            .extra_number(RESTRICTED_COUNT_ATTRIB)
            .map(|n| n as u32);
        let overlap = metric.extra_bool(OVERLAP_ATTRIB);
        break_group(&self.thresholds, count, overlap).map(String::from)
    }

    fn group_ids(&self) -> Vec<String> {
        self.thresholds.group_ids()
    }
}
