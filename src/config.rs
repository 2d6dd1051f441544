//! Project configuration: the reference data a report computation runs against
//!
//! Everything here is static per project and read-only for the duration of a
//! computation: metric group definitions, precalculated reference totals,
//! break-severity thresholds, and planning objectives. The config is loaded
//! once and passed by reference into every call; nothing reads it ambiently.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::classify::break_group::BreakThresholds;
use crate::core::{Error, Metric, Result, ResultExt};

/// Per-class configuration within a metric group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClassConfig {
    pub class_id: String,

    /// Display label for report cards
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,

    /// Upstream datasource the overlap oracle reads for this class
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datasource_id: Option<String>,
}

impl ClassConfig {
    pub fn new(class_id: impl Into<String>) -> Self {
        Self {
            class_id: class_id.into(),
            display: None,
            datasource_id: None,
        }
    }
}

/// A report's metric group: the measurement id and the classes it subdivides
/// into
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricGroup {
    /// Report this group belongs to, e.g. "platform_edge"
    pub report_id: String,

    /// Measurement id stamped on every metric of this group
    pub metric_id: String,

    #[serde(default)]
    pub classes: Vec<ClassConfig>,
}

impl MetricGroup {
    /// Class ids in config order
    pub fn class_ids(&self) -> Vec<&str> {
        self.classes.iter().map(|c| c.class_id.as_str()).collect()
    }
}

/// One precalculated reference total: the denominator for a
/// percent-of-plan-total computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrecalcTotal {
    pub metric_id: String,

    /// Absent means the grand total across all classes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography_id: Option<String>,

    pub value: f64,
}

/// Project reference data, loaded once per process and injected into every
/// aggregation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Planning region total area in square meters
    #[serde(default = "default_study_region_area")]
    pub study_region_area_sq_m: f64,

    /// Fraction of the planning region targeted for full protection
    #[serde(default = "default_eez_objective")]
    pub eez_objective: f64,

    /// Fraction of each nursery habitat class targeted for protection
    #[serde(default = "default_nursery_objective")]
    pub nursery_objective: f64,

    /// Restriction-relevant fishing activity codes for break classification
    #[serde(default = "default_fishing_activities")]
    pub fishing_activities: Vec<String>,

    /// Break severity groups with minimum qualifying counts, most severe
    /// first
    #[serde(default)]
    pub break_thresholds: BreakThresholds,

    #[serde(default = "default_metric_groups")]
    pub metric_groups: Vec<MetricGroup>,

    #[serde(default)]
    pub precalc: Vec<PrecalcTotal>,
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            study_region_area_sq_m: default_study_region_area(),
            eez_objective: default_eez_objective(),
            nursery_objective: default_nursery_objective(),
            fishing_activities: default_fishing_activities(),
            break_thresholds: BreakThresholds::default(),
            metric_groups: default_metric_groups(),
            precalc: Vec::new(),
        }
    }
}

impl ProjectConfig {
    /// Load and validate a project configuration from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&raw)?;
        config
            .validate()
            .context(format!("loading {}", path.as_ref().display()))?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.study_region_area_sq_m <= 0.0 {
            return Err(Error::configuration(
                "study_region_area_sq_m must be positive",
            ));
        }
        for objective in [self.eez_objective, self.nursery_objective] {
            if !(0.0..=1.0).contains(&objective) {
                return Err(Error::configuration(format!(
                    "objective {objective} must be a fraction between 0 and 1"
                )));
            }
        }
        self.break_thresholds.validate()?;
        for total in &self.precalc {
            if total.value < 0.0 || !total.value.is_finite() {
                return Err(Error::configuration(format!(
                    "precalc total for {} class {:?} has invalid value {}",
                    total.metric_id, total.class_id, total.value
                )));
            }
        }
        Ok(())
    }

    /// Metric group for a report; absence is a fatal datasource-mapping error
    pub fn metric_group(&self, report_id: &str) -> Result<&MetricGroup> {
        self.metric_groups
            .iter()
            .find(|g| g.report_id == report_id)
            .ok_or_else(|| {
                Error::configuration(format!("no metric group configured for report {report_id}"))
            })
    }

    /// Precalculated reference totals for a metric group as a metric list:
    /// one per class plus the unqualified grand total
    pub fn precalc_totals(&self, metric_id: &str, geography_id: Option<&str>) -> Result<Vec<Metric>> {
        let totals: Vec<Metric> = self
            .precalc
            .iter()
            .filter(|t| {
                t.metric_id == metric_id
                    && (t.geography_id.is_none() || t.geography_id.as_deref() == geography_id)
            })
            .map(|t| {
                let mut m = Metric::new(&t.metric_id, t.value);
                m.class_id = t.class_id.clone();
                m.geography_id = t.geography_id.clone();
                m
            })
            .collect();
        if totals.is_empty() {
            return Err(Error::configuration(format!(
                "no precalculated totals for metric {metric_id} (geography {geography_id:?})"
            )));
        }
        Ok(totals)
    }

    /// Reference totals where the whole study region is the denominator for
    /// every class and for the grand total
    pub fn study_region_totals(&self, metric_id: &str, class_ids: &[&str]) -> Vec<Metric> {
        let mut totals: Vec<Metric> = class_ids
            .iter()
            .map(|class_id| {
                Metric::new(metric_id, self.study_region_area_sq_m).with_class(*class_id)
            })
            .collect();
        totals.push(Metric::new(metric_id, self.study_region_area_sq_m));
        totals
    }
}

fn default_study_region_area() -> f64 {
    // Planning region (EEZ) area in square meters
    465_737_168_307.9038
}

fn default_eez_objective() -> f64 {
    0.2
}

fn default_nursery_objective() -> f64 {
    0.5
}

fn default_fishing_activities() -> Vec<String> {
    [
        "FISH_COLLECT_REC",
        "FISH_COLLECT_LOCAL",
        "FISH_AQUA_INDUSTRIAL",
    ]
    .map(String::from)
    .to_vec()
}

fn default_metric_groups() -> Vec<MetricGroup> {
    vec![
        MetricGroup {
            report_id: "boundary".into(),
            metric_id: "boundary_area".into(),
            classes: vec![
                ClassConfig::new("eez"),
                ClassConfig::new("nearshore"),
                ClassConfig::new("offshore"),
            ],
        },
        MetricGroup {
            report_id: "platform_edge".into(),
            metric_id: "edge_area".into(),
            classes: vec![ClassConfig::new("edge")],
        },
        MetricGroup {
            report_id: "nursery_habitat".into(),
            metric_id: "nursery_area".into(),
            classes: vec![
                ClassConfig::new("mangrove"),
                ClassConfig::new("oyster_reef"),
                ClassConfig::new("seagrass"),
            ],
        },
        MetricGroup {
            report_id: "priority_areas".into(),
            metric_id: "priority_area".into(),
            classes: vec![ClassConfig::new("priority_areas_all")],
        },
        MetricGroup {
            report_id: "protection".into(),
            metric_id: "protection_area".into(),
            classes: vec![ClassConfig::new("eez")],
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_validates() {
        assert!(ProjectConfig::default().validate().is_ok());
    }

    #[test]
    fn metric_group_lookup_miss_is_configuration_error() {
        let config = ProjectConfig::default();
        assert!(config.metric_group("platform_edge").is_ok());
        assert!(matches!(
            config.metric_group("unknown"),
            Err(Error::Configuration(_))
        ));
    }

    #[test]
    fn precalc_totals_filter_by_metric_and_geography() {
        let mut config = ProjectConfig::default();
        config.precalc = vec![
            PrecalcTotal {
                metric_id: "nursery_area".into(),
                class_id: Some("mangrove".into()),
                geography_id: Some("world".into()),
                value: 100.0,
            },
            PrecalcTotal {
                metric_id: "nursery_area".into(),
                class_id: None,
                geography_id: Some("world".into()),
                value: 250.0,
            },
            PrecalcTotal {
                metric_id: "other".into(),
                class_id: None,
                geography_id: None,
                value: 1.0,
            },
        ];
        let totals = config.precalc_totals("nursery_area", Some("world")).unwrap();
        assert_eq!(totals.len(), 2);
        assert!(config.precalc_totals("missing", None).is_err());
    }

    #[test]
    fn study_region_totals_include_grand_total() {
        let config = ProjectConfig::default();
        let totals = config.study_region_totals("protection_area", &["eez"]);
        assert_eq!(totals.len(), 2);
        assert!(totals.iter().any(|m| m.class_id.is_none()));
        assert!(totals
            .iter()
            .all(|m| m.value == config.study_region_area_sq_m));
    }

    #[test]
    fn invalid_objective_rejected() {
        let config = ProjectConfig {
            eez_objective: 1.5,
            ..ProjectConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
