//! Percent-of-total conversion
//!
//! Divides raw overlap values by their precalculated reference totals,
//! matching on class: a metric with a class id matches the total for that
//! class, a metric without one matches the unqualified grand total. The
//! output can be retagged with a different metric id so percentage and raw
//! metrics coexist in one list without colliding.

use crate::core::{Error, Metric, Result};

/// Options for [`to_percent_metrics`]
#[derive(Debug, Clone, Default)]
pub struct PercentOptions {
    /// Metric id stamped on the output metrics instead of the input's
    pub metric_id_override: Option<String>,
}

impl PercentOptions {
    pub fn with_metric_id(metric_id: impl Into<String>) -> Self {
        Self {
            metric_id_override: Some(metric_id.into()),
        }
    }
}

/// Convert raw-value metrics to percentages of their reference totals
///
/// Every input metric must have a matching total; a miss is fatal. This is
/// the usual failure when a new class is added to a report without adding
/// its precalculated total, and surfacing it beats rendering a wrong
/// percentage.
pub fn to_percent_metrics(
    metrics: &[Metric],
    totals: &[Metric],
    options: &PercentOptions,
) -> Result<Vec<Metric>> {
    metrics
        .iter()
        .map(|metric| {
            let total = matching_total(totals, metric)?;
            let mut out = metric.clone();
            out.value = metric.value / total;
            if let Some(metric_id) = &options.metric_id_override {
                out.metric_id = metric_id.clone();
            }
            Ok(out)
        })
        .collect()
}

fn matching_total(totals: &[Metric], metric: &Metric) -> Result<f64> {
    let total = totals
        .iter()
        .find(|t| t.class_id == metric.class_id)
        .ok_or_else(|| match metric.class_id.as_deref() {
            Some(class_id) => Error::configuration(format!(
                "no precalculated total for class {class_id}; add it to the project precalc data"
            )),
            None => Error::configuration("no precalculated grand total supplied"),
        })?;
    if total.value <= 0.0 || !total.value.is_finite() {
        return Err(Error::configuration(format!(
            "reference total for class {:?} is {}; percentages are undefined",
            metric.class_id, total.value
        )));
    }
    Ok(total.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_by_matching_class_total() {
        let metrics = vec![
            Metric::new("area", 25.0).with_sketch("sk1").with_class("reef"),
            Metric::new("area", 100.0).with_sketch("sk1"),
        ];
        let totals = vec![
            Metric::new("area", 100.0).with_class("reef"),
            Metric::new("area", 400.0),
        ];
        let out = to_percent_metrics(&metrics, &totals, &PercentOptions::default()).unwrap();
        assert_eq!(out[0].value, 0.25);
        assert_eq!(out[1].value, 0.25);
        // identity preserved
        assert_eq!(out[0].sketch_id.as_deref(), Some("sk1"));
        assert_eq!(out[0].metric_id, "area");
    }

    #[test]
    fn self_referential_total_yields_one() {
        let metric = Metric::new("area", 42.0).with_class("reef");
        let total = Metric::new("area", 42.0).with_class("reef");
        let out =
            to_percent_metrics(&[metric], &[total], &PercentOptions::default()).unwrap();
        assert_eq!(out[0].value, 1.0);
    }

    #[test]
    fn override_retags_output_metric_id() {
        let metrics = vec![Metric::new("area", 10.0).with_class("reef")];
        let totals = vec![Metric::new("area", 100.0).with_class("reef")];
        let out = to_percent_metrics(
            &metrics,
            &totals,
            &PercentOptions::with_metric_id("area_perc"),
        )
        .unwrap();
        assert_eq!(out[0].metric_id, "area_perc");
    }

    #[test]
    fn missing_total_is_fatal_not_nan() {
        let metrics = vec![Metric::new("area", 10.0).with_class("kelp")];
        let totals = vec![Metric::new("area", 100.0).with_class("reef")];
        let err = to_percent_metrics(&metrics, &totals, &PercentOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Configuration(_)));
        assert!(err.to_string().contains("kelp"));
    }

    #[test]
    fn zero_total_is_fatal() {
        let metrics = vec![Metric::new("area", 10.0).with_class("reef")];
        let totals = vec![Metric::new("area", 0.0).with_class("reef")];
        assert!(to_percent_metrics(&metrics, &totals, &PercentOptions::default()).is_err());
    }
}
