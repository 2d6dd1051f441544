//! Percent-of-total conversion contract

use proptest::prelude::*;
use reefmap::{to_percent_metrics, Metric, PercentOptions};

#[test]
fn percent_round_trip_matches_ratio() {
    let metric = Metric::new("area", 30.0).with_sketch("sk1").with_class("reef");
    let total = Metric::new("area", 120.0).with_class("reef");
    let out = to_percent_metrics(
        std::slice::from_ref(&metric),
        std::slice::from_ref(&total),
        &PercentOptions::default(),
    )
    .unwrap();
    assert_eq!(out[0].value, 30.0 / 120.0);
}

#[test]
fn self_referential_total_is_exactly_one() {
    let metric = Metric::new("area", 42.0).with_class("reef");
    let total = Metric::new("area", 42.0).with_class("reef");
    let out = to_percent_metrics(
        std::slice::from_ref(&metric),
        std::slice::from_ref(&total),
        &PercentOptions::default(),
    )
    .unwrap();
    assert_eq!(out[0].value, 1.0);
}

#[test]
fn unqualified_metric_matches_unqualified_total() {
    let metrics = vec![
        Metric::new("area", 10.0).with_class("reef"),
        Metric::new("area", 40.0),
    ];
    let totals = vec![
        Metric::new("area", 100.0).with_class("reef"),
        Metric::new("area", 200.0),
    ];
    let out = to_percent_metrics(&metrics, &totals, &PercentOptions::default()).unwrap();
    assert_eq!(out[0].value, 0.1);
    assert_eq!(out[1].value, 0.2);
}

#[test]
fn missing_total_raises_rather_than_emitting_nan_or_zero() {
    let metrics = vec![Metric::new("area", 10.0).with_class("new_habitat")];
    let totals = vec![Metric::new("area", 100.0).with_class("reef")];
    let err = to_percent_metrics(&metrics, &totals, &PercentOptions::default()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("new_habitat"));
}

#[test]
fn retagged_percent_metrics_coexist_with_raw_metrics() {
    let metrics = vec![Metric::new("area", 10.0).with_sketch("sk1").with_class("reef")];
    let totals = vec![Metric::new("area", 100.0).with_class("reef")];
    let percent = to_percent_metrics(
        &metrics,
        &totals,
        &PercentOptions::with_metric_id("area_perc"),
    )
    .unwrap();

    let mut combined = metrics;
    combined.extend(percent);
    assert!(reefmap::validate_metrics(&combined).is_ok());
}

proptest! {
    #[test]
    fn percent_is_always_value_over_total(value in 0.0f64..1e12, total in 1e-6f64..1e12) {
        let metric = Metric::new("area", value).with_class("reef");
        let reference = Metric::new("area", total).with_class("reef");
        let out = to_percent_metrics(
            std::slice::from_ref(&metric),
            std::slice::from_ref(&reference),
            &PercentOptions::default(),
        )
        .unwrap();
        prop_assert_eq!(out[0].value, value / total);
    }
}
