//! Group-metric construction and flattening
//!
//! [`build`] turns untagged per-(sketch, class) overlap metrics plus a
//! classification strategy into the tagged group-metric list; [`flatten`]
//! turns that list into the per-group aggregates the report cards consume.

pub mod build;
pub mod flatten;

pub use build::{build_group_metrics, GroupUnionValue};
pub use flatten::{
    flatten_by_group_all_class, flatten_by_group_all_class_no_total,
    flatten_by_group_sketch_all_class, flatten_by_group_sketch_all_class_no_total, GroupAggregate,
    SketchGroupAggregate,
};
