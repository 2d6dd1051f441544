//! Decode report input and bundle files
//!
//! The report input is the handoff from the upstream geometry oracle: the
//! sketch under evaluation plus one [`OverlapResult`] per report id.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use crate::core::{Result, Sketch};
use crate::report::{OverlapResult, ReportBundle};

/// Everything a bundle computation consumes from upstream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportInput {
    pub sketch: Sketch,

    /// Geography the overlap values were clipped to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geography_id: Option<String>,

    /// Oracle output keyed by report id
    pub overlaps: BTreeMap<String, OverlapResult>,
}

pub fn read_report_input(path: impl AsRef<Path>) -> Result<ReportInput> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}

pub fn read_bundle(path: impl AsRef<Path>) -> Result<ReportBundle> {
    let file = File::open(path.as_ref())?;
    Ok(serde_json::from_reader(BufReader::new(file))?)
}
