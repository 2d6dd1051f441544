//! Report input decoding and output writing

pub mod input;
pub mod output;

pub use input::{read_bundle, read_report_input, ReportInput};
pub use output::{create_writer, JsonWriter, OutputFormat, OutputWriter, TableWriter};
