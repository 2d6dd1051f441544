//! Output writers for computed bundles and flattened aggregates

use colored::Colorize;
use comfy_table::{presets::UTF8_FULL_CONDENSED, Cell, Table};
use std::collections::BTreeSet;
use std::fs::File;
use std::io::{self, Write};
use std::path::Path;

use crate::report::{FlattenedReport, ReportBundle};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Json,
    Terminal,
}

pub trait OutputWriter {
    fn write_bundle(&mut self, bundle: &ReportBundle) -> anyhow::Result<()>;
    fn write_flattened(&mut self, flattened: &FlattenedReport) -> anyhow::Result<()>;
}

/// Build a writer for the chosen format, targeting a file or stdout
pub fn create_writer(
    format: OutputFormat,
    output: Option<&Path>,
) -> anyhow::Result<Box<dyn OutputWriter>> {
    let sink: Box<dyn Write> = match output {
        Some(path) => Box::new(File::create(path)?),
        None => Box::new(io::stdout()),
    };
    Ok(match format {
        OutputFormat::Json => Box::new(JsonWriter::new(sink)),
        OutputFormat::Terminal => Box::new(TableWriter::new(sink)),
    })
}

pub struct JsonWriter<W: Write> {
    writer: W,
}

impl<W: Write> JsonWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for JsonWriter<W> {
    fn write_bundle(&mut self, bundle: &ReportBundle) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, bundle)?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn write_flattened(&mut self, flattened: &FlattenedReport) -> anyhow::Result<()> {
        serde_json::to_writer_pretty(&mut self.writer, flattened)?;
        writeln!(self.writer)?;
        Ok(())
    }
}

pub struct TableWriter<W: Write> {
    writer: W,
}

impl<W: Write> TableWriter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }
}

impl<W: Write> OutputWriter for TableWriter<W> {
    fn write_bundle(&mut self, bundle: &ReportBundle) -> anyhow::Result<()> {
        writeln!(
            self.writer,
            "{} ({})",
            "Report bundle".bold(),
            bundle.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
        )?;
        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec!["Report", "Metrics", "Grouped", "Sketch"]);
        for (report_id, result) in &bundle.reports {
            let grouped = result.metrics.iter().filter(|m| m.group_id.is_some()).count();
            table.add_row(vec![
                Cell::new(report_id),
                Cell::new(result.metrics.len()),
                Cell::new(grouped),
                Cell::new(&result.sketch.id),
            ]);
        }
        writeln!(self.writer, "{table}")?;
        Ok(())
    }

    fn write_flattened(&mut self, flattened: &FlattenedReport) -> anyhow::Result<()> {
        writeln!(self.writer, "{}", flattened.report_id.bold())?;

        let class_ids: BTreeSet<&str> = flattened
            .groups
            .iter()
            .flat_map(|g| g.class_perc.keys().map(String::as_str))
            .collect();

        let mut header = vec!["Group".to_string(), "Sketches".to_string(), "Value".to_string()];
        header.extend(class_ids.iter().map(|c| format!("% {c}")));
        header.push("% Total".to_string());

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(header);
        for group in &flattened.groups {
            let mut row = vec![
                group.group_id.clone(),
                group.num_sketches.to_string(),
                format!("{:.1}", group.value),
            ];
            for class_id in &class_ids {
                row.push(match group.class_perc.get(*class_id) {
                    Some(perc) => format_percent(*perc),
                    None => "-".to_string(),
                });
            }
            row.push(
                group
                    .perc_value
                    .map(format_percent)
                    .unwrap_or_else(|| "-".to_string()),
            );
            table.add_row(row);
        }
        writeln!(self.writer, "{table}")?;

        if !flattened.sketches.is_empty() {
            writeln!(self.writer, "{}", "By sketch".bold())?;
            let mut table = Table::new();
            table.load_preset(UTF8_FULL_CONDENSED);
            table.set_header(vec!["Sketch", "Group", "Value", "% Total"]);
            for row in &flattened.sketches {
                table.add_row(vec![
                    row.sketch_id.clone(),
                    row.group_id.clone(),
                    format!("{:.1}", row.value),
                    row.perc_value
                        .map(format_percent)
                        .unwrap_or_else(|| "-".to_string()),
                ]);
            }
            writeln!(self.writer, "{table}")?;
        }
        Ok(())
    }
}

fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}
