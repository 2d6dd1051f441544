use anyhow::{Context, Result};
use clap::Parser;
use reefmap::cli::{Cli, Commands};
use reefmap::config::ProjectConfig;
use reefmap::io::{create_writer, read_bundle, read_report_input};
use reefmap::report::{flatten_report, run_reports};
use std::path::Path;

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Report {
            input,
            config,
            format,
            output,
        } => {
            let config = load_config(&config)?;
            let input = read_report_input(&input).context("reading report input")?;
            let bundle = run_reports(
                &input.sketch,
                &input.overlaps,
                &config,
                input.geography_id.as_deref(),
            )?;
            let mut writer = create_writer(format.into(), output.as_deref())?;
            writer.write_bundle(&bundle)
        }
        Commands::Flatten {
            input,
            report,
            config,
            geography,
            format,
            output,
        } => {
            let config = load_config(&config)?;
            let bundle = read_bundle(&input).context("reading bundle")?;
            let result = bundle.reports.get(&report).with_context(|| {
                format!("bundle has no report {report}; available: {:?}",
                    bundle.reports.keys().collect::<Vec<_>>())
            })?;
            let flattened = flatten_report(&report, result, &config, geography.as_deref())?;
            let mut writer = create_writer(format.into(), output.as_deref())?;
            writer.write_flattened(&flattened)
        }
    }
}

/// Fall back to defaults when the config file is absent; a present but
/// invalid file is still an error
fn load_config(path: &Path) -> Result<ProjectConfig> {
    if path.exists() {
        Ok(ProjectConfig::load(path)?)
    } else {
        log::warn!("config {} not found, using defaults", path.display());
        Ok(ProjectConfig::default())
    }
}
