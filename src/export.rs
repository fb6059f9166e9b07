use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};

use orbit_czml::document::write_atomically;
use orbit_czml::scenario::load_scenario;

#[derive(Args, Debug, Clone)]
pub struct ExportArgs {
    /// Scenario JSON file (optionally .gz)
    pub scenario: PathBuf,
    /// Output document path; a `.gz` suffix compresses it
    #[arg(long, default_value = "out/scene.czml")]
    pub output: PathBuf,
    /// Write without indentation
    #[arg(long, default_value_t = false)]
    pub compact: bool,
    /// Document name, overriding the scenario's
    #[arg(long)]
    pub name: Option<String>,
}

pub fn run_export(args: ExportArgs) -> Result<()> {
    let mut scenario = load_scenario(&args.scenario)?;
    if let Some(name) = args.name {
        scenario.name = name;
    }
    if scenario.satellites.is_empty() && scenario.ground_stations.is_empty() {
        log::warn!("Scenario {:?} has no satellites or ground stations", scenario.name);
    }

    let document = scenario
        .build_document()
        .with_context(|| format!("Failed to build scene from {:?}", args.scenario))?
        .pretty(!args.compact);
    let total = document.len();
    log::info!("Serializing {} entities", total);

    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::with_template(
            "{elapsed_precise} {bar:40.cyan/blue} {pos}/{len} {percent}% ETA {eta_precise}",
        )
        .map_err(|e| anyhow!("invalid progress template: {}", e))?
        .progress_chars("##-"),
    );

    let bytes = document.render_with(|_, _| progress.inc(1));
    progress.finish_and_clear();
    let bytes = bytes.context("Failed to render document")?;

    write_atomically(&args.output, &bytes)
        .with_context(|| format!("Failed to write {:?}", args.output))?;
    log::info!("Wrote {} bytes to {:?}", bytes.len(), args.output);
    Ok(())
}
