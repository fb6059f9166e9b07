//! orbit-czml - scene document writer
//!
//! Reads a scenario of propagated satellites, ground stations and derived
//! displays and writes a time-tagged CZML document for a 3D globe viewer.

mod export;

use anyhow::Result;
use clap::Parser;

use export::{run_export, ExportArgs};

#[derive(Parser, Debug)]
#[command(name = "orbit-czml", version, about = "Write a CZML scene from an orbit scenario")]
struct Cli {
    #[command(flatten)]
    export: ExportArgs,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    log::info!("Starting orbit-czml...");
    run_export(cli.export)
}
