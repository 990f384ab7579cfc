// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshvol CLI

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use meshvol::cli::{discover_meshes, Reporter, Runner};
use meshvol::{io, topology, MeasurementPipeline, PipelineConfig, RepairConfiguration};
use std::path::PathBuf;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "meshvol")]
#[command(about = "Mesh topology diagnosis, watertight repair and volume measurement", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file (defaults to ./meshvol.toml when present)
    #[arg(short, long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Repair preset: small, medium or high
    #[arg(short, long, global = true)]
    preset: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Measure the volume of STL files or directories of them
    Measure {
        /// Input files or directories
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Material density in g/cm³ for mass output
        #[arg(short, long)]
        density: Option<f64>,

        /// Write a JSON report to this file
        #[arg(long, value_name = "FILE")]
        json: Option<PathBuf>,

        /// Write a Markdown report to this file
        #[arg(long, value_name = "FILE")]
        markdown: Option<PathBuf>,

        /// Export repaired meshes into this directory
        #[arg(long, value_name = "DIR")]
        export_repaired: Option<PathBuf>,
    },

    /// Diagnose mesh topology without repairing
    Analyze {
        /// Input STL file
        input: PathBuf,
    },

    /// Repair a mesh into a closed voxel surface
    Repair {
        /// Input STL file
        input: PathBuf,

        /// Output STL file
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Write the effective configuration as TOML
    Config {
        /// Output file
        #[arg(short, long, default_value = "meshvol.toml")]
        output: PathBuf,
    },

    /// Show version information
    Version,
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "meshvol=debug" } else { "meshvol=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr).compact())
        .with(filter)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;

    match cli.command {
        Commands::Measure {
            paths,
            density,
            json,
            markdown,
            export_repaired,
        } => measure_command(config, &paths, density, json, markdown, export_repaired, cli.verbose),
        Commands::Analyze { input } => analyze_command(&config, &input),
        Commands::Repair { input, output } => repair_command(config, &input, &output),
        Commands::Config { output } => {
            config.save(&output)?;
            Reporter::success(&format!("Configuration written to {}", output.display()));
            Ok(())
        }
        Commands::Version => {
            println!("meshvol v{}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<PipelineConfig> {
    let mut config = match &cli.config {
        Some(path) => {
            let mut config = PipelineConfig::from_file(path)?;
            config.apply_env_overrides(|key| std::env::var(key).ok())?;
            config
        }
        None => PipelineConfig::load()?,
    };

    if let Some(name) = &cli.preset {
        let preset = RepairConfiguration::from_preset_name(name)
            .with_context(|| format!("Unknown preset '{}' (expected small, medium or high)", name))?;
        config.repair = Some(preset);
    }

    config.validate()?;
    Ok(config)
}

fn measure_command(
    config: PipelineConfig,
    paths: &[PathBuf],
    density: Option<f64>,
    json: Option<PathBuf>,
    markdown: Option<PathBuf>,
    export_repaired: Option<PathBuf>,
    verbose: bool,
) -> Result<()> {
    if let Some(density) = density {
        if !(density.is_finite() && density > 0.0) {
            bail!("Density must be a positive number, got {}", density);
        }
    }

    let files = discover_meshes(paths);
    if files.is_empty() {
        bail!("No STL files found");
    }

    if let Some(dir) = &export_repaired {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create export directory: {:?}", dir))?;
    }

    let runner = Runner::new(MeasurementPipeline::new(config))
        .with_density(density)
        .with_export_dir(export_repaired);
    let report = runner.measure_all(&files, files.len() > 1);

    for record in &report.records {
        Reporter::report_measurement(record);
    }
    for error in &report.error_details {
        Reporter::report_warning(&format!("{}: {}", error.file, error.error));
    }
    if files.len() > 1 || verbose {
        Reporter::report_summary(&report);
    }

    if let Some(path) = json {
        report.write_json(&path)?;
        Reporter::success(&format!("JSON report written to {}", path.display()));
    }
    if let Some(path) = markdown {
        report.write_markdown(&path)?;
        Reporter::success(&format!("Markdown report written to {}", path.display()));
    }

    if report.records.is_empty() {
        bail!("Every file failed to measure");
    }
    Ok(())
}

fn analyze_command(config: &PipelineConfig, input: &PathBuf) -> Result<()> {
    let mesh = io::read_stl(input)?;
    let (report, holes) = topology::analyze_with_holes(&mesh, config.parallel_threshold);
    Reporter::report_topology(&input.display().to_string(), &report, &holes);
    Ok(())
}

fn repair_command(config: PipelineConfig, input: &PathBuf, output: &PathBuf) -> Result<()> {
    let mesh = io::read_stl(input)?;
    let pipeline = MeasurementPipeline::new(config);
    let repaired = meshvol::pipeline::repair_for_export(&pipeline, &mesh)
        .with_context(|| format!("Failed to repair {:?}", input))?;

    let report = topology::analyze(&repaired);
    if !report.is_watertight {
        Reporter::report_warning("Repaired mesh still has boundary edges");
    }
    io::write_stl(&repaired, output)?;
    Reporter::success(&format!(
        "Wrote {} triangles to {}",
        repaired.triangle_count(),
        output.display()
    ));
    Ok(())
}
