// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Batch measurement runner

use crate::io::{self, MeasurementRecord, MeasurementReport};
use crate::pipeline::MeasurementPipeline;
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Extensions accepted by [`discover_meshes`]
pub const MESH_EXTENSIONS: &[&str] = &["stl"];

/// Runner measuring STL files through one shared pipeline
pub struct Runner {
    pipeline: MeasurementPipeline,
    density: Option<f64>,
    export_dir: Option<PathBuf>,
}

impl Runner {
    pub fn new(pipeline: MeasurementPipeline) -> Self {
        Self {
            pipeline,
            density: None,
            export_dir: None,
        }
    }

    /// Material density in g/cm³ used to report mass
    pub fn with_density(mut self, density: Option<f64>) -> Self {
        self.density = density;
        self
    }

    /// Directory receiving `<name>.repaired.stl` for every repaired mesh
    pub fn with_export_dir(mut self, export_dir: Option<PathBuf>) -> Self {
        self.export_dir = export_dir;
        self
    }

    pub fn pipeline(&self) -> &MeasurementPipeline {
        &self.pipeline
    }

    /// Load and measure a single file
    pub fn measure_file(&self, path: &Path) -> Result<MeasurementRecord> {
        let start = Instant::now();
        let mesh = io::read_stl(path)?;
        let run = self.pipeline.run(&mesh);

        if let (Some(dir), Some(repaired)) = (&self.export_dir, &run.repaired_mesh) {
            let output = repaired_path(dir, path);
            io::write_stl(repaired, &output)
                .with_context(|| format!("Failed to export repaired mesh for {:?}", path))?;
            debug!(output = ?output, "exported repaired mesh");
        }

        Ok(MeasurementRecord {
            file: path.display().to_string(),
            mass_grams: self.density.map(|d| run.measurement.mass_grams(d)),
            measurement: run.measurement,
            initial_topology: run.initial_topology,
            holes: run.holes,
            time_ms: start.elapsed().as_millis(),
        })
    }

    /// Measure every file in parallel, collecting failures into the report
    pub fn measure_all(&self, files: &[PathBuf], show_progress: bool) -> MeasurementReport {
        let progress = if show_progress {
            let pb = ProgressBar::new(files.len() as u64);
            if let Ok(style) = ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
            {
                pb.set_style(style.progress_chars("#>-"));
            }
            Some(pb)
        } else {
            None
        };

        let results: Vec<(PathBuf, Result<MeasurementRecord>)> = files
            .par_iter()
            .map(|path| {
                let result = self.measure_file(path);
                if let Some(ref pb) = progress {
                    pb.inc(1);
                }
                (path.clone(), result)
            })
            .collect();

        if let Some(pb) = progress {
            pb.finish_with_message("Measurement complete");
        }

        let mut report = MeasurementReport::new();
        for (path, result) in results {
            match result {
                Ok(record) => report.add_record(record),
                Err(e) => {
                    warn!(file = %path.display(), error = %e, "measurement failed");
                    report.add_error(path.display().to_string(), format!("{:#}", e));
                }
            }
        }
        report
    }
}

/// Collect mesh files from files and directories, sorted for stable output
pub fn discover_meshes(paths: &[PathBuf]) -> Vec<PathBuf> {
    let mut meshes = Vec::new();

    for path in paths {
        if path.is_file() {
            meshes.push(path.clone());
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(true)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && has_mesh_extension(entry_path) {
                    meshes.push(entry_path.to_path_buf());
                }
            }
        }
    }

    meshes.sort();
    meshes.dedup();
    meshes
}

fn has_mesh_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| MESH_EXTENSIONS.iter().any(|m| ext.eq_ignore_ascii_case(m)))
}

fn repaired_path(dir: &Path, input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "mesh".to_string());
    dir.join(format!("{}.repaired.stl", stem))
}
