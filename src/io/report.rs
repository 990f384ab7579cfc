// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Measurement reports (JSON and Markdown)

use crate::pipeline::{RepairOutcome, VolumeMeasurement};
use crate::topology::{HoleBoundary, TopologyReport};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// One measured file
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementRecord {
    pub file: String,
    pub measurement: VolumeMeasurement,
    /// Topology of the captured mesh, before repair
    pub initial_topology: TopologyReport,
    /// Boundary loops of the captured mesh
    pub holes: Vec<HoleBoundary>,
    /// Present when a material density was supplied
    pub mass_grams: Option<f64>,
    pub time_ms: u128,
}

/// A file that could not be measured
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementError {
    pub file: String,
    pub error: String,
}

/// Batch measurement report
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementReport {
    pub timestamp: String,
    pub version: String,
    pub total_files: usize,
    pub watertight: usize,
    pub repaired: usize,
    pub degraded: usize,
    pub errors: usize,
    pub total_volume_cm3: f64,
    pub mean_confidence: f64,
    pub records: Vec<MeasurementRecord>,
    pub error_details: Vec<MeasurementError>,
}

impl MeasurementReport {
    pub fn new() -> Self {
        Self {
            timestamp: Utc::now().format("%Y-%m-%d %H:%M:%S UTC").to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            total_files: 0,
            watertight: 0,
            repaired: 0,
            degraded: 0,
            errors: 0,
            total_volume_cm3: 0.0,
            mean_confidence: 0.0,
            records: Vec::new(),
            error_details: Vec::new(),
        }
    }

    pub fn add_record(&mut self, record: MeasurementRecord) {
        match record.measurement.outcome {
            RepairOutcome::NotNeeded => self.watertight += 1,
            RepairOutcome::Repaired => self.repaired += 1,
            RepairOutcome::Degraded | RepairOutcome::Failed(_) => self.degraded += 1,
        }

        self.total_files += 1;
        self.total_volume_cm3 += record.measurement.volume_cm3;
        self.records.push(record);

        let total_confidence: f64 = self.records.iter().map(|r| r.measurement.confidence).sum();
        self.mean_confidence = total_confidence / self.records.len() as f64;
    }

    pub fn add_error(&mut self, file: String, error: String) {
        self.total_files += 1;
        self.errors += 1;
        self.error_details.push(MeasurementError { file, error });
    }

    /// Percentage of measured files that needed no repair
    pub fn watertight_rate(&self) -> f64 {
        if self.records.is_empty() {
            0.0
        } else {
            self.watertight as f64 / self.records.len() as f64 * 100.0
        }
    }

    /// Write JSON report
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self).context("Failed to serialize report")?;
        fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))?;
        Ok(())
    }

    /// Write Markdown report
    pub fn write_markdown(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_markdown())
            .with_context(|| format!("Failed to write report: {:?}", path))?;
        Ok(())
    }

    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        md.push_str(&format!("# Volume Measurement Report ({})\n\n", self.timestamp));

        md.push_str("## Summary\n\n");
        md.push_str(&format!("- **Files**: {}\n", self.total_files));
        md.push_str(&format!(
            "- **Watertight**: {} ({:.1}%)\n",
            self.watertight,
            self.watertight_rate()
        ));
        md.push_str(&format!("- **Repaired**: {}\n", self.repaired));
        md.push_str(&format!("- **Degraded**: {}\n", self.degraded));
        md.push_str(&format!("- **Errors**: {}\n", self.errors));
        md.push_str(&format!("- **Total Volume**: {:.2} cm³\n", self.total_volume_cm3));
        md.push_str(&format!(
            "- **Mean Confidence**: {:.1}%\n\n",
            self.mean_confidence * 100.0
        ));

        md.push_str("## Measurements\n\n");
        md.push_str("| File | Volume (cm³) | Confidence | Boundary Edges | Holes | Repair | Mass (g) |\n");
        md.push_str("|------|--------------|------------|----------------|-------|--------|----------|\n");

        for record in &self.records {
            let name = Path::new(&record.file)
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| record.file.clone());
            let repair = match record.measurement.outcome {
                RepairOutcome::NotNeeded => "-",
                RepairOutcome::Repaired => "✅",
                RepairOutcome::Degraded => "⚠️ open",
                RepairOutcome::Failed(_) => "❌",
            };
            let mass = record
                .mass_grams
                .map(|m| format!("{:.1}", m))
                .unwrap_or_else(|| "N/A".to_string());

            md.push_str(&format!(
                "| {} | {:.2} | {:.1}% | {} | {} | {} | {} |\n",
                name,
                record.measurement.volume_cm3,
                record.measurement.confidence * 100.0,
                record.initial_topology.boundary_edge_count,
                record.initial_topology.estimated_hole_count,
                repair,
                mass
            ));
        }

        if self.errors > 0 {
            md.push_str("\n## Errors\n\n");
            for error in &self.error_details {
                md.push_str(&format!("- ⚠️ **{}**\n", error.file));
                md.push_str(&format!("  ```\n  {}\n  ```\n", error.error));
            }
        }

        md
    }
}

impl Default for MeasurementReport {
    fn default() -> Self {
        Self::new()
    }
}
