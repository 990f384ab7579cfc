// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Measurement results

use crate::error::RepairError;
use crate::topology::TopologyReport;
use serde::Serialize;
use std::fmt;

/// States a single measurement passes through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Ingested,
    Analyzed,
    Repairing,
    ReAnalyzed,
    Integrated,
}

/// What happened to the repair step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "error", rename_all = "snake_case")]
pub enum RepairOutcome {
    /// The captured mesh was already watertight
    NotNeeded,
    /// Repair produced a watertight mesh
    Repaired,
    /// Repair ran but boundary edges remain
    Degraded,
    /// Repair failed; the captured mesh was integrated instead
    Failed(RepairError),
}

impl RepairOutcome {
    /// The result carries less confidence than its topology alone suggests
    pub fn is_degraded(&self) -> bool {
        matches!(self, Self::Degraded | Self::Failed(_))
    }
}

/// Volume estimate handed to downstream consumers
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeMeasurement {
    pub volume_cm3: f64,
    /// In [0, 1]; callers threshold against it
    pub confidence: f64,
    /// Topology of the mesh that was integrated
    pub topology: TopologyReport,
    /// True whenever a repaired mesh was integrated, watertight or not
    pub repair_applied: bool,
    pub outcome: RepairOutcome,
}

impl VolumeMeasurement {
    /// Mass in grams for a material density in g/cm³
    pub fn mass_grams(&self, density_g_per_cm3: f64) -> f64 {
        self.volume_cm3 * density_g_per_cm3
    }

    pub fn volume_liters(&self) -> f64 {
        self.volume_cm3 / 1000.0
    }
}

impl fmt::Display for VolumeMeasurement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:.2} cm³ (confidence {:.1}%, repair {})",
            self.volume_cm3,
            self.confidence * 100.0,
            match self.outcome {
                RepairOutcome::NotNeeded => "not needed".to_string(),
                RepairOutcome::Repaired => "applied".to_string(),
                RepairOutcome::Degraded => "applied, still open".to_string(),
                RepairOutcome::Failed(error) => format!("failed: {}", error),
            }
        )
    }
}
