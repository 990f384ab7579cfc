// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Measurement pipeline: analyze, repair when open, re-analyze, integrate
//!
//! ```text
//! Ingested -> Analyzed -> Integrated                          (watertight)
//! Ingested -> Analyzed -> Repairing -> ReAnalyzed -> Integrated  (open)
//! ```
//!
//! There is no retry loop. A repair that leaves boundary edges is reported as
//! [`RepairOutcome::Degraded`]; a repair that fails outright falls back to the
//! captured mesh with a confidence penalty.

mod measurement;

pub use measurement::{PipelineStage, RepairOutcome, VolumeMeasurement};

use crate::config::PipelineConfig;
use crate::error::RepairError;
use crate::geometry::IndexedMesh;
use crate::repair::{self, RepairConfiguration};
use crate::topology::{self, HoleBoundary, TopologyReport};
use crate::volume::compute_volume;
use tracing::{debug, info, warn};

/// Runs single-mesh measurements. Holds only configuration, so one instance
/// can measure many meshes concurrently.
#[derive(Debug, Clone, Default)]
pub struct MeasurementPipeline {
    config: PipelineConfig,
}

/// Full result of one run, including the repaired mesh when there is one
#[derive(Debug, Clone)]
pub struct PipelineRun {
    pub measurement: VolumeMeasurement,
    /// Topology of the captured mesh, before any repair
    pub initial_topology: TopologyReport,
    /// Boundary loops of the captured mesh
    pub holes: Vec<HoleBoundary>,
    /// The mesh that was integrated when it differs from the input
    pub repaired_mesh: Option<IndexedMesh>,
    /// Stages visited, in order
    pub stages: Vec<PipelineStage>,
}

impl MeasurementPipeline {
    pub fn new(config: PipelineConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Repair settings for `mesh`: the configured ones, else a size-based preset
    pub fn repair_configuration_for(&self, mesh: &IndexedMesh) -> RepairConfiguration {
        self.config.repair.unwrap_or_else(|| {
            let extent = mesh.bounding_box().max_extent();
            RepairConfiguration::for_extent(if extent.is_finite() { extent } else { 0.0 })
        })
    }

    /// Measure the enclosed volume of `mesh`. Always yields a measurement.
    pub fn measure(&self, mesh: &IndexedMesh) -> VolumeMeasurement {
        self.run(mesh).measurement
    }

    /// Same as [`MeasurementPipeline::measure`], keeping intermediate results
    pub fn run(&self, mesh: &IndexedMesh) -> PipelineRun {
        let _span = tracing::info_span!(
            "measure",
            vertices = mesh.vertex_count(),
            triangles = mesh.triangle_count()
        )
        .entered();

        let mut stages = vec![PipelineStage::Ingested];
        let confidence = &self.config.confidence;
        let (vertex_count, triangle_count) = (mesh.vertex_count(), mesh.triangle_count());

        let (initial, holes) = topology::analyze_with_holes(mesh, self.config.parallel_threshold);
        stages.push(PipelineStage::Analyzed);

        if initial.is_watertight {
            debug!("mesh is watertight, integrating directly");
            let volume_cm3 = compute_volume(mesh);
            stages.push(PipelineStage::Integrated);
            let measurement = VolumeMeasurement {
                volume_cm3,
                confidence: confidence.score(vertex_count, triangle_count, initial.quality_score),
                topology: initial.clone(),
                repair_applied: false,
                outcome: RepairOutcome::NotNeeded,
            };
            return PipelineRun {
                measurement,
                initial_topology: initial,
                holes,
                repaired_mesh: None,
                stages,
            };
        }

        info!(
            boundary_edges = initial.boundary_edge_count,
            holes = initial.estimated_hole_count,
            quality = initial.quality_score,
            "mesh is open, repairing"
        );
        stages.push(PipelineStage::Repairing);
        let repair_config = self.repair_configuration_for(mesh);

        match repair::repair(mesh, &repair_config) {
            Ok(repaired) => {
                let report =
                    topology::analyze_with_threshold(&repaired, self.config.parallel_threshold);
                stages.push(PipelineStage::ReAnalyzed);

                let outcome = if report.is_watertight {
                    RepairOutcome::Repaired
                } else {
                    warn!(
                        boundary_edges = report.boundary_edge_count,
                        quality = report.quality_score,
                        "repaired mesh is still open, integrating with degraded confidence"
                    );
                    RepairOutcome::Degraded
                };

                let volume_cm3 = compute_volume(&repaired);
                stages.push(PipelineStage::Integrated);
                let measurement = VolumeMeasurement {
                    volume_cm3,
                    confidence: confidence.score(vertex_count, triangle_count, report.quality_score),
                    topology: report,
                    repair_applied: true,
                    outcome,
                };
                PipelineRun {
                    measurement,
                    initial_topology: initial,
                    holes,
                    repaired_mesh: Some(repaired),
                    stages,
                }
            }
            Err(error) => {
                warn!(%error, "repair failed, integrating the captured mesh");
                let volume_cm3 = compute_volume(mesh);
                stages.push(PipelineStage::Integrated);
                let measurement = VolumeMeasurement {
                    volume_cm3,
                    confidence: confidence.fallback_score(
                        vertex_count,
                        triangle_count,
                        initial.quality_score,
                    ),
                    topology: initial.clone(),
                    repair_applied: false,
                    outcome: RepairOutcome::Failed(error),
                };
                PipelineRun {
                    measurement,
                    initial_topology: initial,
                    holes,
                    repaired_mesh: None,
                    stages,
                }
            }
        }
    }
}

/// Measure `mesh` with the default configuration
pub fn measure(mesh: &IndexedMesh) -> VolumeMeasurement {
    MeasurementPipeline::default().measure(mesh)
}

/// Repair without measuring, for callers that only need the closed surface
pub fn repair_for_export(
    pipeline: &MeasurementPipeline,
    mesh: &IndexedMesh,
) -> Result<IndexedMesh, RepairError> {
    repair::repair(mesh, &pipeline.repair_configuration_for(mesh))
}
