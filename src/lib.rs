// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! meshvol
//!
//! Volume measurement for captured triangle meshes. Diagnoses whether a mesh
//! is a closed surface, repairs open meshes into watertight voxel surfaces,
//! and integrates the enclosed volume together with a confidence score.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod pipeline;
pub mod repair;
pub mod topology;
pub mod volume;

pub use config::PipelineConfig;
pub use error::{InputError, RepairError};
pub use geometry::{BoundingBox, IndexedMesh, Primitive, Triangle};
pub use pipeline::{MeasurementPipeline, PipelineStage, RepairOutcome, VolumeMeasurement};
pub use repair::{repair, RepairConfiguration};
pub use topology::{analyze, TopologyReport};
pub use volume::{compute_volume, ConfidenceModel};

use anyhow::Result;
use std::path::Path;

/// Measure a mesh with the default pipeline configuration
pub fn measure(mesh: &IndexedMesh) -> VolumeMeasurement {
    pipeline::measure(mesh)
}

/// Load an STL file and measure it
pub fn measure_file(path: impl AsRef<Path>) -> Result<VolumeMeasurement> {
    let mesh = io::read_stl(path)?;
    Ok(measure(&mesh))
}
