// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Voxel repair engine
//!
//! Turns an arbitrary, possibly open, mesh into a closed voxel surface:
//! the vertex positions, plus samples across each triangle when enabled, are
//! rasterized into an occupancy grid, small gaps are closed by a single
//! dilation pass, enclosed cavities are filled, and the boundary faces of the
//! solid cells are emitted as quads.

mod config;
mod extract;
mod grid;
mod sample;
mod smooth;

pub use config::{
    RepairConfiguration, DEFAULT_SATURATION_COUNT, MAX_RESOLUTION, MEDIUM_OBJECT_EXTENT,
    SMALL_OBJECT_EXTENT,
};
pub use extract::extract_surface;
pub use grid::{VoxelGrid, DEGENERATE_EXTENT, MAX_GRID_CELLS};
pub use sample::surface_samples;
pub use smooth::{smooth_bounded, MAX_SMOOTHING_DISPLACEMENT};

use crate::error::RepairError;
use crate::geometry::IndexedMesh;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Counters collected during one repair run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairStats {
    pub dims: [usize; 3],
    pub voxel_size: f64,
    pub input_points: usize,
    /// Points added between vertices by surface sampling
    pub sampled_points: usize,
    pub dropped_points: usize,
    pub occupied_cells: usize,
    pub dilated_cells: usize,
    pub interior_cells: usize,
    pub solid_cells: usize,
}

/// Repair `mesh` into a closed voxel surface
pub fn repair(mesh: &IndexedMesh, config: &RepairConfiguration) -> Result<IndexedMesh, RepairError> {
    repair_detailed(mesh, config).map(|(repaired, _)| repaired)
}

/// Same as [`repair`], also returning the grid counters
pub fn repair_detailed(
    mesh: &IndexedMesh,
    config: &RepairConfiguration,
) -> Result<(IndexedMesh, RepairStats), RepairError> {
    config.validate()?;

    let _span = tracing::info_span!(
        "repair",
        resolution = config.resolution,
        threshold = config.occupancy_threshold
    )
    .entered();

    let mut points = point_set(mesh);
    let threshold = config.occupancy_threshold;

    let mut grid = VoxelGrid::enclosing(&points, config)?;
    debug!(dims = ?grid.dims(), voxel_size = grid.voxel_size(), "voxel grid allocated");

    let input_points = points.len();
    if config.surface_sampling {
        // Samples stay inside the vertex bounding box, so the grid still fits
        points.extend(surface_samples(mesh, 0.5 * grid.voxel_size()));
    }
    let sampled_points = points.len() - input_points;

    let dropped_points = grid.rasterize(&points);
    let occupied_cells = grid.solid_count(threshold);
    let dilated_cells = grid.dilate(threshold);
    let interior_cells = if config.fill_interior {
        grid.fill_interior(threshold)
    } else {
        0
    };
    let solid_cells = grid.solid_count(threshold);
    debug!(
        sampled_points,
        dropped_points,
        occupied_cells, dilated_cells, interior_cells, solid_cells, "occupancy resolved"
    );

    let mut repaired = extract_surface(&grid, threshold);
    if config.smoothing_enabled {
        repaired = smooth_bounded(&repaired, MAX_SMOOTHING_DISPLACEMENT * grid.voxel_size());
    }

    info!(
        vertices = repaired.vertex_count(),
        triangles = repaired.triangle_count(),
        "repair produced voxel surface"
    );

    let stats = RepairStats {
        dims: grid.dims(),
        voxel_size: grid.voxel_size(),
        input_points,
        sampled_points,
        dropped_points,
        occupied_cells,
        dilated_cells,
        interior_cells,
        solid_cells,
    };
    Ok((repaired, stats))
}

/// Positions of the vertices referenced by at least one triangle
fn point_set(mesh: &IndexedMesh) -> Vec<Point3<f64>> {
    let mut used = vec![false; mesh.vertex_count()];
    for triangle in mesh.triangles() {
        for &index in &triangle.indices {
            used[index] = true;
        }
    }
    mesh.vertices()
        .iter()
        .zip(used)
        .filter_map(|(point, used)| used.then_some(*point))
        .collect()
}
