// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Bounded Laplacian smoothing of the extracted surface

use crate::geometry::IndexedMesh;
use nalgebra::{Point3, Vector3};
use rayon::prelude::*;

/// Fraction of a voxel a vertex may move during smoothing
pub const MAX_SMOOTHING_DISPLACEMENT: f64 = 0.25;

/// Move each vertex toward the average of its neighbours, at most
/// `max_displacement` away from where it started.
///
/// One pass over a snapshot of the positions; connectivity is untouched, so
/// the boundary-edge count of the input is preserved.
pub fn smooth_bounded(mesh: &IndexedMesh, max_displacement: f64) -> IndexedMesh {
    let neighbors = mesh.vertex_neighbors();
    let positions = mesh.vertices();

    let smoothed: Vec<Point3<f64>> = positions
        .par_iter()
        .zip(neighbors.par_iter())
        .map(|(position, adjacent)| {
            if adjacent.is_empty() {
                return *position;
            }
            let sum = adjacent
                .iter()
                .fold(Vector3::zeros(), |acc, &n| acc + positions[n].coords);
            let target = Point3::from(sum / adjacent.len() as f64);
            let mut offset = target - position;
            let length = offset.norm();
            if length > max_displacement {
                offset *= max_displacement / length;
            }
            position + offset
        })
        .collect();

    IndexedMesh::from_parts_unchecked(smoothed, mesh.triangles().to_vec())
}
