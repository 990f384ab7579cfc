// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Surface samples between mesh vertices

use crate::geometry::IndexedMesh;
use nalgebra::Point3;
use rayon::prelude::*;

/// Points on every triangle, at most `spacing` apart along each edge.
///
/// Corners are left out since they are already in the vertex point set, so a
/// triangle whose edges are all shorter than `spacing` contributes nothing.
pub fn surface_samples(mesh: &IndexedMesh, spacing: f64) -> Vec<Point3<f64>> {
    if !(spacing > 0.0 && spacing.is_finite()) {
        return Vec::new();
    }

    mesh.triangles()
        .par_iter()
        .flat_map_iter(|triangle| {
            let [a, b, c] = mesh.triangle_positions(triangle);
            let (ab, ac) = (b - a, c - a);
            let longest = ab.norm().max(ac.norm()).max((c - b).norm());
            let steps = (longest / spacing).ceil() as usize;
            let n = steps.max(1) as f64;

            (0..=steps)
                .flat_map(move |i| (0..=steps - i).map(move |j| (i, j)))
                .filter(move |&(i, j)| steps >= 2 && !is_corner(i, j, steps))
                .map(move |(i, j)| a + ab * (i as f64 / n) + ac * (j as f64 / n))
        })
        .collect()
}

#[inline]
fn is_corner(i: usize, j: usize, steps: usize) -> bool {
    (i == 0 || i == steps) && (j == 0 || j == steps)
}
