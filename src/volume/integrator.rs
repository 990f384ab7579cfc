// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Signed tetrahedron-sum volume integration

use crate::geometry::{IndexedMesh, Triangle};
use nalgebra::Point3;
use rayon::prelude::*;

/// Mesh units are meters; reported volumes are cubic centimeters
pub const CUBIC_METERS_TO_CUBIC_CENTIMETERS: f64 = 1e6;

/// Triangle count above which the sum runs on the rayon pool
const PARALLEL_TRIANGLE_COUNT: usize = 100_000;

/// Signed volume in m³ of the tetrahedra joining `apex` to every triangle.
///
/// For a closed, consistently wound mesh the result does not depend on `apex`.
pub fn signed_volume_about(mesh: &IndexedMesh, apex: Point3<f64>) -> f64 {
    let tetrahedron = |triangle: &Triangle| {
        let [a, b, c] = mesh.triangle_positions(triangle);
        let (a, b, c) = (a - apex, b - apex, c - apex);
        a.dot(&b.cross(&c)) / 6.0
    };

    if mesh.triangle_count() >= PARALLEL_TRIANGLE_COUNT {
        mesh.triangles().par_iter().map(tetrahedron).sum()
    } else {
        mesh.triangles().iter().map(tetrahedron).sum()
    }
}

/// Signed volume in m³ with the origin as apex. Positive for outward winding.
pub fn signed_volume(mesh: &IndexedMesh) -> f64 {
    signed_volume_about(mesh, Point3::origin())
}

/// Enclosed volume in cm³.
///
/// Assumes the mesh is closed and consistently wound; an open mesh gives an
/// apex-dependent number. Never fails: an empty mesh integrates to zero.
pub fn compute_volume(mesh: &IndexedMesh) -> f64 {
    signed_volume(mesh).abs() * CUBIC_METERS_TO_CUBIC_CENTIMETERS
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    #[test]
    fn test_unit_cube_volume() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
        assert_eq!(cube.triangle_count(), 12);
        assert_relative_eq!(compute_volume(&cube), 1_000_000.0, epsilon = 1e-6);
    }

    #[test]
    fn test_apex_independence() {
        let cube = Primitive::cube(Vector3::new(0.2, 0.3, 0.4), true).to_mesh();
        for apex in [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, -4.0, 2.5),
            Point3::new(-100.0, 50.0, 75.0),
        ] {
            assert_relative_eq!(signed_volume_about(&cube, apex), 0.024, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_winding_sets_sign() {
        let tetra = Primitive::tetrahedron(1.0).to_mesh();
        assert_relative_eq!(signed_volume(&tetra), 1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(signed_volume(&tetra.flipped()), -1.0 / 6.0, epsilon = 1e-12);
        assert_relative_eq!(compute_volume(&tetra.flipped()), 1e6 / 6.0, epsilon = 1e-6);
    }

    #[test]
    fn test_empty_mesh_has_zero_volume() {
        assert_eq!(compute_volume(&IndexedMesh::empty()), 0.0);
    }
}
