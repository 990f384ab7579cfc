// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boundary surface extraction from a solid voxel set

use super::grid::{VoxelGrid, FACE_DIRECTIONS};
use crate::geometry::{IndexedMesh, Triangle};
use ahash::AHashMap;
use nalgebra::Point3;

/// Emit one outward-wound quad (two triangles) for every face between a solid
/// cell and a non-solid or out-of-grid neighbour.
///
/// Corners are shared through the lattice, so each surface edge is used by an
/// even number of triangles and the result has no boundary edges.
pub fn extract_surface(grid: &VoxelGrid, threshold: f32) -> IndexedMesh {
    let mut corners: AHashMap<[usize; 3], usize> = AHashMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    let mut vertex_at = |corner: [usize; 3], vertices: &mut Vec<Point3<f64>>| -> usize {
        *corners.entry(corner).or_insert_with(|| {
            vertices.push(grid.corner_position(corner));
            vertices.len() - 1
        })
    };

    for index in 0..grid.cell_count() {
        if grid.cells()[index] < threshold {
            continue;
        }
        let cell = grid.coords(index);

        for &(axis, positive) in &FACE_DIRECTIONS {
            let exposed = grid
                .neighbor(cell, axis, positive)
                .map(|n| !grid.is_solid(n, threshold))
                .unwrap_or(true);
            if !exposed {
                continue;
            }

            let u = (axis + 1) % 3;
            let v = (axis + 2) % 3;
            let corner = |du: usize, dv: usize| {
                let mut c = cell;
                if positive {
                    c[axis] += 1;
                }
                c[u] += du;
                c[v] += dv;
                c
            };

            let p0 = vertex_at(corner(0, 0), &mut vertices);
            let p1 = vertex_at(corner(1, 0), &mut vertices);
            let p2 = vertex_at(corner(1, 1), &mut vertices);
            let p3 = vertex_at(corner(0, 1), &mut vertices);

            // e_u x e_v = e_axis, so (p0, p1, p2) faces +axis
            if positive {
                triangles.push(Triangle::new([p0, p1, p2]));
                triangles.push(Triangle::new([p0, p2, p3]));
            } else {
                triangles.push(Triangle::new([p0, p2, p1]));
                triangles.push(Triangle::new([p0, p3, p2]));
            }
        }
    }

    IndexedMesh::from_parts_unchecked(vertices, triangles)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::RepairConfiguration;
    use crate::topology::analyze;
    use crate::volume::signed_volume;
    use approx::assert_relative_eq;

    fn grid_with(points: &[Point3<f64>]) -> VoxelGrid {
        let config = RepairConfiguration::default()
            .with_resolution(4)
            .with_padding(1);
        let mut grid = VoxelGrid::enclosing(points, &config).unwrap();
        grid.rasterize(points);
        grid
    }

    #[test]
    fn test_isolated_voxels_are_closed_cubes() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let grid = grid_with(&points);
        assert_eq!(grid.solid_count(0.5), 2);

        let mesh = extract_surface(&grid, 0.5);
        // Two isolated voxels: 2 cubes x 6 faces x 2 triangles
        assert_eq!(mesh.triangle_count(), 24);
        assert_eq!(mesh.vertex_count(), 16);

        let report = analyze(&mesh);
        assert!(report.is_watertight);
        assert_eq!(report.component_count, 2);
        assert_eq!(report.euler_characteristic, 4);
        assert_relative_eq!(signed_volume(&mesh), 2.0 * 0.25f64.powi(3), epsilon = 1e-12);
    }

    #[test]
    fn test_edge_touching_voxels_stay_closed() {
        // Two cells sharing only an edge produce a non-manifold edge, never a boundary one
        let points = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(0.3, 0.3, 0.0),
            Point3::new(1.0, 1.0, 1.0),
        ];
        let grid = grid_with(&points);
        let mesh = extract_surface(&grid, 0.5);
        let report = analyze(&mesh);
        assert!(report.is_watertight);
        assert_eq!(report.boundary_edge_count, 0);
        assert_eq!(report.non_manifold_edge_count, 1);
    }

    #[test]
    fn test_empty_grid_extracts_nothing() {
        let points = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)];
        let config = RepairConfiguration::default().with_resolution(4);
        let grid = VoxelGrid::enclosing(&points, &config).unwrap();
        assert!(extract_surface(&grid, 0.5).is_empty());
    }
}
