// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Occupancy voxel grid

use super::RepairConfiguration;
use crate::error::RepairError;
use crate::geometry::BoundingBox;
use nalgebra::Point3;
use rayon::prelude::*;
use std::collections::VecDeque;

/// Side lengths at or below this are treated as zero
pub const DEGENERATE_EXTENT: f64 = 1e-12;

/// Upper bound on cells in one grid
pub const MAX_GRID_CELLS: usize = 1 << 28;

/// Face-adjacent neighbour offsets: -X, +X, -Y, +Y, -Z, +Z
pub const FACE_DIRECTIONS: [(usize, bool); 6] = [
    (0, false),
    (0, true),
    (1, false),
    (1, true),
    (2, false),
    (2, true),
];

/// Cuboid lattice of scalar occupancy cells with cubic voxels.
///
/// Dimensions and origin are fixed at construction. Cells are mutated by
/// rasterization, then dilation and interior fill, and never resized.
#[derive(Debug, Clone)]
pub struct VoxelGrid {
    dims: [usize; 3],
    origin: Point3<f64>,
    voxel_size: f64,
    padding: usize,
    saturation: u32,
    cells: Vec<f32>,
}

impl VoxelGrid {
    /// Size a grid around the padded bounding box of `points`
    pub fn enclosing(
        points: &[Point3<f64>],
        config: &RepairConfiguration,
    ) -> Result<Self, RepairError> {
        if points.is_empty() {
            return Err(RepairError::EmptyPointSet);
        }

        let bbox = BoundingBox::from_points(points);
        if bbox.is_degenerate(DEGENERATE_EXTENT) {
            return Err(RepairError::DegenerateBoundingBox);
        }

        let voxel_size = bbox.max_extent() / config.resolution as f64;
        let padding = config.padding_voxels as usize;
        let size = bbox.size();

        // +1 keeps points lying exactly on the max face inside the grid
        let dims = [0, 1, 2].map(|axis| (size[axis] / voxel_size).floor() as usize + 1 + 2 * padding);
        let cell_count = dims
            .iter()
            .try_fold(1usize, |acc, &d| acc.checked_mul(d))
            .filter(|&count| count <= MAX_GRID_CELLS)
            .ok_or(RepairError::GridTooLarge)?;
        let origin = bbox.padded(padding as f64 * voxel_size).min;

        Ok(Self {
            dims,
            origin,
            voxel_size,
            padding,
            saturation: config.saturation_count,
            cells: vec![0.0; cell_count],
        })
    }

    pub fn dims(&self) -> [usize; 3] {
        self.dims
    }

    pub fn origin(&self) -> Point3<f64> {
        self.origin
    }

    pub fn voxel_size(&self) -> f64 {
        self.voxel_size
    }

    pub fn padding(&self) -> usize {
        self.padding
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn cells(&self) -> &[f32] {
        &self.cells
    }

    #[inline]
    pub fn index(&self, cell: [usize; 3]) -> usize {
        cell[0] + self.dims[0] * (cell[1] + self.dims[1] * cell[2])
    }

    #[inline]
    pub fn coords(&self, index: usize) -> [usize; 3] {
        let x = index % self.dims[0];
        let rest = index / self.dims[0];
        [x, rest % self.dims[1], rest / self.dims[1]]
    }

    pub fn occupancy(&self, cell: [usize; 3]) -> f32 {
        self.cells[self.index(cell)]
    }

    /// Grid cell containing `point`, or `None` outside the lattice
    pub fn cell_of(&self, point: &Point3<f64>) -> Option<[usize; 3]> {
        let local = (point - self.origin) / self.voxel_size;
        let mut cell = [0usize; 3];
        for axis in 0..3 {
            let f = local[axis].floor();
            if !(f >= 0.0 && f < self.dims[axis] as f64) {
                return None;
            }
            cell[axis] = f as usize;
        }
        Some(cell)
    }

    /// Neighbour across one face, `None` past the grid edge
    #[inline]
    pub fn neighbor(&self, cell: [usize; 3], axis: usize, positive: bool) -> Option<[usize; 3]> {
        let mut next = cell;
        if positive {
            if cell[axis] + 1 >= self.dims[axis] {
                return None;
            }
            next[axis] += 1;
        } else {
            if cell[axis] == 0 {
                return None;
            }
            next[axis] -= 1;
        }
        Some(next)
    }

    /// World-space position of a lattice corner
    pub fn corner_position(&self, corner: [usize; 3]) -> Point3<f64> {
        Point3::new(
            self.origin.x + corner[0] as f64 * self.voxel_size,
            self.origin.y + corner[1] as f64 * self.voxel_size,
            self.origin.z + corner[2] as f64 * self.voxel_size,
        )
    }

    /// Count points per cell, then scale by the busiest cell into [0, 1].
    ///
    /// With a non-zero saturation count, counts are capped there first, so
    /// any cell holding that many points reads as fully occupied. Points
    /// outside the lattice are skipped; returns how many were.
    pub fn rasterize(&mut self, points: &[Point3<f64>]) -> usize {
        let hits: Vec<Option<usize>> = points
            .par_iter()
            .map(|p| self.cell_of(p).map(|cell| self.index(cell)))
            .collect();

        let mut counts = vec![0u32; self.cells.len()];
        let mut dropped = 0;
        for hit in hits {
            match hit {
                Some(index) => counts[index] += 1,
                None => dropped += 1,
            }
        }

        let cap = match self.saturation {
            0 => u32::MAX,
            n => n,
        };
        let max = counts.iter().copied().max().unwrap_or(0).min(cap);
        if max > 0 {
            let scale = 1.0 / max as f32;
            self.cells
                .par_iter_mut()
                .zip(counts.par_iter())
                .for_each(|(cell, &count)| *cell = count.min(cap) as f32 * scale);
        }

        dropped
    }

    /// One morphological dilation pass.
    ///
    /// Every cell below `threshold` with a face neighbour above it is raised to
    /// `threshold`. Reads only the pre-pass snapshot and is never iterated.
    /// Returns the number of cells raised.
    pub fn dilate(&mut self, threshold: f32) -> usize {
        let snapshot = &self.cells;
        let next: Vec<f32> = (0..snapshot.len())
            .into_par_iter()
            .map(|index| {
                let value = snapshot[index];
                if value >= threshold {
                    return value;
                }
                let cell = self.coords(index);
                let touches_solid = FACE_DIRECTIONS.iter().any(|&(axis, positive)| {
                    self.neighbor(cell, axis, positive)
                        .map(|n| snapshot[self.index(n)] > threshold)
                        .unwrap_or(false)
                });
                if touches_solid {
                    threshold
                } else {
                    value
                }
            })
            .collect();

        let raised = next
            .iter()
            .zip(self.cells.iter())
            .filter(|(after, before)| after != before)
            .count();
        self.cells = next;
        raised
    }

    /// Mark non-solid cells that cannot reach the grid border through other
    /// non-solid cells as solid. Returns the number of cells filled.
    pub fn fill_interior(&mut self, threshold: f32) -> usize {
        let mut outside = vec![false; self.cells.len()];
        let mut queue = VecDeque::new();

        for index in 0..self.cells.len() {
            let cell = self.coords(index);
            let on_border = (0..3).any(|axis| cell[axis] == 0 || cell[axis] + 1 == self.dims[axis]);
            if on_border && self.cells[index] < threshold {
                outside[index] = true;
                queue.push_back(cell);
            }
        }

        while let Some(cell) = queue.pop_front() {
            for &(axis, positive) in &FACE_DIRECTIONS {
                if let Some(next) = self.neighbor(cell, axis, positive) {
                    let index = self.index(next);
                    if !outside[index] && self.cells[index] < threshold {
                        outside[index] = true;
                        queue.push_back(next);
                    }
                }
            }
        }

        let mut filled = 0;
        for (value, &reached) in self.cells.iter_mut().zip(outside.iter()) {
            if !reached && *value < threshold {
                *value = threshold;
                filled += 1;
            }
        }
        filled
    }

    pub fn is_solid(&self, cell: [usize; 3], threshold: f32) -> bool {
        self.occupancy(cell) >= threshold
    }

    pub fn solid_count(&self, threshold: f32) -> usize {
        self.cells.iter().filter(|&&v| v >= threshold).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repair::MAX_RESOLUTION;

    fn unit_points() -> Vec<Point3<f64>> {
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)]
    }

    #[test]
    fn test_grid_dimensions() {
        let config = RepairConfiguration::default()
            .with_resolution(4)
            .with_padding(1);
        let grid = VoxelGrid::enclosing(&unit_points(), &config).unwrap();
        assert_eq!(grid.dims(), [7, 7, 7]);
        assert_eq!(grid.voxel_size(), 0.25);
        assert_eq!(grid.origin(), Point3::new(-0.25, -0.25, -0.25));
    }

    #[test]
    fn test_empty_and_degenerate_inputs() {
        let config = RepairConfiguration::default();
        assert_eq!(
            VoxelGrid::enclosing(&[], &config).unwrap_err(),
            RepairError::EmptyPointSet
        );
        let coincident = vec![Point3::new(1.0, 1.0, 1.0); 5];
        assert_eq!(
            VoxelGrid::enclosing(&coincident, &config).unwrap_err(),
            RepairError::DegenerateBoundingBox
        );
    }

    #[test]
    fn test_out_of_grid_points_are_dropped() {
        let config = RepairConfiguration::default().with_resolution(4);
        let mut grid = VoxelGrid::enclosing(&unit_points(), &config).unwrap();
        let mut points = unit_points();
        points.push(Point3::new(50.0, 0.0, 0.0));
        points.push(Point3::new(-50.0, 0.0, 0.0));
        assert_eq!(grid.rasterize(&points), 2);
        assert_eq!(grid.solid_count(0.5), 2);
    }

    #[test]
    fn test_rasterize_normalizes_by_busiest_cell() {
        let config = RepairConfiguration::default()
            .with_resolution(4)
            .with_padding(0)
            .with_saturation(0);
        let mut points = unit_points();
        points.extend(std::iter::repeat(Point3::new(0.01, 0.01, 0.01)).take(3));
        let mut grid = VoxelGrid::enclosing(&points, &config).unwrap();
        grid.rasterize(&points);
        assert_eq!(grid.occupancy([0, 0, 0]), 1.0);
        assert_eq!(grid.occupancy([4, 4, 4]), 0.25);
    }

    #[test]
    fn test_saturation_caps_busy_cells() {
        let mut points = unit_points();
        points.extend(std::iter::repeat(Point3::new(0.01, 0.01, 0.01)).take(7));
        let base = RepairConfiguration::default().with_resolution(4).with_padding(0);

        let mut grid = VoxelGrid::enclosing(&points, &base.with_saturation(2)).unwrap();
        grid.rasterize(&points);
        assert_eq!(grid.occupancy([0, 0, 0]), 1.0);
        assert_eq!(grid.occupancy([4, 4, 4]), 0.5);

        let mut grid = VoxelGrid::enclosing(&points, &base.with_saturation(1)).unwrap();
        grid.rasterize(&points);
        assert_eq!(grid.occupancy([4, 4, 4]), 1.0);
    }

    #[test]
    fn test_oversized_grid_is_rejected() {
        let config = RepairConfiguration::default()
            .with_resolution(MAX_RESOLUTION)
            .with_padding(MAX_RESOLUTION);
        assert_eq!(
            VoxelGrid::enclosing(&unit_points(), &config).unwrap_err(),
            RepairError::GridTooLarge
        );

        let huge_padding = RepairConfiguration::default()
            .with_resolution(8)
            .with_padding(u32::MAX);
        assert_eq!(
            VoxelGrid::enclosing(&unit_points(), &huge_padding).unwrap_err(),
            RepairError::GridTooLarge
        );
    }

    #[test]
    fn test_dilation_is_single_pass() {
        let config = RepairConfiguration::default().with_resolution(8).with_padding(0);
        let points = unit_points();
        let mut grid = VoxelGrid::enclosing(&points, &config).unwrap();
        grid.rasterize(&points);

        let raised = grid.dilate(0.3);
        // Each occupied corner cell gains its three in-grid face neighbours
        assert_eq!(raised, 6);
        assert_eq!(grid.occupancy([1, 0, 0]), 0.3);
        // Second-ring cells stay empty: the pass saw only the snapshot
        assert_eq!(grid.occupancy([2, 0, 0]), 0.0);
        assert_eq!(grid.solid_count(0.3), 8);
    }

    #[test]
    fn test_fill_interior_of_closed_shell() {
        let config = RepairConfiguration::default().with_resolution(4).with_padding(1);
        let mut points = Vec::new();
        // Hollow 3x3x3 shell of sample points around cell (3, 3, 3)
        for x in 0..3 {
            for y in 0..3 {
                for z in 0..3 {
                    if (x, y, z) != (1, 1, 1) {
                        points.push(Point3::new(
                            0.125 + 0.25 * (x + 1) as f64,
                            0.125 + 0.25 * (y + 1) as f64,
                            0.125 + 0.25 * (z + 1) as f64,
                        ));
                    }
                }
            }
        }
        points.push(Point3::new(0.0, 0.0, 0.0));
        points.push(Point3::new(1.0, 1.0, 1.0));

        let mut grid = VoxelGrid::enclosing(&points, &config).unwrap();
        grid.rasterize(&points);
        let center = grid.cell_of(&Point3::new(0.5 + 0.125, 0.5 + 0.125, 0.5 + 0.125)).unwrap();
        assert!(!grid.is_solid(center, 0.5));

        assert_eq!(grid.fill_interior(0.5), 1);
        assert!(grid.is_solid(center, 0.5));
    }
}
