// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed triangle mesh representation

use super::BoundingBox;
use crate::error::InputError;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }

    /// True when two or more corners share an index
    pub fn is_degenerate(&self) -> bool {
        let [a, b, c] = self.indices;
        a == b || b == c || a == c
    }

    /// The three directed edges (a,b), (b,c), (c,a)
    pub fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }
}

/// Immutable indexed triangle mesh.
///
/// Every triangle index is guaranteed to be in bounds. Duplicate positions and
/// degenerate triangles are allowed. Positions are in meters.
///
/// Deserialization goes through [`IndexedMesh::new`], so serialized meshes
/// with bad indices are rejected the same way.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIndexedMesh")]
pub struct IndexedMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
}

/// Unvalidated wire form of [`IndexedMesh`]
#[derive(Deserialize)]
struct RawIndexedMesh {
    vertices: Vec<Point3<f64>>,
    triangles: Vec<Triangle>,
}

impl TryFrom<RawIndexedMesh> for IndexedMesh {
    type Error = InputError;

    fn try_from(raw: RawIndexedMesh) -> Result<Self, Self::Error> {
        Self::new(raw.vertices, raw.triangles)
    }
}

impl IndexedMesh {
    /// Build a mesh, failing on any out-of-range index or non-finite coordinate
    pub fn new(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Result<Self, InputError> {
        if let Some(index) = vertices
            .iter()
            .position(|p| !(p.x.is_finite() && p.y.is_finite() && p.z.is_finite()))
        {
            return Err(InputError::NonFiniteVertex { index });
        }

        let vertex_count = vertices.len();
        for (t, triangle) in triangles.iter().enumerate() {
            if let Some(&index) = triangle.indices.iter().find(|&&i| i >= vertex_count) {
                return Err(InputError::IndexOutOfRange {
                    triangle: t,
                    index,
                    vertex_count,
                });
            }
        }

        Ok(Self {
            vertices,
            triangles,
        })
    }

    /// Build from index triples
    pub fn from_indices(
        vertices: Vec<Point3<f64>>,
        indices: impl IntoIterator<Item = [usize; 3]>,
    ) -> Result<Self, InputError> {
        let triangles = indices.into_iter().map(Triangle::new).collect();
        Self::new(vertices, triangles)
    }

    /// Construct without validation. Callers must guarantee in-bounds indices.
    pub(crate) fn from_parts_unchecked(vertices: Vec<Point3<f64>>, triangles: Vec<Triangle>) -> Self {
        debug_assert!(triangles
            .iter()
            .all(|t| t.indices.iter().all(|&i| i < vertices.len())));
        Self {
            vertices,
            triangles,
        }
    }

    pub fn empty() -> Self {
        Self {
            vertices: Vec::new(),
            triangles: Vec::new(),
        }
    }

    pub fn vertices(&self) -> &[Point3<f64>] {
        &self.vertices
    }

    pub fn triangles(&self) -> &[Triangle] {
        &self.triangles
    }

    /// Get vertex count
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get triangle count
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of a triangle
    pub fn triangle_positions(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        let [a, b, c] = triangle.indices;
        [self.vertices[a], self.vertices[b], self.vertices[c]]
    }

    /// Compute bounding box
    pub fn bounding_box(&self) -> BoundingBox {
        BoundingBox::from_points(&self.vertices)
    }

    /// Number of distinct vertices referenced by at least one triangle
    pub fn referenced_vertex_count(&self) -> usize {
        let mut used = vec![false; self.vertices.len()];
        for triangle in &self.triangles {
            for &i in &triangle.indices {
                used[i] = true;
            }
        }
        used.into_iter().filter(|&u| u).count()
    }

    /// Per-vertex neighbour lists derived from triangle connectivity
    pub fn vertex_neighbors(&self) -> Vec<Vec<usize>> {
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); self.vertices.len()];
        for triangle in &self.triangles {
            for (a, b) in triangle.edges() {
                if a == b {
                    continue;
                }
                if !neighbors[a].contains(&b) {
                    neighbors[a].push(b);
                }
                if !neighbors[b].contains(&a) {
                    neighbors[b].push(a);
                }
            }
        }
        neighbors
    }

    /// Copy of this mesh with a single triangle removed
    pub fn without_triangle(&self, index: usize) -> Self {
        let mut triangles = self.triangles.clone();
        if index < triangles.len() {
            triangles.remove(index);
        }
        Self {
            vertices: self.vertices.clone(),
            triangles,
        }
    }

    /// Copy of this mesh with every triangle's winding reversed
    pub fn flipped(&self) -> Self {
        Self {
            vertices: self.vertices.clone(),
            triangles: self
                .triangles
                .iter()
                .map(|t| Triangle::new([t.indices[0], t.indices[2], t.indices[1]]))
                .collect(),
        }
    }

    /// Concatenate another mesh, offsetting its indices
    pub fn merged(&self, other: &IndexedMesh) -> Self {
        let offset = self.vertices.len();
        let mut vertices = self.vertices.clone();
        vertices.extend_from_slice(&other.vertices);

        let mut triangles = self.triangles.clone();
        triangles.extend(other.triangles.iter().map(|t| {
            Triangle::new([
                t.indices[0] + offset,
                t.indices[1] + offset,
                t.indices[2] + offset,
            ])
        }));

        Self {
            vertices,
            triangles,
        }
    }

    /// Apply a rigid translation to every vertex
    pub fn translated(&self, offset: nalgebra::Vector3<f64>) -> Self {
        Self {
            vertices: self.vertices.iter().map(|p| p + offset).collect(),
            triangles: self.triangles.clone(),
        }
    }
}

impl Default for IndexedMesh {
    fn default() -> Self {
        Self::empty()
    }
}
