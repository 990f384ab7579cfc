// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Hole boundaries and connected components

use super::edge::{EdgeAdjacency, UndirectedEdge};
use crate::geometry::IndexedMesh;
use ahash::AHashMap;
use nalgebra::Point3;
use serde::{Deserialize, Serialize};

/// Union-find over a dense index range
#[derive(Debug, Clone)]
pub(crate) struct DisjointSet {
    parent: Vec<usize>,
    rank: Vec<u8>,
}

impl DisjointSet {
    pub(crate) fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            rank: vec![0; len],
        }
    }

    pub(crate) fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    pub(crate) fn union(&mut self, a: usize, b: usize) {
        let (ra, rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        match self.rank[ra].cmp(&self.rank[rb]) {
            std::cmp::Ordering::Less => self.parent[ra] = rb,
            std::cmp::Ordering::Greater => self.parent[rb] = ra,
            std::cmp::Ordering::Equal => {
                self.parent[rb] = ra;
                self.rank[ra] += 1;
            }
        }
    }
}

/// One hole: a connected group of boundary edges
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HoleBoundary {
    /// Boundary vertices, ascending
    pub vertices: Vec<usize>,
    pub edge_count: usize,
    /// Mean position of the boundary vertices
    pub center: Point3<f64>,
}

/// Group edges into components where edges sharing a vertex belong together.
/// Returns each component's vertex list (ascending) and edge count, ordered by
/// smallest vertex index.
pub(crate) fn edge_components(
    edges: impl IntoIterator<Item = UndirectedEdge>,
) -> Vec<(Vec<usize>, usize)> {
    let edges: Vec<UndirectedEdge> = edges.into_iter().collect();
    if edges.is_empty() {
        return Vec::new();
    }

    // Compact vertex ids so the union-find stays proportional to the boundary
    let mut slots: AHashMap<usize, usize> = AHashMap::new();
    let mut ids: Vec<usize> = Vec::new();
    let mut slot_of = |v: usize| {
        *slots.entry(v).or_insert_with(|| {
            ids.push(v);
            ids.len() - 1
        })
    };
    let pairs: Vec<(usize, usize)> = edges
        .iter()
        .map(|e| {
            let (a, b) = e.vertices();
            (slot_of(a), slot_of(b))
        })
        .collect();

    let mut set = DisjointSet::new(ids.len());
    for &(a, b) in &pairs {
        set.union(a, b);
    }

    let mut groups: AHashMap<usize, (Vec<usize>, usize)> = AHashMap::new();
    for (slot, &vertex) in ids.iter().enumerate() {
        let root = set.find(slot);
        groups.entry(root).or_default().0.push(vertex);
    }
    for &(a, _) in &pairs {
        let root = set.find(a);
        if let Some(group) = groups.get_mut(&root) {
            group.1 += 1;
        }
    }

    let mut components: Vec<(Vec<usize>, usize)> = groups
        .into_values()
        .map(|(mut vertices, edge_count)| {
            vertices.sort_unstable();
            (vertices, edge_count)
        })
        .collect();
    components.sort_by_key(|(vertices, _)| vertices[0]);
    components
}

/// Find every hole in the mesh as a connected component of its boundary edges
pub fn find_hole_boundaries(mesh: &IndexedMesh) -> Vec<HoleBoundary> {
    let adjacency = EdgeAdjacency::build(mesh);
    hole_boundaries_from(mesh, &adjacency)
}

pub(crate) fn hole_boundaries_from(
    mesh: &IndexedMesh,
    adjacency: &EdgeAdjacency,
) -> Vec<HoleBoundary> {
    edge_components(adjacency.boundary_edges())
        .into_iter()
        .map(|(vertices, edge_count)| {
            let sum = vertices
                .iter()
                .fold(nalgebra::Vector3::zeros(), |acc, &v| acc + mesh.vertices()[v].coords);
            let center = Point3::from(sum / vertices.len() as f64);
            HoleBoundary {
                vertices,
                edge_count,
                center,
            }
        })
        .collect()
}

/// Number of connected pieces of the triangle graph. Orphan vertices are ignored.
pub fn count_components(mesh: &IndexedMesh) -> usize {
    if mesh.is_empty() {
        return 0;
    }

    let mut set = DisjointSet::new(mesh.vertex_count());
    let mut used = vec![false; mesh.vertex_count()];
    for triangle in mesh.triangles() {
        let [a, b, c] = triangle.indices;
        set.union(a, b);
        set.union(b, c);
        used[a] = true;
        used[b] = true;
        used[c] = true;
    }

    (0..mesh.vertex_count())
        .filter(|&v| used[v] && set.find(v) == v)
        .count()
}
