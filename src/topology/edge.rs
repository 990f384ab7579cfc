// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Undirected edge keys and edge-adjacency counting

use crate::geometry::IndexedMesh;
use ahash::AHashMap;
use dashmap::DashMap;
use rayon::prelude::*;

/// Unordered pair of vertex indices. `(a, b)` and `(b, a)` are the same edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UndirectedEdge {
    v0: usize,
    v1: usize,
}

impl UndirectedEdge {
    pub fn new(a: usize, b: usize) -> Self {
        // Smaller index first for order-independent hashing
        if a <= b {
            Self { v0: a, v1: b }
        } else {
            Self { v0: b, v1: a }
        }
    }

    pub fn vertices(&self) -> (usize, usize) {
        (self.v0, self.v1)
    }

    /// Both endpoints are the same vertex
    pub fn is_loop(&self) -> bool {
        self.v0 == self.v1
    }
}

/// How many triangles reference each distinct edge of a mesh.
///
/// Every triangle contributes all three of its edges, so a collapsed triangle
/// such as `[a, a, b]` adds a self-loop `(a, a)` referenced once.
#[derive(Debug, Clone, Default)]
pub struct EdgeAdjacency {
    counts: AHashMap<UndirectedEdge, u32>,
}

impl EdgeAdjacency {
    /// Count edges on the calling thread
    pub fn build(mesh: &IndexedMesh) -> Self {
        let mut counts: AHashMap<UndirectedEdge, u32> =
            AHashMap::with_capacity(mesh.triangle_count() * 3 / 2);

        for triangle in mesh.triangles() {
            for (a, b) in triangle.edges() {
                *counts.entry(UndirectedEdge::new(a, b)).or_insert(0) += 1;
            }
        }

        Self { counts }
    }

    /// Count edges across the rayon pool. Each key is merged through the
    /// concurrent map entry, so the result equals [`EdgeAdjacency::build`].
    pub fn build_parallel(mesh: &IndexedMesh) -> Self {
        let shared: DashMap<UndirectedEdge, u32, ahash::RandomState> =
            DashMap::with_capacity_and_hasher(mesh.triangle_count() * 3 / 2, Default::default());

        mesh.triangles().par_iter().for_each(|triangle| {
            for (a, b) in triangle.edges() {
                *shared.entry(UndirectedEdge::new(a, b)).or_insert(0) += 1;
            }
        });

        Self {
            counts: shared.into_iter().collect(),
        }
    }

    /// Sequential below `parallel_threshold` triangles, parallel at or above it
    pub fn build_with_threshold(mesh: &IndexedMesh, parallel_threshold: usize) -> Self {
        if mesh.triangle_count() >= parallel_threshold {
            Self::build_parallel(mesh)
        } else {
            Self::build(mesh)
        }
    }

    /// Number of distinct edges
    pub fn edge_count(&self) -> usize {
        self.counts.len()
    }

    /// Number of triangles referencing `edge`, zero if absent
    pub fn count(&self, edge: &UndirectedEdge) -> u32 {
        self.counts.get(edge).copied().unwrap_or(0)
    }

    /// Edges referenced by exactly one triangle
    pub fn boundary_edges(&self) -> impl Iterator<Item = UndirectedEdge> + '_ {
        self.counts
            .iter()
            .filter(|(_, &count)| count == 1)
            .map(|(edge, _)| *edge)
    }

    pub fn boundary_edge_count(&self) -> usize {
        self.counts.values().filter(|&&count| count == 1).count()
    }

    /// Edges referenced by more than two triangles
    pub fn non_manifold_edge_count(&self) -> usize {
        self.counts.values().filter(|&&count| count > 2).count()
    }
}
