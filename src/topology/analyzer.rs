// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Mesh topology diagnosis

use super::edge::{EdgeAdjacency, UndirectedEdge};
use super::holes::{count_components, edge_components, hole_boundaries_from, HoleBoundary};
use crate::geometry::IndexedMesh;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Penalty per boundary edge, relative to vertex count
pub const BOUNDARY_EDGE_WEIGHT: f64 = 10.0;

/// Penalty per non-manifold edge, relative to edge count
pub const NON_MANIFOLD_EDGE_WEIGHT: f64 = 5.0;

/// Triangle count at which edge counting switches to the rayon pool
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 50_000;

/// Topology diagnosis of a single mesh. Always recomputed from scratch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopologyReport {
    /// No boundary edges. Non-manifold edges do not fail this test.
    pub is_watertight: bool,
    pub boundary_edge_count: usize,
    pub non_manifold_edge_count: usize,
    /// V - E + F over referenced vertices and distinct edges
    pub euler_characteristic: i64,
    /// Connected components of the boundary-edge graph
    pub estimated_hole_count: usize,
    /// 1.0 for watertight meshes, 0.0 for empty ones
    pub quality_score: f64,
    pub vertex_count: usize,
    pub edge_count: usize,
    pub triangle_count: usize,
    /// Connected pieces of the triangle graph
    pub component_count: usize,
}

impl TopologyReport {
    /// Report for a mesh without triangles
    pub fn empty(vertex_count: usize) -> Self {
        Self {
            is_watertight: false,
            boundary_edge_count: 0,
            non_manifold_edge_count: 0,
            euler_characteristic: 0,
            estimated_hole_count: 0,
            quality_score: 0.0,
            vertex_count,
            edge_count: 0,
            triangle_count: 0,
            component_count: 0,
        }
    }

    /// Every edge is shared by exactly two triangles
    pub fn is_manifold(&self) -> bool {
        self.non_manifold_edge_count == 0
    }
}

impl fmt::Display for TopologyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "watertight={} boundary_edges={} non_manifold_edges={} euler={} holes={} quality={:.3} \
             (V={} E={} F={} components={})",
            self.is_watertight,
            self.boundary_edge_count,
            self.non_manifold_edge_count,
            self.euler_characteristic,
            self.estimated_hole_count,
            self.quality_score,
            self.vertex_count,
            self.edge_count,
            self.triangle_count,
            self.component_count,
        )
    }
}

/// Analyze mesh topology. Never fails; an empty mesh yields [`TopologyReport::empty`].
pub fn analyze(mesh: &IndexedMesh) -> TopologyReport {
    analyze_with_threshold(mesh, DEFAULT_PARALLEL_THRESHOLD)
}

/// Same as [`analyze`], counting edges in parallel at or above `parallel_threshold` triangles
pub fn analyze_with_threshold(mesh: &IndexedMesh, parallel_threshold: usize) -> TopologyReport {
    let _span = tracing::debug_span!(
        "analyze",
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count()
    )
    .entered();

    if mesh.is_empty() {
        debug!("mesh has no triangles");
        return TopologyReport::empty(mesh.vertex_count());
    }

    let adjacency = EdgeAdjacency::build_with_threshold(mesh, parallel_threshold);
    let report = report_from_adjacency(mesh, &adjacency);
    debug!(%report, "topology analyzed");
    report
}

/// Same as [`analyze_with_threshold`], also returning the hole boundaries
/// from the same edge-adjacency pass
pub fn analyze_with_holes(
    mesh: &IndexedMesh,
    parallel_threshold: usize,
) -> (TopologyReport, Vec<HoleBoundary>) {
    if mesh.is_empty() {
        return (TopologyReport::empty(mesh.vertex_count()), Vec::new());
    }

    let adjacency = EdgeAdjacency::build_with_threshold(mesh, parallel_threshold);
    let report = report_from_adjacency(mesh, &adjacency);
    let holes = hole_boundaries_from(mesh, &adjacency);
    debug!(%report, holes = holes.len(), "topology analyzed");
    (report, holes)
}

fn report_from_adjacency(mesh: &IndexedMesh, adjacency: &EdgeAdjacency) -> TopologyReport {
    let vertex_count = mesh.vertex_count();
    let triangle_count = mesh.triangle_count();
    let edge_count = adjacency.edge_count();
    let boundary_edge_count = adjacency.boundary_edge_count();
    let non_manifold_edge_count = adjacency.non_manifold_edge_count();

    let euler_characteristic =
        mesh.referenced_vertex_count() as i64 - edge_count as i64 + triangle_count as i64;

    let boundary: Vec<UndirectedEdge> = adjacency.boundary_edges().collect();
    let estimated_hole_count = edge_components(boundary).len();

    let is_watertight = boundary_edge_count == 0;
    let quality_score = quality_score(
        is_watertight,
        boundary_edge_count,
        non_manifold_edge_count,
        vertex_count,
        edge_count,
    );

    TopologyReport {
        is_watertight,
        boundary_edge_count,
        non_manifold_edge_count,
        euler_characteristic,
        estimated_hole_count,
        quality_score,
        vertex_count,
        edge_count,
        triangle_count,
        component_count: count_components(mesh),
    }
}

/// `1 - 10·boundary/V - 5·non_manifold/E`, clamped to [0, 1]; 1.0 when watertight
pub fn quality_score(
    is_watertight: bool,
    boundary_edge_count: usize,
    non_manifold_edge_count: usize,
    vertex_count: usize,
    edge_count: usize,
) -> f64 {
    if is_watertight {
        return 1.0;
    }
    if vertex_count == 0 || edge_count == 0 {
        return 0.0;
    }

    let boundary_penalty = BOUNDARY_EDGE_WEIGHT * boundary_edge_count as f64 / vertex_count as f64;
    let non_manifold_penalty =
        NON_MANIFOLD_EDGE_WEIGHT * non_manifold_edge_count as f64 / edge_count as f64;

    (1.0 - boundary_penalty - non_manifold_penalty).clamp(0.0, 1.0)
}
