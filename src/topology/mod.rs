// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Topology analysis: edge adjacency, watertightness, holes, quality score

mod analyzer;
mod edge;
mod holes;

pub use analyzer::{
    analyze, analyze_with_holes, analyze_with_threshold, quality_score, TopologyReport,
    BOUNDARY_EDGE_WEIGHT, DEFAULT_PARALLEL_THRESHOLD, NON_MANIFOLD_EDGE_WEIGHT,
};
pub use edge::{EdgeAdjacency, UndirectedEdge};
pub use holes::{count_components, find_hole_boundaries, HoleBoundary};
