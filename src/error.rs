// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Error types for mesh ingest and voxel repair

use serde::Serialize;
use thiserror::Error;

/// Malformed input mesh. Always fatal to the call; indices are never clamped.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum InputError {
    /// A triangle references a vertex that does not exist
    #[error("triangle {triangle} references vertex {index}, but the mesh has only {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: usize,
        vertex_count: usize,
    },

    /// A flat buffer whose length is not a multiple of three
    #[error("{buffer} buffer has length {len}, which is not a multiple of 3")]
    MalformedBuffer { buffer: &'static str, len: usize },

    /// A vertex with a NaN or infinite coordinate
    #[error("vertex {index} has a non-finite coordinate")]
    NonFiniteVertex { index: usize },
}

/// Failure of a single voxel repair attempt.
///
/// The pipeline recovers from both variants by integrating the unrepaired mesh
/// with a confidence penalty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RepairError {
    #[error("cannot voxelize an empty point set")]
    EmptyPointSet,

    #[error("point set bounding box has zero extent on at least one axis")]
    DegenerateBoundingBox,

    #[error("invalid repair configuration: {0}")]
    InvalidConfiguration(&'static str),

    #[error("voxel grid would exceed {} cells", crate::repair::MAX_GRID_CELLS)]
    GridTooLarge,
}
