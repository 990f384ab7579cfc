// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Captured mesh ingest
//!
//! Capture sessions hand over raw GPU-style buffers: packed `f32` positions and
//! one `u32` index buffer per submesh. These are merged into a single
//! [`IndexedMesh`], failing on any out-of-range index.

use crate::error::InputError;
use crate::geometry::{IndexedMesh, Triangle};
use nalgebra::Point3;
use tracing::debug;

/// One submesh with its own vertex buffer
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Submesh {
    /// Packed xyz positions
    pub positions: Vec<f32>,
    /// Packed triangle indices into `positions`
    pub indices: Vec<u32>,
}

impl Submesh {
    pub fn new(positions: Vec<f32>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }
}

/// Build a mesh from a packed position buffer and a packed index buffer
pub fn from_flat_buffers(positions: &[f32], indices: &[u32]) -> Result<IndexedMesh, InputError> {
    merge_index_buffers(positions, std::iter::once(indices))
}

/// Merge several index buffers that all address one shared vertex buffer
pub fn merge_index_buffers<'a, I>(positions: &[f32], index_buffers: I) -> Result<IndexedMesh, InputError>
where
    I: IntoIterator<Item = &'a [u32]>,
{
    let vertices = unpack_positions(positions)?;
    let mut triangles = Vec::new();
    let mut buffer_count = 0;
    for indices in index_buffers {
        append_triangles(&mut triangles, indices, 0)?;
        buffer_count += 1;
    }
    debug!(
        vertices = vertices.len(),
        triangles = triangles.len(),
        index_buffers = buffer_count,
        "merged shared-vertex submeshes"
    );
    IndexedMesh::new(vertices, triangles)
}

/// Merge submeshes that each carry their own vertex buffer.
///
/// Vertices are concatenated without deduplication, so seams between
/// submeshes show up as boundary edges.
pub fn merge_submeshes(submeshes: &[Submesh]) -> Result<IndexedMesh, InputError> {
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();
    let mut first_bad_index = None;

    for submesh in submeshes {
        let local = unpack_positions(&submesh.positions)?;
        let offset = vertices.len();
        let start = triangles.len();
        append_triangles(&mut triangles, &submesh.indices, offset)?;

        if first_bad_index.is_none() {
            first_bad_index = triangles[start..]
                .iter()
                .enumerate()
                .find_map(|(i, t)| {
                    t.indices
                        .iter()
                        .find(|&&index| index >= offset + local.len())
                        .map(|&index| (start + i, index))
                });
        }
        vertices.extend(local);
    }

    // An index spilling into the next submesh's vertices is still out of range
    if let Some((triangle, index)) = first_bad_index {
        return Err(InputError::IndexOutOfRange {
            triangle,
            index,
            vertex_count: vertices.len(),
        });
    }

    debug!(
        submeshes = submeshes.len(),
        vertices = vertices.len(),
        triangles = triangles.len(),
        "merged submeshes"
    );
    IndexedMesh::new(vertices, triangles)
}

fn unpack_positions(positions: &[f32]) -> Result<Vec<Point3<f64>>, InputError> {
    if positions.len() % 3 != 0 {
        return Err(InputError::MalformedBuffer {
            buffer: "position",
            len: positions.len(),
        });
    }
    Ok(positions
        .chunks_exact(3)
        .map(|p| Point3::new(p[0] as f64, p[1] as f64, p[2] as f64))
        .collect())
}

fn append_triangles(
    triangles: &mut Vec<Triangle>,
    indices: &[u32],
    offset: usize,
) -> Result<(), InputError> {
    if indices.len() % 3 != 0 {
        return Err(InputError::MalformedBuffer {
            buffer: "index",
            len: indices.len(),
        });
    }
    triangles.extend(indices.chunks_exact(3).map(|t| {
        Triangle::new([
            t[0] as usize + offset,
            t[1] as usize + offset,
            t[2] as usize + offset,
        ])
    }));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topology::analyze;

    const TETRA_POSITIONS: [f32; 12] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0, //
        0.0, 0.0, 1.0,
    ];

    #[test]
    fn test_flat_buffers() {
        let mesh = from_flat_buffers(&TETRA_POSITIONS, &[0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]).unwrap();
        assert_eq!(mesh.vertex_count(), 4);
        assert!(analyze(&mesh).is_watertight);
    }

    #[test]
    fn test_split_index_buffers_merge_into_closed_mesh() {
        let first: &[u32] = &[0, 2, 1, 0, 1, 3];
        let second: &[u32] = &[0, 3, 2, 1, 2, 3];
        let mesh = merge_index_buffers(&TETRA_POSITIONS, [first, second]).unwrap();
        assert_eq!(mesh.triangle_count(), 4);
        assert!(analyze(&mesh).is_watertight);
    }

    #[test]
    fn test_malformed_buffers() {
        assert_eq!(
            from_flat_buffers(&[0.0, 1.0], &[]).unwrap_err(),
            InputError::MalformedBuffer {
                buffer: "position",
                len: 2
            }
        );
        assert_eq!(
            from_flat_buffers(&TETRA_POSITIONS, &[0, 1]).unwrap_err(),
            InputError::MalformedBuffer {
                buffer: "index",
                len: 2
            }
        );
    }

    #[test]
    fn test_out_of_range_index_fails_fast() {
        let err = from_flat_buffers(&TETRA_POSITIONS, &[0, 1, 4]).unwrap_err();
        assert_eq!(
            err,
            InputError::IndexOutOfRange {
                triangle: 0,
                index: 4,
                vertex_count: 4
            }
        );
    }

    #[test]
    fn test_submeshes_are_offset() {
        let a = Submesh::new(TETRA_POSITIONS.to_vec(), vec![0, 2, 1, 0, 1, 3, 0, 3, 2, 1, 2, 3]);
        let b = a.clone();
        let mesh = merge_submeshes(&[a, b]).unwrap();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangles()[4].indices, [4, 6, 5]);
        let report = analyze(&mesh);
        assert!(report.is_watertight);
        assert_eq!(report.component_count, 2);
    }

    #[test]
    fn test_submesh_index_cannot_reach_into_neighbour() {
        let a = Submesh::new(TETRA_POSITIONS.to_vec(), vec![0, 1, 5]);
        let b = Submesh::new(TETRA_POSITIONS.to_vec(), vec![0, 1, 2]);
        assert!(matches!(
            merge_submeshes(&[a, b]),
            Err(InputError::IndexOutOfRange {
                triangle: 0,
                index: 5,
                ..
            })
        ));
    }
}
