// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL import and export

use crate::geometry::IndexedMesh;
use anyhow::{Context, Result};
use nalgebra::{Point3, Vector3};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;
use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};
use tracing::debug;

/// Load a binary or ASCII STL file.
///
/// Coincident corners are shared by the reader, so the result carries real
/// connectivity for topology analysis.
pub fn read_stl(path: impl AsRef<Path>) -> Result<IndexedMesh> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("Failed to open STL file: {:?}", path))?;
    let mut reader = BufReader::new(file);

    let stl = stl_io::read_stl(&mut reader)
        .with_context(|| format!("Failed to read STL file: {:?}", path))?;

    let vertices = stl
        .vertices
        .iter()
        .map(|v| Point3::new(v[0] as f64, v[1] as f64, v[2] as f64))
        .collect();
    let triangles = stl.faces.iter().map(|face| face.vertices);

    let mesh = IndexedMesh::from_indices(vertices, triangles)
        .with_context(|| format!("Invalid mesh in STL file: {:?}", path))?;
    debug!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "loaded STL"
    );
    Ok(mesh)
}

/// Write `mesh` as binary STL with per-facet normals
pub fn write_stl(mesh: &IndexedMesh, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();

    let triangles: Vec<StlTriangle> = mesh
        .triangles()
        .iter()
        .map(|triangle| {
            let [a, b, c] = mesh.triangle_positions(triangle);
            let normal = (b - a)
                .cross(&(c - a))
                .try_normalize(f64::EPSILON)
                .unwrap_or_else(Vector3::zeros);

            StlTriangle {
                normal: Normal::new([normal.x as f32, normal.y as f32, normal.z as f32]),
                vertices: [
                    StlVertex::new([a.x as f32, a.y as f32, a.z as f32]),
                    StlVertex::new([b.x as f32, b.y as f32, b.z as f32]),
                    StlVertex::new([c.x as f32, c.y as f32, c.z as f32]),
                ],
            }
        })
        .collect();

    let file = File::create(path).with_context(|| format!("Failed to create STL file: {:?}", path))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("Failed to write STL file")?;

    debug!(triangles = triangles.len(), path = ?path, "wrote STL");
    Ok(())
}
