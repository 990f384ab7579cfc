// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Closed, outward-wound primitive meshes with shared vertices

use super::{IndexedMesh, Triangle};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};
use std::f64::consts::PI;

/// Geometric primitives
#[derive(Debug, Clone, Copy)]
pub enum Primitive {
    Tetrahedron { size: f64 },
    Cube { size: Vector3<f64>, center: bool },
    SubdividedCube { size: Vector3<f64>, segments: u32 },
    Icosphere { radius: f64, subdivisions: u32 },
    Cylinder { h: f64, r: f64, segments: u32 },
}

impl Primitive {
    /// Right-angle tetrahedron with legs of length `size` along each axis
    pub fn tetrahedron(size: f64) -> Self {
        Self::Tetrahedron { size }
    }

    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    /// Cube with each face split into `segments × segments` quads, anchored at the origin
    pub fn subdivided_cube(size: Vector3<f64>, segments: u32) -> Self {
        Self::SubdividedCube {
            size,
            segments: segments.max(1),
        }
    }

    pub fn icosphere(radius: f64, subdivisions: u32) -> Self {
        Self::Icosphere {
            radius,
            subdivisions,
        }
    }

    pub fn cylinder(h: f64, r: f64, segments: u32) -> Self {
        let segments = if segments >= 3 { segments } else { 32 };
        Self::Cylinder { h, r, segments }
    }

    pub fn to_mesh(&self) -> IndexedMesh {
        match *self {
            Self::Tetrahedron { size } => generate_tetrahedron_mesh(size),
            Self::Cube { size, center } => generate_cube_mesh(size, center),
            Self::SubdividedCube { size, segments } => generate_subdivided_cube_mesh(size, segments),
            Self::Icosphere {
                radius,
                subdivisions,
            } => generate_icosphere_mesh(radius, subdivisions),
            Self::Cylinder { h, r, segments } => generate_cylinder_mesh(h, r, segments),
        }
    }
}

fn generate_tetrahedron_mesh(size: f64) -> IndexedMesh {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(size, 0.0, 0.0),
        Point3::new(0.0, size, 0.0),
        Point3::new(0.0, 0.0, size),
    ];
    let triangles = [[0, 2, 1], [0, 1, 3], [0, 3, 2], [1, 2, 3]]
        .into_iter()
        .map(Triangle::new)
        .collect();
    IndexedMesh::from_parts_unchecked(vertices, triangles)
}

fn generate_cube_mesh(size: Vector3<f64>, center: bool) -> IndexedMesh {
    let min = if center {
        Point3::from(-size / 2.0)
    } else {
        Point3::origin()
    };
    let max = min + size;

    // 8 shared corners
    let vertices = vec![
        Point3::new(min.x, min.y, min.z),
        Point3::new(max.x, min.y, min.z),
        Point3::new(max.x, max.y, min.z),
        Point3::new(min.x, max.y, min.z),
        Point3::new(min.x, min.y, max.z),
        Point3::new(max.x, min.y, max.z),
        Point3::new(max.x, max.y, max.z),
        Point3::new(min.x, max.y, max.z),
    ];

    let faces = [
        // Front (z+)
        [4, 5, 6],
        [4, 6, 7],
        // Back (z-)
        [1, 0, 3],
        [1, 3, 2],
        // Right (x+)
        [5, 1, 2],
        [5, 2, 6],
        // Left (x-)
        [0, 4, 7],
        [0, 7, 3],
        // Top (y+)
        [7, 6, 2],
        [7, 2, 3],
        // Bottom (y-)
        [0, 1, 5],
        [0, 5, 4],
    ];

    let triangles = faces.into_iter().map(Triangle::new).collect();
    IndexedMesh::from_parts_unchecked(vertices, triangles)
}

fn generate_subdivided_cube_mesh(size: Vector3<f64>, segments: u32) -> IndexedMesh {
    let n = segments as i64;
    let step = size / segments as f64;
    let mut lookup: AHashMap<[i64; 3], usize> = AHashMap::new();
    let mut vertices = Vec::new();
    let mut triangles = Vec::new();

    let mut vertex_at = |lattice: [i64; 3], vertices: &mut Vec<Point3<f64>>| -> usize {
        *lookup.entry(lattice).or_insert_with(|| {
            vertices.push(Point3::new(
                lattice[0] as f64 * step.x,
                lattice[1] as f64 * step.y,
                lattice[2] as f64 * step.z,
            ));
            vertices.len() - 1
        })
    };

    for axis in 0..3 {
        let u = (axis + 1) % 3;
        let v = (axis + 2) % 3;
        for positive in [false, true] {
            for i in 0..n {
                for j in 0..n {
                    let corner = |du: i64, dv: i64| {
                        let mut lattice = [0i64; 3];
                        lattice[axis] = if positive { n } else { 0 };
                        lattice[u] = i + du;
                        lattice[v] = j + dv;
                        lattice
                    };
                    let p0 = vertex_at(corner(0, 0), &mut vertices);
                    let p1 = vertex_at(corner(1, 0), &mut vertices);
                    let p2 = vertex_at(corner(1, 1), &mut vertices);
                    let p3 = vertex_at(corner(0, 1), &mut vertices);
                    if positive {
                        triangles.push(Triangle::new([p0, p1, p2]));
                        triangles.push(Triangle::new([p0, p2, p3]));
                    } else {
                        triangles.push(Triangle::new([p0, p2, p1]));
                        triangles.push(Triangle::new([p0, p3, p2]));
                    }
                }
            }
        }
    }

    IndexedMesh::from_parts_unchecked(vertices, triangles)
}

fn generate_icosphere_mesh(radius: f64, subdivisions: u32) -> IndexedMesh {
    let t = (1.0 + 5.0_f64.sqrt()) / 2.0;
    let mut vertices: Vec<Point3<f64>> = [
        (-1.0, t, 0.0),
        (1.0, t, 0.0),
        (-1.0, -t, 0.0),
        (1.0, -t, 0.0),
        (0.0, -1.0, t),
        (0.0, 1.0, t),
        (0.0, -1.0, -t),
        (0.0, 1.0, -t),
        (t, 0.0, -1.0),
        (t, 0.0, 1.0),
        (-t, 0.0, -1.0),
        (-t, 0.0, 1.0),
    ]
    .iter()
    .map(|&(x, y, z)| Point3::from(Vector3::new(x, y, z).normalize() * radius))
    .collect();

    let mut faces: Vec<[usize; 3]> = vec![
        [0, 11, 5],
        [0, 5, 1],
        [0, 1, 7],
        [0, 7, 10],
        [0, 10, 11],
        [1, 5, 9],
        [5, 11, 4],
        [11, 10, 2],
        [10, 7, 6],
        [7, 1, 8],
        [3, 9, 4],
        [3, 4, 2],
        [3, 2, 6],
        [3, 6, 8],
        [3, 8, 9],
        [4, 9, 5],
        [2, 4, 11],
        [6, 2, 10],
        [8, 6, 7],
        [9, 8, 1],
    ];

    for _ in 0..subdivisions {
        let mut midpoints: AHashMap<(usize, usize), usize> = AHashMap::new();
        let mut midpoint = |a: usize, b: usize, vertices: &mut Vec<Point3<f64>>| -> usize {
            let key = (a.min(b), a.max(b));
            *midpoints.entry(key).or_insert_with(|| {
                let mid = nalgebra::center(&vertices[a], &vertices[b]);
                vertices.push(Point3::from(mid.coords.normalize() * radius));
                vertices.len() - 1
            })
        };

        let mut next = Vec::with_capacity(faces.len() * 4);
        for [a, b, c] in faces {
            let ab = midpoint(a, b, &mut vertices);
            let bc = midpoint(b, c, &mut vertices);
            let ca = midpoint(c, a, &mut vertices);
            next.push([a, ab, ca]);
            next.push([b, bc, ab]);
            next.push([c, ca, bc]);
            next.push([ab, bc, ca]);
        }
        faces = next;
    }

    let triangles = faces.into_iter().map(Triangle::new).collect();
    IndexedMesh::from_parts_unchecked(vertices, triangles)
}

fn generate_cylinder_mesh(height: f64, radius: f64, segments: u32) -> IndexedMesh {
    let mut vertices = vec![Point3::new(0.0, 0.0, 0.0), Point3::new(0.0, 0.0, height)];
    let (bottom_center, top_center) = (0usize, 1usize);

    let mut bottom = Vec::with_capacity(segments as usize);
    let mut top = Vec::with_capacity(segments as usize);
    for i in 0..segments {
        let angle = 2.0 * PI * i as f64 / segments as f64;
        let (sin, cos) = angle.sin_cos();
        bottom.push(vertices.len());
        vertices.push(Point3::new(radius * cos, radius * sin, 0.0));
        top.push(vertices.len());
        vertices.push(Point3::new(radius * cos, radius * sin, height));
    }

    let mut triangles = Vec::with_capacity(segments as usize * 4);
    for i in 0..segments as usize {
        let next = (i + 1) % segments as usize;
        triangles.push(Triangle::new([bottom_center, bottom[next], bottom[i]]));
        triangles.push(Triangle::new([top_center, top[i], top[next]]));
        triangles.push(Triangle::new([bottom[i], bottom[next], top[i]]));
        triangles.push(Triangle::new([top[i], bottom[next], top[next]]));
    }

    IndexedMesh::from_parts_unchecked(vertices, triangles)
}
