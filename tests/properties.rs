// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Property tests for topology and repair

use meshvol::repair::repair;
use meshvol::topology;
use meshvol::{IndexedMesh, MeasurementPipeline, PipelineConfig, RepairConfiguration, RepairError};
use nalgebra::Point3;
use proptest::prelude::*;

fn arb_mesh(max_vertices: usize, max_triangles: usize) -> impl Strategy<Value = IndexedMesh> {
    (3..max_vertices).prop_flat_map(move |vertex_count| {
        let vertices = prop::collection::vec(
            (-1.0f64..1.0, -1.0f64..1.0, -1.0f64..1.0).prop_map(|(x, y, z)| Point3::new(x, y, z)),
            vertex_count,
        );
        let triangles = prop::collection::vec(
            [0..vertex_count, 0..vertex_count, 0..vertex_count],
            1..max_triangles,
        );
        (vertices, triangles).prop_map(|(vertices, triangles)| {
            IndexedMesh::from_indices(vertices, triangles).expect("indices are in range")
        })
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn repaired_output_is_always_watertight(
        mesh in arb_mesh(40, 60),
        resolution in 2u32..20,
        threshold in 0.05f32..0.95,
        padding in 0u32..4,
        smoothing in any::<bool>(),
    ) {
        let config = RepairConfiguration::default()
            .with_resolution(resolution)
            .with_threshold(threshold)
            .with_padding(padding)
            .with_smoothing(smoothing);

        match repair(&mesh, &config) {
            Ok(repaired) => {
                let report = topology::analyze(&repaired);
                prop_assert_eq!(report.boundary_edge_count, 0);
                prop_assert!(report.is_watertight);
            }
            Err(error) => {
                prop_assert_eq!(error, RepairError::DegenerateBoundingBox);
            }
        }
    }

    #[test]
    fn edge_counts_ignore_vertex_order(mesh in arb_mesh(30, 80), shift in 0usize..3, reverse in any::<bool>()) {
        let permuted = IndexedMesh::from_indices(
            mesh.vertices().to_vec(),
            mesh.triangles().iter().map(|t| {
                let mut indices = t.indices;
                indices.rotate_left(shift);
                if reverse {
                    indices.reverse();
                }
                indices
            }),
        )
        .unwrap();

        let a = topology::analyze(&mesh);
        let b = topology::analyze(&permuted);
        prop_assert_eq!(a.edge_count, b.edge_count);
        prop_assert_eq!(a.boundary_edge_count, b.boundary_edge_count);
        prop_assert_eq!(a.non_manifold_edge_count, b.non_manifold_edge_count);
        prop_assert_eq!(a.estimated_hole_count, b.estimated_hole_count);
    }

    #[test]
    fn quality_score_stays_in_unit_interval(mesh in arb_mesh(30, 80)) {
        let report = topology::analyze(&mesh);
        prop_assert!((0.0..=1.0).contains(&report.quality_score));
        prop_assert_eq!(report.is_watertight, report.boundary_edge_count == 0);
    }

    #[test]
    fn measurement_confidence_is_bounded(mesh in arb_mesh(30, 40)) {
        let config = PipelineConfig::default()
            .with_repair(RepairConfiguration::small_object().with_resolution(16));
        let measurement = MeasurementPipeline::new(config).measure(&mesh);
        prop_assert!((0.0..=1.0).contains(&measurement.confidence));
        prop_assert!(measurement.volume_cm3 >= 0.0);
    }
}
