// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! End-to-end measurement tests

use approx::assert_relative_eq;
use meshvol::repair::repair_detailed;
use meshvol::topology;
use meshvol::volume::{compute_volume, signed_volume_about, ConfidenceModel};
use meshvol::{
    IndexedMesh, MeasurementPipeline, PipelineConfig, PipelineStage, Primitive, RepairConfiguration,
    RepairError, RepairOutcome, Triangle,
};
use nalgebra::{Point3, Vector3};

/// Closed subdivided cube with the first triangle of `holes` spaced-out quads
/// on one face removed. Every removed triangle opens a separate 3-edge hole.
fn cube_with_holes(size: f64, segments: u32, holes: usize) -> IndexedMesh {
    let mesh = Primitive::subdivided_cube(Vector3::new(size, size, size), segments).to_mesh();
    let n = segments as usize;
    let per_row = (n - 1) / 4;
    let removed: Vec<usize> = (0..holes)
        .map(|h| {
            let (i, j) = (2 + 4 * (h / per_row), 2 + 4 * (h % per_row));
            2 * (i * n + j)
        })
        .collect();
    let triangles: Vec<Triangle> = mesh
        .triangles()
        .iter()
        .enumerate()
        .filter(|(i, _)| !removed.contains(i))
        .map(|(_, t)| *t)
        .collect();
    IndexedMesh::new(mesh.vertices().to_vec(), triangles).unwrap()
}

#[test]
fn test_unit_cube_volume_independent_of_apex() {
    let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_mesh();
    assert_eq!(cube.triangle_count(), 12);
    assert_relative_eq!(compute_volume(&cube), 1_000_000.0, epsilon = 1e-6);

    for apex in [
        Point3::new(0.5, 0.5, 0.5),
        Point3::new(-3.0, 7.0, 11.0),
        Point3::new(1e3, -1e3, 2e2),
    ] {
        assert_relative_eq!(signed_volume_about(&cube, apex), 1.0, epsilon = 1e-9);
    }
}

#[test]
fn test_volume_invariant_under_retriangulation() {
    let coarse = Primitive::cube(Vector3::new(0.4, 0.4, 0.4), false).to_mesh();
    for segments in [2, 3, 7] {
        let fine = Primitive::subdivided_cube(Vector3::new(0.4, 0.4, 0.4), segments).to_mesh();
        assert_relative_eq!(compute_volume(&fine), compute_volume(&coarse), max_relative = 1e-12);
    }
    // Translation does not change the enclosed region either
    let moved = coarse.translated(Vector3::new(5.0, -2.0, 1.0));
    assert_relative_eq!(compute_volume(&moved), compute_volume(&coarse), max_relative = 1e-9);
}

#[test]
fn test_icosphere_approaches_sphere_volume() {
    let sphere = Primitive::icosphere(0.1, 4).to_mesh();
    let exact = 4.0 / 3.0 * std::f64::consts::PI * 0.1f64.powi(3) * 1e6;
    let measured = compute_volume(&sphere);
    assert!(measured < exact);
    assert!(measured > 0.99 * exact);
}

#[test]
fn test_captured_scan_with_holes_end_to_end() {
    // 6 * 38^2 + 2 = 8666 vertices, 17312 triangles after removal
    let scan = cube_with_holes(0.3, 38, 16);
    let initial = topology::analyze(&scan);
    assert_eq!(initial.boundary_edge_count, 48);
    assert_eq!(initial.estimated_hole_count, 16);
    assert_relative_eq!(
        initial.quality_score,
        1.0 - 10.0 * 48.0 / scan.vertex_count() as f64,
        epsilon = 1e-12
    );
    assert!((initial.quality_score - 0.943).abs() < 0.01);

    let run = MeasurementPipeline::default().run(&scan);
    assert_eq!(
        run.stages,
        vec![
            PipelineStage::Ingested,
            PipelineStage::Analyzed,
            PipelineStage::Repairing,
            PipelineStage::ReAnalyzed,
            PipelineStage::Integrated,
        ]
    );
    let measurement = run.measurement;
    assert!(measurement.repair_applied);
    assert_eq!(measurement.outcome, RepairOutcome::Repaired);
    assert_eq!(measurement.topology.boundary_edge_count, 0);
    assert!(measurement.confidence > 0.95);
    // Voxel surfaces sit up to a couple of voxels outside the true faces
    let exact = 27_000.0;
    assert!(
        (measurement.volume_cm3 - exact).abs() < 0.15 * exact,
        "volume {}",
        measurement.volume_cm3
    );
}

#[test]
fn test_default_pipeline_volume_tracks_true_volume() {
    let sphere_volume = 4.0 / 3.0 * std::f64::consts::PI * 0.2f64.powi(3) * 1e6;
    let cases = [
        (
            Primitive::subdivided_cube(Vector3::new(0.1, 0.1, 0.1), 30)
                .to_mesh()
                .without_triangle(100),
            1_000.0,
        ),
        (
            Primitive::icosphere(0.2, 5).to_mesh().without_triangle(0),
            sphere_volume,
        ),
    ];

    for (scan, exact) in cases {
        let run = MeasurementPipeline::default().run(&scan);
        assert_eq!(run.measurement.outcome, RepairOutcome::Repaired);
        let volume = run.measurement.volume_cm3;
        assert!(
            volume > exact && volume < 1.15 * exact,
            "volume {} against {}",
            volume,
            exact
        );
    }
}

#[test]
fn test_dense_scan_repairs_to_close_volume() {
    // Two to three samples per voxel along each axis
    let scan = cube_with_holes(1.0, 150, 4);
    let config = RepairConfiguration::small_object()
        .with_resolution(64)
        .with_threshold(0.15)
        .with_surface_sampling(false);

    let (repaired, stats) = repair_detailed(&scan, &config).unwrap();
    assert_eq!(stats.dropped_points, 0);
    assert!(stats.interior_cells > 0);
    assert!(topology::analyze(&repaired).is_watertight);

    // Dilation grows the solid by about one voxel on each side
    let volume = compute_volume(&repaired);
    assert!(volume > 0.95e6, "volume {}", volume);
    assert!(volume < 1.3e6, "volume {}", volume);
}

#[test]
fn test_zero_triangle_mesh_degrades_gracefully() {
    let points = IndexedMesh::from_indices(
        vec![Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0)],
        Vec::new(),
    )
    .unwrap();

    let report = topology::analyze(&points);
    assert!(!report.is_watertight);
    assert_eq!(report.quality_score, 0.0);
    assert_eq!(
        meshvol::repair(&points, &RepairConfiguration::default()).unwrap_err(),
        RepairError::EmptyPointSet
    );

    let measurement = meshvol::measure(&points);
    assert_eq!(measurement.outcome, RepairOutcome::Failed(RepairError::EmptyPointSet));
    assert_eq!(measurement.volume_cm3, 0.0);
    assert!(measurement.confidence >= 0.0 && measurement.confidence < 0.5);
}

#[test]
fn test_flat_patch_falls_back_with_penalty() {
    let vertices = vec![
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(0.1, 0.0, 0.0),
        Point3::new(0.1, 0.1, 0.0),
        Point3::new(0.0, 0.1, 0.0),
    ];
    let patch = IndexedMesh::from_indices(vertices, [[0, 1, 2], [0, 2, 3]]).unwrap();

    let measurement = meshvol::measure(&patch);
    assert_eq!(
        measurement.outcome,
        RepairOutcome::Failed(RepairError::DegenerateBoundingBox)
    );
    assert!(!measurement.repair_applied);

    let model = ConfidenceModel::default();
    let expected = model.fallback_score(4, 2, measurement.topology.quality_score);
    assert_relative_eq!(measurement.confidence, expected, epsilon = 1e-12);
}

#[test]
fn test_confidence_rises_with_quality() {
    let model = PipelineConfig::default().confidence;
    let qualities = [0.0, 0.25, 0.5, 0.943, 1.0];
    let scores: Vec<f64> = qualities.iter().map(|&q| model.score(3_000, 6_000, q)).collect();
    assert!(scores.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_fixed_repair_configuration_is_used() {
    let open = Primitive::icosphere(0.05, 3).to_mesh().without_triangle(7);
    let config = PipelineConfig::default()
        .with_repair(RepairConfiguration::small_object().with_resolution(16));
    let pipeline = MeasurementPipeline::new(config);
    assert_eq!(pipeline.repair_configuration_for(&open).resolution, 16);

    let run = pipeline.run(&open);
    assert!(run.measurement.repair_applied);
    assert!(run.measurement.topology.is_watertight);
    assert!(run.repaired_mesh.is_some());
}

#[test]
fn test_noisy_capture_still_repairs_closed() {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    let mut rng = StdRng::seed_from_u64(7);
    let clean = cube_with_holes(0.2, 40, 6);
    let jitter = 0.0005;
    let noisy = IndexedMesh::new(
        clean
            .vertices()
            .iter()
            .map(|p| {
                p + Vector3::new(
                    rng.gen_range(-jitter..jitter),
                    rng.gen_range(-jitter..jitter),
                    rng.gen_range(-jitter..jitter),
                )
            })
            .collect(),
        clean.triangles().to_vec(),
    )
    .unwrap();

    let run = MeasurementPipeline::default().run(&noisy);
    assert_eq!(run.initial_topology.boundary_edge_count, 18);
    assert!(run.measurement.repair_applied);
    assert!(run.measurement.topology.is_watertight);
    assert!(run.measurement.confidence > 0.9);
}
