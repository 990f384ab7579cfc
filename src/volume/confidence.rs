// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Confidence scoring for volume estimates

use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Score every measurement starts from
pub const BASE_CONFIDENCE: f64 = 0.3;

/// Share of the score earned by capture density
pub const DENSITY_WEIGHT: f64 = 0.3;

/// Share of the score earned by topology quality
pub const QUALITY_WEIGHT: f64 = 0.4;

/// Vertex count at which the vertex half of the density term saturates
pub const REFERENCE_VERTEX_COUNT: usize = 5_000;

/// Triangle count at which the triangle half of the density term saturates
pub const REFERENCE_TRIANGLE_COUNT: usize = 10_000;

/// Multiplier applied when repair failed and the unrepaired mesh was integrated
pub const FALLBACK_PENALTY: f64 = 0.5;

/// Weights turning capture density and topology quality into a [0, 1] score.
///
/// `base + density_weight * density + quality_weight * quality`, where
/// `density` averages how close the vertex and triangle counts come to their
/// reference values.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceModel {
    pub base: f64,
    pub density_weight: f64,
    pub quality_weight: f64,
    pub reference_vertex_count: usize,
    pub reference_triangle_count: usize,
    pub fallback_penalty: f64,
}

impl Default for ConfidenceModel {
    fn default() -> Self {
        Self {
            base: BASE_CONFIDENCE,
            density_weight: DENSITY_WEIGHT,
            quality_weight: QUALITY_WEIGHT,
            reference_vertex_count: REFERENCE_VERTEX_COUNT,
            reference_triangle_count: REFERENCE_TRIANGLE_COUNT,
            fallback_penalty: FALLBACK_PENALTY,
        }
    }
}

impl ConfidenceModel {
    /// Density term in [0, 1]
    pub fn density_score(&self, vertex_count: usize, triangle_count: usize) -> f64 {
        let ratio = |count: usize, reference: usize| {
            if reference == 0 {
                1.0
            } else {
                (count as f64 / reference as f64).min(1.0)
            }
        };
        0.5 * ratio(vertex_count, self.reference_vertex_count)
            + 0.5 * ratio(triangle_count, self.reference_triangle_count)
    }

    /// Confidence for a mesh of the given density and quality score.
    ///
    /// Strictly increasing in `quality_score` while `quality_weight` is positive.
    pub fn score(&self, vertex_count: usize, triangle_count: usize, quality_score: f64) -> f64 {
        let density = self.density_score(vertex_count, triangle_count);
        let raw = self.base
            + self.density_weight * density
            + self.quality_weight * quality_score.clamp(0.0, 1.0);
        raw.clamp(0.0, 1.0)
    }

    /// Same as [`ConfidenceModel::score`], scaled down by the fallback penalty
    pub fn fallback_score(&self, vertex_count: usize, triangle_count: usize, quality_score: f64) -> f64 {
        (self.score(vertex_count, triangle_count, quality_score) * self.fallback_penalty).clamp(0.0, 1.0)
    }

    pub fn validate(&self) -> Result<()> {
        let weights = [
            ("base", self.base),
            ("density_weight", self.density_weight),
            ("quality_weight", self.quality_weight),
            ("fallback_penalty", self.fallback_penalty),
        ];
        for (name, value) in weights {
            ensure!(
                (0.0..=1.0).contains(&value),
                "confidence {} must lie in [0, 1], got {}",
                name,
                value
            );
        }
        ensure!(
            self.base + self.density_weight + self.quality_weight <= 1.0 + 1e-9,
            "confidence base and weights must sum to at most 1"
        );
        Ok(())
    }
}
