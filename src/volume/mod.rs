// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Volume integration and confidence scoring

mod confidence;
mod integrator;

pub use confidence::{
    ConfidenceModel, BASE_CONFIDENCE, DENSITY_WEIGHT, FALLBACK_PENALTY, QUALITY_WEIGHT,
    REFERENCE_TRIANGLE_COUNT, REFERENCE_VERTEX_COUNT,
};
pub use integrator::{
    compute_volume, signed_volume, signed_volume_about, CUBIC_METERS_TO_CUBIC_CENTIMETERS,
};
