// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Voxel repair configuration and presets

use crate::error::RepairError;
use serde::{Deserialize, Serialize};

/// Largest accepted grid resolution along the longest axis
pub const MAX_RESOLUTION: u32 = 512;

/// Objects whose longest side is below this (meters) use the small preset
pub const SMALL_OBJECT_EXTENT: f64 = 0.15;

/// Objects whose longest side is below this (meters) use the medium preset
pub const MEDIUM_OBJECT_EXTENT: f64 = 0.5;

/// Caller-chosen voxel repair trade-offs. Presets are plain constructors.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RepairConfiguration {
    /// Voxels along the longest bounding-box axis
    pub resolution: u32,
    /// Occupancy at or above which a cell counts as solid, in (0, 1)
    pub occupancy_threshold: f32,
    /// Empty voxels added around the bounding box on every side
    pub padding_voxels: u32,
    /// One bounded Laplacian pass over the extracted surface
    pub smoothing_enabled: bool,
    /// Mark cells enclosed by the solid shell as solid
    #[serde(default = "enabled")]
    pub fill_interior: bool,
    /// Points in one cell that read as full occupancy. 0 scales every cell
    /// by the busiest cell alone.
    #[serde(default = "default_saturation_count")]
    pub saturation_count: u32,
    /// Add points sampled across each triangle at half-voxel spacing, so the
    /// occupied shell does not depend on how far apart the vertices are
    #[serde(default = "enabled")]
    pub surface_sampling: bool,
}

/// Saturation used by the presets: any sampled cell is fully occupied
pub const DEFAULT_SATURATION_COUNT: u32 = 1;

fn enabled() -> bool {
    true
}

fn default_saturation_count() -> u32 {
    DEFAULT_SATURATION_COUNT
}

impl RepairConfiguration {
    pub fn small_object() -> Self {
        Self {
            resolution: 96,
            occupancy_threshold: 0.3,
            padding_voxels: 2,
            smoothing_enabled: false,
            fill_interior: true,
            saturation_count: DEFAULT_SATURATION_COUNT,
            surface_sampling: true,
        }
    }

    pub fn medium_object() -> Self {
        Self {
            resolution: 112,
            occupancy_threshold: 0.3,
            padding_voxels: 3,
            smoothing_enabled: true,
            fill_interior: true,
            saturation_count: DEFAULT_SATURATION_COUNT,
            surface_sampling: true,
        }
    }

    pub fn high_quality() -> Self {
        Self {
            resolution: 128,
            occupancy_threshold: 0.5,
            padding_voxels: 4,
            smoothing_enabled: true,
            fill_interior: true,
            saturation_count: DEFAULT_SATURATION_COUNT,
            surface_sampling: true,
        }
    }

    /// Pick a preset from the object's longest side in meters
    pub fn for_extent(max_extent: f64) -> Self {
        if max_extent < SMALL_OBJECT_EXTENT {
            Self::small_object()
        } else if max_extent < MEDIUM_OBJECT_EXTENT {
            Self::medium_object()
        } else {
            Self::high_quality()
        }
    }

    /// Look up a preset by name (`small`, `medium`, `high`)
    pub fn from_preset_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "small" | "small_object" => Some(Self::small_object()),
            "medium" | "medium_object" => Some(Self::medium_object()),
            "high" | "high_quality" => Some(Self::high_quality()),
            _ => None,
        }
    }

    pub fn with_resolution(mut self, resolution: u32) -> Self {
        self.resolution = resolution;
        self
    }

    pub fn with_threshold(mut self, occupancy_threshold: f32) -> Self {
        self.occupancy_threshold = occupancy_threshold;
        self
    }

    pub fn with_padding(mut self, padding_voxels: u32) -> Self {
        self.padding_voxels = padding_voxels;
        self
    }

    pub fn with_smoothing(mut self, smoothing_enabled: bool) -> Self {
        self.smoothing_enabled = smoothing_enabled;
        self
    }

    pub fn with_interior_fill(mut self, fill_interior: bool) -> Self {
        self.fill_interior = fill_interior;
        self
    }

    pub fn with_saturation(mut self, saturation_count: u32) -> Self {
        self.saturation_count = saturation_count;
        self
    }

    pub fn with_surface_sampling(mut self, surface_sampling: bool) -> Self {
        self.surface_sampling = surface_sampling;
        self
    }

    pub fn validate(&self) -> Result<(), RepairError> {
        if self.resolution < 2 {
            return Err(RepairError::InvalidConfiguration("resolution must be at least 2"));
        }
        if self.resolution > MAX_RESOLUTION {
            return Err(RepairError::InvalidConfiguration("resolution exceeds 512"));
        }
        if self.padding_voxels > self.resolution {
            return Err(RepairError::InvalidConfiguration("padding exceeds resolution"));
        }
        if !(self.occupancy_threshold > 0.0 && self.occupancy_threshold < 1.0) {
            return Err(RepairError::InvalidConfiguration(
                "occupancy threshold must lie strictly between 0 and 1",
            ));
        }
        Ok(())
    }
}

impl Default for RepairConfiguration {
    fn default() -> Self {
        Self::medium_object()
    }
}
