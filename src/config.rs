// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Pipeline configuration: TOML file plus environment overrides

use crate::repair::RepairConfiguration;
use crate::topology::DEFAULT_PARALLEL_THRESHOLD;
use crate::volume::ConfidenceModel;
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// File picked up by [`PipelineConfig::load`] from the working directory
pub const DEFAULT_CONFIG_FILE: &str = "meshvol.toml";

/// Measurement pipeline configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Triangle count at which edge counting goes parallel
    pub parallel_threshold: usize,
    /// Fixed repair settings; `None` picks a preset from the object's size
    pub repair: Option<RepairConfiguration>,
    /// Confidence weights
    pub confidence: ConfidenceModel,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
            repair: None,
            confidence: ConfidenceModel::default(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: PipelineConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        Ok(config)
    }

    /// Load `meshvol.toml` if present, then apply `MESHVOL_*` environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(DEFAULT_CONFIG_FILE).exists() {
            Self::from_file(DEFAULT_CONFIG_FILE)?
        } else {
            Self::default()
        };
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Apply overrides from a variable lookup.
    ///
    /// `MESHVOL_PRESET` replaces the repair settings; the per-field variables
    /// are applied on top of it, or of the default preset when none is set.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(name) = lookup("MESHVOL_PRESET") {
            let preset = RepairConfiguration::from_preset_name(&name)
                .ok_or_else(|| anyhow!("Unknown repair preset in MESHVOL_PRESET: {}", name))?;
            self.repair = Some(preset);
        }

        if let Some(value) = lookup("MESHVOL_PARALLEL_THRESHOLD") {
            self.parallel_threshold = parse_var("MESHVOL_PARALLEL_THRESHOLD", &value)?;
        }

        let resolution = lookup("MESHVOL_RESOLUTION");
        let threshold = lookup("MESHVOL_THRESHOLD");
        let padding = lookup("MESHVOL_PADDING");
        let smoothing = lookup("MESHVOL_SMOOTHING");
        if resolution.is_none() && threshold.is_none() && padding.is_none() && smoothing.is_none() {
            return Ok(());
        }

        let mut repair = self.repair.unwrap_or_default();
        if let Some(value) = resolution {
            repair.resolution = parse_var("MESHVOL_RESOLUTION", &value)?;
        }
        if let Some(value) = threshold {
            repair.occupancy_threshold = parse_var("MESHVOL_THRESHOLD", &value)?;
        }
        if let Some(value) = padding {
            repair.padding_voxels = parse_var("MESHVOL_PADDING", &value)?;
        }
        if let Some(value) = smoothing {
            repair.smoothing_enabled = parse_var("MESHVOL_SMOOTHING", &value)?;
        }
        self.repair = Some(repair);
        Ok(())
    }

    /// Save configuration to file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    /// Reject settings the pipeline cannot run with
    pub fn validate(&self) -> Result<()> {
        if let Some(repair) = &self.repair {
            repair.validate()?;
        }
        self.confidence.validate()
    }

    pub fn with_repair(mut self, repair: RepairConfiguration) -> Self {
        self.repair = Some(repair);
        self
    }

    pub fn with_parallel_threshold(mut self, parallel_threshold: usize) -> Self {
        self.parallel_threshold = parallel_threshold;
        self
    }
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .trim()
        .parse()
        .with_context(|| format!("Invalid value for {}: {:?}", name, value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_selects_preset_by_size() {
        let config = PipelineConfig::default();
        assert!(config.repair.is_none());
        assert_eq!(config.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = PipelineConfig::default();
        config
            .apply_env_overrides(lookup(&[
                ("MESHVOL_PRESET", "small"),
                ("MESHVOL_RESOLUTION", "80"),
                ("MESHVOL_SMOOTHING", "true"),
            ]))
            .unwrap();
        let repair = config.repair.unwrap();
        assert_eq!(repair.resolution, 80);
        assert!(repair.smoothing_enabled);
        assert_eq!(repair.padding_voxels, 2);
    }

    #[test]
    fn test_env_overrides_reject_garbage() {
        let mut config = PipelineConfig::default();
        assert!(config
            .apply_env_overrides(lookup(&[("MESHVOL_THRESHOLD", "lots")]))
            .is_err());
        assert!(config
            .apply_env_overrides(lookup(&[("MESHVOL_PRESET", "enormous")]))
            .is_err());
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("meshvol.toml");
        let config = PipelineConfig::default()
            .with_repair(RepairConfiguration::high_quality())
            .with_parallel_threshold(1_000);
        config.save(&path).unwrap();
        assert_eq!(PipelineConfig::from_file(&path).unwrap(), config);
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
            [repair]
            resolution = 48
            occupancy_threshold = 0.4
            padding_voxels = 2
            smoothing_enabled = false
            "#,
        )
        .unwrap();
        let repair = config.repair.unwrap();
        assert_eq!(repair.resolution, 48);
        assert!(repair.fill_interior);
        assert_eq!(config.confidence, ConfidenceModel::default());
    }
}
