// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{bail, Result};
use emotic_core::EmoticConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dataset::LabelSpace;
use crate::transforms::SamplePipeline;

/// Configuration for dataset access and batching
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameworkConfig {
    /// DataLoader settings
    pub loader: LoaderConfig,

    /// Width of the categorical labels produced by the CSV dataset
    pub label_space: LabelSpace,

    /// Normalization, image sizes, conversion plan and mapping
    #[serde(flatten)]
    pub emotic: EmoticConfig,
}

/// DataLoader configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Samples per batch
    pub batch_size: usize,

    /// Whether to shuffle every epoch
    pub shuffle: bool,

    /// Seed for reproducible shuffling; `None` draws from the OS
    pub seed: Option<u64>,

    /// Drop last incomplete batch
    pub drop_last: bool,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            batch_size: 32,
            shuffle: true,
            seed: Some(42),
            drop_last: false,
        }
    }
}

impl LoaderConfig {
    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            bail!("loader.batch_size must be > 0");
        }
        Ok(())
    }
}

impl FrameworkConfig {
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str)
            .map_err(|e| anyhow::anyhow!("Failed to parse framework config: {}", e))
    }

    /// Load from YAML file with framework extensions
    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;
        Self::from_yaml(&content)
    }

    pub fn validate(&self) -> Result<()> {
        self.loader.validate()?;
        self.emotic.validate()
    }

    /// Identity transform with the configured context/body normalization.
    pub fn sample_pipeline(&self) -> Result<SamplePipeline> {
        let norm = &self.emotic.normalization;
        SamplePipeline::from_stats(norm.context, norm.body)
    }
}
