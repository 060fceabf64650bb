// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/core/src/config/emotic_config.rs
use anyhow::{bail, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;

use crate::categories::CategoryMapping;
use crate::conversion::ConversionPlan;

/// Per-channel RGB statistics of the EMOTIC context crops.
pub const CONTEXT_MEAN: [f32; 3] = [0.469_064_6, 0.440_722_7, 0.405_089_08];
pub const CONTEXT_STD: [f32; 3] = [0.251_422_7, 0.243_128_55, 0.242_669_63];
/// Per-channel RGB statistics of the EMOTIC body crops.
pub const BODY_MEAN: [f32; 3] = [0.438_328_74, 0.396_434_4, 0.370_621_4];
pub const BODY_STD: [f32; 3] = [0.247_842_76, 0.236_212_25, 0.232_365_3];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, rename_all = "snake_case")]
pub struct EmoticConfig {
    pub normalization: NormalizationConfig, // context / body mean + std
    pub images: ImageConfig,                // fixed resize targets
    pub conversion: ConversionPlan,         // label files + auxiliary files
    /// Optional category → group override, e.g. `Pain: Sadness`. Must still
    /// cover all 26 categories.
    pub mapping: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormStats {
    pub mean: [f32; 3],
    pub std: [f32; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NormalizationConfig {
    pub context: NormStats,
    pub body: NormStats,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            context: NormStats {
                mean: CONTEXT_MEAN,
                std: CONTEXT_STD,
            },
            body: NormStats {
                mean: BODY_MEAN,
                std: BODY_STD,
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageConfig {
    pub context_size: u32,
    pub body_size: u32,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            context_size: 224,
            body_size: 128,
        }
    }
}

impl NormStats {
    pub fn validate(&self, stream: &str) -> Result<()> {
        if let Some(s) = self.std.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            bail!("{} normalization std must be positive and finite, got {}", stream, s);
        }
        if self.mean.iter().any(|m| !m.is_finite()) {
            bail!("{} normalization mean must be finite", stream);
        }
        Ok(())
    }
}

impl EmoticConfig {
    /// Parse from a YAML string; absent sections take their defaults.
    pub fn from_yaml(yaml_str: &str) -> Result<Self> {
        serde_yaml::from_str(yaml_str).map_err(|e| anyhow::anyhow!("Failed to parse YAML config: {}", e))
    }

    pub fn from_yaml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;
        Self::from_yaml(&text)
    }

    pub fn validate(&self) -> Result<()> {
        self.normalization.context.validate("context")?;
        self.normalization.body.validate("body")?;

        if self.images.context_size == 0 || self.images.body_size == 0 {
            bail!("image sizes must be > 0");
        }
        if self.conversion.label_files.is_empty() {
            bail!("conversion.label_files must name at least one file");
        }
        self.category_mapping()?;
        Ok(())
    }

    /// The configured mapping, or the standard partition when no override is given.
    pub fn category_mapping(&self) -> Result<CategoryMapping> {
        match &self.mapping {
            None => Ok(CategoryMapping::standard()),
            Some(table) => CategoryMapping::from_table(table)
                .map_err(|e| anyhow::anyhow!("Invalid category mapping in config: {}", e)),
        }
    }
}
