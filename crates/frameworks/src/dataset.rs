// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use emotic_core::MappingError;
use emotic_formats::LiteralError;
use ndarray::{Array1, Array3};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Continuous labels are stored on a 0..10 scale.
pub const CONTINUOUS_SCALE: f32 = 10.0;

/// One person in one image, ready for the model.
#[derive(Debug, Clone, PartialEq)]
pub struct EmoticSample {
    /// Normalized whole-image tensor, `(3, H, W)`.
    pub context: Array3<f32>,
    /// Normalized body-crop tensor, `(3, h, w)`.
    pub body: Array3<f32>,
    /// Multi-hot category vector (26 or 6 wide).
    pub categorical: Array1<f32>,
    /// Valence, arousal, dominance in `[0, 1]`.
    pub continuous: Array1<f32>,
}

/// Width of the categorical vector a dataset yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelSpace {
    /// 26 fine-grained categories.
    #[default]
    Fine,
    /// 6 coarse groups.
    Coarse,
}

impl LabelSpace {
    pub fn width(self) -> usize {
        match self {
            LabelSpace::Fine => emotic_core::Emotion::COUNT,
            LabelSpace::Coarse => emotic_core::EmotionGroup::COUNT,
        }
    }
}

/// Static facts about a dataset, mostly for logging and `inspect`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DatasetMetadata {
    pub source: String,
    pub samples: usize,
    pub label_space: LabelSpace,
    pub categorical_width: usize,
}

/// Failure to produce one sample. These are never retried or papered over.
#[derive(Debug, Error)]
pub enum SampleError {
    #[error("index {index} out of range for dataset of {len} samples")]
    OutOfRange { index: usize, len: usize },

    #[error("failed to load image {path:?}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("row {row}: malformed {field}: {source}")]
    Malformed {
        row: usize,
        field: &'static str,
        #[source]
        source: LiteralError,
    },

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("row {row}: {source}")]
    UnknownCategory {
        row: usize,
        #[source]
        source: MappingError,
    },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Indexed access to EMOTIC samples. Implementations hold no interior
/// mutability so `get` can be called from several threads at once.
pub trait EmoticDataset: Send + Sync {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get(&self, index: usize) -> Result<EmoticSample, SampleError>;

    fn metadata(&self) -> DatasetMetadata;
}

pub(crate) fn check_index(index: usize, len: usize) -> Result<(), SampleError> {
    if index >= len {
        return Err(SampleError::OutOfRange { index, len });
    }
    Ok(())
}

/// Scale raw continuous labels from 0..10 to 0..1.
pub(crate) fn scale_continuous(values: impl IntoIterator<Item = f32>) -> Array1<f32> {
    values.into_iter().map(|v| v / CONTINUOUS_SCALE).collect()
}
