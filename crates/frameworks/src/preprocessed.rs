// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dataset over the pre-processed `.npy` arrays written by the EMOTIC
//! preprocessing step (and rewritten by the 26 → 6 conversion).

use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array4, Axis};
use std::path::Path;
use tracing::{debug, info};

use emotic_core::EmotionGroup;
use emotic_formats::{
    body_file, categorical_file, context_file, continuous_file, read_image_stack, LabelMatrix,
};

use crate::dataset::{
    check_index, scale_continuous, DatasetMetadata, EmoticDataset, EmoticSample, LabelSpace,
    SampleError,
};
use crate::transforms::{image_from_hwc, SamplePipeline};

/// Four parallel arrays indexed by sample.
pub struct PreprocessedDataset {
    context: Array4<u8>,
    body: Array4<u8>,
    categorical: Array2<f32>,
    continuous: Array2<f32>,
    pipeline: SamplePipeline,
    source: String,
}

impl PreprocessedDataset {
    /// Images are `(N, H, W, 3)`, categorical labels `(N, K)`, continuous
    /// labels `(N, 3)` on a 0..10 scale.
    pub fn new(
        context: Array4<u8>,
        body: Array4<u8>,
        categorical: Array2<f32>,
        continuous: Array2<f32>,
        pipeline: SamplePipeline,
    ) -> Result<Self> {
        let n = categorical.nrows();
        let counts = [
            ("context", context.len_of(Axis(0))),
            ("body", body.len_of(Axis(0))),
            ("continuous", continuous.nrows()),
        ];
        for (name, count) in counts {
            if count != n {
                bail!(
                    "{} array has {} samples but categorical labels have {}",
                    name,
                    count,
                    n
                );
            }
        }
        for (name, images) in [("context", &context), ("body", &body)] {
            if images.len_of(Axis(3)) != 3 {
                bail!("{} images must be RGB (N, H, W, 3), got {:?}", name, images.shape());
            }
        }
        if continuous.ncols() != 3 {
            bail!(
                "continuous labels must have 3 columns (valence, arousal, dominance), got {}",
                continuous.ncols()
            );
        }

        Ok(Self {
            context,
            body,
            categorical,
            continuous,
            pipeline,
            source: "in-memory arrays".to_string(),
        })
    }

    /// Load `{split}_context_arr.npy`, `{split}_body_arr.npy`,
    /// `{split}_cat_arr.npy` and `{split}_cont_arr.npy` from `dir`.
    pub fn from_dir(dir: &Path, split: &str, pipeline: SamplePipeline) -> Result<Self> {
        let context = read_image_stack(dir.join(context_file(split)))?;
        let body = read_image_stack(dir.join(body_file(split)))?;
        let categorical = LabelMatrix::read(dir.join(categorical_file(split)))?.to_f32();
        let continuous = LabelMatrix::read(dir.join(continuous_file(split)))?.to_f32();
        debug!(
            "Loaded {} split: context {:?}, body {:?}, cat {:?}",
            split,
            context.shape(),
            body.shape(),
            categorical.shape()
        );

        let mut dataset = Self::new(context, body, categorical, continuous, pipeline)
            .with_context(|| format!("Inconsistent {} arrays in {:?}", split, dir))?;
        dataset.source = format!("{}/{}", dir.display(), split);
        info!("Pre-processed {} dataset: {} samples", split, dataset.len());
        Ok(dataset)
    }

    pub fn categorical_width(&self) -> usize {
        self.categorical.ncols()
    }
}

impl EmoticDataset for PreprocessedDataset {
    fn len(&self) -> usize {
        self.categorical.nrows()
    }

    fn get(&self, index: usize) -> Result<EmoticSample, SampleError> {
        check_index(index, self.len())?;

        let context = image_from_hwc(self.context.index_axis(Axis(0), index)).ok_or_else(|| {
            SampleError::InvalidRow {
                row: index,
                message: "context image buffer has the wrong size".to_string(),
            }
        })?;
        let body = image_from_hwc(self.body.index_axis(Axis(0), index)).ok_or_else(|| {
            SampleError::InvalidRow {
                row: index,
                message: "body image buffer has the wrong size".to_string(),
            }
        })?;

        Ok(EmoticSample {
            context: self.pipeline.context_tensor(context)?,
            body: self.pipeline.body_tensor(body)?,
            categorical: self.categorical.row(index).to_owned(),
            continuous: scale_continuous(self.continuous.row(index).iter().copied()),
        })
    }

    fn metadata(&self) -> DatasetMetadata {
        let width = self.categorical_width();
        let label_space = if width == EmotionGroup::COUNT {
            LabelSpace::Coarse
        } else {
            LabelSpace::Fine
        };
        DatasetMetadata {
            source: self.source.clone(),
            samples: self.len(),
            label_space,
            categorical_width: width,
        }
    }
}
