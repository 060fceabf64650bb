// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::Result;
use ndarray::{stack, Array2, Array4, ArrayView1, ArrayView3, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::dataset::{EmoticDataset, EmoticSample, SampleError};
use crate::framework_config::LoaderConfig;

/// A stack of samples along a new leading axis.
#[derive(Debug, Clone, PartialEq)]
pub struct EmoticBatch {
    /// Dataset indices, in batch order.
    pub indices: Vec<usize>,
    pub context: Array4<f32>,
    pub body: Array4<f32>,
    pub categorical: Array2<f32>,
    pub continuous: Array2<f32>,
}

impl EmoticBatch {
    /// Stack samples; all must share tensor shapes.
    pub fn from_samples(indices: Vec<usize>, samples: &[EmoticSample]) -> Result<Self> {
        let context: Vec<ArrayView3<f32>> = samples.iter().map(|s| s.context.view()).collect();
        let body: Vec<ArrayView3<f32>> = samples.iter().map(|s| s.body.view()).collect();
        let categorical: Vec<ArrayView1<f32>> = samples.iter().map(|s| s.categorical.view()).collect();
        let continuous: Vec<ArrayView1<f32>> = samples.iter().map(|s| s.continuous.view()).collect();

        Ok(Self {
            indices,
            context: stack(Axis(0), &context)?,
            body: stack(Axis(0), &body)?,
            categorical: stack(Axis(0), &categorical)?,
            continuous: stack(Axis(0), &continuous)?,
        })
    }

    pub fn len(&self) -> usize {
        self.indices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indices.is_empty()
    }
}

/// Batches samples from any [`EmoticDataset`].
///
/// Shuffling is seeded per epoch (`seed + epoch`), so a given seed and
/// epoch always produce the same order.
pub struct DataLoader<D> {
    dataset: D,

    config: LoaderConfig,

    /// Current epoch for tracking
    current_epoch: usize,
}

impl<D: EmoticDataset> DataLoader<D> {
    pub fn new(dataset: D, config: LoaderConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            dataset,
            config,
            current_epoch: 0,
        })
    }

    pub fn dataset(&self) -> &D {
        &self.dataset
    }

    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Get current epoch
    pub fn current_epoch(&self) -> usize {
        self.current_epoch
    }

    /// Increment epoch counter
    pub fn next_epoch(&mut self) -> usize {
        self.current_epoch += 1;
        self.current_epoch
    }

    /// Reset epoch counter
    pub fn reset_epoch(&mut self) {
        self.current_epoch = 0;
    }

    /// Batches per epoch.
    pub fn num_batches(&self) -> usize {
        let len = self.dataset.len();
        let size = self.config.batch_size;
        if self.config.drop_last {
            len / size
        } else {
            len.div_ceil(size)
        }
    }

    /// Sample order for the current epoch.
    pub fn epoch_indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = (0..self.dataset.len()).collect();
        if self.config.shuffle {
            let mut rng = match self.config.seed {
                Some(seed) => StdRng::seed_from_u64(seed.wrapping_add(self.current_epoch as u64)),
                None => StdRng::from_os_rng(),
            };
            indices.shuffle(&mut rng);
        }
        indices
    }

    /// Iterate over the batches of the current epoch.
    pub fn iter(&self) -> EpochIter<'_, D> {
        let mut indices = self.epoch_indices();
        if self.config.drop_last {
            indices.truncate(self.num_batches() * self.config.batch_size);
        }
        debug!(
            "Epoch {}: {} samples in {} batches",
            self.current_epoch,
            indices.len(),
            self.num_batches()
        );
        EpochIter {
            dataset: &self.dataset,
            indices,
            batch_size: self.config.batch_size,
            position: 0,
        }
    }
}

pub struct EpochIter<'a, D> {
    dataset: &'a D,
    indices: Vec<usize>,
    batch_size: usize,
    position: usize,
}

impl<D: EmoticDataset> Iterator for EpochIter<'_, D> {
    type Item = Result<EmoticBatch, SampleError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.position >= self.indices.len() {
            return None;
        }
        let end = (self.position + self.batch_size).min(self.indices.len());
        let batch_indices = self.indices[self.position..end].to_vec();
        self.position = end;

        let samples = batch_indices
            .iter()
            .map(|&i| self.dataset.get(i))
            .collect::<Result<Vec<_>, _>>();
        Some(samples.and_then(|samples| {
            EmoticBatch::from_samples(batch_indices, &samples).map_err(SampleError::from)
        }))
    }
}
