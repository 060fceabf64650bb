// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

pub mod csv_dataset;
pub mod data_loader;
pub mod dataset;
pub mod framework_config;
pub mod preprocessed;
pub mod transforms;

pub use framework_config::{FrameworkConfig, LoaderConfig};
#[cfg(test)]
mod tests;

// Re-export main types
pub use csv_dataset::CsvDataset;
pub use data_loader::{DataLoader, EmoticBatch};
pub use dataset::{DatasetMetadata, EmoticDataset, EmoticSample, LabelSpace, SampleError};
pub use preprocessed::PreprocessedDataset;
pub use transforms::{
    to_tensor, Compose, HorizontalFlip, Identity, ImageTransform, Normalization,
    RandomHorizontalFlip, SamplePipeline,
};
