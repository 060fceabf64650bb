// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Dataset built at runtime from an annotation CSV and the raw image folders.

use anyhow::Result;
use ndarray::Array1;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use emotic_core::config::ImageConfig;
use emotic_core::{CategoryMapping, Emotion, MappingError};
use emotic_formats::{read_annotations, AnnotationRow};

use crate::dataset::{
    check_index, scale_continuous, DatasetMetadata, EmoticDataset, EmoticSample, LabelSpace,
    SampleError,
};
use crate::transforms::{crop_padded, resize, SamplePipeline};

pub struct CsvDataset {
    rows: Vec<AnnotationRow>,
    image_root: PathBuf,
    mapping: CategoryMapping,
    images: ImageConfig,
    pipeline: SamplePipeline,
    label_space: LabelSpace,
    source: String,
}

impl CsvDataset {
    pub fn new(
        rows: Vec<AnnotationRow>,
        image_root: &Path,
        mapping: CategoryMapping,
        images: ImageConfig,
        pipeline: SamplePipeline,
    ) -> Self {
        Self {
            rows,
            image_root: image_root.to_path_buf(),
            mapping,
            images,
            pipeline,
            label_space: LabelSpace::Fine,
            source: image_root.display().to_string(),
        }
    }

    /// Read the annotation rows from `csv_path`. Images are resolved as
    /// `image_root/Folder/Filename`.
    pub fn from_csv(
        csv_path: &Path,
        image_root: &Path,
        mapping: CategoryMapping,
        images: ImageConfig,
        pipeline: SamplePipeline,
    ) -> Result<Self> {
        let rows = read_annotations(csv_path)?;
        info!("Annotation dataset {:?}: {} rows", csv_path, rows.len());
        let mut dataset = Self::new(rows, image_root, mapping, images, pipeline);
        dataset.source = csv_path.display().to_string();
        Ok(dataset)
    }

    /// Yield 6-way group labels instead of the 26-way one-hot.
    pub fn with_label_space(mut self, label_space: LabelSpace) -> Self {
        self.label_space = label_space;
        self
    }

    pub fn label_space(&self) -> LabelSpace {
        self.label_space
    }

    pub fn rows(&self) -> &[AnnotationRow] {
        &self.rows
    }

    /// Multi-hot 26-way vector for a list of category names.
    pub fn one_hot(&self, row: usize, names: &[String]) -> Result<Array1<f32>, SampleError> {
        let mut one_hot = Array1::<f32>::zeros(Emotion::COUNT);
        for name in names {
            let index = self
                .mapping
                .fine_index(name)
                .ok_or_else(|| SampleError::UnknownCategory {
                    row,
                    source: MappingError::UnknownCategory(name.clone()),
                })?;
            one_hot[index] = 1.0;
        }
        Ok(one_hot)
    }

    fn categorical(&self, row: usize, annotation: &AnnotationRow) -> Result<Array1<f32>, SampleError> {
        let names = annotation
            .parse_categories()
            .map_err(|source| SampleError::Malformed {
                row,
                field: "Categorical_Labels",
                source,
            })?;
        let one_hot = self.one_hot(row, &names)?;
        match self.label_space {
            LabelSpace::Fine => Ok(one_hot),
            LabelSpace::Coarse => Ok(self
                .mapping
                .row_to_coarse(&one_hot)
                .map_err(anyhow::Error::from)?),
        }
    }

    fn continuous(&self, row: usize, annotation: &AnnotationRow) -> Result<Array1<f32>, SampleError> {
        let values = annotation
            .parse_continuous()
            .map_err(|source| SampleError::Malformed {
                row,
                field: "Continuous_Labels",
                source,
            })?;
        if values.len() != 3 {
            return Err(SampleError::InvalidRow {
                row,
                message: format!(
                    "expected 3 continuous labels (valence, arousal, dominance), found {}",
                    values.len()
                ),
            });
        }
        Ok(scale_continuous(values.into_iter().map(|v| v as f32)))
    }
}

impl EmoticDataset for CsvDataset {
    fn len(&self) -> usize {
        self.rows.len()
    }

    fn get(&self, index: usize) -> Result<EmoticSample, SampleError> {
        check_index(index, self.len())?;
        let annotation = &self.rows[index];

        // Parse the cheap text fields before touching the image.
        let bbox = annotation
            .parse_bbox()
            .map_err(|source| SampleError::Malformed {
                row: index,
                field: "BBox",
                source,
            })?;
        let categorical = self.categorical(index, annotation)?;
        let continuous = self.continuous(index, annotation)?;

        let path = annotation.image_path(&self.image_root);
        debug!("Loading {:?}", path);
        let image = image::open(&path)
            .map_err(|source| SampleError::Image {
                path: path.clone(),
                source,
            })?
            .to_rgb8();

        let (x1, y1, x2, y2) = bbox.pixel_corners();
        let body = crop_padded(&image, x1, y1, x2, y2).map_err(|e| SampleError::InvalidRow {
            row: index,
            message: format!("bad body box: {}", e),
        })?;

        let context_size = self.images.context_size;
        let body_size = self.images.body_size;
        let context = resize(&image, context_size, context_size);
        let body = resize(&body, body_size, body_size);

        Ok(EmoticSample {
            context: self.pipeline.context_tensor(context)?,
            body: self.pipeline.body_tensor(body)?,
            categorical,
            continuous,
        })
    }

    fn metadata(&self) -> DatasetMetadata {
        DatasetMetadata {
            source: self.source.clone(),
            samples: self.len(),
            label_space: self.label_space,
            categorical_width: self.label_space.width(),
        }
    }
}
