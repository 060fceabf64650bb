// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/formats/src/annotations.rs

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::literal::{parse_number_list, parse_string_list, LiteralError};

/// One row of an EMOTIC annotation CSV (`train.csv`, `val.csv`, `test.csv`).
/// Columns other than these five are ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct AnnotationRow {
    #[serde(rename = "Folder")]
    pub folder: String,
    #[serde(rename = "Filename")]
    pub filename: String,
    /// Textual `[x1, y1, x2, y2]` body box in pixels.
    #[serde(rename = "BBox")]
    pub bbox: String,
    /// Textual list of category names.
    #[serde(rename = "Categorical_Labels")]
    pub categorical_labels: String,
    /// Textual list of valence, arousal, dominance on a 0..10 scale.
    #[serde(rename = "Continuous_Labels")]
    pub continuous_labels: String,
}

/// Body bounding box, corners in pixel coordinates (right/bottom exclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x1: f64,
    pub y1: f64,
    pub x2: f64,
    pub y2: f64,
}

impl BoundingBox {
    /// Corners rounded to whole pixels, halves to even. Out-of-range values
    /// saturate at the `i64` bounds.
    pub fn pixel_corners(&self) -> (i64, i64, i64, i64) {
        (
            self.x1.round_ties_even() as i64,
            self.y1.round_ties_even() as i64,
            self.x2.round_ties_even() as i64,
            self.y2.round_ties_even() as i64,
        )
    }
}

impl AnnotationRow {
    pub fn image_path(&self, image_root: &Path) -> PathBuf {
        image_root.join(&self.folder).join(&self.filename)
    }

    pub fn parse_bbox(&self) -> Result<BoundingBox, LiteralError> {
        let values = parse_number_list(&self.bbox)?;
        match values[..] {
            [x1, y1, x2, y2] => Ok(BoundingBox { x1, y1, x2, y2 }),
            _ => Err(LiteralError::WrongLength {
                expected: 4,
                found: values.len(),
            }),
        }
    }

    pub fn parse_categories(&self) -> Result<Vec<String>, LiteralError> {
        parse_string_list(&self.categorical_labels)
    }

    pub fn parse_continuous(&self) -> Result<Vec<f64>, LiteralError> {
        parse_number_list(&self.continuous_labels)
    }
}

/// Read every row of an annotation CSV.
pub fn read_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<AnnotationRow>> {
    let path = path.as_ref();
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("Failed to open annotation file {:?}", path))?;

    reader
        .deserialize::<AnnotationRow>()
        .enumerate()
        .map(|(i, row)| row.with_context(|| format!("Malformed row {} in {:?}", i, path)))
        .collect()
}
