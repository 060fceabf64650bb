// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/formats/src/lib.rs
//
// On-disk formats of a pre-processed EMOTIC dataset: `.npy` label and image
// arrays plus the annotation CSVs with their Python-literal cells.
pub mod annotations;
pub mod literal;
pub mod npy;

pub use annotations::{read_annotations, AnnotationRow, BoundingBox};
pub use literal::{parse_number_list, parse_string_list, LiteralError};
pub use npy::{read_image_stack, write_image_stack, LabelMatrix};

/// Split names used for the per-split files of a pre-processed dataset.
pub const SPLITS: [&str; 3] = ["train", "val", "test"];

/// `{split}_cat_arr.npy`
pub fn categorical_file(split: &str) -> String {
    format!("{}_cat_arr.npy", split)
}

/// `{split}_cont_arr.npy`
pub fn continuous_file(split: &str) -> String {
    format!("{}_cont_arr.npy", split)
}

/// `{split}_context_arr.npy`
pub fn context_file(split: &str) -> String {
    format!("{}_context_arr.npy", split)
}

/// `{split}_body_arr.npy`
pub fn body_file(split: &str) -> String {
    format!("{}_body_arr.npy", split)
}

/// `{split}.csv`
pub fn annotation_file(split: &str) -> String {
    format!("{}.csv", split)
}
