// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// src/labels.rs
//
// Conversion of multi-label matrices between the 26-way and 6-way systems.

use emotic_formats::LabelMatrix;
use ndarray::{Array1, Array2, ArrayBase, Data, Ix1, Ix2};
use thiserror::Error;

use crate::categories::{standard_mapping, CategoryMapping, Emotion, EmotionGroup};

/// Element type of a binary label array.
pub trait LabelValue: Copy {
    fn is_set(self) -> bool;
    /// `1` for `true`, `0` for `false`.
    fn from_flag(flag: bool) -> Self;
}

impl LabelValue for bool {
    fn is_set(self) -> bool {
        self
    }
    fn from_flag(flag: bool) -> Self {
        flag
    }
}

macro_rules! impl_label_value {
    ($($ty:ty => $zero:expr, $one:expr);* $(;)?) => {
        $(
            impl LabelValue for $ty {
                fn is_set(self) -> bool {
                    self != $zero
                }
                fn from_flag(flag: bool) -> Self {
                    if flag { $one } else { $zero }
                }
            }
        )*
    };
}

impl_label_value! {
    u8 => 0, 1;
    i32 => 0, 1;
    i64 => 0, 1;
    f32 => 0.0, 1.0;
    f64 => 0.0, 1.0;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("expected a label array with {expected} columns, found {found}")]
pub struct LabelShapeError {
    pub expected: usize,
    pub found: usize,
}

fn check_columns(found: usize, expected: usize) -> Result<(), LabelShapeError> {
    if found == expected {
        Ok(())
    } else {
        Err(LabelShapeError { expected, found })
    }
}

impl CategoryMapping {
    /// (N × 26) → (N × 6). A group column is set iff any of its member
    /// columns is set; output values are the element type's 0/1.
    pub fn to_coarse<S, T>(&self, labels: &ArrayBase<S, Ix2>) -> Result<Array2<T>, LabelShapeError>
    where
        S: Data<Elem = T>,
        T: LabelValue,
    {
        let (rows, cols) = labels.dim();
        check_columns(cols, Emotion::COUNT)?;

        let mut out = Array2::from_elem((rows, EmotionGroup::COUNT), T::from_flag(false));
        for (src, mut dst) in labels.outer_iter().zip(out.outer_iter_mut()) {
            let flags = self.group_flags(src.iter().copied());
            for (d, flag) in dst.iter_mut().zip(flags) {
                *d = T::from_flag(flag);
            }
        }
        Ok(out)
    }

    /// (N × 6) → (N × 26). Every member column receives its group's value.
    ///
    /// This is lossy: which members were originally present cannot be
    /// recovered, so a partially set group comes back fully set.
    pub fn to_fine<S, T>(&self, labels: &ArrayBase<S, Ix2>) -> Result<Array2<T>, LabelShapeError>
    where
        S: Data<Elem = T>,
        T: LabelValue,
    {
        let (rows, cols) = labels.dim();
        check_columns(cols, EmotionGroup::COUNT)?;

        let mut out = Array2::from_elem((rows, Emotion::COUNT), T::from_flag(false));
        for (fine, &coarse) in self.fine_to_coarse.iter().enumerate() {
            out.column_mut(fine).assign(&labels.column(coarse));
        }
        Ok(out)
    }

    /// Single 26-way vector → 6-way vector.
    pub fn row_to_coarse<S, T>(&self, row: &ArrayBase<S, Ix1>) -> Result<Array1<T>, LabelShapeError>
    where
        S: Data<Elem = T>,
        T: LabelValue,
    {
        check_columns(row.len(), Emotion::COUNT)?;
        Ok(self
            .group_flags(row.iter().copied())
            .into_iter()
            .map(T::from_flag)
            .collect())
    }

    /// 26 → 6 on a dtype-tagged matrix read from disk.
    pub fn matrix_to_coarse(&self, labels: &LabelMatrix) -> Result<LabelMatrix, LabelShapeError> {
        Ok(match labels {
            LabelMatrix::Bool(a) => LabelMatrix::Bool(self.to_coarse(a)?),
            LabelMatrix::U8(a) => LabelMatrix::U8(self.to_coarse(a)?),
            LabelMatrix::I32(a) => LabelMatrix::I32(self.to_coarse(a)?),
            LabelMatrix::I64(a) => LabelMatrix::I64(self.to_coarse(a)?),
            LabelMatrix::F32(a) => LabelMatrix::F32(self.to_coarse(a)?),
            LabelMatrix::F64(a) => LabelMatrix::F64(self.to_coarse(a)?),
        })
    }

    /// 6 → 26 on a dtype-tagged matrix; lossy, see [`CategoryMapping::to_fine`].
    pub fn matrix_to_fine(&self, labels: &LabelMatrix) -> Result<LabelMatrix, LabelShapeError> {
        Ok(match labels {
            LabelMatrix::Bool(a) => LabelMatrix::Bool(self.to_fine(a)?),
            LabelMatrix::U8(a) => LabelMatrix::U8(self.to_fine(a)?),
            LabelMatrix::I32(a) => LabelMatrix::I32(self.to_fine(a)?),
            LabelMatrix::I64(a) => LabelMatrix::I64(self.to_fine(a)?),
            LabelMatrix::F32(a) => LabelMatrix::F32(self.to_fine(a)?),
            LabelMatrix::F64(a) => LabelMatrix::F64(self.to_fine(a)?),
        })
    }

    fn group_flags<T: LabelValue>(
        &self,
        values: impl Iterator<Item = T>,
    ) -> [bool; EmotionGroup::COUNT] {
        let mut flags = [false; EmotionGroup::COUNT];
        for (fine, value) in values.enumerate() {
            if value.is_set() {
                flags[self.fine_to_coarse[fine]] = true;
            }
        }
        flags
    }
}

/// Collapse (N × 26) labels to (N × 6) with the standard partition.
pub fn convert_labels_26_to_6<S, T>(labels_26: &ArrayBase<S, Ix2>) -> Result<Array2<T>, LabelShapeError>
where
    S: Data<Elem = T>,
    T: LabelValue,
{
    standard_mapping().to_coarse(labels_26)
}

/// Broadcast (N × 6) labels back to (N × 26) with the standard partition. Lossy.
pub fn convert_labels_6_to_26<S, T>(labels_6: &ArrayBase<S, Ix2>) -> Result<Array2<T>, LabelShapeError>
where
    S: Data<Elem = T>,
    T: LabelValue,
{
    standard_mapping().to_fine(labels_6)
}
