// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

// crates/formats/src/npy.rs

use anyhow::{bail, Context, Result};
use ndarray::{Array2, Array4};
use ndarray_npy::{read_npy, write_npy, ReadNpyError};
use std::path::Path;

/// A 2-D label array as stored in a `.npy` file, keeping the on-disk dtype so
/// that a converted file can be written back with the same element type.
#[derive(Debug, Clone, PartialEq)]
pub enum LabelMatrix {
    Bool(Array2<bool>),
    U8(Array2<u8>),
    I32(Array2<i32>),
    I64(Array2<i64>),
    F32(Array2<f32>),
    F64(Array2<f64>),
}

impl LabelMatrix {
    /// Read a 2-D `.npy` array of any supported dtype.
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // ndarray-npy checks the descriptor before decoding, so a mismatch is cheap.
        macro_rules! try_dtype {
            ($variant:ident, $ty:ty) => {
                match read_npy::<_, Array2<$ty>>(path) {
                    Ok(array) => return Ok(LabelMatrix::$variant(array)),
                    Err(ReadNpyError::WrongDescriptor(_)) => {}
                    Err(e) => {
                        return Err(e)
                            .with_context(|| format!("Failed to read label array {:?}", path))
                    }
                }
            };
        }

        try_dtype!(Bool, bool);
        try_dtype!(U8, u8);
        try_dtype!(I32, i32);
        try_dtype!(I64, i64);
        try_dtype!(F32, f32);
        try_dtype!(F64, f64);

        bail!(
            "Unsupported dtype in {:?}: expected bool, uint8, int32, int64, float32 or float64",
            path
        )
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let result = match self {
            LabelMatrix::Bool(a) => write_npy(path, a),
            LabelMatrix::U8(a) => write_npy(path, a),
            LabelMatrix::I32(a) => write_npy(path, a),
            LabelMatrix::I64(a) => write_npy(path, a),
            LabelMatrix::F32(a) => write_npy(path, a),
            LabelMatrix::F64(a) => write_npy(path, a),
        };
        result.with_context(|| format!("Failed to write label array {:?}", path))
    }

    /// numpy-style dtype name.
    pub fn dtype(&self) -> &'static str {
        match self {
            LabelMatrix::Bool(_) => "bool",
            LabelMatrix::U8(_) => "uint8",
            LabelMatrix::I32(_) => "int32",
            LabelMatrix::I64(_) => "int64",
            LabelMatrix::F32(_) => "float32",
            LabelMatrix::F64(_) => "float64",
        }
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        match self {
            LabelMatrix::Bool(a) => a.dim(),
            LabelMatrix::U8(a) => a.dim(),
            LabelMatrix::I32(a) => a.dim(),
            LabelMatrix::I64(a) => a.dim(),
            LabelMatrix::F32(a) => a.dim(),
            LabelMatrix::F64(a) => a.dim(),
        }
    }

    /// Number of strictly positive entries in each row.
    pub fn positive_per_row(&self) -> Vec<usize> {
        self.to_f64()
            .outer_iter()
            .map(|row| row.iter().filter(|&&v| v > 0.0).count())
            .collect()
    }

    pub fn to_f32(&self) -> Array2<f32> {
        match self {
            LabelMatrix::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
            LabelMatrix::U8(a) => a.mapv(f32::from),
            LabelMatrix::I32(a) => a.mapv(|v| v as f32),
            LabelMatrix::I64(a) => a.mapv(|v| v as f32),
            LabelMatrix::F32(a) => a.clone(),
            LabelMatrix::F64(a) => a.mapv(|v| v as f32),
        }
    }

    pub fn to_f64(&self) -> Array2<f64> {
        match self {
            LabelMatrix::Bool(a) => a.mapv(|v| if v { 1.0 } else { 0.0 }),
            LabelMatrix::U8(a) => a.mapv(f64::from),
            LabelMatrix::I32(a) => a.mapv(f64::from),
            LabelMatrix::I64(a) => a.mapv(|v| v as f64),
            LabelMatrix::F32(a) => a.mapv(f64::from),
            LabelMatrix::F64(a) => a.clone(),
        }
    }
}

/// Read an `(N, H, W, C)` stack of 8-bit images.
pub fn read_image_stack<P: AsRef<Path>>(path: P) -> Result<Array4<u8>> {
    let path = path.as_ref();
    read_npy(path).with_context(|| format!("Failed to read image array {:?}", path))
}

pub fn write_image_stack<P: AsRef<Path>>(path: P, images: &Array4<u8>) -> Result<()> {
    let path = path.as_ref();
    write_npy(path, images).with_context(|| format!("Failed to write image array {:?}", path))
}
