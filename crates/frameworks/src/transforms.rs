// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

//! Image-side preprocessing shared by both dataset adapters: pixel-space
//! transforms, HWC→CHW tensor conversion, per-channel normalization,
//! cropping and resizing.

use std::sync::Arc;

use anyhow::{bail, Result};
use emotic_core::config::NormStats;
use image::imageops::{self, FilterType};
use image::RgbImage;
use ndarray::{Array3, ArrayView3, Axis};
use rand::Rng;

/// A transform applied to an RGB image before it becomes a tensor.
pub trait ImageTransform: Send + Sync {
    fn apply(&self, image: RgbImage) -> RgbImage;
}

/// Leaves the image as is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl ImageTransform for Identity {
    fn apply(&self, image: RgbImage) -> RgbImage {
        image
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct HorizontalFlip;

impl ImageTransform for HorizontalFlip {
    fn apply(&self, image: RgbImage) -> RgbImage {
        imageops::flip_horizontal(&image)
    }
}

/// Mirrors the image with the given probability, using the thread-local RNG.
#[derive(Debug, Clone, Copy)]
pub struct RandomHorizontalFlip {
    probability: f64,
}

impl RandomHorizontalFlip {
    pub fn new(probability: f64) -> Self {
        Self {
            probability: probability.clamp(0.0, 1.0),
        }
    }
}

impl Default for RandomHorizontalFlip {
    fn default() -> Self {
        Self::new(0.5)
    }
}

impl ImageTransform for RandomHorizontalFlip {
    fn apply(&self, image: RgbImage) -> RgbImage {
        if rand::rng().random_bool(self.probability) {
            imageops::flip_horizontal(&image)
        } else {
            image
        }
    }
}

/// Resize to a fixed `width × height` (bicubic).
#[derive(Debug, Clone, Copy)]
pub struct Resize {
    pub width: u32,
    pub height: u32,
}

impl ImageTransform for Resize {
    fn apply(&self, image: RgbImage) -> RgbImage {
        resize(&image, self.width, self.height)
    }
}

/// Applies transforms in order.
#[derive(Default)]
pub struct Compose {
    steps: Vec<Box<dyn ImageTransform>>,
}

impl Compose {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn then<T: ImageTransform + 'static>(mut self, step: T) -> Self {
        self.steps.push(Box::new(step));
        self
    }
}

impl ImageTransform for Compose {
    fn apply(&self, image: RgbImage) -> RgbImage {
        self.steps.iter().fold(image, |img, step| step.apply(img))
    }
}

/// Per-channel `(x - mean) / std` on a CHW tensor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    mean: [f32; 3],
    std: [f32; 3],
}

impl Normalization {
    pub fn new(mean: [f32; 3], std: [f32; 3]) -> Result<Self> {
        NormStats { mean, std }.validate("image")?;
        Ok(Self { mean, std })
    }

    pub fn mean(&self) -> [f32; 3] {
        self.mean
    }

    pub fn std(&self) -> [f32; 3] {
        self.std
    }

    pub fn apply(&self, tensor: &mut Array3<f32>) -> Result<()> {
        if tensor.len_of(Axis(0)) != 3 {
            bail!(
                "normalization expects 3 channels, tensor has shape {:?}",
                tensor.shape()
            );
        }
        for (c, mut channel) in tensor.axis_iter_mut(Axis(0)).enumerate() {
            let (mean, std) = (self.mean[c], self.std[c]);
            channel.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(())
    }
}

impl TryFrom<NormStats> for Normalization {
    type Error = anyhow::Error;

    fn try_from(stats: NormStats) -> Result<Self> {
        Self::new(stats.mean, stats.std)
    }
}

/// HWC `u8` image → CHW `f32` tensor scaled to `[0, 1]`.
pub fn to_tensor(image: &RgbImage) -> Array3<f32> {
    let (width, height) = image.dimensions();
    Array3::from_shape_fn((3, height as usize, width as usize), |(c, y, x)| {
        f32::from(image.get_pixel(x as u32, y as u32)[c]) / 255.0
    })
}

/// View an `(H, W, 3)` array as an RGB image. `None` when the channel count
/// is not 3.
pub fn image_from_hwc(pixels: ArrayView3<u8>) -> Option<RgbImage> {
    let (height, width, channels) = pixels.dim();
    if channels != 3 {
        return None;
    }
    RgbImage::from_raw(width as u32, height as u32, pixels.iter().copied().collect())
}

/// Bicubic resize.
pub fn resize(image: &RgbImage, width: u32, height: u32) -> RgbImage {
    if image.dimensions() == (width, height) {
        return image.clone();
    }
    imageops::resize(image, width, height, FilterType::CatmullRom)
}

/// A crop may extend past the image by at most this many image widths
/// (heights) in total.
pub const MAX_CROP_SCALE: i64 = 4;

/// Crop the box `[x1, x2) × [y1, y2)`. Parts of the box that fall outside the
/// image come back black, so the result is always `(x2 - x1) × (y2 - y1)`.
///
/// The box must overlap the image and be no larger than
/// [`MAX_CROP_SCALE`] times the image in either direction.
pub fn crop_padded(image: &RgbImage, x1: i64, y1: i64, x2: i64, y2: i64) -> Result<RgbImage> {
    if x2 <= x1 || y2 <= y1 {
        bail!("empty crop box [{}, {}, {}, {}]", x1, y1, x2, y2);
    }
    let (img_w, img_h) = image.dimensions();
    let (img_w, img_h) = (i64::from(img_w), i64::from(img_h));
    if x2 <= 0 || y2 <= 0 || x1 >= img_w || y1 >= img_h {
        bail!(
            "crop box [{}, {}, {}, {}] does not overlap the {}x{} image",
            x1, y1, x2, y2, img_w, img_h
        );
    }

    let (width, height) = match (x2.checked_sub(x1), y2.checked_sub(y1)) {
        (Some(w), Some(h)) if w <= MAX_CROP_SCALE * img_w && h <= MAX_CROP_SCALE * img_h => (w, h),
        _ => bail!(
            "crop box [{}, {}, {}, {}] is too large for the {}x{} image",
            x1, y1, x2, y2, img_w, img_h
        ),
    };
    let width = u32::try_from(width)?;
    let height = u32::try_from(height)?;

    let inside = x1 >= 0 && y1 >= 0 && x2 <= img_w && y2 <= img_h;
    if inside {
        return Ok(imageops::crop_imm(image, x1 as u32, y1 as u32, width, height).to_image());
    }

    let (Some(offset_x), Some(offset_y)) = (x1.checked_neg(), y1.checked_neg()) else {
        bail!("crop box [{}, {}, {}, {}] is out of range", x1, y1, x2, y2);
    };
    let mut canvas = RgbImage::new(width, height);
    imageops::replace(&mut canvas, image, offset_x, offset_y);
    Ok(canvas)
}

/// Everything that turns a context/body image pair into normalized tensors.
#[derive(Clone)]
pub struct SamplePipeline {
    transform: Arc<dyn ImageTransform>,
    context_norm: Normalization,
    body_norm: Normalization,
}

impl SamplePipeline {
    pub fn new(
        transform: Arc<dyn ImageTransform>,
        context_norm: Normalization,
        body_norm: Normalization,
    ) -> Self {
        Self {
            transform,
            context_norm,
            body_norm,
        }
    }

    /// No augmentation, normalization from the given statistics.
    pub fn from_stats(context: NormStats, body: NormStats) -> Result<Self> {
        Ok(Self::new(
            Arc::new(Identity),
            context.try_into()?,
            body.try_into()?,
        ))
    }

    pub fn with_transform(mut self, transform: Arc<dyn ImageTransform>) -> Self {
        self.transform = transform;
        self
    }

    pub fn context_tensor(&self, image: RgbImage) -> Result<Array3<f32>> {
        let mut tensor = to_tensor(&self.transform.apply(image));
        self.context_norm.apply(&mut tensor)?;
        Ok(tensor)
    }

    pub fn body_tensor(&self, image: RgbImage) -> Result<Array3<f32>> {
        let mut tensor = to_tensor(&self.transform.apply(image));
        self.body_norm.apply(&mut tensor)?;
        Ok(tensor)
    }
}
