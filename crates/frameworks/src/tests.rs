// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use crate::{
    CsvDataset, DataLoader, EmoticDataset, FrameworkConfig, Identity, LabelSpace, LoaderConfig,
    Normalization, PreprocessedDataset, SampleError, SamplePipeline,
};
use anyhow::Result;
use emotic_core::config::ImageConfig;
use emotic_core::{CategoryMapping, Emotion, EmotionGroup};
use emotic_formats::{write_image_stack, AnnotationRow, LabelMatrix};
use image::{Rgb, RgbImage};
use ndarray::{Array2, Array4};
use std::path::Path;
use std::sync::Arc;
use tempfile::TempDir;

/// Pipeline that only scales pixels to [0, 1].
fn plain_pipeline() -> SamplePipeline {
    SamplePipeline::new(
        Arc::new(Identity),
        Normalization::new([0.0; 3], [1.0; 3]).unwrap(),
        Normalization::new([0.0; 3], [1.0; 3]).unwrap(),
    )
}

fn small_images() -> ImageConfig {
    ImageConfig {
        context_size: 16,
        body_size: 8,
    }
}

fn preprocessed_arrays(n: usize) -> (Array4<u8>, Array4<u8>, Array2<f32>, Array2<f32>) {
    let context = Array4::from_shape_fn((n, 6, 8, 3), |(i, _, _, c)| (i * 10 + c) as u8);
    let body = Array4::from_elem((n, 4, 4, 3), 255u8);
    let categorical = Array2::from_shape_fn((n, Emotion::COUNT), |(i, j)| f32::from(i == j));
    let continuous = Array2::from_shape_fn((n, 3), |(i, c)| ((i + c) % 11) as f32);
    (context, body, categorical, continuous)
}

fn row(folder: &str, filename: &str, bbox: &str, cats: &str, cont: &str) -> AnnotationRow {
    AnnotationRow {
        folder: folder.to_string(),
        filename: filename.to_string(),
        bbox: bbox.to_string(),
        categorical_labels: cats.to_string(),
        continuous_labels: cont.to_string(),
    }
}

/// Writes `root/mscoco/img.png` (20×10, solid red-ish) and returns the root.
fn image_root() -> Result<TempDir> {
    let root = TempDir::new()?;
    std::fs::create_dir_all(root.path().join("mscoco"))?;
    RgbImage::from_pixel(20, 10, Rgb([255, 0, 51])).save(root.path().join("mscoco/img.png"))?;
    Ok(root)
}

fn csv_dataset(root: &Path, rows: Vec<AnnotationRow>) -> CsvDataset {
    CsvDataset::new(
        rows,
        root,
        CategoryMapping::standard(),
        small_images(),
        plain_pipeline(),
    )
}

#[test]
fn test_loader_config_validation() -> Result<()> {
    let config = FrameworkConfig::default();
    assert!(config.validate().is_ok());
    assert_eq!(config.loader.batch_size, 32);
    assert_eq!(config.loader.seed, Some(42));

    let mut invalid = config.clone();
    invalid.loader.batch_size = 0;
    assert!(invalid.validate().is_err());

    let mut bad_norm = config;
    bad_norm.emotic.normalization.body.std = [0.2, 0.0, 0.2];
    assert!(bad_norm.validate().is_err());
    Ok(())
}

#[test]
fn test_framework_config_yaml() -> Result<()> {
    let yaml = r#"
loader:
  batch_size: 8
  shuffle: false
label_space: coarse
images:
  context_size: 112
"#;
    let config = FrameworkConfig::from_yaml(yaml)?;
    assert_eq!(config.loader.batch_size, 8);
    assert!(!config.loader.shuffle);
    assert_eq!(config.loader.seed, Some(42));
    assert_eq!(config.label_space, LabelSpace::Coarse);
    assert_eq!(config.emotic.images.context_size, 112);
    assert_eq!(config.emotic.images.body_size, 128);
    config.validate()?;

    let dir = TempDir::new()?;
    let path = dir.path().join("emotic.yaml");
    std::fs::write(&path, yaml)?;
    assert_eq!(FrameworkConfig::from_yaml_file(&path)?, config);
    assert!(config.sample_pipeline().is_ok());
    Ok(())
}

#[test]
fn test_preprocessed_sample_shapes_and_scaling() -> Result<()> {
    let (context, body, categorical, continuous) = preprocessed_arrays(4);
    let dataset = PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline())?;
    assert_eq!(dataset.len(), 4);
    assert!(!dataset.is_empty());

    let sample = dataset.get(2)?;
    assert_eq!(sample.context.shape(), &[3, 6, 8]);
    assert_eq!(sample.body.shape(), &[3, 4, 4]);
    assert_eq!(sample.categorical.len(), 26);
    assert_eq!(sample.categorical[2], 1.0);
    assert_eq!(sample.categorical.sum(), 1.0);
    assert_eq!(sample.context[[1, 0, 0]], 21.0 / 255.0);
    assert!(sample.body.iter().all(|&v| v == 1.0));
    assert_eq!(sample.continuous.to_vec(), vec![0.2, 0.3, 0.4]);

    let meta = dataset.metadata();
    assert_eq!(meta.samples, 4);
    assert_eq!(meta.label_space, LabelSpace::Fine);
    Ok(())
}

#[test]
fn test_continuous_labels_within_unit_interval() -> Result<()> {
    let (context, body, categorical, continuous) = preprocessed_arrays(12);
    assert!(continuous.iter().all(|&v| (0.0..=10.0).contains(&v)));
    let dataset = PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline())?;
    for i in 0..dataset.len() {
        let sample = dataset.get(i)?;
        assert!(sample.continuous.iter().all(|&v| (0.0..=1.0).contains(&v)));
    }
    Ok(())
}

#[test]
fn test_preprocessed_rejects_mismatched_arrays() {
    let (context, body, categorical, _) = preprocessed_arrays(3);
    let short = Array2::<f32>::zeros((2, 3));
    let err = PreprocessedDataset::new(context.clone(), body.clone(), categorical.clone(), short, plain_pipeline())
        .err()
        .unwrap();
    assert!(err.to_string().contains("continuous array has 2 samples"));

    let wide = Array2::<f32>::zeros((3, 4));
    assert!(PreprocessedDataset::new(context, body, categorical, wide, plain_pipeline()).is_err());
}

#[test]
fn test_preprocessed_out_of_range() -> Result<()> {
    let (context, body, categorical, continuous) = preprocessed_arrays(2);
    let dataset = PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline())?;
    assert!(matches!(
        dataset.get(2),
        Err(SampleError::OutOfRange { index: 2, len: 2 })
    ));
    Ok(())
}

#[test]
fn test_preprocessed_from_dir() -> Result<()> {
    let dir = TempDir::new()?;
    let (context, body, categorical, continuous) = preprocessed_arrays(3);
    write_image_stack(dir.path().join("val_context_arr.npy"), &context)?;
    write_image_stack(dir.path().join("val_body_arr.npy"), &body)?;
    let coarse = CategoryMapping::standard().to_coarse::<_, f32>(&categorical)?;
    LabelMatrix::F32(coarse).write(dir.path().join("val_cat_arr.npy"))?;
    LabelMatrix::F64(continuous.mapv(f64::from)).write(dir.path().join("val_cont_arr.npy"))?;

    let dataset = PreprocessedDataset::from_dir(dir.path(), "val", plain_pipeline())?;
    assert_eq!(dataset.len(), 3);
    assert_eq!(dataset.categorical_width(), EmotionGroup::COUNT);
    assert_eq!(dataset.metadata().label_space, LabelSpace::Coarse);

    // Sample 0 is Affection → Happiness.
    let sample = dataset.get(0)?;
    assert_eq!(sample.categorical[EmotionGroup::Happiness.index()], 1.0);
    assert_eq!(sample.categorical.sum(), 1.0);

    assert!(PreprocessedDataset::from_dir(dir.path(), "test", plain_pipeline()).is_err());
    Ok(())
}

#[test]
fn test_csv_sample() -> Result<()> {
    let root = image_root()?;
    let dataset = csv_dataset(
        root.path(),
        vec![row(
            "mscoco",
            "img.png",
            "[2, 1, 10.4, 8.6]",
            "['Happiness', 'Doubt/Confusion']",
            "[5.5, 10, 0]",
        )],
    );
    let sample = dataset.get(0)?;
    assert_eq!(sample.context.shape(), &[3, 16, 16]);
    assert_eq!(sample.body.shape(), &[3, 8, 8]);

    assert_eq!(sample.categorical.len(), 26);
    assert_eq!(sample.categorical[Emotion::Happiness.index()], 1.0);
    assert_eq!(sample.categorical[Emotion::DoubtConfusion.index()], 1.0);
    assert_eq!(sample.categorical.sum(), 2.0);

    assert_eq!(sample.continuous.to_vec(), vec![0.55, 1.0, 0.0]);
    assert!(sample.continuous.iter().all(|&v| (0.0..=1.0).contains(&v)));

    let red = sample.context.index_axis(ndarray::Axis(0), 0);
    assert!(red.iter().all(|&v| (v - 1.0).abs() < 1e-6));
    let green = sample.body.index_axis(ndarray::Axis(0), 1);
    assert!(green.iter().all(|&v| v.abs() < 1e-6));
    Ok(())
}

#[test]
fn test_csv_default_image_sizes() -> Result<()> {
    let root = image_root()?;
    let dataset = CsvDataset::new(
        vec![row("mscoco", "img.png", "[0, 0, 20, 10]", "['Pain']", "[1, 2, 3]")],
        root.path(),
        CategoryMapping::standard(),
        ImageConfig::default(),
        plain_pipeline(),
    );
    let sample = dataset.get(0)?;
    assert_eq!(sample.context.shape(), &[3, 224, 224]);
    assert_eq!(sample.body.shape(), &[3, 128, 128]);
    Ok(())
}

#[test]
fn test_csv_body_box_outside_image_is_padded() -> Result<()> {
    let root = image_root()?;
    let dataset = csv_dataset(
        root.path(),
        vec![row("mscoco", "img.png", "(-4, -4, 4, 4)", "['Fear']", "[1, 1, 1]")],
    );
    let sample = dataset.get(0)?;
    assert_eq!(sample.body.shape(), &[3, 8, 8]);
    // Top-left quadrant is padding, bottom-right is image.
    assert_eq!(sample.body[[0, 0, 0]], 0.0);
    assert!((sample.body[[0, 7, 7]] - 1.0).abs() < 1e-6);
    Ok(())
}

#[test]
fn test_csv_unreasonable_body_box_is_rejected() -> Result<()> {
    let root = image_root()?;
    for bbox in [
        "[-1e300, 0, 10, 10]",
        "[0, 0, 200000, 200000]",
        "[30, 0, 40, 5]",
    ] {
        let dataset = csv_dataset(
            root.path(),
            vec![row("mscoco", "img.png", bbox, "['Fear']", "[1, 1, 1]")],
        );
        let result = dataset.get(0);
        assert!(
            matches!(result, Err(SampleError::InvalidRow { row: 0, .. })),
            "{bbox} should be rejected"
        );
    }
    Ok(())
}

#[test]
fn test_csv_coarse_label_space() -> Result<()> {
    let root = image_root()?;
    let dataset = csv_dataset(
        root.path(),
        vec![row(
            "mscoco",
            "img.png",
            "[0, 0, 5, 5]",
            "['Anger', 'Annoyance', 'Pain']",
            "[4, 5, 6]",
        )],
    )
    .with_label_space(LabelSpace::Coarse);

    let sample = dataset.get(0)?;
    assert_eq!(sample.categorical.len(), 6);
    assert_eq!(sample.categorical[EmotionGroup::Anger.index()], 1.0);
    assert_eq!(sample.categorical[EmotionGroup::Disconnection.index()], 1.0);
    assert_eq!(sample.categorical.sum(), 2.0);
    assert_eq!(dataset.metadata().categorical_width, 6);
    Ok(())
}

#[test]
fn test_csv_sample_errors() -> Result<()> {
    let root = image_root()?;
    let dataset = csv_dataset(
        root.path(),
        vec![
            row("mscoco", "missing.png", "[0, 0, 5, 5]", "['Peace']", "[1, 2, 3]"),
            row("mscoco", "img.png", "[0, 0, 5]", "['Peace']", "[1, 2, 3]"),
            row("mscoco", "img.png", "[0, 0, 5, 5]", "['Joy']", "[1, 2, 3]"),
            row("mscoco", "img.png", "[0, 0, 5, 5]", "['Peace'", "[1, 2, 3]"),
            row("mscoco", "img.png", "[0, 0, 5, 5]", "['Peace']", "[1, 2]"),
        ],
    );

    assert!(matches!(dataset.get(0), Err(SampleError::Image { .. })));
    assert!(matches!(
        dataset.get(1),
        Err(SampleError::Malformed { row: 1, field: "BBox", .. })
    ));
    assert!(matches!(
        dataset.get(2),
        Err(SampleError::UnknownCategory { row: 2, .. })
    ));
    assert!(matches!(
        dataset.get(3),
        Err(SampleError::Malformed { row: 3, field: "Categorical_Labels", .. })
    ));
    assert!(matches!(dataset.get(4), Err(SampleError::InvalidRow { row: 4, .. })));
    assert!(matches!(dataset.get(5), Err(SampleError::OutOfRange { .. })));
    Ok(())
}

#[test]
fn test_csv_from_file() -> Result<()> {
    let root = image_root()?;
    let csv_path = root.path().join("train.csv");
    std::fs::write(
        &csv_path,
        "Folder,Filename,BBox,Categorical_Labels,Continuous_Labels\n\
         mscoco,img.png,\"[0, 0, 5, 5]\",\"['Peace']\",\"[1, 2, 3]\"\n\
         mscoco,img.png,\"[5, 0, 10, 5]\",\"['Sympathy']\",\"[3, 2, 1]\"\n",
    )?;
    let dataset = CsvDataset::from_csv(
        &csv_path,
        root.path(),
        CategoryMapping::standard(),
        small_images(),
        plain_pipeline(),
    )?;
    assert_eq!(dataset.len(), 2);
    assert_eq!(dataset.rows()[1].categorical_labels, "['Sympathy']");
    assert_eq!(dataset.get(1)?.categorical[Emotion::Sympathy.index()], 1.0);
    Ok(())
}

#[test]
fn test_data_loader_batches() -> Result<()> {
    let (context, body, categorical, continuous) = preprocessed_arrays(10);
    let dataset = PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline())?;
    let config = LoaderConfig {
        batch_size: 4,
        shuffle: false,
        seed: None,
        drop_last: false,
    };
    let loader = DataLoader::new(dataset, config)?;
    assert_eq!(loader.num_batches(), 3);

    let batches = loader.iter().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(batches.len(), 3);
    assert_eq!(batches[0].indices, vec![0, 1, 2, 3]);
    assert_eq!(batches[0].context.shape(), &[4, 3, 6, 8]);
    assert_eq!(batches[0].body.shape(), &[4, 3, 4, 4]);
    assert_eq!(batches[0].categorical.shape(), &[4, 26]);
    assert_eq!(batches[0].continuous.shape(), &[4, 3]);
    assert_eq!(batches[2].len(), 2);
    Ok(())
}

#[test]
fn test_data_loader_drop_last_and_shuffle() -> Result<()> {
    let (context, body, categorical, continuous) = preprocessed_arrays(10);
    let dataset = PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline())?;
    let config = LoaderConfig {
        batch_size: 3,
        shuffle: true,
        seed: Some(7),
        drop_last: true,
    };
    let mut loader = DataLoader::new(dataset, config)?;
    assert_eq!(loader.num_batches(), 3);

    let first = loader.epoch_indices();
    assert_eq!(first, loader.epoch_indices());
    let mut sorted = first.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..10).collect::<Vec<_>>());

    let batches = loader.iter().collect::<Result<Vec<_>, _>>()?;
    assert_eq!(batches.len(), 3);
    assert!(batches.iter().all(|b| b.len() == 3));
    assert_eq!(batches[0].indices, first[..3].to_vec());

    assert_eq!(loader.next_epoch(), 1);
    let mut second = loader.epoch_indices();
    second.sort_unstable();
    assert_eq!(second, sorted);
    loader.reset_epoch();
    assert_eq!(loader.epoch_indices(), first);
    Ok(())
}

#[test]
fn test_data_loader_rejects_zero_batch() {
    let (context, body, categorical, continuous) = preprocessed_arrays(1);
    let dataset =
        PreprocessedDataset::new(context, body, categorical, continuous, plain_pipeline()).unwrap();
    let config = LoaderConfig {
        batch_size: 0,
        ..LoaderConfig::default()
    };
    assert!(DataLoader::new(dataset, config).is_err());
}

#[test]
fn test_data_loader_surfaces_sample_errors() -> Result<()> {
    let root = image_root()?;
    let dataset = csv_dataset(
        root.path(),
        vec![
            row("mscoco", "img.png", "[0, 0, 5, 5]", "['Peace']", "[1, 2, 3]"),
            row("mscoco", "gone.png", "[0, 0, 5, 5]", "['Peace']", "[1, 2, 3]"),
        ],
    );
    let config = LoaderConfig {
        batch_size: 2,
        shuffle: false,
        ..LoaderConfig::default()
    };
    let loader = DataLoader::new(dataset, config)?;
    let results: Vec<_> = loader.iter().collect();
    assert_eq!(results.len(), 1);
    assert!(matches!(results[0], Err(SampleError::Image { .. })));
    Ok(())
}
