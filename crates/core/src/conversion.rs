// src/conversion.rs
//
// Rewrites the categorical label files of a pre-processed EMOTIC dataset from
// 26 to 6 columns and carries the remaining artifacts over unchanged.

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

use emotic_formats::{
    annotation_file, body_file, categorical_file, context_file, continuous_file, LabelMatrix, SPLITS,
};

use crate::categories::CategoryMapping;
use crate::metrics::{ConversionReport, ConvertedFile, LabelStats};

/// Which files a conversion touches, relative to the data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConversionPlan {
    /// 26-column label arrays to convert.
    pub label_files: Vec<String>,
    /// Files copied byte-for-byte.
    pub auxiliary_files: Vec<String>,
}

impl Default for ConversionPlan {
    fn default() -> Self {
        let label_files = SPLITS.iter().map(|s| categorical_file(s)).collect();

        let mut auxiliary_files: Vec<String> = SPLITS
            .iter()
            .flat_map(|s| [context_file(s), body_file(s), continuous_file(s)])
            .collect();
        auxiliary_files.extend(SPLITS.iter().map(|s| annotation_file(s)));

        Self {
            label_files,
            auxiliary_files,
        }
    }
}

/// Converts a data directory according to a [`ConversionPlan`].
pub struct DatasetConverter {
    plan: ConversionPlan,
    mapping: CategoryMapping,
}

impl DatasetConverter {
    pub fn new(plan: ConversionPlan, mapping: CategoryMapping) -> Self {
        Self { plan, mapping }
    }

    /// Convert every label file found in `data_path`, writing into
    /// `output_path` (defaults to `data_path`).
    ///
    /// Missing files are logged and skipped. A label file that cannot be
    /// read or does not have 26 columns aborts the run.
    pub fn convert(&self, data_path: &Path, output_path: Option<&Path>) -> Result<ConversionReport> {
        if !data_path.is_dir() {
            bail!("Data path {:?} does not exist or is not a directory", data_path);
        }
        let output_path = output_path.unwrap_or(data_path);
        fs::create_dir_all(output_path)
            .with_context(|| format!("Failed to create output directory {:?}", output_path))?;

        let start = Instant::now();
        let mut report = ConversionReport::new(data_path, output_path);

        info!("Converting emotion categories from 26 to 6");
        info!("Input directory: {:?}", data_path);
        info!("Output directory: {:?}", output_path);

        for filename in &self.plan.label_files {
            let input_file = data_path.join(filename);
            if !input_file.is_file() {
                warn!("{:?} not found, skipping", input_file);
                report.record_skipped(filename);
                continue;
            }
            let converted = self
                .convert_file(&input_file, &output_path.join(filename))
                .with_context(|| format!("Failed to convert {}", filename))?;
            report.record_converted(converted);
        }

        let same_dir = same_directory(data_path, output_path);
        for filename in &self.plan.auxiliary_files {
            let input_file = data_path.join(filename);
            if !input_file.is_file() {
                warn!("{} not found, skipping", filename);
                report.record_skipped(filename);
                continue;
            }
            if same_dir {
                debug!("{} already in the output directory", filename);
                report.record_in_place(filename);
                continue;
            }
            let output_file = output_path.join(filename);
            let bytes = fs::copy(&input_file, &output_file)
                .with_context(|| format!("Failed to copy {:?} to {:?}", input_file, output_file))?;
            info!("Copied {} ({} bytes)", filename, bytes);
            report.record_copied(filename, bytes);
        }

        report.record_total_time(start.elapsed());
        info!(
            "Conversion complete: {} converted, {} copied, {} skipped",
            report.converted.len(),
            report.copied.len(),
            report.skipped.len()
        );
        Ok(report)
    }

    fn convert_file(&self, input_file: &Path, output_file: &Path) -> Result<ConvertedFile> {
        let filename = input_file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();

        let labels_26 = LabelMatrix::read(input_file)?;
        info!("Converting {} with shape {:?}", filename, labels_26.shape());

        let labels_6 = self.mapping.matrix_to_coarse(&labels_26)?;
        labels_6.write(output_file)?;

        let converted = ConvertedFile {
            filename,
            output: output_file.to_path_buf(),
            dtype: labels_26.dtype().to_string(),
            original_shape: labels_26.shape(),
            converted_shape: labels_6.shape(),
            original_stats: LabelStats::from_counts(&labels_26.positive_per_row()),
            converted_stats: LabelStats::from_counts(&labels_6.positive_per_row()),
        };
        info!(
            "Saved {:?} {:?}; labels per sample {} → {}",
            output_file, converted.converted_shape, converted.original_stats, converted.converted_stats
        );
        Ok(converted)
    }
}

/// Convert with the default plan and the standard mapping.
pub fn convert_data_files(data_path: &Path, output_path: Option<&Path>) -> Result<ConversionReport> {
    DatasetConverter::new(ConversionPlan::default(), CategoryMapping::standard())
        .convert(data_path, output_path)
}

fn same_directory(a: &Path, b: &Path) -> bool {
    match (a.canonicalize(), b.canonicalize()) {
        (Ok(a), Ok(b)) => a == b,
        _ => a == b,
    }
}
