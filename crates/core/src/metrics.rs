use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Mean and population standard deviation of the number of active labels
/// per sample.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct LabelStats {
    pub samples: usize,
    pub mean: f64,
    pub std: f64,
}

impl LabelStats {
    /// An empty slice yields zeros.
    pub fn from_counts(counts: &[usize]) -> Self {
        if counts.is_empty() {
            return Self::default();
        }
        let n = counts.len() as f64;
        let mean = counts.iter().sum::<usize>() as f64 / n;
        let variance = counts
            .iter()
            .map(|&c| {
                let d = c as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        Self {
            samples: counts.len(),
            mean,
            std: variance.sqrt(),
        }
    }
}

impl fmt::Display for LabelStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.2} ± {:.2}", self.mean, self.std)
    }
}

/// One converted label file.
#[derive(Debug, Clone, Serialize)]
pub struct ConvertedFile {
    pub filename: String,
    pub output: PathBuf,
    pub dtype: String,
    pub original_shape: (usize, usize),
    pub converted_shape: (usize, usize),
    pub original_stats: LabelStats,
    pub converted_stats: LabelStats,
}

/// Outcome of a conversion run
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConversionReport {
    pub input_dir: PathBuf,
    pub output_dir: PathBuf,
    pub converted: Vec<ConvertedFile>,
    pub copied: Vec<String>,
    /// Auxiliary files left untouched because input and output directories coincide.
    pub in_place: Vec<String>,
    pub skipped: Vec<String>,
    pub bytes_copied: u64,
    pub total_time: Option<Duration>,
}

impl ConversionReport {
    pub fn new(input_dir: &Path, output_dir: &Path) -> Self {
        Self {
            input_dir: input_dir.to_path_buf(),
            output_dir: output_dir.to_path_buf(),
            ..Self::default()
        }
    }

    pub fn record_converted(&mut self, file: ConvertedFile) {
        self.converted.push(file);
    }

    pub fn record_copied(&mut self, filename: &str, bytes: u64) {
        self.copied.push(filename.to_string());
        self.bytes_copied += bytes;
    }

    pub fn record_in_place(&mut self, filename: &str) {
        self.in_place.push(filename.to_string());
    }

    pub fn record_skipped(&mut self, filename: &str) {
        self.skipped.push(filename.to_string());
    }

    pub fn record_total_time(&mut self, duration: Duration) {
        self.total_time = Some(duration);
    }

    /// True when nothing was skipped.
    pub fn is_complete(&self) -> bool {
        self.skipped.is_empty()
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn print_summary(&self) {
        println!("\n=== 26 → 6 Category Conversion ===");
        println!("Input directory:  {}", self.input_dir.display());
        println!("Output directory: {}", self.output_dir.display());

        for file in &self.converted {
            println!(
                "{}: {:?} → {:?} ({})",
                file.filename, file.original_shape, file.converted_shape, file.dtype
            );
            println!("  Non-zero labels per sample (26): {}", file.original_stats);
            println!("  Non-zero labels per sample (6):  {}", file.converted_stats);
        }

        if self.bytes_copied < 1024 * 1024 {
            println!(
                "Copied {} files ({:.2} KB)",
                self.copied.len(),
                self.bytes_copied as f64 / 1024.0
            );
        } else {
            println!(
                "Copied {} files ({:.2} MB)",
                self.copied.len(),
                self.bytes_copied as f64 / (1024.0 * 1024.0)
            );
        }

        if !self.in_place.is_empty() {
            println!("Already in place: {}", self.in_place.len());
        }
        if !self.skipped.is_empty() {
            println!("Skipped (not found): {}", self.skipped.join(", "));
        }
        if let Some(total_time) = self.total_time {
            println!("Total Time: {:?}", total_time);
        }
        println!("==================================\n");
    }
}
