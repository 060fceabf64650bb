// SPDX-FileCopyrightText: 2025 Russ Fellows <russ.fellows@gmail.com>
// SPDX-License-Identifier: GPL-3.0-or-later

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use emotic_core::{CategoryMapping, DatasetConverter, EmoticConfig};
use emotic_formats::annotation_file;
use emotic_frameworks::{
    CsvDataset, EmoticDataset, EmoticSample, FrameworkConfig, LabelSpace, PreprocessedDataset,
};

/// emotic – EMOTIC label conversion (26 → 6 categories) and dataset inspection
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert the categorical label files of a pre-processed dataset from 26 to 6 categories
    Convert {
        /// Directory holding the pre-processed `.npy` and `.csv` files
        #[arg(long, alias = "data_path")]
        data_path: PathBuf,

        /// Where to write the converted dataset (defaults to --data-path)
        #[arg(long, alias = "output_path")]
        output_path: Option<PathBuf>,

        /// YAML config overriding the file list or the mapping
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Write the conversion report as JSON to this file
        #[arg(long)]
        report: Option<PathBuf>,
    },
    /// Print the 26 categories, the 6 groups and the mapping between them
    Mapping {
        /// YAML config with a mapping override
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Load one sample through a dataset adapter and summarize it
    Inspect {
        /// Directory holding the pre-processed arrays (or the CSV files)
        #[arg(long, alias = "data_path")]
        data_path: PathBuf,

        /// Split name: train, val or test
        #[arg(long, default_value = "train")]
        split: String,

        /// Sample index
        #[arg(long, default_value_t = 0)]
        index: usize,

        /// Use the CSV adapter with this annotation file (`-` for `<data-path>/<split>.csv`)
        #[arg(long)]
        csv: Option<PathBuf>,

        /// Image root for the CSV adapter (defaults to --data-path)
        #[arg(long)]
        image_root: Option<PathBuf>,

        /// Report 6-way group labels (CSV adapter)
        #[arg(long)]
        coarse: bool,

        /// YAML framework config (normalization, image sizes, mapping)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; RUST_LOG wins when set
    let log_level = if args.verbose { "info" } else { "warn" };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("emotic={}", log_level)));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("emotic v{} starting", env!("CARGO_PKG_VERSION"));

    match args.command {
        Commands::Convert {
            data_path,
            output_path,
            config,
            report,
        } => run_convert(
            &data_path,
            output_path.as_deref(),
            config.as_deref(),
            report.as_deref(),
        ),
        Commands::Mapping { config, json } => show_mapping(config.as_deref(), json),
        Commands::Inspect {
            data_path,
            split,
            index,
            csv,
            image_root,
            coarse,
            config,
        } => inspect_sample(
            &data_path,
            &split,
            index,
            csv.as_deref(),
            image_root.as_deref(),
            coarse,
            config.as_deref(),
        ),
    }
}

fn load_config(config_path: Option<&Path>) -> Result<EmoticConfig> {
    let config = match config_path {
        Some(path) => {
            info!("Loading config from: {:?}", path);
            EmoticConfig::from_yaml_file(path)?
        }
        None => EmoticConfig::default(),
    };
    config.validate().context("Invalid configuration")?;
    Ok(config)
}

/// A missing data directory is reported and the command ends without error.
fn run_convert(
    data_path: &Path,
    output_path: Option<&Path>,
    config_path: Option<&Path>,
    report_path: Option<&Path>,
) -> Result<()> {
    if !data_path.is_dir() {
        error!("Data path does not exist: {:?}", data_path);
        return Ok(());
    }

    let config = load_config(config_path)?;
    let converter = DatasetConverter::new(config.conversion.clone(), config.category_mapping()?);
    let report = converter.convert(data_path, output_path)?;

    report.print_summary();
    if let Some(path) = report_path {
        std::fs::write(path, report.to_json()?)
            .with_context(|| format!("Failed to write report to {:?}", path))?;
        info!("Report saved to {:?}", path);
    }
    Ok(())
}

fn show_mapping(config_path: Option<&Path>, json: bool) -> Result<()> {
    let mapping = load_config(config_path)?.category_mapping()?;

    if json {
        let rows: Vec<_> = mapping
            .rows()
            .map(|(fine, fine_name, coarse, coarse_name)| {
                serde_json::json!({
                    "index": fine,
                    "category": fine_name,
                    "group_index": coarse,
                    "group": coarse_name,
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    println!("=== 26 → 6 Category Mapping ===");
    for (fine, fine_name, coarse, coarse_name) in mapping.rows() {
        println!("{:>2}  {:<16} → {}  {}", fine, fine_name, coarse, coarse_name);
    }
    println!();
    print_groups(&mapping);
    Ok(())
}

fn print_groups(mapping: &CategoryMapping) {
    for coarse in 0..emotic_core::EmotionGroup::COUNT {
        let members: Vec<&str> = mapping
            .members(coarse)
            .into_iter()
            .filter_map(|fine| mapping.fine_name(fine))
            .collect();
        println!(
            "{} {:<14} ({:>2}): {}",
            coarse,
            mapping.coarse_name(coarse).unwrap_or("?"),
            members.len(),
            members.join(", ")
        );
    }
}

#[allow(clippy::too_many_arguments)]
fn inspect_sample(
    data_path: &Path,
    split: &str,
    index: usize,
    csv: Option<&Path>,
    image_root: Option<&Path>,
    coarse: bool,
    config_path: Option<&Path>,
) -> Result<()> {
    let mut config = match config_path {
        Some(path) => FrameworkConfig::from_yaml_file(path)?,
        None => FrameworkConfig::default(),
    };
    if coarse {
        config.label_space = LabelSpace::Coarse;
    }
    config.validate().context("Invalid configuration")?;

    let mapping = config.emotic.category_mapping()?;
    let pipeline = config.sample_pipeline()?;

    let dataset: Box<dyn EmoticDataset> = match csv {
        Some(csv_path) => {
            let csv_path = if csv_path == Path::new("-") {
                data_path.join(annotation_file(split))
            } else {
                csv_path.to_path_buf()
            };
            let dataset = CsvDataset::from_csv(
                &csv_path,
                image_root.unwrap_or(data_path),
                mapping.clone(),
                config.emotic.images,
                pipeline,
            )?
            .with_label_space(config.label_space);
            Box::new(dataset)
        }
        None => Box::new(PreprocessedDataset::from_dir(data_path, split, pipeline)?),
    };

    let metadata = dataset.metadata();
    println!("{}", serde_json::to_string_pretty(&metadata)?);

    let sample = dataset
        .get(index)
        .with_context(|| format!("Failed to load sample {}", index))?;
    print_sample(index, &sample, &mapping);
    Ok(())
}

fn print_sample(index: usize, sample: &EmoticSample, mapping: &CategoryMapping) {
    let coarse = sample.categorical.len() == emotic_core::EmotionGroup::COUNT;
    let active: Vec<&str> = sample
        .categorical
        .iter()
        .enumerate()
        .filter(|(_, v)| **v != 0.0)
        .filter_map(|(i, _)| {
            if coarse {
                mapping.coarse_name(i)
            } else {
                mapping.fine_name(i)
            }
        })
        .collect();

    println!("=== Sample {} ===", index);
    println!("Context tensor: {:?}", sample.context.shape());
    println!("Body tensor:    {:?}", sample.body.shape());
    println!("Categories:     {}", active.join(", "));
    println!(
        "Continuous:     valence {:.3}, arousal {:.3}, dominance {:.3}",
        sample.continuous.get(0).copied().unwrap_or_default(),
        sample.continuous.get(1).copied().unwrap_or_default(),
        sample.continuous.get(2).copied().unwrap_or_default()
    );
}
