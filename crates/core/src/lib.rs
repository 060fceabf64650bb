//! Core library for the EMOTIC toolkit ─ category tables, 26 → 6 label conversion and the file driver.

pub mod categories;
pub mod config;
pub mod conversion;
pub mod labels;
pub mod metrics;

pub use categories::{standard_mapping, CategoryMapping, Emotion, EmotionGroup, MappingError};
pub use config::EmoticConfig;
pub use conversion::{convert_data_files, ConversionPlan, DatasetConverter};
pub use labels::{convert_labels_26_to_6, convert_labels_6_to_26, LabelShapeError, LabelValue};
pub use metrics::{ConversionReport, ConvertedFile, LabelStats};
