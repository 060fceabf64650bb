// crates/core/src/config/mod.rs
pub mod emotic_config;

pub use emotic_config::{
    EmoticConfig, ImageConfig, NormStats, NormalizationConfig, BODY_MEAN, BODY_STD, CONTEXT_MEAN,
    CONTEXT_STD,
};
