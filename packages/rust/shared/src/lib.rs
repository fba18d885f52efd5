//! Shared types, error model, and configuration for autodict.
//!
//! This crate is the foundation depended on by all other autodict crates.
//! It provides:
//! - [`AutodictError`]: the unified error type
//! - Domain types ([`CommandName`], [`DictionaryEntry`], [`Lookup`])
//! - Configuration ([`AppConfig`], [`PipelineConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, CatalogConfig, DEFAULT_DIRECTORIES, DEFAULT_OUTPUT, DEFAULT_TAGS, LookupConfig,
    PipelineConfig, ScanConfig, config_dir, config_file_path, init_config, load_config,
    load_config_from,
};
pub use error::{AutodictError, Result};
pub use types::{CommandName, DictionaryEntry, Lookup, Unavailable};
