//! Shared types, error model, and configuration for docmux.
//!
//! This crate is the foundation depended on by all other docmux crates.
//! It provides:
//! - [`DocmuxError`], the unified error type
//! - Domain types ([`Docset`], [`RawEntry`], [`Entry`], [`SchemaVariant`])
//! - Configuration ([`AppConfig`], config loading)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, FeedsConfig, SelectorConfig, config_dir, config_file_path,
    init_config, load_config, load_config_from,
};
pub use error::{DocmuxError, Result};
pub use types::{
    DOCSET_SUFFIX, DOCUMENTS_RELATIVE_PATH, Docset, Entry, RawEntry, STORE_RELATIVE_PATH,
    SchemaVariant,
};
