//! Shared types, error model, and configuration for pageforge.
//!
//! This crate is the foundation depended on by all other pageforge crates.
//! It provides:
//! - [`PageForgeError`], the unified error type
//! - Domain types ([`DocumentType`], [`ConversionMethod`], [`ConversionWarning`])
//! - Application configuration ([`AppConfig`], config loading)
//! - The read-only [`ConfigStore`] of platform metadata, affiliate links and site settings

pub mod catalog;
pub mod config;
pub mod error;
pub mod text;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use catalog::{
    AFFILIATE_LINKS_FILE, ConfigStore, Disclaimers, IMAGE_SETTINGS_FILE, ImageSettings,
    PLATFORM_METADATA_FILE, PlatformMetadata,
};
pub use config::{
    AiSettings, AppConfig, ContentConfig, PathsConfig, ServerConfig, config_dir,
    config_file_path, init_config, load_config, load_config_from,
};
pub use error::{PageForgeError, Result};
pub use text::truncate_chars;
pub use types::{ConversionMethod, ConversionWarning, DocumentType};
