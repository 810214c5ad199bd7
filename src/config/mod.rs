//! Configuration module for cbom-tools.
//!
//! This module provides a unified configuration system with:
//! - Type-safe configuration structures
//! - Validation for all configuration values
//! - YAML config file loading and discovery
//! - CLI argument merging
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use cbom_tools::config::AppConfig;
//!
//! // Use defaults
//! let config = AppConfig::default();
//!
//! // Use builder
//! let config = AppConfig::builder()
//!     .parallel(false)
//!     .id_seed(7)
//!     .fail_on_warnings(true)
//!     .build();
//!
//! // Load from file
//! use cbom_tools::config::file::load_or_default;
//! let (config, loaded_from) = load_or_default(None);
//! ```
//!
//! # Configuration File
//!
//! Place a `.cbom-tools.yaml` file in your project root or `~/.config/cbom-tools/`:
//!
//! ```yaml
//! scan:
//!   exclude_dirs: ["proc", "sys", "dev", "var/cache"]
//!   implementation_platform: x86_64
//! behavior:
//!   fail_on_warnings: true
//! ```

pub mod file;
mod types;
mod validation;

pub use types::{
    AppConfig, AppConfigBuilder, BehaviorConfig, OutputConfig, ScanConfig, DEFAULT_MAX_FILE_SIZE,
};
pub use validation::{ConfigError, Validatable};

pub use file::{
    discover_config_file, generate_example_config, generate_full_example_config, load_config_file,
    load_or_default, search_paths, ConfigFileError, CONFIG_FILE_NAMES,
};

use crate::error::{CbomError, Result};

/// Generate a JSON Schema for the `AppConfig` configuration format.
///
/// This schema documents all configuration options that can be set in
/// `.cbom-tools.yaml` config files. It can be used by editors for
/// validation and autocompletion.
pub fn generate_json_schema() -> Result<String> {
    let schema = schemars::schema_for!(AppConfig);
    serde_json::to_string_pretty(&schema)
        .map_err(|e| CbomError::config(format!("schema serialization failed: {e}")))
}

/// Fail with every validation error of `config` joined into one message
pub fn ensure_valid(config: &impl Validatable) -> Result<()> {
    let errors = config.validate();
    if errors.is_empty() {
        return Ok(());
    }
    let message = errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    Err(CbomError::config(message))
}
