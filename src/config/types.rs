//! Configuration types for cbom-tools.

use crate::model::{ImplementationPlatform, DEFAULT_ID_SEED};
use crate::scanner::decode::{DEFAULT_CERTIFICATE_EXTENSIONS, DEFAULT_PKCS7_EXTENSIONS};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default size limit for scanned files (16 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 16 * 1024 * 1024;

// ============================================================================
// Unified Application Configuration
// ============================================================================

/// Unified application configuration that can be loaded from CLI args or config files.
///
/// CLI arguments are layered over file settings with [`AppConfig::merge`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct AppConfig {
    /// Filesystem traversal and certificate scanning
    pub scan: ScanConfig,
    /// Output document settings
    pub output: OutputConfig,
    /// Behavior flags
    pub behavior: BehaviorConfig,
}

impl AppConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

// ============================================================================
// Builder for AppConfig
// ============================================================================

/// Builder for constructing `AppConfig` with fluent API.
#[derive(Debug, Default)]
#[must_use]
pub struct AppConfigBuilder {
    config: AppConfig,
}

impl AppConfigBuilder {
    pub fn certificate_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.scan.certificate_extensions = extensions;
        self
    }

    pub fn pkcs7_extensions(mut self, extensions: Vec<String>) -> Self {
        self.config.scan.pkcs7_extensions = extensions;
        self
    }

    pub fn exclude_dirs(mut self, dirs: Vec<String>) -> Self {
        self.config.scan.exclude_dirs = dirs;
        self
    }

    pub const fn follow_symlinks(mut self, follow: bool) -> Self {
        self.config.scan.follow_symlinks = follow;
        self
    }

    /// Set the file size limit in bytes (0 disables it).
    pub const fn max_file_size(mut self, bytes: u64) -> Self {
        self.config.scan.max_file_size = bytes;
        self
    }

    pub const fn parallel(mut self, parallel: bool) -> Self {
        self.config.scan.parallel = parallel;
        self
    }

    /// Set the identifier generator seed.
    pub const fn id_seed(mut self, seed: u64) -> Self {
        self.config.scan.id_seed = seed;
        self
    }

    pub const fn implementation_platform(mut self, platform: ImplementationPlatform) -> Self {
        self.config.scan.implementation_platform = platform;
        self
    }

    pub fn output_file(mut self, file: Option<PathBuf>) -> Self {
        self.config.output.file = file;
        self
    }

    pub const fn pretty(mut self, pretty: bool) -> Self {
        self.config.output.pretty = pretty;
        self
    }

    pub const fn quiet(mut self, quiet: bool) -> Self {
        self.config.behavior.quiet = quiet;
        self
    }

    /// Exit with code 1 when the scan recorded warnings.
    pub const fn fail_on_warnings(mut self, fail: bool) -> Self {
        self.config.behavior.fail_on_warnings = fail;
        self
    }

    #[must_use]
    pub fn build(self) -> AppConfig {
        self.config
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Scan configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct ScanConfig {
    /// File name suffixes decoded as PEM or DER certificates
    pub certificate_extensions: Vec<String>,
    /// File name suffixes decoded as PKCS #7 bundles
    pub pkcs7_extensions: Vec<String>,
    /// Root-relative directories that are not descended into
    pub exclude_dirs: Vec<String>,
    /// Follow symbolic links while walking
    pub follow_symlinks: bool,
    /// Skip files larger than this many bytes (0 = unlimited)
    pub max_file_size: u64,
    /// Decode files on all cores
    pub parallel: bool,
    /// Seed of the identifier generator
    pub id_seed: u64,
    /// Platform recorded on every algorithm
    pub implementation_platform: ImplementationPlatform,
}

impl Default for ScanConfig {
    fn default() -> Self {
        let owned = |list: &[&str]| list.iter().map(|e| (*e).to_string()).collect();
        Self {
            certificate_extensions: owned(DEFAULT_CERTIFICATE_EXTENSIONS),
            pkcs7_extensions: owned(DEFAULT_PKCS7_EXTENSIONS),
            exclude_dirs: owned(&["proc", "sys", "dev"]),
            follow_symlinks: false,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            parallel: true,
            id_seed: DEFAULT_ID_SEED,
            implementation_platform: ImplementationPlatform::Unknown,
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct OutputConfig {
    /// Output file path (stdout if not specified)
    pub file: Option<PathBuf>,
    /// Indent the JSON document
    pub pretty: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file: None,
            pretty: true,
        }
    }
}

/// Behavior configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Suppress non-essential output
    pub quiet: bool,
    /// Exit with code 1 when warnings were recorded
    pub fail_on_warnings: bool,
}
