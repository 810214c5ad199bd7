//! Configuration file loading and discovery.
//!
//! Supports loading configuration from YAML files with automatic discovery.

use super::types::AppConfig;
use std::path::{Path, PathBuf};

// ============================================================================
// Configuration File Discovery
// ============================================================================

/// Standard config file names to search for.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    ".cbom-tools.yaml",
    ".cbom-tools.yml",
    "cbom-tools.yaml",
    "cbom-tools.yml",
    ".cbom-toolsrc",
];

/// Directory searched below the user config directory
const CONFIG_DIR_NAME: &str = "cbom-tools";

/// Discover a config file by searching standard locations.
///
/// Search order:
/// 1. Explicit path if provided
/// 2. Current directory
/// 3. Git repository root (if in a repo)
/// 4. User config directory (~/.config/cbom-tools/)
/// 5. Home directory
#[must_use]
pub fn discover_config_file(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }

    search_paths()
        .into_iter()
        .find_map(|dir| find_config_in_dir(&dir))
}

/// Directories searched for a config file, in order
#[must_use]
pub fn search_paths() -> Vec<PathBuf> {
    let mut candidates = Vec::new();
    if let Ok(cwd) = std::env::current_dir() {
        candidates.push(cwd);
    }
    if let Some(git_root) = find_git_root() {
        if !candidates.contains(&git_root) {
            candidates.push(git_root);
        }
    }
    if let Some(config_dir) = dirs::config_dir() {
        candidates.push(config_dir.join(CONFIG_DIR_NAME));
    }
    if let Some(home) = dirs::home_dir() {
        candidates.push(home);
    }
    candidates
}

/// Find a config file in a specific directory.
fn find_config_in_dir(dir: &Path) -> Option<PathBuf> {
    CONFIG_FILE_NAMES
        .iter()
        .map(|name| dir.join(name))
        .find(|path| path.exists())
}

/// Find the git repository root by walking up the directory tree.
fn find_git_root() -> Option<PathBuf> {
    let cwd = std::env::current_dir().ok()?;
    let mut current = cwd.as_path();

    loop {
        if current.join(".git").exists() {
            return Some(current.to_path_buf());
        }
        current = current.parent()?;
    }
}

// ============================================================================
// Configuration File Loading
// ============================================================================

/// Error type for config file operations.
#[derive(Debug)]
pub enum ConfigFileError {
    /// File not found
    NotFound(PathBuf),
    /// IO error reading file
    Io(std::io::Error),
    /// YAML parsing error
    Parse(serde_yaml::Error),
}

impl std::fmt::Display for ConfigFileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(path) => {
                write!(f, "Config file not found: {}", path.display())
            }
            Self::Io(e) => write!(f, "Failed to read config file: {e}"),
            Self::Parse(e) => write!(f, "Failed to parse config file: {e}"),
        }
    }
}

impl std::error::Error for ConfigFileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::NotFound(_) => None,
            Self::Io(e) => Some(e),
            Self::Parse(e) => Some(e),
        }
    }
}

impl From<std::io::Error> for ConfigFileError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<serde_yaml::Error> for ConfigFileError {
    fn from(err: serde_yaml::Error) -> Self {
        Self::Parse(err)
    }
}

/// Load an `AppConfig` from a YAML file.
pub fn load_config_file(path: &Path) -> Result<AppConfig, ConfigFileError> {
    if !path.exists() {
        return Err(ConfigFileError::NotFound(path.to_path_buf()));
    }

    let content = std::fs::read_to_string(path)?;
    // An empty file is a valid, all-defaults config
    if content.trim().is_empty() {
        return Ok(AppConfig::default());
    }
    let config: AppConfig = serde_yaml::from_str(&content)?;
    Ok(config)
}

/// Load config from discovered file, or return default.
#[must_use]
pub fn load_or_default(explicit_path: Option<&Path>) -> (AppConfig, Option<PathBuf>) {
    discover_config_file(explicit_path).map_or_else(
        || (AppConfig::default(), None),
        |path| match load_config_file(&path) {
            Ok(config) => (config, Some(path)),
            Err(e) => {
                tracing::warn!("Failed to load config from {}: {}", path.display(), e);
                (AppConfig::default(), None)
            }
        },
    )
}

// ============================================================================
// Configuration Merging
// ============================================================================

impl AppConfig {
    /// Merge another config into this one, with `other` taking precedence.
    ///
    /// Only values that differ from the defaults override, so a CLI config
    /// built from unset flags leaves file values alone.
    pub fn merge(&mut self, other: &Self) {
        let defaults = Self::default();

        // Scan config
        if other.scan.certificate_extensions != defaults.scan.certificate_extensions {
            self.scan
                .certificate_extensions
                .clone_from(&other.scan.certificate_extensions);
        }
        if other.scan.pkcs7_extensions != defaults.scan.pkcs7_extensions {
            self.scan.pkcs7_extensions.clone_from(&other.scan.pkcs7_extensions);
        }
        if other.scan.exclude_dirs != defaults.scan.exclude_dirs {
            self.scan.exclude_dirs.clone_from(&other.scan.exclude_dirs);
        }
        if other.scan.follow_symlinks {
            self.scan.follow_symlinks = true;
        }
        if other.scan.max_file_size != defaults.scan.max_file_size {
            self.scan.max_file_size = other.scan.max_file_size;
        }
        if !other.scan.parallel {
            self.scan.parallel = false;
        }
        if other.scan.id_seed != defaults.scan.id_seed {
            self.scan.id_seed = other.scan.id_seed;
        }
        if other.scan.implementation_platform != defaults.scan.implementation_platform {
            self.scan.implementation_platform = other.scan.implementation_platform;
        }

        // Output config - only override if explicitly set
        if other.output.file.is_some() {
            self.output.file.clone_from(&other.output.file);
        }
        if !other.output.pretty {
            self.output.pretty = false;
        }

        // Behavior config (booleans - if set to true, override)
        if other.behavior.quiet {
            self.behavior.quiet = true;
        }
        if other.behavior.fail_on_warnings {
            self.behavior.fail_on_warnings = true;
        }
    }

    /// Load from file and merge with CLI overrides.
    #[must_use]
    pub fn from_file_with_overrides(
        config_path: Option<&Path>,
        cli_overrides: &Self,
    ) -> (Self, Option<PathBuf>) {
        let (mut config, loaded_from) = load_or_default(config_path);
        config.merge(cli_overrides);
        (config, loaded_from)
    }
}

// ============================================================================
// Example Config Generation
// ============================================================================

/// Generate an example config file content from the defaults.
#[must_use]
pub fn generate_example_config() -> String {
    let example = AppConfig::default();
    format!(
        r"# cbom-tools configuration
# Place this file at .cbom-tools.yaml in your project root or ~/.config/cbom-tools/

{}",
        serde_yaml::to_string(&example).unwrap_or_default()
    )
}

/// Generate a commented example config with all options.
#[must_use]
pub fn generate_full_example_config() -> String {
    r#"# cbom-tools Configuration File
# =============================
#
# Place it at:
#   - .cbom-tools.yaml in your project root
#   - ~/.config/cbom-tools/cbom-tools.yaml for global config
#
# CLI arguments always override file settings.

# Filesystem traversal and certificate scanning
scan:
  # File name suffixes decoded as PEM or DER certificates
  certificate_extensions: [".pem", ".cer", ".cert", ".der", ".ca-bundle", ".crt"]
  # File name suffixes decoded as PKCS #7 bundles
  pkcs7_extensions: [".p7a", ".p7b", ".p7c", ".p7r", ".p7s", ".spc"]
  # Root-relative directories that are not descended into
  exclude_dirs: ["proc", "sys", "dev"]
  follow_symlinks: false
  # Skip files larger than this many bytes (0 = unlimited)
  max_file_size: 16777216
  # Decode files on all cores; output is identical either way
  parallel: true
  # Seed of the bom-ref generator; equal seeds give identical output
  id_seed: 1
  # generic, x86_32, x86_64, armv7-a, armv7-m, armv8-a, armv8-m,
  # armv9-a, armv9-m, s390x, ppc64, ppc64le, other, unknown
  implementation_platform: unknown

# Output document
output:
  # Output file path (omit for stdout)
  # file: cbom.json
  pretty: true

# Behavior flags
behavior:
  # Suppress non-essential output
  quiet: false
  # Exit with code 1 if the scan recorded warnings
  fail_on_warnings: false
"#
    .to_string()
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ImplementationPlatform;
    use tempfile::TempDir;

    #[test]
    fn test_find_config_in_dir() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join(".cbom-tools.yaml");
        std::fs::write(&config_path, "scan:\n  parallel: false\n").unwrap();

        assert_eq!(find_config_in_dir(tmp.path()), Some(config_path));
    }

    #[test]
    fn test_find_config_in_dir_not_found() {
        let tmp = TempDir::new().unwrap();
        assert_eq!(find_config_in_dir(tmp.path()), None);
    }

    #[test]
    fn test_load_config_file() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.yaml");
        let yaml = r#"
scan:
  exclude_dirs: ["proc", "var/cache"]
  id_seed: 9
  implementation_platform: armv8-a
behavior:
  fail_on_warnings: true
"#;
        std::fs::write(&config_path, yaml).unwrap();

        let config = load_config_file(&config_path).unwrap();
        assert_eq!(config.scan.exclude_dirs, vec!["proc", "var/cache"]);
        assert_eq!(config.scan.id_seed, 9);
        assert_eq!(config.scan.implementation_platform, ImplementationPlatform::Armv8A);
        assert!(config.behavior.fail_on_warnings);
        assert!(config.output.pretty);
    }

    #[test]
    fn test_load_empty_and_invalid_files() {
        let tmp = TempDir::new().unwrap();
        let empty = tmp.path().join("empty.yaml");
        std::fs::write(&empty, "\n").unwrap();
        assert_eq!(load_config_file(&empty).unwrap(), AppConfig::default());

        let invalid = tmp.path().join("invalid.yaml");
        std::fs::write(&invalid, "scan: [unclosed").unwrap();
        assert!(matches!(
            load_config_file(&invalid),
            Err(ConfigFileError::Parse(_))
        ));
    }

    #[test]
    fn test_load_config_file_not_found() {
        let result = load_config_file(Path::new("/nonexistent/config.yaml"));
        assert!(matches!(result, Err(ConfigFileError::NotFound(_))));
    }

    #[test]
    fn test_config_merge() {
        let mut base = AppConfig {
            scan: super::super::types::ScanConfig {
                id_seed: 5,
                exclude_dirs: vec!["opt".into()],
                ..Default::default()
            },
            ..AppConfig::default()
        };
        let overrides = AppConfig::builder()
            .parallel(false)
            .implementation_platform(ImplementationPlatform::Ppc64le)
            .output_file(Some(PathBuf::from("out.json")))
            .fail_on_warnings(true)
            .build();

        base.merge(&overrides);

        assert_eq!(base.scan.id_seed, 5);
        assert_eq!(base.scan.exclude_dirs, vec!["opt"]);
        assert!(!base.scan.parallel);
        assert_eq!(base.scan.implementation_platform, ImplementationPlatform::Ppc64le);
        assert_eq!(base.output.file, Some(PathBuf::from("out.json")));
        assert!(base.behavior.fail_on_warnings);
    }

    #[test]
    fn test_example_configs_parse() {
        let example = generate_example_config();
        assert!(example.contains("scan:"));
        let parsed: AppConfig = serde_yaml::from_str(&example).unwrap();
        assert_eq!(parsed, AppConfig::default());

        let full: AppConfig = serde_yaml::from_str(&generate_full_example_config()).unwrap();
        assert_eq!(full, AppConfig::default());
    }

    #[test]
    fn test_discover_explicit_path() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("custom-config.yaml");
        std::fs::write(&config_path, "output:\n  pretty: false\n").unwrap();

        assert_eq!(discover_config_file(Some(&config_path)), Some(config_path));
    }
}
