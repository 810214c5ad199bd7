//! Configuration validation for cbom-tools.

use super::types::{AppConfig, BehaviorConfig, OutputConfig, ScanConfig};
use std::collections::HashSet;

// ============================================================================
// Configuration Error
// ============================================================================

/// Error type for configuration validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigError {
    /// The field that failed validation
    pub field: String,
    /// Description of the validation error
    pub message: String,
}

impl ConfigError {
    fn new(field: &str, message: impl Into<String>) -> Self {
        Self {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Validation Trait
// ============================================================================

/// Trait for validatable configuration types.
pub trait Validatable {
    /// Validate the configuration, returning any errors found.
    fn validate(&self) -> Vec<ConfigError>;

    /// Check if the configuration is valid.
    fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }
}

// ============================================================================
// Validation Implementations
// ============================================================================

impl Validatable for AppConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        errors.extend(self.scan.validate());
        errors.extend(self.output.validate());
        errors.extend(self.behavior.validate());
        errors
    }
}

fn validate_extensions(field: &str, extensions: &[String], errors: &mut Vec<ConfigError>) {
    for ext in extensions {
        if !ext.starts_with('.') || ext.len() < 2 {
            errors.push(ConfigError::new(
                field,
                format!("Extension '{ext}' must start with '.' followed by at least one character"),
            ));
        }
    }
}

impl Validatable for ScanConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        if self.certificate_extensions.is_empty() && self.pkcs7_extensions.is_empty() {
            errors.push(ConfigError::new(
                "scan",
                "At least one certificate or PKCS #7 extension is required",
            ));
        }
        validate_extensions("scan.certificate_extensions", &self.certificate_extensions, &mut errors);
        validate_extensions("scan.pkcs7_extensions", &self.pkcs7_extensions, &mut errors);

        let certificate: HashSet<String> =
            self.certificate_extensions.iter().map(|e| e.to_lowercase()).collect();
        for ext in &self.pkcs7_extensions {
            if certificate.contains(&ext.to_lowercase()) {
                errors.push(ConfigError::new(
                    "scan.pkcs7_extensions",
                    format!("Extension '{ext}' is also listed as a certificate extension"),
                ));
            }
        }

        for dir in &self.exclude_dirs {
            if dir.trim_matches('/').is_empty() {
                errors.push(ConfigError::new(
                    "scan.exclude_dirs",
                    "Excluding the scan root is not allowed",
                ));
            }
        }

        errors
    }
}

impl Validatable for OutputConfig {
    fn validate(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if let Some(ref file_path) = self.file {
            if let Some(parent) = file_path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    errors.push(ConfigError::new(
                        "output.file",
                        format!("Parent directory does not exist: {}", parent.display()),
                    ));
                }
            }
        }
        errors
    }
}

impl Validatable for BehaviorConfig {
    fn validate(&self) -> Vec<ConfigError> {
        Vec::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_config_is_valid() {
        assert!(AppConfig::default().is_valid());
    }

    #[test]
    fn test_bad_extensions() {
        let config = ScanConfig {
            certificate_extensions: vec!["pem".into(), ".crt".into()],
            pkcs7_extensions: vec![".CRT".into()],
            ..ScanConfig::default()
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, "scan.certificate_extensions");
        assert_eq!(errors[1].field, "scan.pkcs7_extensions");
    }

    #[test]
    fn test_no_extensions() {
        let config = ScanConfig {
            certificate_extensions: vec![],
            pkcs7_extensions: vec![],
            ..ScanConfig::default()
        };
        assert!(config.validate().iter().any(|e| e.field == "scan"));
    }

    #[test]
    fn test_root_exclusion_rejected() {
        let config = ScanConfig {
            exclude_dirs: vec!["/".into()],
            ..ScanConfig::default()
        };
        assert!(!config.is_valid());
    }

    #[test]
    fn test_output_parent_must_exist() {
        let config = OutputConfig {
            file: Some(PathBuf::from("/nonexistent/dir/cbom.json")),
            pretty: true,
        };
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].to_string().starts_with("output.file: "));
    }
}
