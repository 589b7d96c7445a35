//! Tool settings

use std::path::Path;

use confmig_document::{Indent, DEFAULT_ENV_PREFIX};
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::report::UnmappedKeyReporter;

/// Environment variable overriding [`Settings::env_prefix`]
pub const ENV_PREFIX_VAR: &str = "CONFMIG_ENV_PREFIX";

/// Settings of the converter itself, not of the configured product
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Prefix of the product's environment variables
    pub env_prefix: String,
    /// Indentation of JSON output
    pub indent: Indent,
    /// Report unmapped options below the top level
    pub report_nested_unmapped: bool,
    /// Report env variables that no mapping consumed
    pub report_unmapped_env: bool,
}

impl Settings {
    /// Create default settings
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With environment prefix
    #[inline]
    #[must_use]
    pub fn with_env_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.env_prefix = prefix.into();
        self
    }

    /// With output indentation
    #[inline]
    #[must_use]
    pub fn with_indent(mut self, indent: Indent) -> Self {
        self.indent = indent;
        self
    }

    /// With nested unmapped-key reporting
    #[inline]
    #[must_use]
    pub fn with_nested_unmapped(mut self, enabled: bool) -> Self {
        self.report_nested_unmapped = enabled;
        self
    }

    /// With unmapped env-variable reporting
    #[inline]
    #[must_use]
    pub fn with_unmapped_env(mut self, enabled: bool) -> Self {
        self.report_unmapped_env = enabled;
        self
    }

    /// Apply overrides from the process environment
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        match std::env::var(ENV_PREFIX_VAR) {
            Ok(prefix) if !prefix.trim().is_empty() => {
                tracing::debug!(%prefix, "env prefix overridden from environment");
                self.with_env_prefix(prefix.trim())
            }
            _ => self,
        }
    }

    /// Load settings from a TOML file; missing fields keep their defaults
    ///
    /// # Errors
    /// Returns [`SettingsError::Io`] if the file cannot be read and
    /// [`SettingsError::Invalid`] if it is not valid settings TOML.
    pub fn from_toml_file(path: &Path) -> Result<Self, SettingsError> {
        let text = std::fs::read_to_string(path).map_err(|source| SettingsError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&text).map_err(|e| SettingsError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Unmapped-key reporter for these settings
    #[inline]
    #[must_use]
    pub fn reporter(&self) -> UnmappedKeyReporter {
        UnmappedKeyReporter::new().with_recursive(self.report_nested_unmapped)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            env_prefix: DEFAULT_ENV_PREFIX.to_string(),
            indent: Indent::default(),
            report_nested_unmapped: true,
            report_unmapped_env: true,
        }
    }
}
