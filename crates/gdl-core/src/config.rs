//! Tool configuration, loadable from TOML.
//!
//! ```toml
//! [suggestions]
//! enabled = true
//! cutoff = 0.7
//! max = 3
//!
//! [validate]
//! strict = false
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for `{field}`: {value} ({message})")]
    InvalidValue {
        field: &'static str,
        value: String,
        message: &'static str,
    },
    #[error("failed to decode config: {0}")]
    Toml(#[from] toml::de::Error),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct GdlConfig {
    pub suggestions: SuggestionConfig,
    pub validate: ValidateConfig,
}

/// Controls the "did you mean" candidates attached to unresolved references.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SuggestionConfig {
    pub enabled: bool,
    /// Minimum similarity in `[0, 1]`.
    pub cutoff: f64,
    /// Maximum number of candidates per warning.
    pub max: usize,
}

impl Default for SuggestionConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            cutoff: 0.7,
            max: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidateConfig {
    /// Also fail validation on reported analysis findings. Parse warnings
    /// always fail it.
    pub strict: bool,
    /// Report nodes that no edge touches.
    pub report_unreferenced: bool,
    /// Report directed edges declared more than once.
    pub report_duplicates: bool,
}

impl Default for ValidateConfig {
    fn default() -> Self {
        Self {
            strict: false,
            report_unreferenced: true,
            report_duplicates: true,
        }
    }
}

impl GdlConfig {
    /// Decode and validate a TOML document. Missing tables and keys keep
    /// their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let cutoff = self.suggestions.cutoff;
        if !(0.0..=1.0).contains(&cutoff) {
            return Err(ConfigError::InvalidValue {
                field: "suggestions.cutoff",
                value: cutoff.to_string(),
                message: "expected a number between 0 and 1",
            });
        }
        if self.suggestions.enabled && self.suggestions.max == 0 {
            return Err(ConfigError::InvalidValue {
                field: "suggestions.max",
                value: "0".to_string(),
                message: "must be at least 1 when suggestions are enabled",
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, GdlConfig};

    #[test]
    fn empty_document_yields_defaults() {
        let config = GdlConfig::from_toml_str("").expect("empty config");
        assert_eq!(config, GdlConfig::default());
        assert!(config.suggestions.enabled);
        assert_eq!(config.suggestions.max, 3);
        assert!(config.validate.report_duplicates);
    }

    #[test]
    fn partial_tables_keep_remaining_defaults() {
        let config = GdlConfig::from_toml_str("[suggestions]\nmax = 5\n\n[validate]\nstrict = true\n")
            .expect("partial config");
        assert_eq!(config.suggestions.max, 5);
        assert!((config.suggestions.cutoff - 0.7).abs() < f64::EPSILON);
        assert!(config.validate.strict);
        assert!(config.validate.report_unreferenced);
    }

    #[test]
    fn out_of_range_cutoff_is_rejected() {
        let err = GdlConfig::from_toml_str("[suggestions]\ncutoff = 1.5\n")
            .expect_err("cutoff above 1");
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "suggestions.cutoff",
                ..
            }
        ));
    }

    #[test]
    fn zero_max_only_allowed_when_disabled() {
        assert!(GdlConfig::from_toml_str("[suggestions]\nmax = 0\n").is_err());
        assert!(GdlConfig::from_toml_str("[suggestions]\nenabled = false\nmax = 0\n").is_ok());
    }

    #[test]
    fn unknown_keys_are_decode_errors() {
        let err = GdlConfig::from_toml_str("[suggestions]\ncutof = 0.5\n").expect_err("typo key");
        assert!(matches!(err, ConfigError::Toml(_)));
    }
}
