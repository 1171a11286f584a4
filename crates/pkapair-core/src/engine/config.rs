use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// The physiological reference pH shared by classifier and generators.
pub const DEFAULT_REFERENCE_PH: f64 = 7.4;
/// Default lower bound (exclusive) of the pKa validity window.
pub const DEFAULT_LOWER_PKA_LIMIT: f64 = -2.0;
/// Default upper bound (exclusive) of the pKa validity window.
pub const DEFAULT_UPPER_PKA_LIMIT: f64 = 16.0;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid pKa window: lower limit {lower} must lie below upper limit {upper}")]
    InvalidWindow { lower: f64, upper: f64 },

    #[error("Reference pH {ph} lies outside the pKa validity window ({lower}, {upper})")]
    PhOutsideWindow { ph: f64, lower: f64, upper: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Parameters of the protonation-state enumeration.
///
/// The validity window differs between historical pipeline variants
/// (−2…16 for predictor output, 0.5…13.5 for experimentally curated sets),
/// so it is configuration, never a constant in the algorithm.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EnumerationConfig {
    /// pKa values at or below this pH classify as acidic, above as basic.
    pub reference_ph: f64,
    /// Predictions with pKa at or below this bound are dropped as noise.
    pub lower_pka_limit: f64,
    /// Predictions with pKa at or above this bound are dropped as noise.
    pub upper_pka_limit: f64,
}

impl Default for EnumerationConfig {
    fn default() -> Self {
        Self {
            reference_ph: DEFAULT_REFERENCE_PH,
            lower_pka_limit: DEFAULT_LOWER_PKA_LIMIT,
            upper_pka_limit: DEFAULT_UPPER_PKA_LIMIT,
        }
    }
}

impl EnumerationConfig {
    fn validate(self) -> Result<Self, ConfigError> {
        if self.lower_pka_limit >= self.upper_pka_limit {
            return Err(ConfigError::InvalidWindow {
                lower: self.lower_pka_limit,
                upper: self.upper_pka_limit,
            });
        }
        if self.reference_ph <= self.lower_pka_limit || self.reference_ph >= self.upper_pka_limit {
            return Err(ConfigError::PhOutsideWindow {
                ph: self.reference_ph,
                lower: self.lower_pka_limit,
                upper: self.upper_pka_limit,
            });
        }
        Ok(self)
    }

    /// Parses a configuration from TOML text and validates it.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: EnumerationConfig = toml::from_str(text)?;
        config.validate()
    }

    /// Reads and validates a configuration from a TOML file.
    pub fn from_toml_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}

#[derive(Debug, Default)]
pub struct EnumerationConfigBuilder {
    reference_ph: Option<f64>,
    lower_pka_limit: Option<f64>,
    upper_pka_limit: Option<f64>,
}

impl EnumerationConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reference_ph(mut self, ph: f64) -> Self {
        self.reference_ph = Some(ph);
        self
    }

    pub fn lower_pka_limit(mut self, limit: f64) -> Self {
        self.lower_pka_limit = Some(limit);
        self
    }

    pub fn upper_pka_limit(mut self, limit: f64) -> Self {
        self.upper_pka_limit = Some(limit);
        self
    }

    pub fn build(self) -> Result<EnumerationConfig, ConfigError> {
        let defaults = EnumerationConfig::default();
        EnumerationConfig {
            reference_ph: self.reference_ph.unwrap_or(defaults.reference_ph),
            lower_pka_limit: self.lower_pka_limit.unwrap_or(defaults.lower_pka_limit),
            upper_pka_limit: self.upper_pka_limit.unwrap_or(defaults.upper_pka_limit),
        }
        .validate()
    }
}
