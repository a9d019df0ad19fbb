//! Replay configuration with builder pattern.
//!
//! ```
//! use recordcount::ReplayConfig;
//!
//! // All defaults: comma separated, empty cells are missing, pretty output
//! let config = ReplayConfig::builder().build().unwrap();
//! assert_eq!(config.delimiter, ',');
//!
//! let config = ReplayConfig::builder()
//!     .delimiter(';')
//!     .missing_values(vec!["NA".into(), String::new()])
//!     .trim(true)
//!     .build()
//!     .unwrap();
//! ```

use bon::Builder;

use crate::inference::EvalOptions;
use crate::persist::JsonWriteOptions;

// =============================================================================
// ConfigError
// =============================================================================

/// Errors that can occur during configuration validation.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// Delimiter must be a single ASCII character other than a quote or a line break.
    InvalidDelimiter(char),
    /// A missing-value token contains the delimiter and could never match a cell.
    MissingTokenContainsDelimiter(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidDelimiter(c) => {
                write!(f, "delimiter must be an ASCII character other than a quote or line break, got {c:?}")
            }
            Self::MissingTokenContainsDelimiter(token) => {
                write!(f, "missing-value token {token:?} contains the delimiter")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

// =============================================================================
// ReplayConfig
// =============================================================================

/// Options for reading the dataset and writing the recounted model.
#[derive(Debug, Clone, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct ReplayConfig {
    /// Cell separator. Default: `,`.
    #[builder(default = ',')]
    pub delimiter: char,

    /// Cell texts read as missing values. Default: the empty string.
    #[builder(default = vec![String::new()])]
    pub missing_values: Vec<String>,

    /// Trim whitespace around header names and cells. Default: false.
    #[builder(default)]
    pub trim: bool,

    /// Pretty-print the output document. Default: true.
    #[builder(default = true)]
    pub pretty: bool,
}

impl<S: replay_config_builder::IsComplete> ReplayConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if the delimiter is unusable or a missing-value
    /// token contains it.
    pub fn build(self) -> Result<ReplayConfig, ConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl ReplayConfig {
    fn validate(&self) -> Result<(), ConfigError> {
        let d = self.delimiter;
        if !d.is_ascii() || matches!(d, '"' | '\n' | '\r') {
            return Err(ConfigError::InvalidDelimiter(d));
        }
        if let Some(token) = self.missing_values.iter().find(|t| t.contains(d)) {
            return Err(ConfigError::MissingTokenContainsDelimiter(token.clone()));
        }
        Ok(())
    }

    /// The delimiter as a byte. Validated to be ASCII.
    pub fn delimiter_byte(&self) -> u8 {
        self.delimiter as u8
    }

    pub fn eval_options(&self) -> EvalOptions {
        EvalOptions {
            missing_values: self.missing_values.clone(),
        }
    }

    pub fn write_options(&self) -> JsonWriteOptions {
        JsonWriteOptions { pretty: self.pretty }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            missing_values: vec![String::new()],
            trim: false,
            pretty: true,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
