//! Configuration for the isomaker namespace builder.
//!
//! The builder itself is configured once, before any content is added. This crate owns the
//! serialized form of that configuration (TOML), its semantic validation, and the `tracing`
//! subscriber setup shared by everything that embeds the builder.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

mod logging;
mod validation;

pub use logging::{init_tracing, LoggingConfig};
pub use validation::ConfigValidationError;

/// Highest primary ISO-9660 interchange level the builder understands.
pub const MAX_ISO9660_LEVEL: u8 = 3;
/// Highest Joliet level (UCS-2 escape sequence level). `0` disables Joliet.
pub const MAX_JOLIET_LEVEL: u8 = 3;
/// Highest Rock Ridge level. `0` disables Rock Ridge for that namespace.
pub const MAX_ROCK_RIDGE_LEVEL: u8 = 2;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PrimaryIsoConfig {
    /// ISO-9660 interchange level (1 = 8.3 names, 2 and 3 = 30 character names).
    #[serde(default = "PrimaryIsoConfig::default_level")]
    pub level: u8,

    /// Rock Ridge level layered on top of the primary names.
    #[serde(default = "PrimaryIsoConfig::default_rock_ridge_level")]
    pub rock_ridge_level: u8,
}

impl PrimaryIsoConfig {
    fn default_level() -> u8 {
        3
    }

    fn default_rock_ridge_level() -> u8 {
        1
    }
}

impl Default for PrimaryIsoConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            rock_ridge_level: Self::default_rock_ridge_level(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JolietConfig {
    /// Joliet UCS-2 level. `0` disables the Joliet namespace entirely.
    #[serde(default = "JolietConfig::default_level")]
    pub level: u8,

    /// Rock Ridge level for the Joliet directory tree.
    #[serde(default)]
    pub rock_ridge_level: u8,
}

impl JolietConfig {
    fn default_level() -> u8 {
        3
    }
}

impl Default for JolietConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            rock_ridge_level: 0,
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UdfConfig {
    #[serde(default)]
    pub enabled: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HfsConfig {
    #[serde(default)]
    pub enabled: bool,
}

/// Top-level builder configuration.
///
/// The defaults match a freshly created builder: primary ISO level 3, Joliet level 3,
/// UDF and HFS disabled.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IsoMakerConfig {
    #[serde(default)]
    pub iso9660: PrimaryIsoConfig,
    #[serde(default)]
    pub joliet: JolietConfig,
    #[serde(default)]
    pub udf: UdfConfig,
    #[serde(default)]
    pub hfs: HfsConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse toml config: {0}")]
    Toml(String),
    #[error("invalid config: {}", format_validation_errors(.0))]
    Invalid(Vec<ConfigValidationError>),
}

fn format_validation_errors(errors: &[ConfigValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        // The default `Display` embeds a snippet of the input; keep only the message.
        ConfigError::Toml(err.message().to_owned())
    }
}

impl IsoMakerConfig {
    /// Parse and validate a TOML document.
    pub fn load_from_str(text: &str) -> Result<Self, ConfigError> {
        let config: IsoMakerConfig = toml::from_str(text)?;
        let errors = config.validate();
        if !errors.is_empty() {
            return Err(ConfigError::Invalid(errors));
        }
        Ok(config)
    }

    /// Read, parse and validate a TOML config file.
    pub fn load_from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::load_from_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded isomaker config");
        Ok(config)
    }

    /// Serialize back to TOML.
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        toml::to_string(self).map_err(|err| ConfigError::Toml(err.to_string()))
    }
}
