use thiserror::Error;

use crate::{IsoMakerConfig, LoggingConfig, MAX_ISO9660_LEVEL, MAX_JOLIET_LEVEL, MAX_ROCK_RIDGE_LEVEL};

#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error("iso9660.level must be between 1 and {max}, got {value}")]
    Iso9660Level { value: u8, max: u8 },
    #[error("joliet.level must be between 0 and {max}, got {value}")]
    JolietLevel { value: u8, max: u8 },
    #[error("{namespace}.rock_ridge_level must be between 0 and {max}, got {value}")]
    RockRidgeLevel {
        namespace: &'static str,
        value: u8,
        max: u8,
    },
    #[error("joliet.rock_ridge_level is set but joliet is disabled (level = 0)")]
    RockRidgeWithoutJoliet,
    #[error("logging.level {level:?} is not a valid filter directive")]
    LoggingLevel { level: String },
}

impl IsoMakerConfig {
    /// Validate semantic invariants.
    ///
    /// Reports every problem found instead of stopping at the first one.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut out = Vec::new();

        if !(1..=MAX_ISO9660_LEVEL).contains(&self.iso9660.level) {
            out.push(ConfigValidationError::Iso9660Level {
                value: self.iso9660.level,
                max: MAX_ISO9660_LEVEL,
            });
        }
        if self.iso9660.rock_ridge_level > MAX_ROCK_RIDGE_LEVEL {
            out.push(ConfigValidationError::RockRidgeLevel {
                namespace: "iso9660",
                value: self.iso9660.rock_ridge_level,
                max: MAX_ROCK_RIDGE_LEVEL,
            });
        }

        if self.joliet.level > MAX_JOLIET_LEVEL {
            out.push(ConfigValidationError::JolietLevel {
                value: self.joliet.level,
                max: MAX_JOLIET_LEVEL,
            });
        }
        if self.joliet.rock_ridge_level > MAX_ROCK_RIDGE_LEVEL {
            out.push(ConfigValidationError::RockRidgeLevel {
                namespace: "joliet",
                value: self.joliet.rock_ridge_level,
                max: MAX_ROCK_RIDGE_LEVEL,
            });
        } else if self.joliet.rock_ridge_level > 0 && self.joliet.level == 0 {
            out.push(ConfigValidationError::RockRidgeWithoutJoliet);
        }

        validate_logging(&self.logging, &mut out);

        out
    }
}

fn validate_logging(logging: &LoggingConfig, out: &mut Vec<ConfigValidationError>) {
    if tracing_subscriber::EnvFilter::try_new(logging.directives()).is_err() {
        out.push(ConfigValidationError::LoggingLevel {
            level: logging.level.clone(),
        });
    }
}
