use std::sync::Once;

use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::prelude::*;
use tracing_subscriber::EnvFilter;

static TRACING_INIT: Once = Once::new();

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LoggingConfig {
    /// Either a simple level (`info`, `debug`, ...) or a full `EnvFilter` directive string.
    #[serde(default = "LoggingConfig::default_level")]
    pub level: String,

    /// Emit logs in JSON format.
    #[serde(default)]
    pub json: bool,

    /// Write logs to stderr. When disabled no subscriber output is produced.
    #[serde(default = "LoggingConfig::default_stderr")]
    pub stderr: bool,
}

/// Targets a bare level applies to. Other crates stay at their `RUST_LOG` setting.
const TARGETS: [&str; 2] = ["isomaker", "isomaker_config"];

impl LoggingConfig {
    fn default_level() -> String {
        "info".to_owned()
    }

    fn default_stderr() -> bool {
        true
    }

    /// Filter directives for `level`.
    ///
    /// A bare level (`debug`, `WARNING`, ...) is scoped to the isomaker crates; anything else is
    /// taken as an `EnvFilter` directive string. An empty level means `info`.
    pub fn directives(&self) -> String {
        let level = match self.level.trim() {
            "" => "info",
            level if level.eq_ignore_ascii_case("warning") => "warn",
            level => level,
        };
        match level.parse::<LevelFilter>() {
            Ok(level) => TARGETS
                .iter()
                .map(|target| format!("{target}={level}"))
                .collect::<Vec<_>>()
                .join(","),
            Err(_) => level.to_owned(),
        }
    }

    /// Effective filter: the configured directives with `RUST_LOG` appended when it parses.
    pub fn env_filter(&self) -> EnvFilter {
        let directives = self.directives();
        std::env::var("RUST_LOG")
            .ok()
            .filter(|env| !env.trim().is_empty())
            .and_then(|env| EnvFilter::try_new(format!("{directives},{}", env.trim())).ok())
            // `validate` already rejected configs whose own directives do not parse.
            .unwrap_or_else(|| EnvFilter::new(directives))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Self::default_level(),
            json: false,
            stderr: Self::default_stderr(),
        }
    }
}

/// Installs the global `tracing` subscriber.
///
/// Only the first call has an effect; later calls (and calls after another crate already
/// installed a global subscriber) are ignored.
pub fn init_tracing(config: &LoggingConfig) {
    TRACING_INIT.call_once(|| {
        if !config.stderr {
            return;
        }

        let filter = config.env_filter();
        let result = if config.json {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .try_init()
        } else {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
        };

        if let Err(err) = result {
            tracing::debug!(error = %err, "global tracing subscriber already installed");
        }
    });
}
