use crate::calendar::WeekStart;
use serde::Deserialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Settings read from the configuration file, all of which have defaults
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Config {
    /// Milliseconds of quiet after an edit before it is saved
    pub(crate) debounce_ms: u64,
    pub(crate) week_start: WeekStart,
    pub(crate) data_file: PathBuf,
    pub(crate) temperature: TemperatureRange,
}

impl Config {
    pub(crate) fn load<P: AsRef<Path>>(path: P) -> Result<Config, ConfigError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Config::parse(&src, path)?;
        tracing::info!(path = %path.display(), "loaded configuration");
        Ok(config)
    }

    fn parse(src: &str, path: &Path) -> Result<Config, ConfigError> {
        let config = toml::from_str::<Config>(src).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.temperature.validate()?;
        Ok(config)
    }

    pub(crate) fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

impl Default for Config {
    fn default() -> Config {
        Config {
            debounce_ms: 3000,
            week_start: WeekStart::default(),
            data_file: PathBuf::from("measurements.json"),
            temperature: TemperatureRange::default(),
        }
    }
}

/// Bounds & granularity of the temperature slider, in degrees Celsius
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct TemperatureRange {
    /// Lowest selectable temperature, also given to new measurements
    pub(crate) min: f64,
    pub(crate) max: f64,
    pub(crate) step: f64,
    /// Temperatures above this are shown as a fever
    pub(crate) fever: f64,
}

impl TemperatureRange {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.min < self.max && self.step > 0.0 {
            Ok(())
        } else {
            Err(ConfigError::InvalidRange(*self))
        }
    }

    /// Snap to the nearest step above `min` and clamp to the range
    pub(crate) fn clamp(&self, value: f64) -> f64 {
        let steps = ((value - self.min) / self.step).round();
        self.step.mul_add(steps, self.min).clamp(self.min, self.max)
    }

    pub(crate) fn is_fever(&self, value: f64) -> bool {
        value > self.fever
    }

    /// Position of `value` within the range, from 0.0 to 1.0
    pub(crate) fn ratio(&self, value: f64) -> f64 {
        ((value - self.min) / (self.max - self.min)).clamp(0.0, 1.0)
    }
}

impl Default for TemperatureRange {
    fn default() -> TemperatureRange {
        TemperatureRange {
            min: 35.1,
            max: 41.0,
            step: 0.1,
            fever: 37.2,
        }
    }
}

#[derive(Debug, Error)]
pub(crate) enum ConfigError {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse {}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("invalid temperature range {}..{} with step {}", .0.min, .0.max, .0.step)]
    InvalidRange(TemperatureRange),
}
