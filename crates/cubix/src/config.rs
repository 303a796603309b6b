//! # Configuration
//!
//! Cube settings loaded from TOML once at startup.
//!
//! ```toml
//! size = 4
//! cancel_poll_ms = 10
//! ```
//!
//! Missing keys fall back to [`CubeConfig::default`]; unknown keys are
//! rejected.

use std::path::Path;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use cubix_core::MAX_CUBE_SIZE;

use crate::error::{CubeError, CubeResult};

/// Settings for one [`Cube`](crate::Cube).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CubeConfig {
    /// Layers per axis (`N`).
    pub size: usize,
    /// How often a cancellable waiter re-checks its token, in milliseconds.
    pub cancel_poll_ms: u64,
}

impl Default for CubeConfig {
    fn default() -> Self {
        Self {
            size: 3,
            cancel_poll_ms: 10,
        }
    }
}

impl CubeConfig {
    /// Parses and validates a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`CubeError::Config`] on malformed TOML or a zero poll
    /// interval, and [`CubeError::InvalidSize`] on an unsupported size.
    pub fn from_toml_str(text: &str) -> CubeResult<Self> {
        let config: Self = parse_toml(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    ///
    /// # Errors
    ///
    /// As [`from_toml_str`](Self::from_toml_str), plus [`CubeError::Config`]
    /// if the file cannot be read.
    pub fn from_file(path: impl AsRef<Path>) -> CubeResult<Self> {
        Self::from_toml_str(&read_file(path.as_ref())?)
    }

    /// Checks every value is in range.
    ///
    /// # Errors
    ///
    /// See [`from_toml_str`](Self::from_toml_str).
    pub fn validate(&self) -> CubeResult<()> {
        if self.size == 0 || self.size > MAX_CUBE_SIZE {
            return Err(CubeError::InvalidSize {
                size: self.size,
                max: MAX_CUBE_SIZE,
            });
        }
        if self.cancel_poll_ms == 0 {
            return Err(CubeError::Config(
                "cancel_poll_ms must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// The poll interval as a [`Duration`].
    #[must_use]
    pub const fn cancel_poll(&self) -> Duration {
        Duration::from_millis(self.cancel_poll_ms)
    }
}

pub(crate) fn parse_toml<T: DeserializeOwned>(text: &str) -> CubeResult<T> {
    Ok(toml::from_str(text)?)
}

pub(crate) fn read_file(path: &Path) -> CubeResult<String> {
    std::fs::read_to_string(path)
        .map_err(|err| CubeError::Config(format!("cannot read {}: {err}", path.display())))
}
