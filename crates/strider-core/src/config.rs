use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

// ---------------------------------------------------------------------------
// Serde default functions
// ---------------------------------------------------------------------------

const fn default_dt() -> f64 {
    0.1
}
const fn default_horizon() -> usize {
    16
}

// ---------------------------------------------------------------------------
// PreviewConfig
// ---------------------------------------------------------------------------

/// Preview-control parameters shared by every derived constraint matrix.
///
/// Changing either field invalidates the assembled matrices; build a new
/// assembler instead of mutating a live one.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Control period in seconds (default: 0.1 = 10 Hz).
    #[serde(default = "default_dt")]
    pub dt: f64,

    /// Number of preview steps (default: 16).
    #[serde(default = "default_horizon")]
    pub horizon: usize,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            dt: default_dt(),
            horizon: default_horizon(),
        }
    }
}

impl PreviewConfig {
    /// Create a config from a period and a horizon length.
    pub const fn new(dt: f64, horizon: usize) -> Self {
        Self { dt, horizon }
    }

    /// Create a config from a period in whole milliseconds, the unit the
    /// walking thread is scheduled with.
    pub fn from_period_ms(period_ms: u32, horizon: usize) -> Self {
        Self {
            dt: f64::from(period_ms) * 1e-3,
            horizon,
        }
    }

    /// Validate configuration. Returns Err on invalid values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_dt(self.dt)?;
        if self.horizon == 0 {
            return Err(ConfigError::InvalidHorizon(self.horizon));
        }
        Ok(())
    }

    /// Preview window length in seconds.
    #[allow(clippy::cast_precision_loss)]
    pub fn window_duration(&self) -> f64 {
        self.dt * self.horizon as f64
    }

    /// Control rate in Hz.
    pub fn control_hz(&self) -> f64 {
        1.0 / self.dt
    }

    /// Parse from a TOML string and validate.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }
}

/// Check that a control period is usable for discretization.
pub fn validate_dt(dt: f64) -> Result<(), ConfigError> {
    if !dt.is_finite() || dt <= 0.0 {
        return Err(ConfigError::InvalidDt(dt));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
