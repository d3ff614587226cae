// strider-core: error types and preview-control configuration for Strider.

pub mod config;
pub mod error;

pub use config::{PreviewConfig, validate_dt};
pub use error::{ConfigError, StateError, StriderError};
