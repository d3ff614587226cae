use thiserror::Error;

/// Top-level error type for strider.
#[derive(Debug, Error)]
pub enum StriderError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("State error: {0}")]
    State(#[from] StateError),
}

/// Configuration errors.
///
/// Raised while loading a config or assembling constraints, and by query
/// calls handed a buffer of the wrong shape. None of these can be recovered
/// inside a control tick.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid dt: {0} (must be finite and > 0)")]
    InvalidDt(f64),

    #[error("Invalid horizon: {0} (must be >= 1)")]
    InvalidHorizon(usize),

    #[error("No constraint rows registered")]
    NoConstraints,

    #[error("Family '{family}' {block} has shape {got_rows}x{got_cols}, expected {expected_rows}x{expected_cols}")]
    BlockShape {
        family: String,
        block: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        got_rows: usize,
        got_cols: usize,
    },

    #[error("Family '{family}' {block} contains a non-finite entry")]
    NonFiniteBlock { family: String, block: &'static str },

    #[error("Assembled constraints contain non-finite entries for dt={0}")]
    NonFiniteAssembly(f64),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Buffer size mismatch for {target}: expected {expected_rows}x{expected_cols}, got {got_rows}x{got_cols}")]
    BufferSize {
        target: &'static str,
        expected_rows: usize,
        expected_cols: usize,
        got_rows: usize,
        got_cols: usize,
    },
}

/// Live-state errors reported by the per-tick RHS refresh.
///
/// Copy + static messages for cheap propagation in hot paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StateError {
    #[error("State dimension mismatch: expected {expected}, got {got}")]
    StateDimMismatch { expected: usize, got: usize },

    #[error("Input dimension mismatch: expected {expected}, got {got}")]
    InputDimMismatch { expected: usize, got: usize },

    #[error("State contains a non-finite value at index {index}")]
    NonFiniteState { index: usize },

    #[error("Input contains a non-finite value at index {index}")]
    NonFiniteInput { index: usize },
}
