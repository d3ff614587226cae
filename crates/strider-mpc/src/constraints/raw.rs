//! Externally generated constraint blocks.

use nalgebra::{DMatrix, DVector};

use super::ConstraintSource;

/// A family whose `(Ci, Cii, d)` triple comes from an outside generator.
///
/// Nothing is checked here; malformed blocks are rejected at assembly.
#[derive(Clone, Debug)]
pub struct RawConstraints {
    name: String,
    ci: DMatrix<f64>,
    cii: DMatrix<f64>,
    d: DVector<f64>,
}

impl RawConstraints {
    /// Wrap a generated `(Ci, Cii, d)` triple under `name`.
    pub fn new(
        name: impl Into<String>,
        ci: DMatrix<f64>,
        cii: DMatrix<f64>,
        d: DVector<f64>,
    ) -> Self {
        Self {
            name: name.into(),
            ci,
            cii,
            d,
        }
    }
}

impl ConstraintSource for RawConstraints {
    fn name(&self) -> &str {
        &self.name
    }

    fn same_step_block(&self) -> DMatrix<f64> {
        self.ci.clone()
    }

    fn next_step_block(&self) -> DMatrix<f64> {
        self.cii.clone()
    }

    fn bound_vector(&self) -> DVector<f64> {
        self.d.clone()
    }
}
