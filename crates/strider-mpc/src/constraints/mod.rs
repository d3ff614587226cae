//! Per-step constraint families.
//!
//! Every family describes one kind of inequality acting on two consecutive
//! preview states:
//!
//! ```text
//! Ci ξ_{k+i} + Cii ξ_{k+i+1} <= d
//! ```
//!
//! The blocks do not depend on the preview step, so a family is queried once
//! at assembly and never again.

pub mod admissibility;
pub mod constancy;
pub mod raw;
pub mod shape;

pub use admissibility::AdmissibilityConstraints;
pub use constancy::Constancy;
pub use raw::RawConstraints;
pub use shape::ShapeConstraints;

use nalgebra::{DMatrix, DVector};
use strider_core::ConfigError;

use crate::types::STATE_DIM;

/// A source of time-invariant linear inequality blocks.
pub trait ConstraintSource {
    /// Human-readable family name, used in errors and logs.
    fn name(&self) -> &str;

    /// `Ci`: coefficients on the state at the same preview step (m × 6).
    fn same_step_block(&self) -> DMatrix<f64>;

    /// `Cii`: coefficients on the state at the next preview step (m × 6).
    fn next_step_block(&self) -> DMatrix<f64>;

    /// `d`: state-independent upper bounds (m).
    fn bound_vector(&self) -> DVector<f64>;

    /// Number of inequality rows contributed per preview step.
    ///
    /// The assembler takes the row count from the extracted bound vector and
    /// never calls this, so overriding it cannot change the assembled system.
    fn num_constraints(&self) -> usize {
        self.bound_vector().len()
    }
}

/// Validated blocks extracted from one [`ConstraintSource`].
#[derive(Clone, Debug)]
pub(crate) struct FamilyBlocks {
    pub name: String,
    pub ci: DMatrix<f64>,
    pub cii: DMatrix<f64>,
    pub d: DVector<f64>,
}

impl FamilyBlocks {
    /// Query a source once and check that its blocks agree with each other
    /// and with the preview state dimension.
    ///
    /// Each of the three block functions is called exactly once; the row
    /// count comes from `d`.
    pub fn extract(source: &dyn ConstraintSource) -> Result<Self, ConfigError> {
        let name = source.name().to_owned();
        let ci = source.same_step_block();
        let cii = source.next_step_block();
        let d = source.bound_vector();
        let rows = d.len();

        check_shape(&name, "Ci", &ci, rows)?;
        check_shape(&name, "Cii", &cii, rows)?;
        check_finite(&name, "Ci", ci.iter())?;
        check_finite(&name, "Cii", cii.iter())?;
        check_finite(&name, "d", d.iter())?;

        Ok(Self { name, ci, cii, d })
    }

    pub fn rows(&self) -> usize {
        self.d.len()
    }
}

fn check_shape(
    family: &str,
    block: &'static str,
    m: &DMatrix<f64>,
    rows: usize,
) -> Result<(), ConfigError> {
    if m.shape() != (rows, STATE_DIM) {
        return Err(ConfigError::BlockShape {
            family: family.to_owned(),
            block,
            expected_rows: rows,
            expected_cols: STATE_DIM,
            got_rows: m.nrows(),
            got_cols: m.ncols(),
        });
    }
    Ok(())
}

fn check_finite<'a>(
    family: &str,
    block: &'static str,
    mut values: impl Iterator<Item = &'a f64>,
) -> Result<(), ConfigError> {
    if values.all(|v| v.is_finite()) {
        Ok(())
    } else {
        Err(ConfigError::NonFiniteBlock {
            family: family.to_owned(),
            block,
        })
    }
}

/// Reject a geometric parameter that is not a finite, non-negative number.
pub(crate) fn check_non_negative(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value < 0.0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            message: format!("must be finite and >= 0, got {value}"),
        });
    }
    Ok(())
}

/// Reject a geometric parameter that is not a finite, strictly positive number.
pub(crate) fn check_positive(field: &str, value: f64) -> Result<(), ConfigError> {
    if !value.is_finite() || value <= 0.0 {
        return Err(ConfigError::InvalidValue {
            field: field.to_owned(),
            message: format!("must be finite and > 0, got {value}"),
        });
    }
    Ok(())
}
