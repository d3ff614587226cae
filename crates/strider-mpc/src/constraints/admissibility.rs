//! Step-to-step admissibility constraints.
//!
//! Bounds how far the CoM may travel along the sagittal axis between two
//! consecutive preview steps:
//!
//! ```text
//!  c_x(i+1) − c_x(i) <= max_forward
//!  c_x(i) − c_x(i+1) <= max_backward
//! ```

use nalgebra::{DMatrix, DVector};
use strider_core::ConfigError;

use super::{ConstraintSource, check_non_negative};
use crate::types::{POS, STATE_DIM};

const ROWS: usize = 2;

/// Sagittal stride bounds between consecutive preview steps.
#[derive(Clone, Debug)]
pub struct AdmissibilityConstraints {
    max_forward: f64,
    max_backward: f64,
}

impl AdmissibilityConstraints {
    /// Forward and backward stride limits in metres; both must be >= 0.
    pub fn new(max_forward: f64, max_backward: f64) -> Result<Self, ConfigError> {
        check_non_negative("max_forward", max_forward)?;
        check_non_negative("max_backward", max_backward)?;
        Ok(Self {
            max_forward,
            max_backward,
        })
    }

    /// Same bound in both directions.
    pub fn symmetric(max_stride: f64) -> Result<Self, ConfigError> {
        Self::new(max_stride, max_stride)
    }

    fn signed_block(sign: f64) -> DMatrix<f64> {
        let mut block = DMatrix::zeros(ROWS, STATE_DIM);
        block[(0, POS)] = sign;
        block[(1, POS)] = -sign;
        block
    }
}

impl ConstraintSource for AdmissibilityConstraints {
    fn name(&self) -> &str {
        "admissibility"
    }

    fn same_step_block(&self) -> DMatrix<f64> {
        Self::signed_block(-1.0)
    }

    fn next_step_block(&self) -> DMatrix<f64> {
        Self::signed_block(1.0)
    }

    fn bound_vector(&self) -> DVector<f64> {
        DVector::from_column_slice(&[self.max_forward, self.max_backward])
    }

    fn num_constraints(&self) -> usize {
        ROWS
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocks_encode_displacement() {
        let adm = AdmissibilityConstraints::new(0.3, 0.1).unwrap();
        let ci = adm.same_step_block();
        let cii = adm.next_step_block();

        let mut now = DVector::zeros(STATE_DIM);
        let mut next = DVector::zeros(STATE_DIM);
        now[POS] = 1.0;
        next[POS] = 1.25;

        let lhs = &ci * &now + &cii * &next;
        assert!((lhs[0] - 0.25).abs() < 1e-12);
        assert!((lhs[1] + 0.25).abs() < 1e-12);
        assert!(lhs[0] <= adm.bound_vector()[0]);
    }

    #[test]
    fn lateral_motion_is_unconstrained() {
        let adm = AdmissibilityConstraints::symmetric(0.2).unwrap();
        for block in [adm.same_step_block(), adm.next_step_block()] {
            for col in 1..STATE_DIM {
                assert_eq!(block.column(col).norm(), 0.0);
            }
        }
    }

    #[test]
    fn rejects_negative_stride() {
        assert!(AdmissibilityConstraints::new(-0.1, 0.1).is_err());
        assert!(AdmissibilityConstraints::symmetric(f64::INFINITY).is_err());
    }
}
