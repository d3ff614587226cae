//! Constancy constraints: a fixed upper bound on a same-step selection of
//! the preview state. `Cii` is zero.

use nalgebra::{DMatrix, DVector, Vector2};

use super::ConstraintSource;
use crate::types::{ACC, INPUT_DIM, STATE_DIM};

/// Upper bound `S` on `Ci ξ` at every preview step.
#[derive(Clone, Debug)]
pub struct Constancy {
    ci: DMatrix<f64>,
    s: DVector<f64>,
}

impl Constancy {
    /// Bound the planar CoM acceleration per axis: `c̈ <= S`.
    pub fn new(s: Vector2<f64>) -> Self {
        let mut ci = DMatrix::zeros(INPUT_DIM, STATE_DIM);
        for axis in 0..INPUT_DIM {
            ci[(axis, ACC + axis)] = 1.0;
        }
        Self {
            ci,
            s: DVector::from_column_slice(s.as_slice()),
        }
    }

    /// Bound an arbitrary same-step selector. Shapes are checked when the
    /// family is assembled.
    pub const fn from_rows(ci: DMatrix<f64>, s: DVector<f64>) -> Self {
        Self { ci, s }
    }

    /// Upper bounds `S`.
    pub const fn upper_bounds(&self) -> &DVector<f64> {
        &self.s
    }
}

impl ConstraintSource for Constancy {
    fn name(&self) -> &str {
        "constancy"
    }

    fn same_step_block(&self) -> DMatrix<f64> {
        self.ci.clone()
    }

    fn next_step_block(&self) -> DMatrix<f64> {
        DMatrix::zeros(self.s.len(), STATE_DIM)
    }

    fn bound_vector(&self) -> DVector<f64> {
        self.s.clone()
    }

    fn num_constraints(&self) -> usize {
        self.s.len()
    }
}
