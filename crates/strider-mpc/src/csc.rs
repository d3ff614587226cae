//! Hand-off of the assembled system to Clarabel.
//!
//! Clarabel reads inequalities as `A z + s = b, s ∈ K`; with the nonnegative
//! cone that is exactly `A z <= b`, so `(A, rhs)` passes through unchanged.

use clarabel::algebra::CscMatrix;
use clarabel::solver::SupportedConeT::{self, NonnegativeConeT};
use nalgebra::DMatrix;

use crate::assembler::ConstraintAssembler;

/// Convert a nalgebra `DMatrix<f64>` to a Clarabel `CscMatrix<f64>`,
/// dropping exact zeros.
pub fn dmatrix_to_csc(m: &DMatrix<f64>) -> CscMatrix<f64> {
    let (nrows, ncols) = m.shape();
    let mut colptr = vec![0usize; ncols + 1];
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();

    for j in 0..ncols {
        for (i, &v) in m.column(j).iter().enumerate() {
            if v != 0.0 {
                rowval.push(i);
                nzval.push(v);
            }
        }
        colptr[j + 1] = rowval.len();
    }

    CscMatrix::new(nrows, ncols, colptr, rowval, nzval)
}

impl ConstraintAssembler {
    /// `A` in compressed sparse column form.
    pub fn constraints_csc(&self) -> CscMatrix<f64> {
        dmatrix_to_csc(self.constraints_matrix())
    }

    /// Cone list matching [`Self::constraints_csc`]: every row is an
    /// inequality.
    pub fn inequality_cones(&self) -> Vec<SupportedConeT<f64>> {
        vec![NonnegativeConeT(self.total_constraints())]
    }
}
