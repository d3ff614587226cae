//! Linear constraint assembly for a preview-control walking stabilizer.
//!
//! The walking controller solves, every control tick, a mixed-integer QP over
//! the next `N` CoM jerks. This crate builds its linear inequality part:
//!
//! 1. **Preview model** — triple-integrator recurrence `ξ' = Q ξ + T x`
//! 2. **Constraint families** — shape, admissibility, constancy, or any
//!    [`ConstraintSource`] producing `(Ci, Cii, d)`
//! 3. **Assembler** — stacks the families, expands them over the horizon
//!    into a block-lower-triangular `A`, and refreshes `rhs` from live state
//!
//! # Architecture
//!
//! Everything that does not depend on the live state is built once in
//! [`ConstraintAssembler::new`]. The per-tick path is a single
//! matrix-vector product into a preallocated buffer; solving the QP is left
//! to the caller (see [`csc`] for the Clarabel hand-off).

pub mod assembler;
pub mod constraints;
pub mod csc;
pub mod preview;
pub mod types;

pub use assembler::ConstraintAssembler;
pub use constraints::{
    AdmissibilityConstraints, Constancy, ConstraintSource, RawConstraints, ShapeConstraints,
};
pub use csc::dmatrix_to_csc;
pub use preview::{PreviewModel, build_bh, build_matrix_q, build_matrix_t};
pub use types::{FamilyLayout, INPUT_DIM, InputVector, STATE_DIM, StateVector};
