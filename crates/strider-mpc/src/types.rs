//! Core types for the walking preview model.

use std::ops::Range;

use nalgebra::{Matrix6, SMatrix, Vector2, Vector6};

/// Dimension of the auxiliary preview state: [c_x, c_y, ċ_x, ċ_y, c̈_x, c̈_y] = 6.
pub const STATE_DIM: usize = 6;

/// Dimension of the per-step decision: planar CoM jerk [j_x, j_y] = 2.
pub const INPUT_DIM: usize = 2;

/// Auxiliary preview state ξ.
pub type StateVector = Vector6<f64>;

/// Per-step decision x.
pub type InputVector = Vector2<f64>;

/// State transition block `Q`.
pub type TransitionMatrix = Matrix6<f64>;

/// Input-to-state block (`T`, `Bh`).
pub type InputMatrix = SMatrix<f64, STATE_DIM, INPUT_DIM>;

/// Index of the first position component in [`StateVector`].
pub const POS: usize = 0;
/// Index of the first velocity component in [`StateVector`].
pub const VEL: usize = 2;
/// Index of the first acceleration component in [`StateVector`].
pub const ACC: usize = 4;

/// Where one constraint family sits inside a single preview step.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FamilyLayout {
    /// Family name as reported by its source.
    pub name: String,
    /// First row of the family inside the per-step block.
    pub row_offset: usize,
    /// Number of rows the family contributes per step.
    pub rows: usize,
}

impl FamilyLayout {
    /// Rows of this family in the horizon-wide system at preview `step`.
    pub const fn horizon_rows(&self, step: usize, rows_per_step: usize) -> Range<usize> {
        let start = step * rows_per_step + self.row_offset;
        start..start + self.rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_layout_indices() {
        assert_eq!(POS, 0);
        assert_eq!(VEL, 2);
        assert_eq!(ACC, 4);
        assert_eq!(ACC + INPUT_DIM, STATE_DIM);
    }

    #[test]
    fn family_layout_horizon_rows() {
        let layout = FamilyLayout {
            name: "admissibility".into(),
            row_offset: 4,
            rows: 2,
        };
        assert_eq!(layout.horizon_rows(0, 6), 4..6);
        assert_eq!(layout.horizon_rows(2, 6), 16..18);
    }
}
