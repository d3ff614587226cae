//! Support-region (shape) constraints.
//!
//! Keeps the ZMP of the next preview state inside an axis-aligned rectangle
//! around the support point. With the cart-table model the planar ZMP is
//!
//! ```text
//! z = c − (h / g) c̈
//! ```
//!
//! so each bound is linear in ξ. Rows, in order:
//! `z_x <= cx + l`, `−z_x <= l − cx`, `z_y <= cy + w`, `−z_y <= w − cy`.

use nalgebra::{DMatrix, DVector, Vector2};
use strider_core::ConfigError;

use super::{ConstraintSource, check_non_negative, check_positive};
use crate::types::{ACC, INPUT_DIM, POS, STATE_DIM, StateVector};

const ROWS: usize = 4;

/// Rectangular ZMP support constraints.
#[derive(Clone, Debug)]
pub struct ShapeConstraints {
    half_length: f64,
    half_width: f64,
    com_height: f64,
    gravity: f64,
    center: Vector2<f64>,
}

impl ShapeConstraints {
    /// Create a support rectangle centered on the origin.
    ///
    /// # Arguments
    /// * `half_length` - sagittal half-extent of the support region (m)
    /// * `half_width` - lateral half-extent of the support region (m)
    /// * `com_height` - constant CoM height of the cart-table model (m)
    /// * `gravity` - gravitational acceleration magnitude (m/s²)
    pub fn new(
        half_length: f64,
        half_width: f64,
        com_height: f64,
        gravity: f64,
    ) -> Result<Self, ConfigError> {
        check_non_negative("half_length", half_length)?;
        check_non_negative("half_width", half_width)?;
        check_positive("com_height", com_height)?;
        check_positive("gravity", gravity)?;
        Ok(Self {
            half_length,
            half_width,
            com_height,
            gravity,
            center: Vector2::zeros(),
        })
    }

    /// Move the rectangle center to `center` (world frame, m).
    #[must_use]
    pub fn with_center(mut self, center: Vector2<f64>) -> Self {
        self.center = center;
        self
    }

    /// Ratio `h / g` of the cart-table model.
    pub fn zmp_gain(&self) -> f64 {
        self.com_height / self.gravity
    }

    /// ZMP of a preview state.
    pub fn zmp(&self, xi: &StateVector) -> Vector2<f64> {
        let gain = self.zmp_gain();
        Vector2::new(
            xi[POS] - gain * xi[ACC],
            xi[POS + 1] - gain * xi[ACC + 1],
        )
    }
}

impl ConstraintSource for ShapeConstraints {
    fn name(&self) -> &str {
        "shape"
    }

    fn same_step_block(&self) -> DMatrix<f64> {
        DMatrix::zeros(ROWS, STATE_DIM)
    }

    fn next_step_block(&self) -> DMatrix<f64> {
        let gain = self.zmp_gain();
        let mut cii = DMatrix::zeros(ROWS, STATE_DIM);
        for axis in 0..INPUT_DIM {
            let upper = 2 * axis;
            let lower = upper + 1;
            cii[(upper, POS + axis)] = 1.0;
            cii[(upper, ACC + axis)] = -gain;
            cii[(lower, POS + axis)] = -1.0;
            cii[(lower, ACC + axis)] = gain;
        }
        cii
    }

    fn bound_vector(&self) -> DVector<f64> {
        let (cx, cy) = (self.center.x, self.center.y);
        DVector::from_column_slice(&[
            cx + self.half_length,
            self.half_length - cx,
            cy + self.half_width,
            self.half_width - cy,
        ])
    }

    fn num_constraints(&self) -> usize {
        ROWS
    }
}
