//! Discrete-time preview model of the planar CoM.
//!
//! Each planar axis is a triple integrator driven by a piecewise-constant
//! jerk. The auxiliary state evolves through the preview window as
//!
//! ```text
//! ξ_{k+j+1} = Q ξ_{k+j} + T x_{k+j+1}
//! ```
//!
//! with
//!
//! ```text
//!     [ I   δt·I   δt²/2·I ]        [ δt³/6·I ]
//! Q = [ 0     I     δt·I   ]    T = [ δt²/2·I ]
//!     [ 0     0       I    ]        [  δt·I   ]
//! ```
//!
//! `Bh` is the input block of the live CoM state process. It shares `T`'s
//! expression for this model and is used to rebuild ξ_k from the previous
//! tick's state and the input that was actually applied.

use nalgebra::DVector;
use strider_core::{ConfigError, StateError, validate_dt};

use crate::types::{
    ACC, INPUT_DIM, InputMatrix, InputVector, POS, StateVector, TransitionMatrix, VEL,
};

/// Build the state transition block `Q` for period `dt`.
pub fn build_matrix_q(dt: f64) -> TransitionMatrix {
    let mut q = TransitionMatrix::identity();
    for axis in 0..INPUT_DIM {
        q[(POS + axis, VEL + axis)] = dt;
        q[(POS + axis, ACC + axis)] = dt * dt / 2.0;
        q[(VEL + axis, ACC + axis)] = dt;
    }
    q
}

/// Build the preview input block `T` for period `dt`.
pub fn build_matrix_t(dt: f64) -> InputMatrix {
    jerk_input_block(dt)
}

/// Build the CoM state-process input block `Bh` for period `dt`.
pub fn build_bh(dt: f64) -> InputMatrix {
    jerk_input_block(dt)
}

fn jerk_input_block(dt: f64) -> InputMatrix {
    let mut b = InputMatrix::zeros();
    for axis in 0..INPUT_DIM {
        b[(POS + axis, axis)] = dt * dt * dt / 6.0;
        b[(VEL + axis, axis)] = dt * dt / 2.0;
        b[(ACC + axis, axis)] = dt;
    }
    b
}

/// Constant recurrence matrices for one control period.
#[derive(Clone, Debug)]
pub struct PreviewModel {
    dt: f64,
    q: TransitionMatrix,
    t: InputMatrix,
    bh: InputMatrix,
}

impl PreviewModel {
    /// Build the model for control period `dt` (seconds).
    pub fn new(dt: f64) -> Result<Self, ConfigError> {
        validate_dt(dt)?;
        Ok(Self {
            dt,
            q: build_matrix_q(dt),
            t: build_matrix_t(dt),
            bh: build_bh(dt),
        })
    }

    /// Control period in seconds.
    pub const fn dt(&self) -> f64 {
        self.dt
    }

    /// State transition matrix `Q`.
    pub const fn q(&self) -> &TransitionMatrix {
        &self.q
    }

    /// Preview input matrix `T`.
    pub const fn t(&self) -> &InputMatrix {
        &self.t
    }

    /// Input block `Bh` of the live state update.
    pub const fn bh(&self) -> &InputMatrix {
        &self.bh
    }

    /// One preview step: `Q ξ + T x`.
    pub fn propagate(&self, xi: &StateVector, x: &InputVector) -> StateVector {
        self.q * xi + self.t * x
    }

    /// Rebuild the live state from the previous one and the applied input:
    /// `Q ξ_{k-1} + Bh x_k`.
    pub fn advance_live(&self, prev: &StateVector, applied: &InputVector) -> StateVector {
        self.q * prev + self.bh * applied
    }

    /// Roll the recurrence over a stacked decision vector `[x_1, ..., x_N]`.
    ///
    /// Returns `N + 1` states, starting with `xi0` itself.
    pub fn predict(
        &self,
        xi0: &StateVector,
        decisions: &DVector<f64>,
    ) -> Result<Vec<StateVector>, StateError> {
        if decisions.len() % INPUT_DIM != 0 {
            return Err(StateError::InputDimMismatch {
                expected: decisions.len().next_multiple_of(INPUT_DIM),
                got: decisions.len(),
            });
        }

        let mut states = Vec::with_capacity(decisions.len() / INPUT_DIM + 1);
        states.push(*xi0);
        for chunk in decisions.as_slice().chunks_exact(INPUT_DIM) {
            let x = InputVector::from_column_slice(chunk);
            let last = states[states.len() - 1];
            states.push(self.propagate(&last, &x));
        }
        Ok(states)
    }
}
