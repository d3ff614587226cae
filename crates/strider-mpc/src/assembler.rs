//! MIQP linear-constraint assembler for the walking preview controller.
//!
//! Builds, once per (families, dt, N), the horizon-wide system
//!
//! ```text
//! A X <= f̄c − B ξ_k
//! ```
//!
//! over the stacked decision `X = [x_{k+1}, ..., x_{k+N}]`. With the
//! combined per-step pair `Acl` (stacked `Ci`) and `Acr` (stacked `Cii`):
//!
//! ```text
//!     [ Acr T                      0                         ...  0     ]
//! A = [ (Acl Q⁰ + Acr Q¹) T        Acr T                     ...  0     ]
//!     [ (Acl Q¹ + Acr Q²) T        (Acl Q⁰ + Acr Q¹) T       ...  0     ]
//!     [ ...                                                       ...   ]
//!     [ (Acl Q^{N-2} + Acr Q^{N-1}) T            ...             Acr T  ]
//!
//!     [ Acl Q⁰ + Acr Q¹         ]
//! B = [ Acl Q¹ + Acr Q²         ]
//!     [ ...                     ]
//!     [ Acl Q^{N-1} + Acr Q^{N} ]
//! ```
//!
//! `A` and `B` depend only on the lag `i − j`, so each distinct block is
//! computed once and copied into place. Every control tick only the
//! right-hand side is refreshed, in `O(N)` and without allocating.

use std::ops::Range;

use nalgebra::{DMatrix, DVector, SMatrix};
use strider_core::{ConfigError, PreviewConfig, StateError};
use tracing::{debug, warn};

use crate::constraints::{ConstraintSource, FamilyBlocks};
use crate::preview::PreviewModel;
use crate::types::{FamilyLayout, INPUT_DIM, InputVector, STATE_DIM, StateVector};

/// Horizon-wide inequality system `A X <= rhs` for the walking MIQP.
#[derive(Clone, Debug)]
pub struct ConstraintAssembler {
    config: PreviewConfig,
    preview: PreviewModel,
    layout: Vec<FamilyLayout>,
    /// Stacked same-step blocks `Ci` (m × 6).
    acl: DMatrix<f64>,
    /// Stacked next-step blocks `Cii` (m × 6).
    acr: DMatrix<f64>,
    /// Stacked bounds `d` (m).
    fcbar: DVector<f64>,
    /// `fcbar` repeated over the horizon (N·m).
    fcbar_tiled: DVector<f64>,
    /// Block-lower-triangular constraint matrix (N·m × N·2).
    a: DMatrix<f64>,
    /// Live-state projection (N·m × 6).
    b: DMatrix<f64>,
    /// `fcbar_tiled − B ξ_k` for the last accepted state.
    rhs: DVector<f64>,
}

impl ConstraintAssembler {
    /// Assemble the constraint system for `config` from a set of families.
    ///
    /// Each family is queried exactly once; the assembler keeps only the
    /// extracted blocks. Any malformed family, an empty family set or an
    /// invalid `dt`/`horizon` fails here rather than inside the control loop.
    pub fn new(
        config: PreviewConfig,
        families: impl IntoIterator<Item = Box<dyn ConstraintSource>>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;

        let families: Vec<Box<dyn ConstraintSource>> = families.into_iter().collect();
        let (layout, acl, acr, fcbar) = stack_families(&families)?;

        let preview = PreviewModel::new(config.dt)?;
        let (a, b) = expand_horizon(&acl, &acr, &preview, config.horizon);
        if !a.iter().chain(b.iter()).all(|v| v.is_finite()) {
            return Err(ConfigError::NonFiniteAssembly(config.dt));
        }

        let fcbar_tiled = tile(&fcbar, config.horizon);
        let rhs = fcbar_tiled.clone();

        debug!(
            families = layout.len(),
            rows_per_step = fcbar.len(),
            horizon = config.horizon,
            dt = config.dt,
            total_constraints = a.nrows(),
            "assembled MIQP linear constraints"
        );

        Ok(Self {
            config,
            preview,
            layout,
            acl,
            acr,
            fcbar,
            fcbar_tiled,
            a,
            b,
            rhs,
        })
    }

    // ---------------------------------------------------------------------
    // Per-tick refresh
    // ---------------------------------------------------------------------

    /// Refresh the right-hand side from the live auxiliary state ξ_k.
    ///
    /// A state of the wrong dimension or with non-finite entries is rejected
    /// and the previous right-hand side is kept untouched.
    pub fn update_rhs(&mut self, xi: &DVector<f64>) -> Result<(), StateError> {
        let xi = state_from_slice(xi.as_slice()).inspect_err(|err| {
            warn!(error = %err, "rejected live state; keeping previous RHS");
        })?;
        self.apply_state(&xi);
        Ok(())
    }

    /// Refresh the right-hand side from the previous tick's state and the
    /// input applied since: `ξ_k = Q ξ_{k-1} + Bh x_k`.
    pub fn update_rhs_from_history(
        &mut self,
        prev: &DVector<f64>,
        applied: &DVector<f64>,
    ) -> Result<(), StateError> {
        let checked = state_from_slice(prev.as_slice())
            .and_then(|prev| Ok((prev, input_from_slice(applied.as_slice())?)));
        let (prev, applied) = checked.inspect_err(|err| {
            warn!(error = %err, "rejected state history; keeping previous RHS");
        })?;
        let xi = self.preview.advance_live(&prev, &applied);
        self.apply_state(&xi);
        Ok(())
    }

    fn apply_state(&mut self, xi: &StateVector) {
        self.rhs.copy_from(&self.fcbar_tiled);
        self.rhs.gemv(-1.0, &self.b, xi, 1.0);
    }

    // ---------------------------------------------------------------------
    // Queries
    // ---------------------------------------------------------------------

    /// Copy `A` into a caller-owned buffer of exactly
    /// `total_constraints() × decision_dim()`.
    pub fn copy_constraints_matrix(&self, out: &mut DMatrix<f64>) -> Result<(), ConfigError> {
        if out.shape() != self.a.shape() {
            return Err(ConfigError::BufferSize {
                target: "A",
                expected_rows: self.a.nrows(),
                expected_cols: self.a.ncols(),
                got_rows: out.nrows(),
                got_cols: out.ncols(),
            });
        }
        out.copy_from(&self.a);
        Ok(())
    }

    /// Copy the current right-hand side into a caller-owned vector of length
    /// `total_constraints()`.
    pub fn copy_rhs(&self, out: &mut DVector<f64>) -> Result<(), ConfigError> {
        if out.len() != self.rhs.len() {
            return Err(ConfigError::BufferSize {
                target: "rhs",
                expected_rows: self.rhs.len(),
                expected_cols: 1,
                got_rows: out.len(),
                got_cols: 1,
            });
        }
        out.copy_from(&self.rhs);
        Ok(())
    }

    /// Total number of inequality rows over the horizon.
    pub fn total_constraints(&self) -> usize {
        self.a.nrows()
    }

    /// Number of inequality rows per preview step.
    pub fn rows_per_step(&self) -> usize {
        self.fcbar.len()
    }

    /// Length of the stacked decision vector, `N · 2`.
    pub fn decision_dim(&self) -> usize {
        self.a.ncols()
    }

    /// Preview horizon length `N`.
    pub const fn horizon(&self) -> usize {
        self.config.horizon
    }

    /// Access the preview configuration.
    pub const fn config(&self) -> &PreviewConfig {
        &self.config
    }

    /// Access the preview model built for this `dt`.
    pub const fn preview(&self) -> &PreviewModel {
        &self.preview
    }

    /// The assembled block-lower-triangular constraints matrix `A`.
    pub const fn constraints_matrix(&self) -> &DMatrix<f64> {
        &self.a
    }

    /// Right-hand side from the last successful refresh.
    pub const fn rhs(&self) -> &DVector<f64> {
        &self.rhs
    }

    /// Projection `B` of the live state onto every horizon row.
    pub const fn state_projection(&self) -> &DMatrix<f64> {
        &self.b
    }

    /// Stacked same-step blocks of every family.
    pub const fn acl(&self) -> &DMatrix<f64> {
        &self.acl
    }

    /// Stacked next-step blocks of every family.
    pub const fn acr(&self) -> &DMatrix<f64> {
        &self.acr
    }

    /// Stacked per-step bound vector.
    pub const fn fcbar(&self) -> &DVector<f64> {
        &self.fcbar
    }

    /// Per-step placement of each family, in registration order.
    pub fn family_layout(&self) -> &[FamilyLayout] {
        &self.layout
    }

    /// Rows of family `family` at preview `step` in the horizon-wide system.
    pub fn family_rows(&self, family: usize, step: usize) -> Option<Range<usize>> {
        if step >= self.config.horizon {
            return None;
        }
        self.layout
            .get(family)
            .map(|layout| layout.horizon_rows(step, self.rows_per_step()))
    }

    /// `A X − rhs` for a candidate stacked decision.
    ///
    /// Allocates; meant for vetting a solver answer, not for the hot path.
    pub fn residual(&self, decisions: &DVector<f64>) -> Result<DVector<f64>, StateError> {
        if decisions.len() != self.decision_dim() {
            return Err(StateError::InputDimMismatch {
                expected: self.decision_dim(),
                got: decisions.len(),
            });
        }
        if let Some(index) = decisions.iter().position(|v| !v.is_finite()) {
            return Err(StateError::NonFiniteInput { index });
        }
        Ok(&self.a * decisions - &self.rhs)
    }

    /// Largest violated margin of `A X <= rhs`, zero when all rows hold.
    pub fn max_violation(&self, decisions: &DVector<f64>) -> Result<f64, StateError> {
        let residual = self.residual(decisions)?;
        Ok(residual.iter().copied().fold(0.0_f64, f64::max))
    }

    /// Whether `A X <= rhs + tol` holds row-wise.
    pub fn is_satisfied(&self, decisions: &DVector<f64>, tol: f64) -> Result<bool, StateError> {
        Ok(self.max_violation(decisions)? <= tol)
    }
}

// ---------------------------------------------------------------------------
// Assembly helpers
// ---------------------------------------------------------------------------

type StackedBlocks = (Vec<FamilyLayout>, DMatrix<f64>, DMatrix<f64>, DVector<f64>);

/// Extract and stack every family row-wise into `(layout, Acl, Acr, f̄c)`.
fn stack_families(families: &[Box<dyn ConstraintSource>]) -> Result<StackedBlocks, ConfigError> {
    let blocks = families
        .iter()
        .map(|family| FamilyBlocks::extract(family.as_ref()))
        .collect::<Result<Vec<_>, _>>()?;

    let rows: usize = blocks.iter().map(FamilyBlocks::rows).sum();
    if rows == 0 {
        return Err(ConfigError::NoConstraints);
    }

    let mut layout = Vec::with_capacity(blocks.len());
    let mut acl = DMatrix::zeros(rows, STATE_DIM);
    let mut acr = DMatrix::zeros(rows, STATE_DIM);
    let mut fcbar = DVector::zeros(rows);

    let mut offset = 0;
    for family in blocks {
        let m = family.rows();
        acl.view_mut((offset, 0), (m, STATE_DIM)).copy_from(&family.ci);
        acr.view_mut((offset, 0), (m, STATE_DIM)).copy_from(&family.cii);
        fcbar.rows_mut(offset, m).copy_from(&family.d);
        layout.push(FamilyLayout {
            name: family.name,
            row_offset: offset,
            rows: m,
        });
        offset += m;
    }

    Ok((layout, acl, acr, fcbar))
}

/// Expand the per-step pair through the preview recurrence into `(A, B)`.
///
/// With `M_i = Acl Q^i + Acr Q^{i+1}` (so `M_{i+1} = M_i Q`), block row `i`
/// of `B` is `M_i`, and the lag-`l` block of `A` is `Acr T` for `l = 0` and
/// `M_{l-1} T` otherwise.
fn expand_horizon(
    acl: &DMatrix<f64>,
    acr: &DMatrix<f64>,
    preview: &PreviewModel,
    horizon: usize,
) -> (DMatrix<f64>, DMatrix<f64>) {
    let m = acl.nrows();
    let q = to_dmatrix(preview.q());
    let t = to_dmatrix(preview.t());

    let mut b = DMatrix::zeros(horizon * m, STATE_DIM);
    let mut lag_blocks = Vec::with_capacity(horizon);
    lag_blocks.push(acr * &t);

    let mut m_i = acl + acr * &q;
    for i in 0..horizon {
        b.view_mut((i * m, 0), (m, STATE_DIM)).copy_from(&m_i);
        if i + 1 < horizon {
            lag_blocks.push(&m_i * &t);
            m_i = &m_i * &q;
        }
    }

    let mut a = DMatrix::zeros(horizon * m, horizon * INPUT_DIM);
    for i in 0..horizon {
        for j in 0..=i {
            a.view_mut((i * m, j * INPUT_DIM), (m, INPUT_DIM))
                .copy_from(&lag_blocks[i - j]);
        }
    }

    (a, b)
}

fn tile(v: &DVector<f64>, times: usize) -> DVector<f64> {
    let m = v.len();
    let mut out = DVector::zeros(m * times);
    for k in 0..times {
        out.rows_mut(k * m, m).copy_from(v);
    }
    out
}

fn to_dmatrix<const R: usize, const C: usize>(m: &SMatrix<f64, R, C>) -> DMatrix<f64> {
    DMatrix::from_column_slice(R, C, m.as_slice())
}

fn state_from_slice(values: &[f64]) -> Result<StateVector, StateError> {
    if values.len() != STATE_DIM {
        return Err(StateError::StateDimMismatch {
            expected: STATE_DIM,
            got: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(StateError::NonFiniteState { index });
    }
    Ok(StateVector::from_column_slice(values))
}

fn input_from_slice(values: &[f64]) -> Result<InputVector, StateError> {
    if values.len() != INPUT_DIM {
        return Err(StateError::InputDimMismatch {
            expected: INPUT_DIM,
            got: values.len(),
        });
    }
    if let Some(index) = values.iter().position(|v| !v.is_finite()) {
        return Err(StateError::NonFiniteInput { index });
    }
    Ok(InputVector::from_column_slice(values))
}
