//! Integration test: the assembled `A X <= rhs` system against a direct
//! simulation of the preview recurrence.
//!
//! For a stacked decision X and live state ξ_k, row block i of `A X − rhs`
//! must equal `Acl ξ_{k+i} + Acr ξ_{k+i+1} − f̄c`, where the states come
//! from rolling `ξ' = Q ξ + T x` forward one step at a time.

use std::cell::Cell;
use std::rc::Rc;

use approx::assert_relative_eq;
use nalgebra::{DMatrix, DVector, Vector2};
use strider_core::{ConfigError, PreviewConfig};
use strider_mpc::{
    AdmissibilityConstraints, Constancy, ConstraintAssembler, ConstraintSource, INPUT_DIM,
    RawConstraints, STATE_DIM, ShapeConstraints, StateVector,
};
use strider_test_utils::{random_decisions, random_state};

fn shape() -> ShapeConstraints {
    ShapeConstraints::new(0.1, 0.05, 0.8, 9.81).unwrap()
}

fn admissibility() -> AdmissibilityConstraints {
    AdmissibilityConstraints::new(0.3, 0.1).unwrap()
}

#[test]
fn shape_and_admissibility_over_three_steps() {
    let families: Vec<Box<dyn ConstraintSource>> =
        vec![Box::new(shape()), Box::new(admissibility())];
    let asm = ConstraintAssembler::new(PreviewConfig::new(0.1, 3), families).unwrap();

    assert_eq!(asm.total_constraints(), 18);

    let mut a = DMatrix::zeros(asm.total_constraints(), 3 * INPUT_DIM);
    asm.copy_constraints_matrix(&mut a).unwrap();

    for i in 0..3 {
        for j in (i + 1)..3 {
            let blk = a.view((i * 6, j * INPUT_DIM), (6, INPUT_DIM));
            assert!(blk.iter().all(|&v| v == 0.0), "block ({i},{j}) must be zero");
        }
    }
    // The diagonal couples each step to its own decision
    assert!(a.view((0, 0), (6, INPUT_DIM)).norm() > 0.0);
}

#[test]
fn residual_matches_simulated_trajectory() {
    let horizon = 6;
    let dt = 0.05;
    let families: Vec<Box<dyn ConstraintSource>> = vec![
        Box::new(shape()),
        Box::new(admissibility()),
        Box::new(Constancy::new(Vector2::new(2.0, 2.0))),
    ];
    let mut asm = ConstraintAssembler::new(PreviewConfig::new(dt, horizon), families).unwrap();
    let m = asm.rows_per_step();

    for seed in 0..5 {
        let xi = random_state(seed);
        let decisions = random_decisions(horizon, 5.0, seed + 100);
        asm.update_rhs(&xi).unwrap();

        let xi0 = StateVector::from_column_slice(xi.as_slice());
        let states = asm.preview().predict(&xi0, &decisions).unwrap();
        let residual = asm.residual(&decisions).unwrap();

        for i in 0..horizon {
            let now = DVector::from_column_slice(states[i].as_slice());
            let next = DVector::from_column_slice(states[i + 1].as_slice());
            let expected = asm.acl() * &now + asm.acr() * &next - asm.fcbar();
            let got = residual.rows(i * m, m).clone_owned();
            assert_relative_eq!(got, expected, epsilon = 1e-10);
        }
    }
}

#[test]
fn per_tick_refresh_tracks_state() {
    let families: Vec<Box<dyn ConstraintSource>> =
        vec![Box::new(shape()), Box::new(admissibility())];
    let mut asm = ConstraintAssembler::new(PreviewConfig::new(0.1, 4), families).unwrap();
    let mut rhs = DVector::zeros(asm.total_constraints());

    // Host loop: refresh, export, reuse the buffer across ticks
    let mut previous: Option<DVector<f64>> = None;
    for tick in 0..10 {
        let xi = random_state(tick);
        asm.update_rhs(&xi).unwrap();
        asm.copy_rhs(&mut rhs).unwrap();

        let expected = asm.state_projection() * &xi;
        for row in 0..rhs.len() {
            let bound = asm.fcbar()[row % asm.rows_per_step()];
            assert_relative_eq!(rhs[row], bound - expected[row], epsilon = 1e-12);
        }
        if let Some(prev) = &previous {
            assert_ne!(prev, &rhs);
        }
        previous = Some(rhs.clone());
    }

    // A bad tick leaves the last valid constraints in place
    let last = asm.rhs().clone();
    assert!(asm.update_rhs(&DVector::zeros(STATE_DIM + 1)).is_err());
    assert_eq!(asm.rhs(), &last);
}

#[test]
fn assembler_from_toml_config() {
    let config = PreviewConfig::from_toml_str("dt = 0.1\nhorizon = 8\n").unwrap();
    let families: Vec<Box<dyn ConstraintSource>> = vec![Box::new(shape())];
    let asm = ConstraintAssembler::new(config, families).unwrap();
    assert_eq!(asm.total_constraints(), 32);
    assert_eq!(asm.decision_dim(), 16);
    assert_eq!(asm.constraints_csc().n, 16);
}

#[test]
fn invalid_config_fails_before_any_tick() {
    let families: Vec<Box<dyn ConstraintSource>> = vec![Box::new(shape())];
    let err = ConstraintAssembler::new(PreviewConfig::new(0.0, 8), families).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidDt(_)));
}

/// Shared per-function call counts for [`Counted`].
#[derive(Default)]
struct CallCounts {
    same_step: Cell<usize>,
    next_step: Cell<usize>,
    bound: Cell<usize>,
}

/// Forwards to an inner family and records every block query.
struct Counted<S> {
    inner: S,
    counts: Rc<CallCounts>,
}

impl<S: ConstraintSource> ConstraintSource for Counted<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn same_step_block(&self) -> DMatrix<f64> {
        self.counts.same_step.set(self.counts.same_step.get() + 1);
        self.inner.same_step_block()
    }

    fn next_step_block(&self) -> DMatrix<f64> {
        self.counts.next_step.set(self.counts.next_step.get() + 1);
        self.inner.next_step_block()
    }

    fn bound_vector(&self) -> DVector<f64> {
        self.counts.bound.set(self.counts.bound.get() + 1);
        self.inner.bound_vector()
    }
}

#[test]
fn assembly_queries_each_family_block_once() {
    let counts = Rc::new(CallCounts::default());
    let raw = RawConstraints::new(
        "generated",
        DMatrix::zeros(3, STATE_DIM),
        DMatrix::identity(3, STATE_DIM),
        DVector::from_element(3, 0.5),
    );
    let families: Vec<Box<dyn ConstraintSource>> = vec![
        Box::new(Counted {
            inner: raw,
            counts: Rc::clone(&counts),
        }),
        Box::new(shape()),
    ];

    let mut asm = ConstraintAssembler::new(PreviewConfig::new(0.1, 2), families).unwrap();
    asm.update_rhs(&random_state(7)).unwrap();

    assert_eq!(asm.total_constraints(), 2 * (3 + 4));
    assert_eq!(counts.same_step.get(), 1);
    assert_eq!(counts.next_step.get(), 1);
    assert_eq!(counts.bound.get(), 1);
}
