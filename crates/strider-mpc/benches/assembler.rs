//! # Constraint Assembler Benchmark
//!
//! Assembly runs once at startup; the RHS refresh runs every control tick
//! and has to stay well inside the control period.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use nalgebra::{DVector, Vector2};
use std::hint::black_box;

use strider_core::PreviewConfig;
use strider_mpc::{
    AdmissibilityConstraints, Constancy, ConstraintAssembler, ConstraintSource, ShapeConstraints,
};
use strider_test_utils::random_state;

fn walking_families() -> Vec<Box<dyn ConstraintSource>> {
    vec![
        Box::new(ShapeConstraints::new(0.1, 0.05, 0.8, 9.81).unwrap()),
        Box::new(AdmissibilityConstraints::new(0.3, 0.1).unwrap()),
        Box::new(Constancy::new(Vector2::new(2.0, 2.0))),
    ]
}

fn assembly_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("assemble");
    for horizon in [8, 16, 32] {
        group.bench_with_input(BenchmarkId::from_parameter(horizon), &horizon, |b, &n| {
            b.iter(|| {
                ConstraintAssembler::new(PreviewConfig::new(0.1, n), walking_families()).unwrap()
            });
        });
    }
    group.finish();
}

fn update_rhs_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("update_rhs");
    for horizon in [8, 16, 32] {
        let mut asm =
            ConstraintAssembler::new(PreviewConfig::new(0.1, horizon), walking_families()).unwrap();
        let xi = random_state(3);
        let mut rhs = DVector::zeros(asm.total_constraints());

        group.bench_function(BenchmarkId::from_parameter(horizon), |b| {
            b.iter(|| {
                asm.update_rhs(black_box(&xi)).unwrap();
                asm.copy_rhs(&mut rhs).unwrap();
            });
        });
    }
    group.finish();
}

criterion_group!(benches, assembly_benchmark, update_rhs_benchmark);
criterion_main!(benches);
