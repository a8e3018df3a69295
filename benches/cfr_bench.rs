//! Benchmarks for CFR solver.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use infoset_solver::cfr::{CFRSolver, InfoSetRegistry, SolverConfig};
use infoset_solver::games::coin::CoinGame;
use infoset_solver::games::kuhn::KuhnPoker;

fn kuhn_iteration_benchmark(c: &mut Criterion) {
    let config = SolverConfig::default().with_max_iterations(u64::MAX);
    let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();

    c.bench_function("kuhn_single_iteration", |b| {
        b.iter(|| black_box(solver.run_iteration().unwrap()))
    });
}

fn kuhn_1000_iterations_benchmark(c: &mut Criterion) {
    c.bench_function("kuhn_1000_iterations", |b| {
        b.iter(|| {
            let config = SolverConfig::default()
                .with_max_iterations(black_box(1000))
                .with_gain_threshold(0.0);
            let mut solver = CFRSolver::new(KuhnPoker::new(), config).unwrap();
            solver.solve().unwrap().final_gain
        })
    });
}

fn coin_iteration_benchmark(c: &mut Criterion) {
    let game = CoinGame::new(3, 1).unwrap();
    let config = SolverConfig::default().with_max_iterations(u64::MAX);
    let mut solver = CFRSolver::new(game, config).unwrap();

    c.bench_function("coin_3x1_single_iteration", |b| {
        b.iter(|| black_box(solver.run_iteration().unwrap()))
    });
}

fn registry_build_benchmark(c: &mut Criterion) {
    let game = CoinGame::new(3, 2).unwrap();

    c.bench_function("coin_3x2_registry_build", |b| {
        b.iter(|| InfoSetRegistry::build(black_box(&game)).unwrap().len())
    });
}

criterion_group!(
    benches,
    kuhn_iteration_benchmark,
    kuhn_1000_iterations_benchmark,
    coin_iteration_benchmark,
    registry_build_benchmark
);
criterion_main!(benches);
