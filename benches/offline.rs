mod common;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};

use common::workload::InstanceSpec;
use varpage::config::{Reduction, SolverConfig};
use varpage::flow::{MinCostFlowSolver, SuccessiveShortestPath, layered};
use varpage::offline::OfflineSolver;

fn bench_offline_reductions(c: &mut Criterion) {
    let mut group = c.benchmark_group("offline_solve");
    group.sample_size(20);

    for &(pages, requests, capacity) in &[(4, 50, 2), (8, 100, 3), (12, 200, 4)] {
        let (reqs, caps) = InstanceSpec::new(pages, requests, capacity).generate();
        for reduction in [Reduction::Layered, Reduction::Interval] {
            let solver = OfflineSolver::new(SolverConfig::default().with_reduction(reduction));
            group.bench_with_input(
                BenchmarkId::new(reduction.to_string(), format!("{pages}p_{requests}r")),
                &(&reqs, &caps),
                |b, (reqs, caps)| b.iter(|| black_box(solver.solve(reqs, caps).cost)),
            );
        }
    }
    group.finish();
}

fn bench_layered_build_vs_solve(c: &mut Criterion) {
    let (reqs, caps) = InstanceSpec::new(8, 100, 3).generate();
    let network = layered::build(&reqs, &caps, 1_000_000.0);

    c.bench_function("layered_build_8p_100r", |b| {
        b.iter(|| black_box(layered::build(black_box(&reqs), &caps, 1_000_000.0).edge_count()))
    });
    c.bench_function("ssp_solve_8p_100r", |b| {
        b.iter(|| black_box(SuccessiveShortestPath::new().solve(&network).is_ok()))
    });
}

criterion_group!(benches, bench_offline_reductions, bench_layered_build_vs_solve);
criterion_main!(benches);
