#![no_main]

use libfuzzer_sys::fuzz_target;
use varpage::config::{Reduction, SolverConfig};
use varpage::engine::OnlineEngine;
use varpage::model::{CapacitySchedule, Page, Request, check_capacity};
use varpage::offline::OfflineSolver;

// Fuzz both offline reductions against the online engine
//
// Same byte layout as `engine_capacity_invariant`, capped at 24 requests to
// keep the flow networks small.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let n_pages = usize::from(data[0] % 5) + 1;
    let pages: Vec<Page> = (0..n_pages)
        .map(|i| Page::new(format!("p{i}"), (i + 1) as f64))
        .collect();

    let mut sequence = Vec::new();
    let mut capacities = CapacitySchedule::new();
    for (step, pair) in data[1..].chunks_exact(2).take(24).enumerate() {
        sequence.push(pages[usize::from(pair[0]) % n_pages].clone());
        capacities.set(step + 1, usize::from(pair[1] % 4));
    }
    let requests = Request::sequence(sequence);

    let online = OnlineEngine::new(capacities.clone()).run(&requests);
    let layered = OfflineSolver::new(SolverConfig::default())
        .try_solve(&requests, &capacities)
        .expect("layered network is always feasible");
    let interval = OfflineSolver::new(SolverConfig::default().with_reduction(Reduction::Interval))
        .try_solve(&requests, &capacities)
        .expect("interval network is always feasible");

    assert!(check_capacity(&layered.schedule).is_ok());
    assert!(layered.cost <= online.total_cost + 1e-9);
    assert!((layered.cost - interval.cost).abs() < 1e-6);
});
