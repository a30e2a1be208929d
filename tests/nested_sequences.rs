// ==============================================
// NESTED SEQUENCE EXPERIMENTS (integration)
// ==============================================
//
// Runs generated adversarial sequences through both algorithms, the way the
// `competitive_ratio` binary does.

use varpage::config::{Reduction, SolverConfig};
use varpage::engine::OnlineEngine;
use varpage::generator::nested_sequence;
use varpage::model::{CapacitySchedule, check_capacity};
use varpage::offline::OfflineSolver;

#[test]
fn nested_counts_for_three_pages() {
    let (pages, requests) = nested_sequence(3, 2.0, 3).unwrap();

    let lightest = requests.iter().filter(|r| r.page().weight() == 2.0).count();
    assert_eq!(lightest, 9);
    assert_eq!(pages.iter().map(|p| p.id()).collect::<Vec<_>>(), ["P1", "P2", "P3"]);
}

#[test]
fn unit_capacity_ratio_is_at_least_one() {
    let (_, requests) = nested_sequence(3, 2.0, 2).unwrap();
    let capacities = CapacitySchedule::with_default(1);

    let online = OnlineEngine::new(capacities.clone()).run(&requests);
    let offline = OfflineSolver::new(SolverConfig::default()).solve(&requests, &capacities);

    assert!(offline.cost > 0.0);
    assert!(online.total_cost >= offline.cost);
    assert!(check_capacity(&online.history).is_ok());
    assert!(check_capacity(&offline.schedule).is_ok());
}

#[test]
fn capacity_drops_keep_reductions_in_agreement() {
    let (_, requests) = nested_sequence(3, 3.0, 2).unwrap();
    let mut capacities = CapacitySchedule::with_default(2);
    capacities.set(4, 1);
    capacities.set(5, 0);
    capacities.set(8, 3);

    let layered = OfflineSolver::new(SolverConfig::default()).solve(&requests, &capacities);
    let interval = OfflineSolver::new(SolverConfig::default().with_reduction(Reduction::Interval))
        .solve(&requests, &capacities);

    assert!((layered.cost - interval.cost).abs() < 1e-9);
    assert_eq!(layered.schedule[4].capacity, 0);
    assert!(layered.schedule[4].pages.is_empty());
}

#[test]
fn capacity_covering_every_page_pays_cold_misses_only() {
    let (pages, requests) = nested_sequence(3, 2.0, 2).unwrap();
    let capacities = CapacitySchedule::with_default(pages.len());
    let cold: f64 = pages.iter().map(|p| p.weight()).sum();

    let online = OnlineEngine::new(capacities.clone()).run(&requests);
    let offline = OfflineSolver::new(SolverConfig::default()).solve(&requests, &capacities);

    assert_eq!(online.total_cost, cold);
    assert_eq!(offline.cost, cold);
}
