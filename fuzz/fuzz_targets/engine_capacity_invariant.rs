#![no_main]

use libfuzzer_sys::fuzz_target;
use varpage::engine::OnlineEngine;
use varpage::model::{CapacitySchedule, Page, Request, check_capacity, schedule_cost};

// Fuzz the online engine with arbitrary sequences and capacity schedules
//
// Byte 0 picks the number of pages (1-8); each following byte pair is one
// request (page, capacity 0-7). Weights are the page index plus one.
fuzz_target!(|data: &[u8]| {
    if data.len() < 3 {
        return;
    }

    let n_pages = usize::from(data[0] % 8) + 1;
    let pages: Vec<Page> = (0..n_pages)
        .map(|i| Page::new(format!("p{i}"), (i + 1) as f64))
        .collect();

    let mut sequence = Vec::new();
    let mut capacities = CapacitySchedule::new();
    for (step, pair) in data[1..].chunks_exact(2).enumerate() {
        sequence.push(pages[usize::from(pair[0]) % n_pages].clone());
        capacities.set(step + 1, usize::from(pair[1] % 8));
    }
    let requests = Request::sequence(sequence);

    let run = OnlineEngine::new(capacities).run(&requests);

    assert_eq!(run.history.len(), requests.len());
    assert!(check_capacity(&run.history).is_ok());
    assert!((run.total_cost - schedule_cost(&requests, &run.history)).abs() < 1e-9);
});
