//! Random instance generators for the online and offline benchmarks.
//!
//! Seeded, so every run measures the same instances.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use varpage::model::{CapacitySchedule, Page, Request};

#[derive(Debug, Clone, Copy)]
pub struct InstanceSpec {
    pub pages: usize,
    pub requests: usize,
    /// Capacities are drawn from `1..=max_capacity`.
    pub max_capacity: usize,
    /// Weights are drawn from `1..=max_weight`.
    pub max_weight: u32,
    pub seed: u64,
}

impl InstanceSpec {
    pub fn new(pages: usize, requests: usize, max_capacity: usize) -> Self {
        Self {
            pages,
            requests,
            max_capacity,
            max_weight: 10,
            seed: 42,
        }
    }

    pub fn generate(&self) -> (Vec<Request>, CapacitySchedule) {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let pages: Vec<Page> = (0..self.pages)
            .map(|i| {
                let weight = rng.gen_range(1..=self.max_weight);
                Page::new(format!("p{i}"), f64::from(weight))
            })
            .collect();

        let requests = Request::sequence(
            (0..self.requests).map(|_| pages[rng.gen_range(0..pages.len())].clone()),
        );
        let capacities = (1..=self.requests)
            .map(|step| (step, rng.gen_range(1..=self.max_capacity)))
            .collect();
        (requests, capacities)
    }
}
