//! Nested request sequences for competitive-ratio experiments.
//!
//! Pages `P1..Pn` get weights `base^1..base^n`. Requests are produced by a
//! mixed-radix counter over `branching^(n-1)` ticks:
//!
//! ```text
//!   tick 0:   P2 P3 .. Pn                       (opening request of each coarse page)
//!   tick k:   P1, then P_i for i = 2, 3, ..     while k % branching^(i-1) == 0
//!
//!   n = 3, branching = 2:
//!
//!   tick   0      1    2       3    4
//!          P2 P3  P1   P1 P2   P1   P1 P2 P3
//! ```
//!
//! Between two consecutive requests of `P_i` (`i > 1`) there are exactly
//! `branching` requests of `P_(i-1)`, and `P1` is requested
//! `branching^(n-1)` times.

use crate::error::ConfigError;
use crate::model::{Page, Request};

/// Generates the nested sequence for `n_pages` pages.
///
/// # Errors
///
/// Returns [`ConfigError`] when `n_pages` or `branching` is zero, when `base`
/// is not positive and finite, or when a weight or the sequence length
/// overflows.
///
/// # Example
///
/// ```
/// use varpage::generator::nested_sequence;
///
/// let (pages, requests) = nested_sequence(3, 2.0, 3).unwrap();
/// assert_eq!(pages.len(), 3);
/// assert_eq!(pages[2].weight(), 8.0);
///
/// let p1 = requests.iter().filter(|r| r.page().id() == "P1").count();
/// assert_eq!(p1, 9);
/// ```
pub fn nested_sequence(
    n_pages: usize,
    base: f64,
    branching: usize,
) -> Result<(Vec<Page>, Vec<Request>), ConfigError> {
    if n_pages == 0 {
        return Err(ConfigError::new("n_pages must be at least 1"));
    }
    if branching == 0 {
        return Err(ConfigError::new("branching must be at least 1"));
    }
    if !base.is_finite() || base <= 0.0 {
        return Err(ConfigError::new(format!(
            "base must be positive and finite, got {base}"
        )));
    }

    let pages = (1..=n_pages)
        .map(|i| Page::try_new(format!("P{i}"), base.powi(i as i32)))
        .collect::<Result<Vec<_>, _>>()?;

    let exponent = u32::try_from(n_pages - 1)
        .map_err(|_| ConfigError::new("n_pages is too large"))?;
    let ticks = branching.checked_pow(exponent).ok_or_else(|| {
        ConfigError::new(format!(
            "sequence length {branching}^{exponent} overflows"
        ))
    })?;

    let mut order: Vec<Page> = pages[1..].to_vec();
    for tick in 1..=ticks {
        order.push(pages[0].clone());
        let mut period = branching;
        for page in &pages[1..] {
            if tick % period != 0 {
                break;
            }
            order.push(page.clone());
            period = match period.checked_mul(branching) {
                Some(next) => next,
                None => break,
            };
        }
    }

    Ok((pages, Request::sequence(order)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(requests: &[Request]) -> Vec<&str> {
        requests.iter().map(|r| r.page().id()).collect()
    }

    fn positions(requests: &[Request], id: &str) -> Vec<usize> {
        requests
            .iter()
            .enumerate()
            .filter(|(_, r)| r.page().id() == id)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn small_sequence_matches_layout() {
        let (_, requests) = nested_sequence(3, 2.0, 2).unwrap();
        assert_eq!(
            ids(&requests),
            vec!["P2", "P3", "P1", "P1", "P2", "P1", "P1", "P2", "P3"]
        );
    }

    #[test]
    fn weights_are_powers_of_base() {
        let (pages, _) = nested_sequence(4, 3.0, 1).unwrap();
        let weights: Vec<f64> = pages.iter().map(Page::weight).collect();
        assert_eq!(weights, vec![3.0, 9.0, 27.0, 81.0]);
    }

    #[test]
    fn request_counts_per_level() {
        let (_, requests) = nested_sequence(3, 2.0, 3).unwrap();
        assert_eq!(requests.len(), 15);
        assert_eq!(positions(&requests, "P1").len(), 9);
        assert_eq!(positions(&requests, "P2").len(), 4);
        assert_eq!(positions(&requests, "P3").len(), 2);
    }

    #[test]
    fn nesting_holds_at_every_level() {
        let branching = 3;
        let (pages, requests) = nested_sequence(4, 2.0, branching).unwrap();

        for level in 1..pages.len() {
            let outer = positions(&requests, pages[level].id());
            let inner = positions(&requests, pages[level - 1].id());
            for pair in outer.windows(2) {
                let between = inner.iter().filter(|&&p| pair[0] < p && p < pair[1]).count();
                assert_eq!(between, branching, "level {} between {:?}", level + 1, pair);
            }
        }
    }

    #[test]
    fn single_page_is_requested_once() {
        let (pages, requests) = nested_sequence(1, 2.0, 5).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(ids(&requests), vec!["P1"]);
    }

    #[test]
    fn time_steps_are_one_based() {
        let (_, requests) = nested_sequence(2, 2.0, 2).unwrap();
        let steps: Vec<usize> = requests.iter().map(Request::time_step).collect();
        assert_eq!(steps, vec![1, 2, 3, 4]);
    }

    #[test]
    fn invalid_arguments_are_rejected() {
        assert!(nested_sequence(0, 2.0, 2).unwrap_err().message().contains("n_pages"));
        assert!(nested_sequence(3, 2.0, 0).unwrap_err().message().contains("branching"));
        assert!(nested_sequence(3, 0.0, 2).unwrap_err().message().contains("base"));
        assert!(nested_sequence(3, f64::NAN, 2).is_err());
        assert!(nested_sequence(80, 2.0, 2).is_err());
    }
}
