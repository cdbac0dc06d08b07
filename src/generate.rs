//! Random input lists.

use std::collections::BTreeMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::EcoSortError;

/// Deterministic RNG for a fixed seed, entropy-seeded otherwise.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

/// `size` integers drawn uniformly from `0..=max_value`.
pub fn generate_list<R: Rng + ?Sized>(size: usize, max_value: i64, rng: &mut R) -> Vec<i64> {
    (0..size).map(|_| rng.gen_range(0..=max_value)).collect()
}

/// One list per requested size, keyed by size.
pub fn generate_lists<R: Rng + ?Sized>(
    sizes: &[usize],
    max_value: i64,
    rng: &mut R,
) -> BTreeMap<usize, Vec<i64>> {
    sizes
        .iter()
        .map(|&size| (size, generate_list(size, max_value, rng)))
        .collect()
}

/// Parse whitespace separated integers typed by a user.
pub fn parse_list(input: &str) -> Result<Vec<i64>, EcoSortError> {
    input
        .split_whitespace()
        .map(|tok| {
            tok.parse::<i64>()
                .map_err(|_| EcoSortError::Precondition(format!("not an integer: {tok:?}")))
        })
        .collect()
}

/// The first `n` elements, and whether anything was left out.
pub fn preview<T>(list: &[T], n: usize) -> (&[T], bool) {
    let n = n.min(list.len());
    (&list[..n], n < list.len())
}
