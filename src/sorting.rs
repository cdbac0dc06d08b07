//! Classic comparison sorts used as measurement workloads.
//!
//! Every function borrows its input and returns a freshly allocated, sorted
//! copy. Inputs are never mutated.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::EcoSortError;

/// Largest input the front-end should ever hand to [`bogo_sort`].
pub const BOGO_MAX_LEN: usize = 10;

/// Sorting algorithms offered by the harness, in menu order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    Merge,
    Quick,
    Bubble,
    Insertion,
    Bogo,
}

impl Algorithm {
    pub const ALL: [Algorithm; 5] = [
        Algorithm::Merge,
        Algorithm::Quick,
        Algorithm::Bubble,
        Algorithm::Insertion,
        Algorithm::Bogo,
    ];

    pub fn display_name(self) -> &'static str {
        match self {
            Algorithm::Merge => "Merge Sort",
            Algorithm::Quick => "Quick Sort",
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Bogo => "Bogosort",
        }
    }

    /// Short lowercase key used by the reference table.
    pub fn key(self) -> &'static str {
        match self {
            Algorithm::Merge => "merge",
            Algorithm::Quick => "quick",
            Algorithm::Bubble => "bubble",
            Algorithm::Insertion => "insertion",
            Algorithm::Bogo => "bogo",
        }
    }

    /// Resolve a user supplied name such as `"Merge Sort"`, `"mergesort"`
    /// or `"merge"`.
    pub fn from_name(name: &str) -> Option<Self> {
        let key = normalize_name(name);
        Self::ALL.into_iter().find(|a| a.key() == key)
    }

    /// Whether cross-language reference measurements exist for this algorithm.
    pub fn has_reference(self) -> bool {
        !matches!(self, Algorithm::Bogo)
    }

    /// Reject inputs the algorithm cannot finish in bounded expected time.
    pub fn check_input(self, len: usize, bogo_max_len: usize) -> Result<(), EcoSortError> {
        if self == Algorithm::Bogo && len > bogo_max_len {
            return Err(EcoSortError::Precondition(format!(
                "bogosort accepts at most {bogo_max_len} elements, got {len}"
            )));
        }
        Ok(())
    }

    pub fn sort<T: Ord + Clone>(self, input: &[T]) -> Vec<T> {
        match self {
            Algorithm::Merge => merge_sort(input),
            Algorithm::Quick => quick_sort(input),
            Algorithm::Bubble => bubble_sort(input),
            Algorithm::Insertion => insertion_sort(input),
            Algorithm::Bogo => bogo_sort(input),
        }
    }
}

/// Lowercase, drop every `" sort"`/`"sort"` occurrence and trim.
pub fn normalize_name(name: &str) -> String {
    name.to_lowercase()
        .replace(" sort", "")
        .replace("sort", "")
        .trim()
        .to_string()
}

/// Check if a slice is sorted in non-decreasing order.
pub fn is_sorted<T: Ord>(data: &[T]) -> bool {
    data.windows(2).all(|w| w[0] <= w[1])
}

/// Adjacent-swap sort. Always runs the full `n - 1` passes.
pub fn bubble_sort<T: Ord + Clone>(input: &[T]) -> Vec<T> {
    let mut out = input.to_vec();
    let n = out.len();
    for i in 0..n.saturating_sub(1) {
        for j in 0..n - i - 1 {
            if out[j] > out[j + 1] {
                out.swap(j, j + 1);
            }
        }
    }
    out
}

/// Shift-insert sort.
pub fn insertion_sort<T: Ord + Clone>(input: &[T]) -> Vec<T> {
    let mut out = input.to_vec();
    for i in 1..out.len() {
        let current = out[i].clone();
        let mut pos = i;
        while pos > 0 && out[pos - 1] > current {
            out[pos] = out[pos - 1].clone();
            pos -= 1;
        }
        out[pos] = current;
    }
    out
}

/// Top-down merge sort splitting at `len / 2`.
///
/// The merge step takes from the left run only when it is strictly smaller,
/// so equal elements are taken from the right run first.
pub fn merge_sort<T: Ord + Clone>(input: &[T]) -> Vec<T> {
    if input.len() <= 1 {
        return input.to_vec();
    }
    let mid = input.len() / 2;
    let left = merge_sort(&input[..mid]);
    let right = merge_sort(&input[mid..]);
    merge(left, right)
}

fn merge<T: Ord>(left: Vec<T>, right: Vec<T>) -> Vec<T> {
    let mut out = Vec::with_capacity(left.len() + right.len());
    let mut left = left.into_iter().peekable();
    let mut right = right.into_iter().peekable();
    loop {
        let take_left = match (left.peek(), right.peek()) {
            (Some(l), Some(r)) => l < r,
            _ => break,
        };
        let next = if take_left { left.next() } else { right.next() };
        out.extend(next);
    }
    out.extend(left);
    out.extend(right);
    out
}

/// Quick sort with the first element as pivot.
///
/// Elements `<= pivot` go left, the rest right. There is no pivot
/// randomisation: already sorted or reversed inputs take O(n²). Pending
/// partitions live on an explicit stack, so those inputs cost time but not
/// call-stack depth.
pub fn quick_sort<T: Ord + Clone>(input: &[T]) -> Vec<T> {
    enum Task<T> {
        Split(Vec<T>),
        Emit(T),
    }

    let mut out = Vec::with_capacity(input.len());
    let mut pending = vec![Task::Split(input.to_vec())];
    while let Some(task) = pending.pop() {
        match task {
            Task::Emit(value) => out.push(value),
            Task::Split(items) if items.len() <= 1 => out.extend(items),
            Task::Split(items) => {
                let mut items = items.into_iter();
                let Some(pivot) = items.next() else { continue };
                let (lower, upper): (Vec<T>, Vec<T>) = items.partition(|x| *x <= pivot);
                // Pushed in reverse so `lower` is emitted first.
                pending.push(Task::Split(upper));
                pending.push(Task::Emit(pivot));
                pending.push(Task::Split(lower));
            }
        }
    }
    out
}

/// Shuffle until sorted, using the thread-local RNG.
///
/// Expected running time grows factorially. Callers must check the input
/// with [`Algorithm::check_input`] first; this function does not.
pub fn bogo_sort<T: Ord + Clone>(input: &[T]) -> Vec<T> {
    bogo_sort_with(input, &mut rand::thread_rng())
}

pub fn bogo_sort_with<T: Ord + Clone, R: Rng + ?Sized>(input: &[T], rng: &mut R) -> Vec<T> {
    let mut out = input.to_vec();
    while !is_sorted(&out) {
        out.shuffle(rng);
    }
    out
}
