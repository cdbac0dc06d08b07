//! Pre-recorded cross-language measurements.
//!
//! Each entry is the mean of 50 runs of the same algorithm written in C, Java
//! and Go over random lists of 1 000, 10 000 and 100 000 integers. The table
//! is compiled in and never changes at runtime.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::OnceLock;

use log::warn;
use serde::Serialize;

use crate::sorting::Algorithm;

pub use crate::sorting::normalize_name as normalize_algorithm;

/// Input sizes the table was recorded at, ascending.
pub const SIZE_BUCKETS: [usize; 3] = [1_000, 10_000, 100_000];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    C,
    Java,
    Go,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::C, Language::Java, Language::Go];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::C => "c",
            Language::Java => "java",
            Language::Go => "go",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        let name = name.trim().to_lowercase();
        Self::ALL.into_iter().find(|l| l.as_str() == name)
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BenchmarkEntry {
    pub language: Language,
    pub algorithm: Algorithm,
    pub size_bucket: usize,
    pub elapsed_seconds: f64,
    pub cpu_percent: f64,
    pub energy_wh: f64,
    pub co2_g: f64,
}

type Row = (Language, Algorithm, usize, f64, f64, f64, f64);

#[rustfmt::skip]
const ROWS: [Row; 36] = {
    use Algorithm::*;
    use Language::*;
    [
        (C, Merge, 1_000, 0.000181, 60.00, 0.00002, 0.0000),
        (C, Merge, 10_000, 0.002448, 87.48, 0.000039, 0.0000),
        (C, Merge, 100_000, 0.025123, 98.78, 0.000448, 0.0001),
        (C, Quick, 1_000, 0.000099, 53.60, 0.00001, 0.0000),
        (C, Quick, 10_000, 0.000974, 83.19, 0.000015, 0.0000),
        (C, Quick, 100_000, 0.008952, 96.50, 0.000156, 0.0000),
        (C, Bubble, 1_000, 0.001254, 88.28, 0.000020, 0.0000),
        (C, Bubble, 10_000, 0.175015, 99.86, 0.003155, 0.0007),
        (C, Bubble, 100_000, 14.567331, 100.00, 0.263017, 0.0613),
        (C, Insertion, 1_000, 0.000142, 57.00, 0.00001, 0.0000),
        (C, Insertion, 10_000, 0.014661, 98.65, 0.000261, 0.0001),
        (C, Insertion, 100_000, 1.486456, 99.98, 0.026834, 0.0063),

        (Java, Merge, 1_000, 0.000120, 18.23, 0.0000, 0.0000),
        (Java, Merge, 10_000, 0.000967, 16.87, 0.00003, 0.0000),
        (Java, Merge, 100_000, 0.012376, 15.58, 0.000035, 0.0000),
        (Java, Quick, 1_000, 0.000062, 16.49, 0.0000, 0.0000),
        (Java, Quick, 10_000, 0.000605, 17.42, 0.00002, 0.0000),
        (Java, Quick, 100_000, 0.007027, 16.18, 0.000021, 0.0000),
        (Java, Bubble, 1_000, 0.001039, 16.85, 0.00003, 0.0000),
        (Java, Bubble, 10_000, 0.142538, 15.89, 0.000408, 0.0001),
        (Java, Bubble, 100_000, 16.310651, 15.50, 0.045614, 0.0106),
        (Java, Insertion, 1_000, 0.000181, 16.06, 0.00001, 0.0000),
        (Java, Insertion, 10_000, 0.007635, 15.66, 0.000022, 0.0000),
        (Java, Insertion, 100_000, 0.855350, 15.49, 0.002391, 0.0006),

        (Go, Merge, 1_000, 0.000098, 40.50, 0.00001, 0.0000),
        (Go, Merge, 10_000, 0.001292, 54.00, 0.000013, 0.0000),
        (Go, Merge, 100_000, 0.016760, 67.50, 0.000204, 0.0000),
        (Go, Quick, 1_000, 0.000061, 40.50, 0.0000, 0.0000),
        (Go, Quick, 10_000, 0.000559, 54.00, 0.00005, 0.0000),
        (Go, Quick, 100_000, 0.007117, 67.50, 0.000087, 0.0000),
        (Go, Bubble, 1_000, 0.000790, 49.50, 0.00007, 0.0000),
        (Go, Bubble, 10_000, 0.111852, 66.00, 0.001333, 0.0003),
        (Go, Bubble, 100_000, 15.387725, 82.50, 0.229213, 0.0534),
        (Go, Insertion, 1_000, 0.000091, 49.50, 0.00001, 0.0000),
        (Go, Insertion, 10_000, 0.017150, 66.00, 0.000204, 0.0000),
        (Go, Insertion, 100_000, 1.724546, 82.50, 0.025689, 0.0060),
    ]
};

/// Snap `size` to the closest entry of [`SIZE_BUCKETS`] by absolute
/// difference. Ties go to the smaller bucket.
pub fn snap_size(size: usize) -> usize {
    let mut best = SIZE_BUCKETS[0];
    for bucket in SIZE_BUCKETS {
        if bucket.abs_diff(size) < best.abs_diff(size) {
            best = bucket;
        }
    }
    best
}

/// language -> algorithm -> size bucket -> entry
pub struct ReferenceTable {
    entries: HashMap<Language, HashMap<Algorithm, BTreeMap<usize, BenchmarkEntry>>>,
}

impl ReferenceTable {
    fn build() -> Self {
        let mut entries: HashMap<Language, HashMap<Algorithm, BTreeMap<usize, BenchmarkEntry>>> =
            HashMap::new();
        for (language, algorithm, size_bucket, elapsed_seconds, cpu_percent, energy_wh, co2_g) in
            ROWS
        {
            let entry = BenchmarkEntry {
                language,
                algorithm,
                size_bucket,
                elapsed_seconds,
                cpu_percent,
                energy_wh,
                co2_g,
            };
            let previous = entries
                .entry(language)
                .or_default()
                .entry(algorithm)
                .or_default()
                .insert(size_bucket, entry);
            debug_assert!(previous.is_none(), "duplicate reference row");
        }
        Self { entries }
    }

    /// The process-wide table, built on first use.
    pub fn global() -> &'static ReferenceTable {
        static TABLE: OnceLock<ReferenceTable> = OnceLock::new();
        TABLE.get_or_init(ReferenceTable::build)
    }

    pub fn get(&self, language: Language, algorithm: Algorithm, size: usize) -> Option<&BenchmarkEntry> {
        self.entries
            .get(&language)?
            .get(&algorithm)?
            .get(&snap_size(size))
    }

    /// Look up by free-form names; the size is snapped to the nearest bucket.
    pub fn lookup(&self, language: &str, algorithm: &str, size: usize) -> Option<&BenchmarkEntry> {
        let found = Language::from_name(language)
            .zip(Algorithm::from_name(algorithm))
            .and_then(|(lang, alg)| self.get(lang, alg, size));
        if found.is_none() {
            warn!("no reference entry for {language}/{algorithm}/{size}");
        }
        found
    }

    /// Entries for every language that has one, in `c`, `java`, `go` order.
    pub fn lookup_all(&self, algorithm: &str, size: usize) -> Vec<&BenchmarkEntry> {
        let Some(alg) = Algorithm::from_name(algorithm) else {
            warn!("unknown algorithm {algorithm:?}");
            return Vec::new();
        };
        Language::ALL
            .into_iter()
            .filter_map(|lang| self.get(lang, alg, size))
            .collect()
    }

    /// All entries ordered by language, algorithm and size.
    pub fn iter(&self) -> impl Iterator<Item = &BenchmarkEntry> {
        Language::ALL.into_iter().flat_map(move |lang| {
            Algorithm::ALL
                .into_iter()
                .filter_map(move |alg| self.entries.get(&lang)?.get(&alg))
                .flat_map(|by_size| by_size.values())
        })
    }

    pub fn languages(&self) -> &'static [Language] {
        &Language::ALL
    }

    pub fn algorithms(&self) -> Vec<Algorithm> {
        Algorithm::ALL
            .into_iter()
            .filter(|a| a.has_reference())
            .collect()
    }

    pub fn sizes(&self) -> &'static [usize] {
        &SIZE_BUCKETS
    }

    pub fn len(&self) -> usize {
        self.entries
            .values()
            .flat_map(|by_alg| by_alg.values())
            .map(|by_size| by_size.len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Shorthand for [`ReferenceTable::lookup`] on the global table.
pub fn lookup(language: &str, algorithm: &str, size: usize) -> Option<&'static BenchmarkEntry> {
    ReferenceTable::global().lookup(language, algorithm, size)
}

#[cfg(test)]
mod tests {
    use super::*;
    use quickcheck::quickcheck;

    #[test]
    fn c_merge_ten_thousand() {
        let e = lookup("c", "merge", 10_000).unwrap();
        assert_eq!(e.elapsed_seconds, 0.002448);
        assert_eq!(e.cpu_percent, 87.48);
        assert_eq!(e.energy_wh, 0.000039);
        assert_eq!(e.co2_g, 0.0);
    }

    #[test]
    fn five_thousand_snaps_down() {
        let a = lookup("c", "quick", 5_000).unwrap();
        let b = lookup("c", "quick", 1_000).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.size_bucket, 1_000);
    }

    #[test]
    fn exact_midpoint_prefers_lower() {
        assert_eq!(snap_size(5_500), 1_000);
        assert_eq!(snap_size(5_501), 10_000);
        assert_eq!(snap_size(55_000), 10_000);
        assert_eq!(snap_size(0), 1_000);
        assert_eq!(snap_size(usize::MAX), 100_000);
    }

    #[test]
    fn names_are_normalised() {
        let want = lookup("c", "merge", 1_000).unwrap();
        for name in ["Merge Sort", "mergesort", "MERGE", " merge "] {
            assert_eq!(lookup("C", name, 1_000), Some(want), "{name}");
        }
        assert_eq!(lookup(" Java ", "quick", 1_000).unwrap().language, Language::Java);
        assert_eq!(normalize_algorithm("Insertion Sort"), "insertion");
    }

    #[test]
    fn misses_are_none() {
        assert!(lookup("python", "merge", 1_000).is_none());
        assert!(lookup("c", "bogosort", 1_000).is_none());
        assert!(lookup("c", "heap", 1_000).is_none());
        assert!(ReferenceTable::global().lookup_all("heap", 1_000).is_empty());
    }

    #[test]
    fn one_entry_per_key() {
        let table = ReferenceTable::global();
        assert_eq!(table.len(), 36);
        assert_eq!(table.iter().count(), 36);
        for lang in Language::ALL {
            for alg in table.algorithms() {
                for &size in table.sizes() {
                    let e = table.get(lang, alg, size).unwrap();
                    assert_eq!((e.language, e.algorithm, e.size_bucket), (lang, alg, size));
                }
            }
        }
    }

    #[test]
    fn lookup_all_in_language_order() {
        let all = ReferenceTable::global().lookup_all("Quick Sort", 100_000);
        let langs: Vec<_> = all.iter().map(|e| e.language).collect();
        assert_eq!(langs, vec![Language::C, Language::Java, Language::Go]);
    }

    quickcheck! {
        fn prop_snap_is_nearest(size: usize) -> bool {
            let snapped = snap_size(size);
            SIZE_BUCKETS.iter().all(|b| snapped.abs_diff(size) <= b.abs_diff(size))
        }
    }
}
