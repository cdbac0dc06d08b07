//! Run records, per-algorithm statistics and reference comparisons.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::impact::ImpactEstimate;
use crate::reference::BenchmarkEntry;
use crate::sampler::Sample;

/// A sample merged with its impact estimate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunRecord {
    pub algorithm_name: String,
    pub elapsed_seconds: f64,
    pub cpu_percent: f64,
    pub energy_wh: f64,
    pub co2_g: f64,
}

impl RunRecord {
    pub fn new<T>(sample: &Sample<T>, estimate: &ImpactEstimate, algorithm_name: impl Into<String>) -> Self {
        Self {
            algorithm_name: algorithm_name.into(),
            elapsed_seconds: sample.elapsed_seconds,
            cpu_percent: sample.cpu_percent,
            energy_wh: estimate.energy_wh,
            co2_g: estimate.co2_g,
        }
    }
}

/// Means for one algorithm over every record carrying its name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Statistics {
    pub algorithm_name: String,
    pub mean_time: f64,
    pub mean_energy: f64,
    pub mean_co2: f64,
    pub sample_count: usize,
}

/// Statistics keyed by algorithm name, iterating in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatisticsTable {
    entries: Vec<Statistics>,
}

impl StatisticsTable {
    pub fn get(&self, algorithm_name: &str) -> Option<&Statistics> {
        self.entries.iter().find(|s| s.algorithm_name == algorithm_name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Statistics> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'a> IntoIterator for &'a StatisticsTable {
    type Item = &'a Statistics;
    type IntoIter = std::slice::Iter<'a, Statistics>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Group `records` by algorithm name and average each group.
pub fn statistics(records: &[RunRecord]) -> StatisticsTable {
    struct Sums {
        time: f64,
        energy: f64,
        co2: f64,
        count: usize,
    }

    let mut order: Vec<&str> = Vec::new();
    let mut sums: HashMap<&str, Sums> = HashMap::new();
    for r in records {
        let name = r.algorithm_name.as_str();
        let acc = sums.entry(name).or_insert_with(|| {
            order.push(name);
            Sums {
                time: 0.0,
                energy: 0.0,
                co2: 0.0,
                count: 0,
            }
        });
        acc.time += r.elapsed_seconds;
        acc.energy += r.energy_wh;
        acc.co2 += r.co2_g;
        acc.count += 1;
    }

    let entries = order
        .into_iter()
        .map(|name| {
            let s = &sums[name];
            let n = s.count as f64;
            Statistics {
                algorithm_name: name.to_string(),
                mean_time: s.time / n,
                mean_energy: s.energy / n,
                mean_co2: s.co2 / n,
                sample_count: s.count,
            }
        })
        .collect();
    StatisticsTable { entries }
}

/// Ordered log of every run in a session. Records are only ever appended.
#[derive(Debug, Clone, Default)]
pub struct Session {
    records: Vec<RunRecord>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record<T>(
        &mut self,
        sample: &Sample<T>,
        estimate: &ImpactEstimate,
        algorithm_name: impl Into<String>,
    ) -> &RunRecord {
        self.push(RunRecord::new(sample, estimate, algorithm_name))
    }

    pub fn push(&mut self, record: RunRecord) -> &RunRecord {
        self.records.push(record);
        &self.records[self.records.len() - 1]
    }

    pub fn records(&self) -> &[RunRecord] {
        &self.records
    }

    pub fn latest(&self) -> Option<&RunRecord> {
        self.records.last()
    }

    /// First record for `algorithm_name`.
    pub fn find(&self, algorithm_name: &str) -> Option<&RunRecord> {
        self.records.iter().find(|r| r.algorithm_name == algorithm_name)
    }

    pub fn statistics(&self) -> StatisticsTable {
        statistics(&self.records)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

/// A reference entry next to the measured run it is compared with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Comparison<'a> {
    pub entry: &'a BenchmarkEntry,
    /// `run / entry` elapsed time. Above 1 the reference was faster.
    pub speedup: f64,
}

/// Pair each entry with its speedup, fastest reference first.
pub fn compare_to_reference<'a>(run: &RunRecord, entries: &[&'a BenchmarkEntry]) -> Vec<Comparison<'a>> {
    let mut out: Vec<Comparison<'a>> = entries
        .iter()
        .map(|&entry| Comparison {
            entry,
            speedup: run.elapsed_seconds / entry.elapsed_seconds,
        })
        .collect();
    out.sort_by(|a, b| a.entry.elapsed_seconds.total_cmp(&b.entry.elapsed_seconds));
    out
}

/// How much slower and hungrier `other` was than `baseline`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct RunComparison {
    pub time_factor: f64,
    pub energy_factor: f64,
}

/// Ratios `other / baseline`; a zero baseline yields a zero factor.
pub fn compare_runs(baseline: &RunRecord, other: &RunRecord) -> RunComparison {
    let ratio = |num: f64, den: f64| if den > 0.0 { num / den } else { 0.0 };
    RunComparison {
        time_factor: ratio(other.elapsed_seconds, baseline.elapsed_seconds),
        energy_factor: ratio(other.energy_wh, baseline.energy_wh),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reference::{Language, ReferenceTable};

    fn run(name: &str, t: f64, e: f64, c: f64) -> RunRecord {
        RunRecord {
            algorithm_name: name.to_string(),
            elapsed_seconds: t,
            cpu_percent: 50.0,
            energy_wh: e,
            co2_g: c,
        }
    }

    #[test]
    fn record_merges_sample_and_estimate() {
        let sample = Sample {
            elapsed_seconds: 0.25,
            cpu_percent: 80.0,
            payload: vec![1, 2],
        };
        let est = ImpactEstimate {
            energy_wh: 0.5,
            co2_g: 213.0,
        };
        let mut session = Session::new();
        let r = session.record(&sample, &est, "Merge Sort").clone();
        assert_eq!(r, RunRecord {
            algorithm_name: "Merge Sort".into(),
            elapsed_seconds: 0.25,
            cpu_percent: 80.0,
            energy_wh: 0.5,
            co2_g: 213.0,
        });
        assert_eq!(session.len(), 1);
    }

    #[test]
    fn grouped_means_in_first_seen_order() {
        let records = vec![
            run("Quick Sort", 1.0, 2.0, 3.0),
            run("Merge Sort", 4.0, 4.0, 4.0),
            run("Quick Sort", 3.0, 4.0, 5.0),
        ];
        let stats = statistics(&records);
        let names: Vec<_> = stats.iter().map(|s| s.algorithm_name.as_str()).collect();
        assert_eq!(names, vec!["Quick Sort", "Merge Sort"]);

        let q = stats.get("Quick Sort").unwrap();
        assert_eq!(q.sample_count, 2);
        assert_eq!(q.mean_time, 2.0);
        assert_eq!(q.mean_energy, 3.0);
        assert_eq!(q.mean_co2, 4.0);
        assert!(stats.get("Bubble Sort").is_none());
    }

    #[test]
    fn empty_records_give_empty_table() {
        assert!(statistics(&[]).is_empty());
    }

    #[test]
    fn session_find_returns_first() {
        let mut s = Session::new();
        s.push(run("Merge Sort", 1.0, 0.0, 0.0));
        s.push(run("Merge Sort", 2.0, 0.0, 0.0));
        assert_eq!(s.find("Merge Sort").unwrap().elapsed_seconds, 1.0);
        assert_eq!(s.latest().unwrap().elapsed_seconds, 2.0);
        assert!(s.find("Quick Sort").is_none());
    }

    #[test]
    fn quick_reference_speedups() {
        let entries = ReferenceTable::global().lookup_all("quick", 100_000);
        let cmp = compare_to_reference(&run("Quick Sort", 0.05, 0.0, 0.0), &entries);

        let langs: Vec<_> = cmp.iter().map(|c| c.entry.language).collect();
        assert_eq!(langs, vec![Language::Java, Language::Go, Language::C]);
        for c in &cmp {
            assert_eq!(c.speedup, 0.05 / c.entry.elapsed_seconds);
            assert!(c.speedup > 1.0);
        }
    }

    #[test]
    fn run_factors() {
        let base = run("Quick Sort", 0.5, 0.01, 0.0);
        let llm = run("llama3.2", 5.0, 1.0, 0.0);
        let f = compare_runs(&base, &llm);
        assert_eq!(f.time_factor, 10.0);
        assert_eq!(f.energy_factor, 100.0);

        let zero = run("Quick Sort", 0.0, 0.0, 0.0);
        let f = compare_runs(&zero, &llm);
        assert_eq!(f, RunComparison { time_factor: 0.0, energy_factor: 0.0 });
    }
}
