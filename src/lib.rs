//! Core logic for the ecosort sorting-impact harness.
//!
//! Sort a list, sample the call's wall-clock time and CPU share, turn the
//! sample into an energy and CO2 estimate, then aggregate runs and compare
//! them with pre-recorded C, Java and Go measurements.

pub mod aggregate;
pub mod config;
pub mod error;
pub mod export;
pub mod generate;
pub mod impact;
pub mod io_utils;
pub mod llm;
pub mod reference;
pub mod sampler;
pub mod sorting;

pub use aggregate::{
    compare_runs, compare_to_reference, statistics, Comparison, RunComparison, RunRecord, Session,
    Statistics, StatisticsTable,
};
pub use config::Config;
pub use error::EcoSortError;
pub use export::{export_language_comparison, export_records, export_statistics};
pub use generate::{generate_list, generate_lists, parse_list, seeded_rng};
pub use impact::{estimate, ImpactEstimate, ImpactModel};
pub use llm::{LlmClient, LlmError, LlmRun};
pub use reference::{lookup, snap_size, BenchmarkEntry, Language, ReferenceTable, SIZE_BUCKETS};
pub use sampler::{CpuMeter, ProcessCpuMeter, Sample, Sampler};
pub use sorting::{
    bogo_sort, bubble_sort, insertion_sort, is_sorted, merge_sort, quick_sort, Algorithm,
};
