//! CSV snapshots of runs, statistics and language comparisons.
//!
//! Column names follow the original reports (`algoritmo`, `tempo`, ...) so
//! existing spreadsheets keep working.

use std::ffi::OsString;
use std::fs::File;
use std::path::{Path, PathBuf};

use log::info;

use crate::aggregate::{RunRecord, StatisticsTable};
use crate::error::EcoSortError;
use crate::reference::BenchmarkEntry;

pub const RECORD_HEADER: [&str; 5] = ["algoritmo", "tempo", "cpu", "energia", "co2"];
pub const STATISTICS_HEADER: [&str; 5] =
    ["algoritmo", "tempo_medio", "energia_media", "co2_medio", "execucoes"];
pub const COMPARISON_HEADER: [&str; 7] =
    ["linguagem", "algoritmo", "tamanho", "tempo", "cpu", "energia", "co2"];

/// `path` with `.csv` appended when missing, or `<prefix>_<timestamp>.csv`.
pub fn output_path(path: Option<&Path>, prefix: &str) -> PathBuf {
    match path {
        Some(p) if p.extension().map_or(false, |e| e == "csv") => p.to_path_buf(),
        Some(p) => {
            let mut name = OsString::from(p.as_os_str());
            name.push(".csv");
            PathBuf::from(name)
        }
        None => {
            let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
            PathBuf::from(format!("{prefix}_{stamp}.csv"))
        }
    }
}

fn writer(path: &Path) -> Result<csv::Writer<File>, EcoSortError> {
    let file = File::create(path)?;
    Ok(csv::Writer::from_writer(file))
}

/// Write one row per record. Returns `None` without touching disk when
/// there is nothing to write.
pub fn export_records(
    records: &[RunRecord],
    path: Option<&Path>,
) -> Result<Option<PathBuf>, EcoSortError> {
    if records.is_empty() {
        return Ok(None);
    }
    let path = output_path(path, "resultados");
    let mut wtr = writer(&path)?;
    wtr.write_record(RECORD_HEADER)?;
    for r in records {
        wtr.write_record([
            r.algorithm_name.clone(),
            r.elapsed_seconds.to_string(),
            r.cpu_percent.to_string(),
            r.energy_wh.to_string(),
            r.co2_g.to_string(),
        ])?;
    }
    wtr.flush()?;
    info!("wrote {} records to {}", records.len(), path.display());
    Ok(Some(path))
}

pub fn export_statistics(
    stats: &StatisticsTable,
    path: Option<&Path>,
) -> Result<Option<PathBuf>, EcoSortError> {
    if stats.is_empty() {
        return Ok(None);
    }
    let path = output_path(path, "estatisticas");
    let mut wtr = writer(&path)?;
    wtr.write_record(STATISTICS_HEADER)?;
    for s in stats {
        wtr.write_record([
            s.algorithm_name.clone(),
            s.mean_time.to_string(),
            s.mean_energy.to_string(),
            s.mean_co2.to_string(),
            s.sample_count.to_string(),
        ])?;
    }
    wtr.flush()?;
    info!("wrote statistics for {} algorithms to {}", stats.len(), path.display());
    Ok(Some(path))
}

/// One row per language for `algorithm` at `size`.
pub fn export_language_comparison(
    entries: &[&BenchmarkEntry],
    algorithm: &str,
    size: usize,
    path: Option<&Path>,
) -> Result<PathBuf, EcoSortError> {
    let path = output_path(path, &format!("comparacao_{algorithm}_{size}"));
    let mut wtr = writer(&path)?;
    wtr.write_record(COMPARISON_HEADER)?;
    for e in entries {
        wtr.write_record([
            e.language.to_string(),
            algorithm.to_string(),
            size.to_string(),
            e.elapsed_seconds.to_string(),
            e.cpu_percent.to_string(),
            e.energy_wh.to_string(),
            e.co2_g.to_string(),
        ])?;
    }
    wtr.flush()?;
    info!("wrote {} reference rows to {}", entries.len(), path.display());
    Ok(path)
}
