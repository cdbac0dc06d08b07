use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::EcoSortError;
use crate::impact::{ImpactModel, DEFAULT_CPU_POWER_WATTS, GRID_INTENSITY_G_PER_KWH};
use crate::sorting::BOGO_MAX_LEN;

/// Runtime configuration for the harness and its collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// CPU package power in watts used by the energy model.
    pub cpu_power_watts: f64,
    /// Grams of CO2 emitted per kWh.
    pub grid_intensity_g_per_kwh: f64,
    /// Largest list Bogosort may be given.
    pub bogo_max_len: usize,
    /// List sizes generated when none are requested.
    pub list_sizes: Vec<usize>,
    /// Generated values fall in `0..=max_value`.
    pub max_value: i64,
    /// Executable used for local model queries.
    pub llm_command: String,
    /// Arguments placed before the runner subcommand, e.g. a container exec.
    pub llm_args: Vec<String>,
    /// Hard limit for a single model query.
    pub llm_timeout_secs: u64,
    /// Maximum number of list elements embedded in a prompt.
    pub llm_prompt_limit: usize,
    /// Characters of the model response kept.
    pub llm_response_limit: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cpu_power_watts: DEFAULT_CPU_POWER_WATTS,
            grid_intensity_g_per_kwh: GRID_INTENSITY_G_PER_KWH,
            bogo_max_len: BOGO_MAX_LEN,
            list_sizes: vec![10, 1_000, 10_000, 100_000],
            max_value: 1_000_000,
            llm_command: "ollama".to_string(),
            llm_args: Vec::new(),
            llm_timeout_secs: 120,
            llm_prompt_limit: 100,
            llm_response_limit: 500,
        }
    }
}

impl Config {
    /// Read a JSON config file. Missing fields keep their defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, EcoSortError> {
        let data = fs::read_to_string(path)?;
        let cfg: Config = serde_json::from_str(&data)?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Load `path` when given, otherwise the defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, EcoSortError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> Result<(), EcoSortError> {
        if !(self.cpu_power_watts > 0.0) {
            return Err(EcoSortError::Config(format!(
                "cpu_power_watts must be positive, got {}",
                self.cpu_power_watts
            )));
        }
        if !(self.grid_intensity_g_per_kwh >= 0.0) {
            return Err(EcoSortError::Config(format!(
                "grid_intensity_g_per_kwh must not be negative, got {}",
                self.grid_intensity_g_per_kwh
            )));
        }
        if self.list_sizes.is_empty() {
            return Err(EcoSortError::Config("list_sizes must not be empty".into()));
        }
        if self.max_value < 0 {
            return Err(EcoSortError::Config("max_value must not be negative".into()));
        }
        if self.llm_timeout_secs == 0 {
            return Err(EcoSortError::Config("llm_timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn impact_model(&self) -> ImpactModel {
        ImpactModel {
            cpu_power_watts: self.cpu_power_watts,
            grid_intensity_g_per_kwh: self.grid_intensity_g_per_kwh,
        }
    }

    pub fn llm_timeout(&self) -> Duration {
        Duration::from_secs(self.llm_timeout_secs)
    }
}
