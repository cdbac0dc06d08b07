//! Local language-model queries through an external runner (`ollama` by
//! default), measured with the same sampler as the sorting algorithms.

use std::fmt::Debug;
use std::io::Read;
use std::process::{Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, warn};
use thiserror::Error;

use crate::aggregate::RunRecord;
use crate::config::Config;
use crate::impact::ImpactModel;
use crate::sampler::{CpuMeter, Sample, Sampler};

const PROBE_TIMEOUT: Duration = Duration::from_secs(5);
const POLL_INTERVAL: Duration = Duration::from_millis(10);

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("failed to start {command:?}: {reason}")]
    Spawn { command: String, reason: String },

    #[error("runner exited with status {code:?}: {stderr}")]
    NonZeroExit { code: Option<i32>, stderr: String },

    #[error("timed out after {0:?}")]
    Timeout(Duration),

    #[error("no models installed")]
    NoModels,
}

/// A completed query: the sampled call with the (truncated) response.
#[derive(Debug, Clone, PartialEq)]
pub struct LlmRun {
    pub model: String,
    pub sample: Sample<String>,
}

impl LlmRun {
    pub fn response(&self) -> &str {
        &self.sample.payload
    }

    /// Record named after the model, comparable with algorithm runs.
    pub fn to_record(&self, impact: &ImpactModel) -> RunRecord {
        RunRecord::new(&self.sample, &self.sample.estimate(impact), self.model.clone())
    }
}

#[derive(Debug, Clone)]
pub struct LlmClient {
    pub command: String,
    /// Arguments placed before the runner subcommand.
    pub base_args: Vec<String>,
    pub timeout: Duration,
    pub prompt_limit: usize,
    pub response_limit: usize,
}

impl LlmClient {
    pub fn from_config(cfg: &Config) -> Self {
        Self {
            command: cfg.llm_command.clone(),
            base_args: cfg.llm_args.clone(),
            timeout: cfg.llm_timeout(),
            prompt_limit: cfg.llm_prompt_limit,
            response_limit: cfg.llm_response_limit,
        }
    }

    fn run(&self, args: &[&str], timeout: Duration) -> Result<String, LlmError> {
        let mut full: Vec<&str> = self.base_args.iter().map(String::as_str).collect();
        full.extend_from_slice(args);
        run_with_timeout(&self.command, &full, timeout)
    }

    /// Whether `<command> list` succeeds.
    pub fn is_available(&self) -> bool {
        match self.run(&["list"], PROBE_TIMEOUT) {
            Ok(_) => true,
            Err(e) => {
                debug!("model runner unavailable: {e}");
                false
            }
        }
    }

    pub fn list_models(&self) -> Result<Vec<String>, LlmError> {
        let out = self.run(&["list"], PROBE_TIMEOUT)?;
        Ok(parse_model_list(&out))
    }

    /// Ask for sorting code, embedding at most `prompt_limit` elements.
    pub fn build_prompt<T: Debug>(&self, list: &[T]) -> String {
        let shown = &list[..list.len().min(self.prompt_limit)];
        format!(
            "Sort the following list of numbers in ascending order using Python.\n\
             Reply with the Python code only, without explanations.\n\n\
             List: {shown:?}\n\n\
             Return only the Python code that sorts this list."
        )
    }

    /// Run `<command> run <model> <prompt>` under `sampler`.
    ///
    /// The child is killed once `timeout` expires.
    pub fn query<M: CpuMeter>(
        &self,
        sampler: &mut Sampler<M>,
        model: &str,
        prompt: &str,
    ) -> Result<LlmRun, LlmError> {
        let sample = sampler.sample(|| self.run(&["run", model, prompt], self.timeout));
        let Sample {
            elapsed_seconds,
            cpu_percent,
            payload,
        } = sample;
        let response = payload.map_err(|e| {
            warn!("query to {model} failed: {e}");
            e
        })?;
        Ok(LlmRun {
            model: model.to_string(),
            sample: Sample {
                elapsed_seconds,
                cpu_percent,
                payload: response.chars().take(self.response_limit).collect(),
            },
        })
    }
}

/// First column of every row after the header of `ollama list` output.
pub fn parse_model_list(output: &str) -> Vec<String> {
    output
        .lines()
        .skip(1)
        .filter_map(|line| line.split_whitespace().next())
        .map(str::to_string)
        .collect()
}

fn drain<R: Read + Send + 'static>(mut reader: R) -> Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let _ = reader.read_to_end(&mut buf);
        let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
    });
    rx
}

/// Output of a drain thread, or `None` once `deadline` passes. A pipe can
/// outlive the child when a grandchild inherited it.
fn collect(rx: Option<Receiver<String>>, deadline: Instant) -> Option<String> {
    let Some(rx) = rx else {
        return Some(String::new());
    };
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
        Err(RecvTimeoutError::Timeout) => None,
    }
}

/// Run `command` and return its stdout, giving up after `timeout`.
///
/// The child is killed at the deadline; output pipes still held open by
/// its descendants are abandoned at the same deadline.
pub fn run_with_timeout(command: &str, args: &[&str], timeout: Duration) -> Result<String, LlmError> {
    let spawn_err = |e: std::io::Error| LlmError::Spawn {
        command: command.to_string(),
        reason: e.to_string(),
    };
    let mut child = Command::new(command)
        .args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(spawn_err)?;
    let stdout = child.stdout.take().map(drain);
    let stderr = child.stderr.take().map(drain);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait().map_err(spawn_err)? {
            Some(status) => break status,
            None if Instant::now() >= deadline => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(LlmError::Timeout(timeout));
            }
            None => thread::sleep(POLL_INTERVAL),
        }
    };

    if !status.success() {
        return Err(LlmError::NonZeroExit {
            code: status.code(),
            stderr: collect(stderr, deadline).unwrap_or_default().trim().to_string(),
        });
    }
    collect(stdout, deadline).ok_or(LlmError::Timeout(timeout))
}
