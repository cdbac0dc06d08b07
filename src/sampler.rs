//! Wall-clock and CPU sampling of a single call.

use std::sync::Mutex;
use std::time::Instant;

use cpu_time::ProcessTime;
use log::{debug, warn};

use crate::error::EcoSortError;
use crate::impact::{ImpactEstimate, ImpactModel};

/// Held for the whole reset/invoke/read window of every sample.
static SAMPLE_LOCK: Mutex<()> = Mutex::new(());

/// One measured invocation.
#[derive(Debug, Clone, PartialEq)]
pub struct Sample<T> {
    pub elapsed_seconds: f64,
    /// Always within `0.0..=100.0`.
    pub cpu_percent: f64,
    pub payload: T,
}

impl<T> Sample<T> {
    pub fn estimate(&self, model: &ImpactModel) -> ImpactEstimate {
        model.estimate(self.elapsed_seconds, self.cpu_percent)
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Sample<U> {
        Sample {
            elapsed_seconds: self.elapsed_seconds,
            cpu_percent: self.cpu_percent,
            payload: f(self.payload),
        }
    }

    pub fn into_payload(self) -> T {
        self.payload
    }
}

/// Source of CPU utilisation readings.
///
/// `reset` starts a new accounting window; `read` returns the utilisation
/// since the last reset, in percent of one core. Multi-core work can push
/// readings past 100.
pub trait CpuMeter {
    fn reset(&mut self);
    fn read(&mut self) -> f32;
}

/// CPU time consumed by the current process over wall-clock time elapsed,
/// both taken between `reset` and `read`.
///
/// CPU time counts every thread of the process, so parallel work reads
/// above 100.
pub struct ProcessCpuMeter {
    window: Option<(ProcessTime, Instant)>,
}

impl ProcessCpuMeter {
    pub fn new() -> Result<Self, EcoSortError> {
        ProcessTime::try_now()
            .map_err(|e| EcoSortError::Internal(format!("process cpu clock unavailable: {e}")))?;
        Ok(Self { window: None })
    }
}

impl CpuMeter for ProcessCpuMeter {
    fn reset(&mut self) {
        self.window = match ProcessTime::try_now() {
            Ok(cpu) => Some((cpu, Instant::now())),
            Err(e) => {
                warn!("reading process cpu clock failed: {e}");
                None
            }
        };
    }

    fn read(&mut self) -> f32 {
        let Some((cpu_start, wall_start)) = self.window.take() else {
            return 0.0;
        };
        let wall = wall_start.elapsed().as_secs_f64();
        let cpu = match cpu_start.try_elapsed() {
            Ok(d) => d.as_secs_f64(),
            Err(e) => {
                warn!("reading process cpu clock failed: {e}");
                return 0.0;
            }
        };
        if wall <= 0.0 {
            return 0.0;
        }
        (cpu / wall * 100.0) as f32
    }
}

/// Measures calls one at a time against an exclusively owned [`CpuMeter`].
pub struct Sampler<M: CpuMeter = ProcessCpuMeter> {
    meter: M,
}

impl Sampler<ProcessCpuMeter> {
    pub fn for_current_process() -> Result<Self, EcoSortError> {
        Ok(Self::new(ProcessCpuMeter::new()?))
    }
}

impl<M: CpuMeter> Sampler<M> {
    pub fn new(meter: M) -> Self {
        Self { meter }
    }

    /// Invoke `f` exactly once and measure it.
    ///
    /// Panics raised by `f` are not caught.
    pub fn sample<T>(&mut self, f: impl FnOnce() -> T) -> Sample<T> {
        let _guard = SAMPLE_LOCK.lock().unwrap_or_else(|e| e.into_inner());

        self.meter.reset();
        let start = Instant::now();
        let payload = f();
        let elapsed = start.elapsed();
        let raw = self.meter.read();

        let cpu_percent = clamp_cpu(raw);
        if f64::from(raw) > 100.0 {
            warn!("cpu reading {raw:.2}% clamped to 100%");
        }
        debug!(
            "sampled {:.6}s, cpu raw {:.2}% -> {:.2}%",
            elapsed.as_secs_f64(),
            raw,
            cpu_percent
        );

        Sample {
            elapsed_seconds: elapsed.as_secs_f64(),
            cpu_percent,
            payload,
        }
    }

    pub fn meter(&self) -> &M {
        &self.meter
    }
}

/// Clamp a raw reading into `0.0..=100.0`. NaN reads as idle.
pub fn clamp_cpu(raw: f32) -> f64 {
    let raw = f64::from(raw);
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 100.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FixedMeter {
        reading: f32,
        resets: usize,
    }

    impl CpuMeter for FixedMeter {
        fn reset(&mut self) {
            self.resets += 1;
        }

        fn read(&mut self) -> f32 {
            self.reading
        }
    }

    fn fixed(reading: f32) -> Sampler<FixedMeter> {
        Sampler::new(FixedMeter { reading, resets: 0 })
    }

    #[test]
    fn over_hundred_is_clamped() {
        let s = fixed(387.5).sample(|| ());
        assert_eq!(s.cpu_percent, 100.0);
    }

    #[test]
    fn negative_and_nan_read_as_zero() {
        assert_eq!(fixed(-3.0).sample(|| ()).cpu_percent, 0.0);
        assert_eq!(fixed(f32::NAN).sample(|| ()).cpu_percent, 0.0);
    }

    #[test]
    fn payload_passes_through_and_call_runs_once() {
        let calls = Cell::new(0);
        let mut sampler = fixed(42.0);
        let s = sampler.sample(|| {
            calls.set(calls.get() + 1);
            vec![1, 2, 3]
        });
        assert_eq!(calls.get(), 1);
        assert_eq!(s.payload, vec![1, 2, 3]);
        assert_eq!(s.cpu_percent, 42.0);
        assert_eq!(sampler.meter().resets, 1);
    }

    #[test]
    fn elapsed_covers_the_call() {
        let s = fixed(0.0).sample(|| std::thread::sleep(std::time::Duration::from_millis(20)));
        assert!(s.elapsed_seconds >= 0.02);
    }

    #[test]
    fn panics_propagate_and_lock_survives() {
        let result = std::panic::catch_unwind(|| {
            fixed(0.0).sample(|| panic!("boom"));
        });
        assert!(result.is_err());
        assert_eq!(fixed(10.0).sample(|| 1).payload, 1);
    }

    #[test]
    fn estimate_uses_sample_values() {
        let s = Sample {
            elapsed_seconds: 1.0,
            cpu_percent: 50.0,
            payload: (),
        };
        let e = s.estimate(&ImpactModel::default());
        assert!((e.energy_wh - 65.0 * 0.5 / 3600.0).abs() < 1e-12);
    }

    fn busy_for(d: std::time::Duration) -> u64 {
        let start = Instant::now();
        let mut acc = 0u64;
        while start.elapsed() < d {
            for x in 0..10_000u64 {
                acc = std::hint::black_box(acc.wrapping_add(x * x));
            }
        }
        acc
    }

    #[test]
    fn process_meter_sees_busy_first_call() {
        let mut sampler = Sampler::for_current_process().unwrap();
        let s = sampler.sample(|| busy_for(std::time::Duration::from_millis(300)));
        assert!(s.elapsed_seconds >= 0.3);
        assert!(s.cpu_percent > 50.0, "cpu {}", s.cpu_percent);
        assert!(s.cpu_percent <= 100.0);
    }

    #[test]
    fn process_meter_reads_idle_sleep_low() {
        let mut sampler = Sampler::for_current_process().unwrap();
        let s = sampler.sample(|| std::thread::sleep(std::time::Duration::from_millis(200)));
        assert!((0.0..=100.0).contains(&s.cpu_percent));
    }

    #[test]
    fn read_without_reset_is_zero() {
        let mut meter = ProcessCpuMeter::new().unwrap();
        assert_eq!(meter.read(), 0.0);
    }
}
