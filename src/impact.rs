//! Linear energy and emissions model.
//!
//! ```text
//! energy_wh = cpu_power_watts * elapsed_seconds * (cpu_percent / 100) / 3600
//! co2_g     = energy_wh * grid_intensity
//! ```
//!
//! Both constants are approximations: 65 W is a typical desktop CPU package
//! power and 426 g CO2/kWh an average grid intensity. Neither is measured.

use serde::{Deserialize, Serialize};

pub const DEFAULT_CPU_POWER_WATTS: f64 = 65.0;
pub const GRID_INTENSITY_G_PER_KWH: f64 = 426.0;

const SECONDS_PER_HOUR: f64 = 3600.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactEstimate {
    pub energy_wh: f64,
    pub co2_g: f64,
}

/// Constants feeding [`ImpactModel::estimate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ImpactModel {
    pub cpu_power_watts: f64,
    pub grid_intensity_g_per_kwh: f64,
}

impl Default for ImpactModel {
    fn default() -> Self {
        Self {
            cpu_power_watts: DEFAULT_CPU_POWER_WATTS,
            grid_intensity_g_per_kwh: GRID_INTENSITY_G_PER_KWH,
        }
    }
}

impl ImpactModel {
    pub fn with_power(cpu_power_watts: f64) -> Self {
        Self {
            cpu_power_watts,
            ..Self::default()
        }
    }

    pub fn estimate(&self, elapsed_seconds: f64, cpu_percent: f64) -> ImpactEstimate {
        let energy_wh =
            (self.cpu_power_watts * elapsed_seconds * (cpu_percent / 100.0)) / SECONDS_PER_HOUR;
        ImpactEstimate {
            energy_wh,
            co2_g: energy_wh * self.grid_intensity_g_per_kwh,
        }
    }
}

/// Estimate with the fixed grid intensity and the given CPU power.
pub fn estimate(elapsed_seconds: f64, cpu_percent: f64, cpu_power_watts: f64) -> ImpactEstimate {
    ImpactModel::with_power(cpu_power_watts).estimate(elapsed_seconds, cpu_percent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn one_second_half_load() {
        let e = estimate(1.0, 50.0, DEFAULT_CPU_POWER_WATTS);
        assert!((e.energy_wh - 0.009_027_777).abs() < 1e-8);
        assert!((e.co2_g - 3.845_833).abs() < 1e-5);
    }

    #[test]
    fn zero_time_is_zero_impact() {
        let e = estimate(0.0, 100.0, 65.0);
        assert_eq!(e.energy_wh, 0.0);
        assert_eq!(e.co2_g, 0.0);
    }

    #[test]
    fn grid_intensity_is_configurable() {
        let model = ImpactModel {
            cpu_power_watts: 100.0,
            grid_intensity_g_per_kwh: 100.0,
        };
        let e = model.estimate(36.0, 100.0);
        assert!((e.energy_wh - 1.0).abs() < 1e-12);
        assert!((e.co2_g - 100.0).abs() < 1e-9);
    }

    proptest! {
        #[test]
        fn deterministic_and_proportional(t in 0.0f64..1_000.0, c in 0.0f64..=100.0, p in 1.0f64..500.0) {
            let a = estimate(t, c, p);
            let b = estimate(t, c, p);
            prop_assert_eq!(a, b);
            prop_assert_eq!(a.co2_g, a.energy_wh * GRID_INTENSITY_G_PER_KWH);
            prop_assert!(a.energy_wh >= 0.0);
        }
    }
}
