//! Simulated triplicated sensor.

use clap::ValueEnum;
use rand::Rng;
use serde::Serialize;
use tmr_voter::Reading;

/// Value reported by a stuck channel.
pub const STUCK_VALUE: u16 = 0x0BAD;

/// Cycles per unit of drift on a drifting channel.
pub const DRIFT_PERIOD: u64 = 4;

const BASE_MIN: u16 = 1_000;
const BASE_MAX: u16 = 60_000;

/// Fault injected into the simulated sensors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FaultMode {
    /// All channels track the measured value.
    #[default]
    None,
    /// Channel 1 reports a constant value.
    Stuck,
    /// Channel 2 drifts away from the measured value over time.
    Drift,
    /// Every channel reports independent random values.
    Chaos,
}

/// Three noisy views of one slowly varying quantity.
#[derive(Debug)]
pub struct SensorModel<R> {
    rng: R,
    base: u16,
    noise: u16,
    fault: FaultMode,
    cycle: u64,
}

impl<R: Rng> SensorModel<R> {
    /// Create a model starting at a random base value.
    pub fn new(mut rng: R, noise: u16, fault: FaultMode) -> Self {
        let base = rng.random_range(BASE_MIN..=BASE_MAX);
        Self {
            rng,
            base,
            noise,
            fault,
            cycle: 0,
        }
    }

    /// Current true value being measured.
    pub fn base(&self) -> u16 {
        self.base
    }

    /// Sample the three channels for the next cycle.
    pub fn next_reading(&mut self) -> Reading {
        self.step_base();
        let mut samples = [self.noisy(), self.noisy(), self.noisy()];

        match self.fault {
            FaultMode::None => {}
            FaultMode::Stuck => {
                if let Some(s1) = samples.get_mut(1) {
                    *s1 = STUCK_VALUE;
                }
            }
            FaultMode::Drift => {
                let offset = u16::try_from(self.cycle / DRIFT_PERIOD).unwrap_or(u16::MAX);
                if let Some(s2) = samples.get_mut(2) {
                    *s2 = s2.saturating_add(offset);
                }
            }
            FaultMode::Chaos => {
                samples = self.rng.random();
            }
        }

        self.cycle = self.cycle.saturating_add(1);
        Reading::from(samples)
    }

    fn step_base(&mut self) {
        let step: i8 = self.rng.random_range(-1..=1);
        self.base = self
            .base
            .saturating_add_signed(i16::from(step))
            .clamp(BASE_MIN, BASE_MAX);
    }

    fn noisy(&mut self) -> u16 {
        let offset = self.rng.random_range(0..=self.noise);
        self.base.saturating_add(offset)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use tmr_voter::{SystemState, classify, majority_vote};

    fn model(noise: u16, fault: FaultMode) -> SensorModel<StdRng> {
        SensorModel::new(StdRng::seed_from_u64(7), noise, fault)
    }

    #[test]
    fn test_noise_stays_within_bound() {
        let mut sensors = model(2, FaultMode::None);
        for _ in 0..500 {
            let reading = sensors.next_reading();
            let base = sensors.base();
            for sample in reading.samples() {
                assert!(sample >= base && sample <= base.saturating_add(2));
            }
            assert_eq!(classify(reading, 2), SystemState::AllSensorsOk);
        }
    }

    #[test]
    fn test_stuck_channel_is_outvoted() {
        let mut sensors = model(0, FaultMode::Stuck);
        for _ in 0..50 {
            let reading = sensors.next_reading();
            let [s0, s1, s2] = reading.samples();
            assert_eq!(s1, STUCK_VALUE);
            assert_eq!(s0, s2);
            assert_eq!(majority_vote(reading), s0);
        }
    }

    #[test]
    fn test_drift_grows_over_time() {
        let mut sensors = model(0, FaultMode::Drift);
        let mut last_offset = 0;
        for _ in 0..200 {
            let [s0, _, s2] = sensors.next_reading().samples();
            let offset = s2.saturating_sub(s0);
            assert!(offset >= last_offset);
            last_offset = offset;
        }
        assert!(last_offset >= 40);
    }

    #[test]
    fn test_seeded_models_are_reproducible() {
        let mut a = model(3, FaultMode::Chaos);
        let mut b = model(3, FaultMode::Chaos);
        for _ in 0..20 {
            assert_eq!(a.next_reading(), b.next_reading());
        }
    }
}
