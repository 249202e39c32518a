//! Sensor health classification.
//!
//! Once per window the voter compares the three masked samples of the
//! window's last cycle pairwise and maps the deviations onto one of three
//! system states. The checks run in a fixed order: the all-within-threshold
//! test wins over the all-diverging test, so deviations equal to the
//! threshold on every pair classify as healthy.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::reading::{Reading, SensorChannel};

/// Default pairwise deviation threshold.
pub const DEFAULT_DEVIATION_THRESHOLD: u16 = 2;

/// System state requested from the state machine after a classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemState {
    /// All three sensors agree within the threshold.
    AllSensorsOk,
    /// One sensor disagrees with the other two.
    OneSensorFail,
    /// Every pair of sensors diverges.
    CriticalError,
}

impl SystemState {
    /// All states in severity order.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::AllSensorsOk, Self::OneSensorFail, Self::CriticalError].into_iter()
    }

    /// State name as used by the state machine.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AllSensorsOk => "ALL_SENSORS_OK",
            Self::OneSensorFail => "ONE_SENSOR_FAIL",
            Self::CriticalError => "CRITICAL_ERROR",
        }
    }

    /// Returns true for the two fault states.
    #[must_use]
    pub fn is_fault(&self) -> bool {
        !matches!(self, Self::AllSensorsOk)
    }
}

impl fmt::Display for SystemState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Absolute differences between each pair of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PairwiseDeviation {
    /// `|s0 - s1|`
    pub d01: u16,
    /// `|s0 - s2|`
    pub d02: u16,
    /// `|s1 - s2|`
    pub d12: u16,
}

impl PairwiseDeviation {
    /// Compute the deviations of a reading.
    #[must_use]
    pub fn of(reading: Reading) -> Self {
        let [v0, v1, v2] = reading.samples();
        Self {
            d01: v0.abs_diff(v1),
            d02: v0.abs_diff(v2),
            d12: v1.abs_diff(v2),
        }
    }

    /// Every pair differs by at most `threshold`.
    #[must_use]
    pub fn all_within(&self, threshold: u16) -> bool {
        self.d01 <= threshold && self.d02 <= threshold && self.d12 <= threshold
    }

    /// Every pair differs by at least `threshold`.
    #[must_use]
    pub fn all_at_least(&self, threshold: u16) -> bool {
        self.d01 >= threshold && self.d02 >= threshold && self.d12 >= threshold
    }

    /// Largest of the three deviations.
    #[must_use]
    pub fn max(&self) -> u16 {
        self.d01.max(self.d02).max(self.d12)
    }

    /// Channel left out of the closest-agreeing pair.
    ///
    /// Ties keep the earlier pair in `(0,1)`, `(0,2)`, `(1,2)` order.
    #[must_use]
    pub fn outlier(&self) -> SensorChannel {
        if self.d01 <= self.d02 && self.d01 <= self.d12 {
            SensorChannel::Sensor2
        } else if self.d02 <= self.d12 {
            SensorChannel::Sensor1
        } else {
            SensorChannel::Sensor0
        }
    }
}

/// Classify a masked reading against a deviation threshold.
///
/// ```rust
/// use tmr_voter::{Reading, SystemState, classify};
///
/// assert_eq!(classify(Reading::new(10, 10, 10), 2), SystemState::AllSensorsOk);
/// assert_eq!(classify(Reading::new(10, 13, 10), 2), SystemState::OneSensorFail);
/// assert_eq!(classify(Reading::new(10, 20, 30), 2), SystemState::CriticalError);
/// ```
#[must_use]
pub fn classify(reading: Reading, threshold: u16) -> SystemState {
    let deviation = PairwiseDeviation::of(reading);
    if deviation.all_within(threshold) {
        SystemState::AllSensorsOk
    } else if deviation.all_at_least(threshold) {
        SystemState::CriticalError
    } else {
        SystemState::OneSensorFail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const T: u16 = DEFAULT_DEVIATION_THRESHOLD;

    #[test]
    fn test_classification_examples() {
        assert_eq!(classify(Reading::new(10, 10, 10), T), SystemState::AllSensorsOk);
        assert_eq!(classify(Reading::new(10, 13, 10), T), SystemState::OneSensorFail);
        assert_eq!(classify(Reading::new(10, 20, 30), T), SystemState::CriticalError);
    }

    #[test]
    fn test_classification_boundaries() {
        // diffs 2, 2, 0
        assert_eq!(classify(Reading::new(10, 12, 12), T), SystemState::AllSensorsOk);
        // diffs 2, 4, 2
        assert_eq!(classify(Reading::new(10, 12, 14), T), SystemState::CriticalError);
        // diffs 3, 3, 0
        assert_eq!(classify(Reading::new(10, 13, 13), T), SystemState::OneSensorFail);
    }

    #[test]
    fn test_overlap_resolves_to_ok() {
        // With T = 0 and equal samples both the ok and critical conditions
        // hold; ok is checked first.
        let reading = Reading::new(7, 7, 7);
        let deviation = PairwiseDeviation::of(reading);
        assert!(deviation.all_within(0));
        assert!(deviation.all_at_least(0));
        assert_eq!(classify(reading, 0), SystemState::AllSensorsOk);
    }

    #[test]
    fn test_deviation_handles_unsigned_wrap() {
        let deviation = PairwiseDeviation::of(Reading::new(0, u16::MAX, 1));
        assert_eq!(deviation.d01, u16::MAX);
        assert_eq!(deviation.d02, 1);
        assert_eq!(deviation.d12, u16::MAX - 1);
        assert_eq!(deviation.max(), u16::MAX);
    }

    #[test]
    fn test_outlier() {
        assert_eq!(
            PairwiseDeviation::of(Reading::new(50, 10, 11)).outlier(),
            SensorChannel::Sensor0
        );
        assert_eq!(
            PairwiseDeviation::of(Reading::new(10, 50, 11)).outlier(),
            SensorChannel::Sensor1
        );
        assert_eq!(
            PairwiseDeviation::of(Reading::new(10, 11, 50)).outlier(),
            SensorChannel::Sensor2
        );
    }

    #[test]
    fn test_state_names() {
        let names: Vec<String> = SystemState::all().map(|s| s.to_string()).collect();
        assert_eq!(names, ["ALL_SENSORS_OK", "ONE_SENSOR_FAIL", "CRITICAL_ERROR"]);
        assert!(!SystemState::AllSensorsOk.is_fault());
        assert!(SystemState::CriticalError.is_fault());
    }
}
