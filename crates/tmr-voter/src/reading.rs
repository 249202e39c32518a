//! Sensor readings and their wire form.
//!
//! A reading is three `u16` samples in fixed channel order. On the wire it is
//! the native-endian bytes of a `[u16; 3]`, and a vote result is the
//! native-endian bytes of a single `u16`.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{VoterError, VoterResult};

/// Number of redundant sensor channels.
pub const CHANNEL_COUNT: usize = 3;

/// Size in bytes of one reading record.
pub const READING_SIZE: usize = CHANNEL_COUNT * size_of::<u16>();

/// Size in bytes of one vote result record.
pub const RESULT_SIZE: usize = size_of::<u16>();

/// Redundant sensor channel identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SensorChannel {
    /// First sensor.
    Sensor0,
    /// Second sensor.
    Sensor1,
    /// Third sensor.
    Sensor2,
}

impl SensorChannel {
    /// All channels in wire order.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Sensor0, Self::Sensor1, Self::Sensor2].into_iter()
    }

    /// Zero-based position of the channel in a reading.
    #[must_use]
    pub fn index(self) -> usize {
        match self {
            Self::Sensor0 => 0,
            Self::Sensor1 => 1,
            Self::Sensor2 => 2,
        }
    }
}

impl fmt::Display for SensorChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sensor{}", self.index())
    }
}

/// One sampling cycle's worth of triplicated sensor values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Reading {
    samples: [u16; CHANNEL_COUNT],
}

impl Reading {
    /// Create a reading from the three channel samples.
    #[must_use]
    pub const fn new(s0: u16, s1: u16, s2: u16) -> Self {
        Self {
            samples: [s0, s1, s2],
        }
    }

    /// Decode a reading record.
    ///
    /// # Errors
    ///
    /// Returns [`VoterError::MalformedPayload`] unless `bytes` is exactly
    /// [`READING_SIZE`] long.
    pub fn from_bytes(bytes: &[u8]) -> VoterResult<Self> {
        let Ok([a0, a1, b0, b1, c0, c1]) = <[u8; READING_SIZE]>::try_from(bytes) else {
            return Err(VoterError::malformed_payload(bytes.len(), READING_SIZE));
        };
        Ok(Self::new(
            u16::from_ne_bytes([a0, a1]),
            u16::from_ne_bytes([b0, b1]),
            u16::from_ne_bytes([c0, c1]),
        ))
    }

    /// Encode the reading as a wire record.
    #[must_use]
    pub fn to_bytes(&self) -> [u8; READING_SIZE] {
        let [s0, s1, s2] = self.samples;
        let [a0, a1] = s0.to_ne_bytes();
        let [b0, b1] = s1.to_ne_bytes();
        let [c0, c1] = s2.to_ne_bytes();
        [a0, a1, b0, b1, c0, c1]
    }

    /// Samples in channel order.
    #[must_use]
    pub const fn samples(&self) -> [u16; CHANNEL_COUNT] {
        self.samples
    }

    /// Sample for one channel.
    #[must_use]
    pub fn sample(&self, channel: SensorChannel) -> u16 {
        let [s0, s1, s2] = self.samples;
        match channel {
            SensorChannel::Sensor0 => s0,
            SensorChannel::Sensor1 => s1,
            SensorChannel::Sensor2 => s2,
        }
    }

    /// Apply the same bit mask to every channel.
    #[must_use]
    pub const fn masked(&self, mask: u16) -> Self {
        let [s0, s1, s2] = self.samples;
        Self::new(s0 & mask, s1 & mask, s2 & mask)
    }
}

impl From<[u16; CHANNEL_COUNT]> for Reading {
    fn from(samples: [u16; CHANNEL_COUNT]) -> Self {
        Self { samples }
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [s0, s1, s2] = self.samples;
        write!(f, "({s0}, {s1}, {s2})")
    }
}

/// Encode a vote result as a wire record.
#[must_use]
pub fn encode_result(result: u16) -> [u8; RESULT_SIZE] {
    result.to_ne_bytes()
}

/// Decode a vote result record.
///
/// # Errors
///
/// Returns [`VoterError::MalformedPayload`] unless `bytes` is exactly
/// [`RESULT_SIZE`] long.
pub fn decode_result(bytes: &[u8]) -> VoterResult<u16> {
    let Ok(raw) = <[u8; RESULT_SIZE]>::try_from(bytes) else {
        return Err(VoterError::malformed_payload(bytes.len(), RESULT_SIZE));
    };
    Ok(u16::from_ne_bytes(raw))
}
