//! Voter run counters.
//!
//! The voting loop increments these from its own thread; other threads read
//! them through [`VoterCounters::snapshot`]. All counters use
//! `Ordering::Relaxed` and are only eventually consistent with each other.

use core::sync::atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

use crate::health::SystemState;

/// Point-in-time copy of the voter counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct VoterStats {
    /// Payloads received from the inbound channel.
    pub received: u64,
    /// Valid readings voted.
    pub voted: u64,
    /// Payloads discarded for having the wrong size.
    pub discarded: u64,
    /// Receive waits that ended without data.
    pub receive_timeouts: u64,
    /// Results queued on the outbound channel.
    pub forwarded: u64,
    /// Results dropped because the outbound channel had no room.
    pub dropped_results: u64,
    /// Windows that produced an `ALL_SENSORS_OK` request.
    pub all_sensors_ok: u64,
    /// Windows that produced a `ONE_SENSOR_FAIL` request.
    pub one_sensor_fail: u64,
    /// Windows that produced a `CRITICAL_ERROR` request.
    pub critical_error: u64,
}

impl VoterStats {
    /// Total classifications across all states.
    #[must_use]
    pub fn classifications(&self) -> u64 {
        self.all_sensors_ok
            .saturating_add(self.one_sensor_fail)
            .saturating_add(self.critical_error)
    }

    /// Classifications that produced the given state.
    #[must_use]
    pub fn classifications_for(&self, state: SystemState) -> u64 {
        match state {
            SystemState::AllSensorsOk => self.all_sensors_ok,
            SystemState::OneSensorFail => self.one_sensor_fail,
            SystemState::CriticalError => self.critical_error,
        }
    }
}

/// Atomic counters shared between the voting loop and observers.
#[derive(Debug, Default)]
pub struct VoterCounters {
    received: AtomicU64,
    voted: AtomicU64,
    discarded: AtomicU64,
    receive_timeouts: AtomicU64,
    forwarded: AtomicU64,
    dropped_results: AtomicU64,
    all_sensors_ok: AtomicU64,
    one_sensor_fail: AtomicU64,
    critical_error: AtomicU64,
}

impl VoterCounters {
    /// Create zeroed counters.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            received: AtomicU64::new(0),
            voted: AtomicU64::new(0),
            discarded: AtomicU64::new(0),
            receive_timeouts: AtomicU64::new(0),
            forwarded: AtomicU64::new(0),
            dropped_results: AtomicU64::new(0),
            all_sensors_ok: AtomicU64::new(0),
            one_sensor_fail: AtomicU64::new(0),
            critical_error: AtomicU64::new(0),
        }
    }

    #[inline]
    pub(crate) fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_voted(&self) {
        self.voted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_discarded(&self) {
        self.discarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_receive_timeout(&self) {
        self.receive_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_forwarded(&self) {
        self.forwarded.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_dropped_result(&self) {
        self.dropped_results.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn record_classification(&self, state: SystemState) {
        let counter = match state {
            SystemState::AllSensorsOk => &self.all_sensors_ok,
            SystemState::OneSensorFail => &self.one_sensor_fail,
            SystemState::CriticalError => &self.critical_error,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters.
    #[must_use]
    pub fn snapshot(&self) -> VoterStats {
        VoterStats {
            received: self.received.load(Ordering::Relaxed),
            voted: self.voted.load(Ordering::Relaxed),
            discarded: self.discarded.load(Ordering::Relaxed),
            receive_timeouts: self.receive_timeouts.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            dropped_results: self.dropped_results.load(Ordering::Relaxed),
            all_sensors_ok: self.all_sensors_ok.load(Ordering::Relaxed),
            one_sensor_fail: self.one_sensor_fail.load(Ordering::Relaxed),
            critical_error: self.critical_error.load(Ordering::Relaxed),
        }
    }
}
