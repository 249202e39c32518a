//! The TMR voter task body.
//!
//! One cycle:
//!
//! 1. wait (bounded) for a reading; a timeout is an idle period, not an error
//! 2. reject payloads that are not exactly one reading long
//! 3. mask, vote, forward the result (bounded wait, dropped on failure)
//! 4. advance the window; on the window's last cycle classify and signal
//! 5. release the received item
//!
//! Release is tied to the item's `Drop`, so every path in the cycle returns
//! the item to its source exactly once.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::channel::{InboundChannel, OutboundChannel};
use crate::config::VoterConfig;
use crate::error::VoterResult;
use crate::health::classify;
use crate::reading::{READING_SIZE, Reading, encode_result};
use crate::signal::{StateSignal, StateTransition};
use crate::stats::{VoterCounters, VoterStats};
use crate::task::StopToken;
use crate::vote::{disagreement_bits, vote_masked};

/// What a single cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No reading arrived within the receive timeout.
    Idle,
    /// A payload of the wrong size was discarded.
    Discarded {
        /// Length of the discarded payload.
        len: usize,
    },
    /// A reading was voted.
    Voted {
        /// Majority of the masked samples.
        result: u16,
        /// Whether the result made it onto the outbound channel.
        forwarded: bool,
        /// Transition requested if this cycle closed a window.
        transition: Option<StateTransition>,
    },
}

/// Mutable voting state, kept apart from the inbound channel so a received
/// item can stay borrowed from the channel while the stage runs.
struct VotingStage<O, S> {
    config: VoterConfig,
    outbound: O,
    signal: S,
    window_position: u32,
    windows_completed: u64,
    counters: Arc<VoterCounters>,
}

impl<O: OutboundChannel, S: StateSignal> VotingStage<O, S> {
    fn process(&mut self, payload: &[u8]) -> CycleOutcome {
        let raw = match Reading::from_bytes(payload) {
            Ok(raw) => raw,
            Err(err) => {
                self.counters.inc_discarded();
                error!(
                    len = payload.len(),
                    expected = READING_SIZE,
                    %err,
                    "Unexpected data received, payload discarded"
                );
                return CycleOutcome::Discarded { len: payload.len() };
            }
        };

        let (masked, result) = vote_masked(raw, self.config.mask);
        self.counters.inc_voted();
        debug!(
            raw = %raw,
            masked = %masked,
            result,
            disagreement = disagreement_bits(masked),
            "Reading voted"
        );

        let forwarded = self.forward(result);
        let transition = self.advance_window(masked);

        CycleOutcome::Voted {
            result,
            forwarded,
            transition,
        }
    }

    fn forward(&self, result: u16) -> bool {
        match self
            .outbound
            .send(&encode_result(result), self.config.send_timeout())
        {
            Ok(()) => {
                self.counters.inc_forwarded();
                true
            }
            Err(err) => {
                self.counters.inc_dropped_result();
                warn!(
                    result,
                    timeout_ms = self.config.send_timeout_ms,
                    %err,
                    "Output buffer full, vote result dropped"
                );
                false
            }
        }
    }

    fn advance_window(&mut self, masked: Reading) -> Option<StateTransition> {
        self.window_position = self.window_position.saturating_add(1);
        if self.window_position < self.config.window_len {
            return None;
        }
        self.window_position = 0;
        self.windows_completed = self.windows_completed.saturating_add(1);

        let state = classify(masked, self.config.deviation_threshold);
        let transition = StateTransition::new(state, self.windows_completed, masked);
        self.counters.record_classification(state);

        if state.is_fault() {
            warn!(
                state = %state,
                window = transition.window,
                reading = %masked,
                suspect = ?transition.suspect,
                "Sensor discrepancy detected"
            );
        } else {
            info!(
                state = %state,
                window = transition.window,
                reading = %masked,
                "Sensors in agreement"
            );
        }

        self.signal.request_transition(&transition);
        Some(transition)
    }
}

/// Triple modular redundancy voter.
///
/// Generic over its inbound channel `I`, outbound channel `O` and state
/// signal `S`, all fixed at construction.
///
/// # Example
///
/// ```rust
/// use std::sync::Arc;
/// use std::time::Duration;
/// use tmr_ringbuf::RingBuffer;
/// use tmr_voter::prelude::*;
///
/// let sensors = Arc::new(RingBuffer::for_items(16, READING_SIZE)?);
/// let monitor = Arc::new(RingBuffer::for_items(16, RESULT_SIZE)?);
/// let log = Arc::new(TransitionLog::new());
///
/// let config = VoterConfig::builder().receive_timeout_ms(10).build()?;
/// let mut voter = Voter::new(config, Arc::clone(&sensors), Arc::clone(&monitor), Arc::clone(&log))?;
///
/// sensors.send(&Reading::new(0b110, 0b101, 0b011).to_bytes(), Duration::from_millis(10))?;
/// let outcome = voter.poll_once();
/// assert!(matches!(outcome, CycleOutcome::Voted { result: 0b111, forwarded: true, .. }));
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct Voter<I, O, S> {
    inbound: I,
    stage: VotingStage<O, S>,
}

impl<I, O, S> Voter<I, O, S>
where
    I: InboundChannel,
    O: OutboundChannel,
    S: StateSignal,
{
    /// Create a voter.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn new(config: VoterConfig, inbound: I, outbound: O, signal: S) -> VoterResult<Self> {
        config.validate()?;
        Ok(Self {
            inbound,
            stage: VotingStage {
                config,
                outbound,
                signal,
                window_position: 0,
                windows_completed: 0,
                counters: Arc::new(VoterCounters::new()),
            },
        })
    }

    /// Run one receive-and-process cycle.
    pub fn poll_once(&mut self) -> CycleOutcome {
        let timeout = self.stage.config.receive_timeout();
        let Some(item) = self.inbound.receive(timeout) else {
            self.stage.counters.inc_receive_timeout();
            warn!(
                timeout_ms = self.stage.config.receive_timeout_ms,
                "Waiting for data ..."
            );
            return CycleOutcome::Idle;
        };
        self.stage.counters.inc_received();
        self.stage.process(&item)
    }

    /// Run cycles until `stop` is requested. Returns the final counters.
    ///
    /// The stop request is checked before each cycle, so a cycle in progress
    /// always completes.
    pub fn run(&mut self, stop: &StopToken) -> VoterStats {
        info!(
            mask = %format!("{:#06x}", self.stage.config.mask),
            window_len = self.stage.config.window_len,
            threshold = self.stage.config.deviation_threshold,
            "Voter task running"
        );

        while !stop.is_stop_requested() {
            self.poll_once();
        }

        let stats = self.stats();
        info!(
            voted = stats.voted,
            discarded = stats.discarded,
            windows = stats.classifications(),
            "Stopping voter task"
        );
        stats
    }

    /// The voter's configuration.
    #[must_use]
    pub fn config(&self) -> &VoterConfig {
        &self.stage.config
    }

    /// Valid cycles counted in the current window (`0 ≤ n < window_len`).
    #[must_use]
    pub fn window_position(&self) -> u32 {
        self.stage.window_position
    }

    /// Windows classified so far.
    #[must_use]
    pub fn windows_completed(&self) -> u64 {
        self.stage.windows_completed
    }

    /// Shared handle to the live counters.
    #[must_use]
    pub fn counters(&self) -> Arc<VoterCounters> {
        Arc::clone(&self.stage.counters)
    }

    /// Snapshot of the counters.
    #[must_use]
    pub fn stats(&self) -> VoterStats {
        self.stage.counters.snapshot()
    }
}

impl<I, O, S> fmt::Debug for Voter<I, O, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Voter")
            .field("config", &self.stage.config)
            .field("window_position", &self.stage.window_position)
            .field("windows_completed", &self.stage.windows_completed)
            .finish_non_exhaustive()
    }
}
