//! Hosting the voter on its own thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use tracing::{error, warn};

use crate::channel::{InboundChannel, OutboundChannel};
use crate::error::{VoterError, VoterResult};
use crate::signal::StateSignal;
use crate::stats::{VoterCounters, VoterStats};
use crate::voter::Voter;

/// Name given to the voter thread.
pub const VOTER_THREAD_NAME: &str = "tmr-voter";

/// Cooperative stop request shared between a running voter and its owner.
///
/// The voter checks the token between cycles, so stopping takes at most one
/// receive timeout plus one send timeout.
#[derive(Debug, Clone, Default)]
pub struct StopToken {
    stop: Arc<AtomicBool>,
}

impl StopToken {
    /// Create a token with no stop requested.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask the voter to stop after its current cycle.
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    /// Returns true once a stop has been requested.
    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// A voter running on a dedicated thread.
///
/// Dropping a running task requests a stop and waits for the thread.
#[derive(Debug)]
pub struct VoterTask {
    stop: StopToken,
    counters: Arc<VoterCounters>,
    handle: Option<JoinHandle<VoterStats>>,
}

impl VoterTask {
    /// Move `voter` onto a new thread and start its loop.
    ///
    /// # Errors
    ///
    /// Returns [`VoterError::TaskSpawn`] if the thread cannot be created.
    pub fn spawn<I, O, S>(mut voter: Voter<I, O, S>) -> VoterResult<Self>
    where
        I: InboundChannel + Send + 'static,
        O: OutboundChannel + Send + 'static,
        S: StateSignal + Send + 'static,
    {
        let stop = StopToken::new();
        let counters = voter.counters();
        let thread_stop = stop.clone();

        let handle = thread::Builder::new()
            .name(VOTER_THREAD_NAME.to_string())
            .spawn(move || voter.run(&thread_stop))
            .map_err(|e| VoterError::task_spawn(e.to_string()))?;

        Ok(Self {
            stop,
            counters,
            handle: Some(handle),
        })
    }

    /// Token that stops this task when triggered.
    #[must_use]
    pub fn stop_token(&self) -> StopToken {
        self.stop.clone()
    }

    /// Request a stop without waiting for it.
    pub fn request_stop(&self) {
        self.stop.request_stop();
    }

    /// Returns true while the voter thread has not exited.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.handle.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Live snapshot of the voter counters.
    #[must_use]
    pub fn stats(&self) -> VoterStats {
        self.counters.snapshot()
    }

    /// Wait for the voter thread to exit on its own.
    ///
    /// Only returns once something has triggered the stop token.
    ///
    /// # Errors
    ///
    /// Returns [`VoterError::TaskPanicked`] if the voter thread panicked.
    pub fn join(mut self) -> VoterResult<VoterStats> {
        self.join_inner()
    }

    /// Request a stop and wait for the voter thread to exit.
    ///
    /// # Errors
    ///
    /// Returns [`VoterError::TaskPanicked`] if the voter thread panicked.
    pub fn stop(mut self) -> VoterResult<VoterStats> {
        self.stop.request_stop();
        self.join_inner()
    }

    fn join_inner(&mut self) -> VoterResult<VoterStats> {
        let Some(handle) = self.handle.take() else {
            return Ok(self.counters.snapshot());
        };
        match handle.join() {
            Ok(stats) => Ok(stats),
            Err(_) => {
                error!("Voter thread panicked");
                Err(VoterError::TaskPanicked)
            }
        }
    }
}

impl Drop for VoterTask {
    fn drop(&mut self) {
        if self.handle.is_some() {
            warn!("Voter task dropped while still running, stopping");
            self.stop.request_stop();
            if let Err(err) = self.join_inner() {
                error!(%err, "Voter task did not stop cleanly");
            }
        }
    }
}
