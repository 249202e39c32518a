//! State transition signalling.
//!
//! Every completed window produces a [`StateTransition`] that the voter hands
//! to an injected [`StateSignal`]. Delivery is fire-and-forget: the voter
//! neither waits for nor observes what the state machine does with it.

use crossbeam::channel::{Sender, TrySendError};
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;

use crate::health::{PairwiseDeviation, SystemState};
use crate::reading::{Reading, SensorChannel};

/// Transition request emitted once per classification window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    /// Requested system state.
    pub state: SystemState,
    /// 1-based sequence number of the window that produced this request.
    pub window: u64,
    /// Masked samples of the window's last cycle.
    pub reading: Reading,
    /// Channel that disagrees with the other two, for `ONE_SENSOR_FAIL`.
    pub suspect: Option<SensorChannel>,
}

impl StateTransition {
    /// Build a transition for a classified reading.
    #[must_use]
    pub fn new(state: SystemState, window: u64, reading: Reading) -> Self {
        let suspect = (state == SystemState::OneSensorFail)
            .then(|| PairwiseDeviation::of(reading).outlier());
        Self {
            state,
            window,
            reading,
            suspect,
        }
    }
}

impl fmt::Display for StateTransition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "window {} -> {} {}", self.window, self.state, self.reading)?;
        if let Some(suspect) = self.suspect {
            write!(f, " suspect={suspect}")?;
        }
        Ok(())
    }
}

/// Receiver of state transition requests.
pub trait StateSignal {
    /// Request a transition. Must not block the voter.
    fn request_transition(&self, transition: &StateTransition);
}

impl<T: StateSignal + ?Sized> StateSignal for Arc<T> {
    fn request_transition(&self, transition: &StateTransition) {
        (**self).request_transition(transition);
    }
}

impl<T: StateSignal + ?Sized> StateSignal for Box<T> {
    fn request_transition(&self, transition: &StateTransition) {
        (**self).request_transition(transition);
    }
}

/// Forwards transitions to a state machine thread without blocking.
///
/// A full or disconnected channel loses the request and logs a warning.
impl StateSignal for Sender<StateTransition> {
    fn request_transition(&self, transition: &StateTransition) {
        match self.try_send(*transition) {
            Ok(()) => {}
            Err(TrySendError::Full(dropped)) => {
                tracing::warn!(
                    state = %dropped.state,
                    window = dropped.window,
                    "State machine queue full, transition request dropped"
                );
            }
            Err(TrySendError::Disconnected(dropped)) => {
                tracing::warn!(
                    state = %dropped.state,
                    window = dropped.window,
                    "State machine disconnected, transition request dropped"
                );
            }
        }
    }
}

/// Adapts a closure into a [`StateSignal`].
///
/// ```rust
/// use tmr_voter::{Reading, SignalFn, StateSignal, StateTransition, SystemState};
///
/// let signal = SignalFn(|t: &StateTransition| assert_eq!(t.window, 1));
/// signal.request_transition(&StateTransition::new(
///     SystemState::AllSensorsOk,
///     1,
///     Reading::new(1, 1, 1),
/// ));
/// ```
pub struct SignalFn<F>(pub F);

impl<F: Fn(&StateTransition)> StateSignal for SignalFn<F> {
    fn request_transition(&self, transition: &StateTransition) {
        (self.0)(transition);
    }
}

impl<F> fmt::Debug for SignalFn<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignalFn").finish_non_exhaustive()
    }
}

/// Default number of transitions kept by a [`TransitionLog`].
pub const DEFAULT_TRANSITION_HISTORY: usize = 256;

/// Bounded in-memory record of transition requests.
///
/// Keeps the most recent requests; the oldest are evicted once the history
/// is full. Also usable directly as a [`StateSignal`].
#[derive(Debug)]
pub struct TransitionLog {
    capacity: usize,
    history: Mutex<VecDeque<StateTransition>>,
}

impl Default for TransitionLog {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_TRANSITION_HISTORY)
    }
}

impl TransitionLog {
    /// Create a log with the default history length.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a log keeping at most `capacity` transitions (minimum 1).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            history: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    /// Record a transition.
    pub fn record(&self, transition: StateTransition) {
        let mut history = self.history.lock();
        if history.len() >= self.capacity {
            history.pop_front();
        }
        history.push_back(transition);
    }

    /// State requested by the most recent transition.
    #[must_use]
    pub fn current_state(&self) -> Option<SystemState> {
        self.history.lock().back().map(|t| t.state)
    }

    /// Most recent transition.
    #[must_use]
    pub fn last(&self) -> Option<StateTransition> {
        self.history.lock().back().copied()
    }

    /// Retained transitions, oldest first.
    #[must_use]
    pub fn history(&self) -> Vec<StateTransition> {
        self.history.lock().iter().copied().collect()
    }

    /// Number of retained transitions requesting `state`.
    #[must_use]
    pub fn count(&self, state: SystemState) -> usize {
        self.history
            .lock()
            .iter()
            .filter(|t| t.state == state)
            .count()
    }

    /// Number of retained transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.history.lock().len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.history.lock().is_empty()
    }
}

impl StateSignal for TransitionLog {
    fn request_transition(&self, transition: &StateTransition) {
        self.record(*transition);
    }
}
