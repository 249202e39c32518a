//! # tmr-voter
//!
//! Triple modular redundancy voter for three redundant sensors.
//!
//! Each cycle the voter receives one reading (three `u16` samples), masks the
//! samples, takes the bitwise two-out-of-three majority and forwards it to a
//! monitor channel. Every `window_len` valid cycles it compares the last
//! masked samples pairwise and asks a state machine to move to
//! `ALL_SENSORS_OK`, `ONE_SENSOR_FAIL` or `CRITICAL_ERROR`.
//!
//! ## Key types
//!
//! - [`Voter`]: the voting loop, generic over its channels and state signal
//! - [`VoterTask`]: a voter running on its own thread, stopped through a
//!   [`StopToken`]
//! - [`InboundChannel`] / [`OutboundChannel`]: message seams, implemented for
//!   [`tmr_ringbuf::RingBuffer`]
//! - [`StateSignal`]: transition request sink, implemented for crossbeam
//!   senders, closures ([`SignalFn`]) and [`TransitionLog`]
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use std::time::Duration;
//! use tmr_ringbuf::RingBuffer;
//! use tmr_voter::prelude::*;
//!
//! let sensors = Arc::new(RingBuffer::for_items(16, READING_SIZE)?);
//! let monitor = Arc::new(RingBuffer::for_items(16, RESULT_SIZE)?);
//! let (tx, rx) = crossbeam::channel::bounded(8);
//!
//! let config = VoterConfig::builder().window_len(1).receive_timeout_ms(20).build()?;
//! let task = VoterTask::spawn(Voter::new(config, Arc::clone(&sensors), monitor, tx)?)?;
//!
//! sensors.send(&Reading::new(10, 13, 10).to_bytes(), Duration::from_millis(20))?;
//! let transition: StateTransition = rx.recv_timeout(Duration::from_secs(2))?;
//! assert_eq!(transition.state, SystemState::OneSensorFail);
//!
//! let stats = task.stop()?;
//! assert_eq!(stats.voted, 1);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

#![deny(
    unsafe_op_in_unsafe_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic_in_result_fn,
    clippy::panic,
    missing_docs,
    missing_debug_implementations
)]
#![warn(clippy::pedantic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod channel;
pub mod config;
pub mod error;
pub mod health;
pub mod reading;
pub mod signal;
pub mod stats;
pub mod task;
pub mod vote;
pub mod voter;

pub mod prelude;

pub use channel::{InboundChannel, OutboundChannel};
pub use config::{
    DEFAULT_RECEIVE_TIMEOUT_MS, DEFAULT_SEND_TIMEOUT_MS, DEFAULT_WINDOW_LEN, VoterConfig,
    VoterConfigBuilder,
};
pub use error::{VoterError, VoterResult};
pub use health::{DEFAULT_DEVIATION_THRESHOLD, PairwiseDeviation, SystemState, classify};
pub use reading::{
    CHANNEL_COUNT, READING_SIZE, RESULT_SIZE, Reading, SensorChannel, decode_result,
    encode_result,
};
pub use signal::{
    DEFAULT_TRANSITION_HISTORY, SignalFn, StateSignal, StateTransition, TransitionLog,
};
pub use stats::{VoterCounters, VoterStats};
pub use task::{StopToken, VOTER_THREAD_NAME, VoterTask};
pub use vote::{disagreement_bits, majority_vote, vote_masked};
pub use voter::{CycleOutcome, Voter};
