//! Prelude for tmr-voter.
//!
//! ```rust
//! use tmr_voter::prelude::*;
//!
//! let config = VoterConfig::default();
//! assert_eq!(config.window_len, DEFAULT_WINDOW_LEN);
//! ```

pub use crate::channel::{InboundChannel, OutboundChannel};
pub use crate::config::{DEFAULT_WINDOW_LEN, VoterConfig, VoterConfigBuilder};
pub use crate::error::{VoterError, VoterResult};
pub use crate::health::{SystemState, classify};
pub use crate::reading::{READING_SIZE, RESULT_SIZE, Reading, SensorChannel};
pub use crate::signal::{SignalFn, StateSignal, StateTransition, TransitionLog};
pub use crate::stats::VoterStats;
pub use crate::task::{StopToken, VoterTask};
pub use crate::vote::majority_vote;
pub use crate::voter::{CycleOutcome, Voter};
