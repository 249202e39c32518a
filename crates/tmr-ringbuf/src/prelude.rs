//! Prelude for tmr-ringbuf.
//!
//! ```rust
//! use tmr_ringbuf::prelude::*;
//!
//! let ring = RingBuffer::new(64);
//! assert!(ring.is_ok());
//! ```

pub use crate::error::{RingBufferError, RingBufferResult};
pub use crate::ring::{RingBuffer, RingItem, item_footprint};
pub use crate::stats::RingBufferStats;
