//! # tmr-ringbuf
//!
//! Bounded byte ring buffer used as the message substrate between sensor
//! sampling, the TMR voter and downstream monitors.
//!
//! ## Model
//!
//! - Items are variable-length byte records delivered in FIFO order.
//! - Capacity is counted in bytes; each item is charged an 8-byte header plus
//!   its payload padded to 4 bytes (see [`item_footprint`]).
//! - `send` and `receive` block with a bounded timeout; `try_*` variants never
//!   block.
//! - A received [`RingItem`] is a scope-bound view: its space is returned to the
//!   buffer when it is dropped, on every exit path of the consumer.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use tmr_ringbuf::prelude::*;
//!
//! let ring = RingBuffer::for_items(8, 6)?;
//! ring.send(&[1, 0, 2, 0, 3, 0], Duration::from_millis(100))?;
//!
//! if let Some(item) = ring.receive(Duration::from_millis(100)) {
//!     assert_eq!(item.len(), 6);
//! }
//! assert_eq!(ring.stats().returned, 1);
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

pub mod error;
pub mod ring;
pub mod stats;

pub mod prelude;

pub use error::{RingBufferError, RingBufferResult};
pub use ring::{ITEM_ALIGNMENT, ITEM_HEADER_SIZE, RingBuffer, RingItem, item_footprint};
pub use stats::RingBufferStats;
