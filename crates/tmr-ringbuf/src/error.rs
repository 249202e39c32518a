//! Error types for ring buffer operations.

use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when sending into a [`RingBuffer`](crate::RingBuffer).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RingBufferError {
    /// The buffer was created with a capacity that cannot hold any item.
    #[error("Invalid capacity: {0} bytes")]
    InvalidCapacity(usize),

    /// The item can never fit, even into an empty buffer.
    #[error("Item of {len} bytes needs {footprint} bytes, capacity is {capacity} bytes")]
    ItemTooLarge {
        /// Payload length in bytes.
        len: usize,
        /// Bytes the item would occupy including header and padding.
        footprint: usize,
        /// Total buffer capacity in bytes.
        capacity: usize,
    },

    /// Not enough free space for a non-blocking send.
    #[error("Ring buffer full")]
    Full,

    /// Space did not become available within the wait period.
    #[error("Timed out after {0:?} waiting for free space")]
    Timeout(Duration),
}

impl RingBufferError {
    /// Create an item too large error.
    #[must_use]
    pub fn item_too_large(len: usize, footprint: usize, capacity: usize) -> Self {
        Self::ItemTooLarge {
            len,
            footprint,
            capacity,
        }
    }

    /// Create a timeout error.
    #[must_use]
    pub fn timeout(waited: Duration) -> Self {
        Self::Timeout(waited)
    }

    /// Returns true if retrying later could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Full | Self::Timeout(_))
    }
}

/// A specialized `Result` type for ring buffer operations.
pub type RingBufferResult<T> = std::result::Result<T, RingBufferError>;
