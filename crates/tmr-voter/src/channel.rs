//! Channel seams between the voter and its message substrate.
//!
//! The voter only needs a bounded-wait receive that hands out a scope-bound
//! view of the payload, and a bounded-wait send. Dropping a received item is
//! what returns it to its source.

use std::fmt;
use std::ops::Deref;
use std::sync::Arc;
use std::time::Duration;

use tmr_ringbuf::{RingBuffer, RingBufferError, RingItem};

/// Source of inbound reading records.
pub trait InboundChannel {
    /// Received payload. Releases its slot when dropped.
    type Item<'a>: Deref<Target = [u8]>
    where
        Self: 'a;

    /// Wait up to `timeout` for the next record.
    fn receive(&self, timeout: Duration) -> Option<Self::Item<'_>>;
}

/// Sink for outbound vote result records.
pub trait OutboundChannel {
    /// Failure reported when a record could not be queued.
    type Error: fmt::Display;

    /// Queue `payload`, waiting up to `timeout` for space.
    ///
    /// # Errors
    ///
    /// Returns an error if the record could not be queued in time.
    fn send(&self, payload: &[u8], timeout: Duration) -> Result<(), Self::Error>;
}

impl InboundChannel for RingBuffer {
    type Item<'a> = RingItem<'a>;

    fn receive(&self, timeout: Duration) -> Option<RingItem<'_>> {
        RingBuffer::receive(self, timeout)
    }
}

impl OutboundChannel for RingBuffer {
    type Error = RingBufferError;

    fn send(&self, payload: &[u8], timeout: Duration) -> Result<(), RingBufferError> {
        RingBuffer::send(self, payload, timeout)
    }
}

impl<T: InboundChannel + ?Sized> InboundChannel for Arc<T> {
    type Item<'a>
        = T::Item<'a>
    where
        Self: 'a;

    fn receive(&self, timeout: Duration) -> Option<Self::Item<'_>> {
        (**self).receive(timeout)
    }
}

impl<T: OutboundChannel + ?Sized> OutboundChannel for Arc<T> {
    type Error = T::Error;

    fn send(&self, payload: &[u8], timeout: Duration) -> Result<(), T::Error> {
        (**self).send(payload, timeout)
    }
}
