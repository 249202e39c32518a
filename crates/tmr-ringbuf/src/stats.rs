//! Traffic counters for a ring buffer.
//!
//! Counters are plain atomics updated with `Ordering::Relaxed`. They are
//! eventually consistent with each other and only meant for diagnostics and
//! leak checks (`received == returned` once all items are dropped).

use core::sync::atomic::{AtomicU64, Ordering};
use serde::{Deserialize, Serialize};

/// Snapshot of ring buffer traffic returned by [`RingBuffer::stats`](crate::RingBuffer::stats).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RingBufferStats {
    /// Items accepted by `send`/`try_send`.
    pub sent: u64,
    /// Items handed out by `receive`/`try_receive`.
    pub received: u64,
    /// Items whose storage was returned to the buffer.
    pub returned: u64,
    /// Blocking sends that gave up after their timeout.
    pub send_timeouts: u64,
    /// Sends rejected outright (too large, or full on `try_send`).
    pub rejected: u64,
}

impl RingBufferStats {
    /// Items received but not yet returned at snapshot time.
    #[must_use]
    pub fn in_flight(&self) -> u64 {
        self.received.saturating_sub(self.returned)
    }
}

#[derive(Debug, Default)]
pub(crate) struct RingCounters {
    sent: AtomicU64,
    received: AtomicU64,
    returned: AtomicU64,
    send_timeouts: AtomicU64,
    rejected: AtomicU64,
}

impl RingCounters {
    #[inline]
    pub(crate) fn inc_sent(&self) {
        self.sent.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_received(&self) {
        self.received.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_returned(&self) {
        self.returned.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_send_timeout(&self) {
        self.send_timeouts.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub(crate) fn inc_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> RingBufferStats {
        RingBufferStats {
            sent: self.sent.load(Ordering::Relaxed),
            received: self.received.load(Ordering::Relaxed),
            returned: self.returned.load(Ordering::Relaxed),
            send_timeouts: self.send_timeouts.load(Ordering::Relaxed),
            rejected: self.rejected.load(Ordering::Relaxed),
        }
    }
}
