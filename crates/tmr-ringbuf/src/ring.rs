//! Bounded byte ring buffer.
//!
//! Items are variable-length byte records kept in FIFO order. Capacity is
//! accounted in bytes: every item occupies [`item_footprint`] bytes from the
//! moment it is sent until the consumer drops the [`RingItem`] it received.
//! A received item therefore still holds its space while the consumer works on
//! it, and producers blocked on a full buffer wake up when it is dropped.

use std::collections::VecDeque;
use std::fmt;
use std::ops::Deref;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};

use crate::error::{RingBufferError, RingBufferResult};
use crate::stats::{RingBufferStats, RingCounters};

/// Bytes of bookkeeping charged to every stored item.
pub const ITEM_HEADER_SIZE: usize = 8;

/// Payloads are padded to a multiple of this many bytes.
pub const ITEM_ALIGNMENT: usize = 4;

/// Bytes an item of `len` payload bytes occupies inside the buffer.
#[must_use]
pub const fn item_footprint(len: usize) -> usize {
    ITEM_HEADER_SIZE.saturating_add(len.div_ceil(ITEM_ALIGNMENT).saturating_mul(ITEM_ALIGNMENT))
}

#[derive(Debug, Default)]
struct RingState {
    items: VecDeque<Box<[u8]>>,
    used_bytes: usize,
    outstanding: usize,
}

impl RingState {
    fn free_bytes(&self, capacity: usize) -> usize {
        capacity.saturating_sub(self.used_bytes)
    }

    fn push(&mut self, payload: &[u8], footprint: usize) {
        self.items.push_back(payload.into());
        self.used_bytes = self.used_bytes.saturating_add(footprint);
    }

    fn pop(&mut self) -> Option<Box<[u8]>> {
        let data = self.items.pop_front()?;
        self.outstanding = self.outstanding.saturating_add(1);
        Some(data)
    }

    fn release(&mut self, footprint: usize) {
        self.used_bytes = self.used_bytes.saturating_sub(footprint);
        self.outstanding = self.outstanding.saturating_sub(1);
    }
}

/// Bounded, byte-capacity-limited FIFO of byte items.
///
/// Producers call [`send`](Self::send) (blocking with timeout) or
/// [`try_send`](Self::try_send). Consumers call [`receive`](Self::receive) or
/// [`try_receive`](Self::try_receive) and get a [`RingItem`] that returns its
/// storage to the buffer when dropped.
///
/// # Thread Safety
///
/// All methods take `&self`; share the buffer between threads with `Arc`.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use tmr_ringbuf::RingBuffer;
///
/// let ring = RingBuffer::new(64)?;
/// ring.send(&[1, 2, 3], Duration::from_millis(10))?;
///
/// {
///     let item = ring.receive(Duration::from_millis(10)).ok_or("empty")?;
///     assert_eq!(&*item, &[1, 2, 3]);
///     assert_eq!(ring.outstanding(), 1);
/// }
///
/// assert_eq!(ring.outstanding(), 0);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
pub struct RingBuffer {
    capacity: usize,
    state: Mutex<RingState>,
    readable: Condvar,
    writable: Condvar,
    counters: RingCounters,
}

impl RingBuffer {
    /// Create a ring buffer holding at most `capacity` bytes of item footprint.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::InvalidCapacity`] if the capacity cannot
    /// hold even an empty item.
    pub fn new(capacity: usize) -> RingBufferResult<Self> {
        if capacity < item_footprint(0) {
            return Err(RingBufferError::InvalidCapacity(capacity));
        }
        tracing::debug!(capacity, "Ring buffer created");
        Ok(Self {
            capacity,
            state: Mutex::new(RingState::default()),
            readable: Condvar::new(),
            writable: Condvar::new(),
            counters: RingCounters::default(),
        })
    }

    /// Create a ring buffer sized for `count` items of `item_len` bytes each.
    ///
    /// # Errors
    ///
    /// Returns [`RingBufferError::InvalidCapacity`] if `count` is zero.
    pub fn for_items(count: usize, item_len: usize) -> RingBufferResult<Self> {
        if count == 0 {
            return Err(RingBufferError::InvalidCapacity(0));
        }
        Self::new(item_footprint(item_len).saturating_mul(count))
    }

    /// Total capacity in bytes.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Bytes currently free for new items.
    #[must_use]
    pub fn free_bytes(&self) -> usize {
        self.state.lock().free_bytes(self.capacity)
    }

    /// Number of items waiting to be received.
    #[must_use]
    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    /// Returns true if no item is waiting to be received.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.state.lock().items.is_empty()
    }

    /// Number of received items whose storage has not been returned yet.
    #[must_use]
    pub fn outstanding(&self) -> usize {
        self.state.lock().outstanding
    }

    /// Traffic counters.
    #[must_use]
    pub fn stats(&self) -> RingBufferStats {
        self.counters.snapshot()
    }

    fn check_fits(&self, len: usize) -> RingBufferResult<usize> {
        let footprint = item_footprint(len);
        if footprint > self.capacity {
            self.counters.inc_rejected();
            return Err(RingBufferError::item_too_large(
                len,
                footprint,
                self.capacity,
            ));
        }
        Ok(footprint)
    }

    /// Copy `payload` into the buffer, waiting up to `timeout` for space.
    ///
    /// # Errors
    ///
    /// - [`RingBufferError::ItemTooLarge`] if the item can never fit.
    /// - [`RingBufferError::Timeout`] if space did not free up in time.
    pub fn send(&self, payload: &[u8], timeout: Duration) -> RingBufferResult<()> {
        let footprint = self.check_fits(payload.len())?;
        let deadline = Instant::now().checked_add(timeout);

        let mut state = self.state.lock();
        while state.free_bytes(self.capacity) < footprint {
            let remaining = remaining_until(deadline);
            if remaining.is_zero() {
                drop(state);
                self.counters.inc_send_timeout();
                return Err(RingBufferError::timeout(timeout));
            }
            self.writable.wait_for(&mut state, remaining);
        }
        state.push(payload, footprint);
        drop(state);

        self.counters.inc_sent();
        self.readable.notify_one();
        Ok(())
    }

    /// Copy `payload` into the buffer without waiting.
    ///
    /// # Errors
    ///
    /// - [`RingBufferError::ItemTooLarge`] if the item can never fit.
    /// - [`RingBufferError::Full`] if there is not enough free space now.
    pub fn try_send(&self, payload: &[u8]) -> RingBufferResult<()> {
        let footprint = self.check_fits(payload.len())?;

        let mut state = self.state.lock();
        if state.free_bytes(self.capacity) < footprint {
            drop(state);
            self.counters.inc_rejected();
            return Err(RingBufferError::Full);
        }
        state.push(payload, footprint);
        drop(state);

        self.counters.inc_sent();
        self.readable.notify_one();
        Ok(())
    }

    /// Take the oldest item, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` if nothing arrived in time.
    #[must_use]
    pub fn receive(&self, timeout: Duration) -> Option<RingItem<'_>> {
        let deadline = Instant::now().checked_add(timeout);

        let mut state = self.state.lock();
        loop {
            if let Some(data) = state.pop() {
                drop(state);
                self.counters.inc_received();
                return Some(RingItem { ring: self, data });
            }
            let remaining = remaining_until(deadline);
            if remaining.is_zero() {
                return None;
            }
            self.readable.wait_for(&mut state, remaining);
        }
    }

    /// Take the oldest item if one is waiting.
    #[must_use]
    pub fn try_receive(&self) -> Option<RingItem<'_>> {
        let data = self.state.lock().pop()?;
        self.counters.inc_received();
        Some(RingItem { ring: self, data })
    }

    fn return_item(&self, len: usize) {
        self.state.lock().release(item_footprint(len));
        self.counters.inc_returned();
        self.writable.notify_all();
    }
}

fn remaining_until(deadline: Option<Instant>) -> Duration {
    deadline.map_or(Duration::MAX, |at| {
        at.saturating_duration_since(Instant::now())
    })
}

impl fmt::Debug for RingBuffer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RingBuffer")
            .field("capacity", &self.capacity)
            .field("used_bytes", &state.used_bytes)
            .field("waiting", &state.items.len())
            .field("outstanding", &state.outstanding)
            .finish()
    }
}

/// An item checked out of a [`RingBuffer`].
///
/// Dereferences to the payload bytes. The item's space stays reserved in the
/// buffer until this value is dropped, whichever path the consumer takes.
pub struct RingItem<'a> {
    ring: &'a RingBuffer,
    data: Box<[u8]>,
}

impl RingItem<'_> {
    /// Payload bytes.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }
}

impl Deref for RingItem<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        &self.data
    }
}

impl AsRef<[u8]> for RingItem<'_> {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl Drop for RingItem<'_> {
    fn drop(&mut self) {
        self.ring.return_item(self.data.len());
    }
}

impl fmt::Debug for RingItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingItem")
            .field("len", &self.data.len())
            .finish_non_exhaustive()
    }
}
