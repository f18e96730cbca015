//! Per-channel sample history: fixed-capacity ring with overflow tracking
//!
//! The buffer keeps the most recent `capacity` samples. Once full, a new
//! push discards the single oldest unread entry (overwrite-oldest) and
//! latches the overflow flag until the next drain. The pull transport
//! drains everything in one destructive read; there is no peek.

use heapless::Vec;

use crate::domain::config::MAX_BUFFER;
use crate::domain::sample::Sample;

/// Samples drained in one pull, in FIFO order
pub type Drained = Vec<Sample, MAX_BUFFER>;

/// Fixed-capacity FIFO of timestamped samples.
///
/// Backing storage is always `MAX_BUFFER` slots; the effective capacity is
/// set per configuration and bounded by it. Invariant: `count <= capacity`
/// for every sequence of pushes.
pub struct SampleBuffer {
    slots: [Sample; MAX_BUFFER],
    capacity: u16,
    /// Next write index
    head: u16,
    /// Oldest unread index
    tail: u16,
    /// Unread samples
    count: u16,
    /// At least one push landed while full, since the last drain
    overflow: bool,
}

impl SampleBuffer {
    /// Create a buffer with the given capacity.
    ///
    /// Caller validates `1 <= capacity <= MAX_BUFFER`; out-of-range values
    /// are clamped rather than trusted.
    pub fn new(capacity: u16) -> Self {
        Self {
            slots: [Sample::ZERO; MAX_BUFFER],
            capacity: capacity.clamp(1, MAX_BUFFER as u16),
            head: 0,
            tail: 0,
            count: 0,
            overflow: false,
        }
    }

    /// Discard all state and adopt a new capacity (reconfigure / boot path)
    pub fn reset(&mut self, capacity: u16) {
        self.capacity = capacity.clamp(1, MAX_BUFFER as u16);
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.overflow = false;
    }

    /// Append a sample, overwriting the oldest unread entry when full
    pub fn push(&mut self, sample: Sample) {
        if self.count < self.capacity {
            self.count += 1;
        } else {
            // Full: drop the oldest, remember that we did
            self.overflow = true;
            self.tail = (self.tail + 1) % self.capacity;
        }
        self.slots[self.head as usize] = sample;
        self.head = (self.head + 1) % self.capacity;
    }

    /// Destructive read of everything unread, in push order.
    ///
    /// Returns the samples plus whether any push overwrote an unread entry
    /// since the previous drain. Afterwards the buffer is empty and the
    /// overflow flag is clear.
    pub fn drain_all(&mut self) -> (Drained, bool) {
        let mut out = Drained::new();
        for i in 0..self.count {
            let idx = (self.tail + i) % self.capacity;
            // count <= capacity <= MAX_BUFFER, push cannot fail
            let _ = out.push(self.slots[idx as usize]);
        }
        let overflowed = self.overflow;
        self.tail = self.head;
        self.count = 0;
        self.overflow = false;
        (out, overflowed)
    }

    /// Unread samples currently held
    pub fn len(&self) -> u16 {
        self.count
    }

    /// True when nothing is unread
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Effective capacity in samples
    pub fn capacity(&self) -> u16 {
        self.capacity
    }

    /// Overflow latched since the last drain (diagnostics)
    pub fn has_overflowed(&self) -> bool {
        self.overflow
    }
}
