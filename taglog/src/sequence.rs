//! Key allocation for insert operations.
//!
//! Every insert manufactures a fresh key. The [`KeyAllocator`] trait
//! abstracts how, and [`TimestampAllocator`] is the default strategy:
//! read the wall clock, and when the clock has not moved past the newest
//! existing key, advance one microsecond beyond it instead. Rapid
//! successive inserts therefore always produce strictly increasing keys,
//! even within a single clock tick.

use std::sync::Arc;

use crate::clock::{Clock, SystemClock};
use crate::model::Timestamp;

/// Strategy for generating fresh log keys.
///
/// Implementations must uphold the uniqueness contract: the returned key is
/// strictly greater than `last` whenever `last` is present. The log passes
/// the greatest key it currently holds, so a conforming allocator can never
/// collide with an existing record.
pub trait KeyAllocator<K>: Send + Sync {
    /// Returns the next key, strictly greater than `last` when given.
    fn next_key(&self, last: Option<&K>) -> K;
}

/// Allocates [`Timestamp`] keys from a clock, with a monotonic tiebreak.
pub struct TimestampAllocator {
    clock: Arc<dyn Clock>,
}

impl TimestampAllocator {
    /// Creates an allocator backed by the system clock.
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    /// Creates an allocator backed by the given clock.
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }
}

impl Default for TimestampAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyAllocator<Timestamp> for TimestampAllocator {
    fn next_key(&self, last: Option<&Timestamp>) -> Timestamp {
        let now = Timestamp::from_system_time(self.clock.now());
        match last {
            // Clock stalled or regressed: step past the newest key.
            Some(&prev) if now <= prev => prev.next(),
            _ => now,
        }
    }
}
