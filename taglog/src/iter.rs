//! Insertion-order iteration over log entries.

use std::iter::FusedIterator;

use crate::index::RecordId;
use crate::log::Log;
use crate::model::{Entry, LogKey};
use crate::sequence::{KeyAllocator, TimestampAllocator};

/// An iterator over a log's entries in insertion order.
///
/// Created by [`Log::iter`]. The traversal is bound to a snapshot of the
/// record count taken at creation: records inserted afterwards are not
/// yielded, which makes the iterator safe against concurrent appends.
/// Values are frozen, but each step reads the live index, so an entry's
/// tag set is current at the moment it is produced.
///
/// No lock is held between steps; the iterator briefly takes the log's
/// read lock once per entry.
pub struct Iter<'a, K, V, A = TimestampAllocator> {
    log: &'a Log<K, V, A>,
    next: RecordId,
    end: RecordId,
}

impl<'a, K, V, A> Iter<'a, K, V, A> {
    pub(crate) fn new(log: &'a Log<K, V, A>, end: RecordId) -> Self {
        Self { log, next: 0, end }
    }
}

impl<K: LogKey, V: Clone, A: KeyAllocator<K>> Iterator for Iter<'_, K, V, A> {
    type Item = Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        // Ordinals below the snapshot bound stay valid: records are never
        // removed from the log.
        let entry = self.log.read_entry(self.next);
        self.next += 1;
        Some(entry)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.end - self.next) as usize;
        (remaining, Some(remaining))
    }
}

impl<K: LogKey, V: Clone, A: KeyAllocator<K>> ExactSizeIterator for Iter<'_, K, V, A> {}

impl<K: LogKey, V: Clone, A: KeyAllocator<K>> FusedIterator for Iter<'_, K, V, A> {}
