//! Core Log implementation with insert, lookup, and tagging APIs.
//!
//! This module provides the [`Log`] struct, the primary entry point of the
//! crate. A `Log` owns all storage: the insertion-ordered record list, the
//! key lookup table, and the tag posting lists, and it keeps the forward
//! and inverted tag indices consistent under every mutation.

use std::collections::BTreeSet;
use std::fmt;
use std::iter;

use parking_lot::RwLock;

use crate::error::Result;
use crate::index::{ForwardIndex, InvertedIndex, RecordId};
use crate::iter::Iter;
use crate::model::{Entry, LogKey, Tag, Timestamp};
use crate::sequence::{KeyAllocator, TimestampAllocator};

/// Inner state for both indices.
///
/// Wrapped in a single `RwLock` for simplicity: mutations take the write
/// lock and update both indices under one acquisition, which is what keeps
/// them exact duals of each other.
struct LogInner<K, V> {
    forward: ForwardIndex<K, V>,
    inverted: InvertedIndex,
}

/// An in-memory, append-oriented log with a mutable tag index.
///
/// Every insert stores an immutable value under a fresh, strictly
/// increasing key and returns the key. Tags can be attached to (and
/// detached from) records after insertion; values cannot change. Records
/// are retrievable by key, by tag, and in insertion order, and they live
/// for the lifetime of the log: there is no delete operation.
///
/// # Thread Safety
///
/// `Log` is designed to be shared across threads. All methods take `&self`;
/// internal synchronization is a single reader-writer lock, so writers
/// serialize and readers see a consistent view of both indices.
///
/// # Equality
///
/// Logs compare by identity, not content: the aggregate intentionally
/// implements no `PartialEq`. Wrap a log in `Arc` and use `Arc::ptr_eq`
/// when identity comparisons are needed. [`Entry`] and [`Tag`] values
/// compare by content.
///
/// # Example
///
/// ```
/// use taglog::{Log, Tag};
///
/// let log = Log::new();
/// log.insert("boot sequence started".to_string());
/// let key = log.insert_tagged("cache warmed".to_string(), ["startup", "cache"]);
///
/// assert_eq!(log.count(), 2);
/// assert_eq!(log.get(&key).unwrap().value, "cache warmed");
/// assert_eq!(log.entries_for_tag("startup").len(), 1);
///
/// log.tag_last(["ready"]);
/// assert!(log.tags_for(&key).contains(&Tag::new("ready")));
/// ```
pub struct Log<K, V, A = TimestampAllocator> {
    allocator: A,
    inner: RwLock<LogInner<K, V>>,
}

impl<V> Log<Timestamp, V> {
    /// Creates an empty log with [`Timestamp`] keys drawn from the system
    /// clock.
    pub fn new() -> Self {
        Self::with_allocator(TimestampAllocator::new())
    }

    /// Creates a log pre-populated from explicit key/value pairs.
    ///
    /// Bulk loading bypasses key generation: the given keys are stored as
    /// is, untagged, and insertion order follows the order of the pairs.
    /// Keys generated by later [`insert`](Log::insert) calls are always
    /// greater than every loaded key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::DuplicateKey`](crate::Error::DuplicateKey) if the
    /// same key appears twice.
    pub fn try_from_pairs<I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Timestamp, V)>,
    {
        Self::try_from_pairs_with(TimestampAllocator::new(), pairs)
    }
}

impl<V> Default for Log<Timestamp, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: LogKey, V, A: KeyAllocator<K>> Log<K, V, A> {
    /// Creates an empty log with a custom key allocation strategy.
    pub fn with_allocator(allocator: A) -> Self {
        Self {
            allocator,
            inner: RwLock::new(LogInner {
                forward: ForwardIndex::new(),
                inverted: InvertedIndex::default(),
            }),
        }
    }

    /// Creates a pre-populated log with a custom key allocation strategy.
    ///
    /// See [`try_from_pairs`](Log::try_from_pairs).
    pub fn try_from_pairs_with<I>(allocator: A, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let log = Self::with_allocator(allocator);
        {
            let mut inner = log.inner.write();
            for (key, value) in pairs {
                inner.forward.try_append(key, value, BTreeSet::new())?;
            }
        }
        Ok(log)
    }

    /// Inserts an untagged value and returns its freshly generated key.
    ///
    /// Always succeeds. The key is strictly greater than every key already
    /// in the log.
    pub fn insert(&self, value: V) -> K {
        self.insert_tagged(value, iter::empty::<Tag>())
    }

    /// Inserts a value with an initial tag set and returns its key.
    ///
    /// The stored tag set is the deduplicated union of `tags`; the inverse
    /// index gains the new key under each of them. The value is immutable
    /// from here on, only the tag set may change.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn insert_tagged<I>(&self, value: V, tags: I) -> K
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let tags: BTreeSet<Tag> = tags.into_iter().map(Into::into).collect();

        let mut inner = self.inner.write();
        let LogInner { forward, inverted } = &mut *inner;

        let key = self.allocator.next_key(forward.max_key());
        let id = forward.append(key.clone(), value, tags.clone());
        for tag in tags {
            inverted.add(tag, id);
        }
        key
    }

    /// Returns the entry stored under `key`, or `None` for an unknown key.
    ///
    /// The entry is a snapshot; its tag set reflects the index state at
    /// the time of this call.
    pub fn get(&self, key: &K) -> Option<Entry<K, V>>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        let id = inner.forward.id_of(key)?;
        Some(inner.forward.entry(id))
    }

    /// Looks up several keys at once, positionally.
    ///
    /// The result has one element per input key; unknown keys yield `None`
    /// in place.
    pub fn values(&self, keys: &[K]) -> Vec<Option<V>>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        keys.iter()
            .map(|key| {
                inner
                    .forward
                    .id_of(key)
                    .map(|id| inner.forward.record(id).value.clone())
            })
            .collect()
    }

    /// Looks up several keys at once, silently skipping unknown keys.
    pub fn present_values(&self, keys: &[K]) -> Vec<V>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        keys.iter()
            .filter_map(|key| {
                inner
                    .forward
                    .id_of(key)
                    .map(|id| inner.forward.record(id).value.clone())
            })
            .collect()
    }

    /// Returns every entry whose current tag set contains `tag`, in
    /// insertion order.
    ///
    /// The result reflects live tag state: tagging operations between two
    /// calls are visible in the second. Unknown tags yield an empty vector.
    pub fn entries_for_tag(&self, tag: impl Into<Tag>) -> Vec<Entry<K, V>>
    where
        V: Clone,
    {
        let tag = tag.into();
        let inner = self.inner.read();
        match inner.inverted.get(&tag) {
            Some(ids) => ids.iter().map(|id| inner.forward.entry(id)).collect(),
            None => Vec::new(),
        }
    }

    /// Returns entries carrying ALL of the given tags, in insertion order.
    ///
    /// An empty tag list yields an empty vector.
    pub fn entries_for_all<I>(&self, tags: I) -> Vec<Entry<K, V>>
    where
        V: Clone,
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let tags: Vec<Tag> = tags.into_iter().map(Into::into).collect();
        let inner = self.inner.read();
        inner
            .inverted
            .intersect(&tags)
            .iter()
            .map(|id| inner.forward.entry(id))
            .collect()
    }

    /// Returns entries carrying ANY of the given tags, in insertion order.
    pub fn entries_for_any<I>(&self, tags: I) -> Vec<Entry<K, V>>
    where
        V: Clone,
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let tags: Vec<Tag> = tags.into_iter().map(Into::into).collect();
        let inner = self.inner.read();
        inner
            .inverted
            .union(&tags)
            .iter()
            .map(|id| inner.forward.entry(id))
            .collect()
    }

    /// Returns the keys carrying `tag`, in insertion order.
    pub fn keys_for_tag(&self, tag: impl Into<Tag>) -> Vec<K> {
        let tag = tag.into();
        let inner = self.inner.read();
        match inner.inverted.get(&tag) {
            Some(ids) => ids
                .iter()
                .map(|id| inner.forward.record(id).key.clone())
                .collect(),
            None => Vec::new(),
        }
    }

    /// Unions `tags` into the tag set of `key`.
    ///
    /// Idempotent: tags already present are left alone. Both indices update
    /// together for each newly added tag. Addressing an unknown key is a
    /// no-op.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn add_tags<I>(&self, key: &K, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let mut inner = self.inner.write();
        let LogInner { forward, inverted } = &mut *inner;
        let Some(id) = forward.id_of(key) else {
            return;
        };
        Self::union_tags(forward, inverted, id, tags);
    }

    /// Unions `tags` into the tag set of the most recently inserted record.
    ///
    /// A no-op on an empty log.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn tag_last<I>(&self, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let mut inner = self.inner.write();
        let LogInner { forward, inverted } = &mut *inner;
        let Some(id) = forward.last_id() else {
            return;
        };
        Self::union_tags(forward, inverted, id, tags);
    }

    /// Adds one tag to each of the given keys; unknown keys are skipped.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn tag_many(&self, keys: &[K], tag: impl Into<Tag>) {
        let tag = tag.into();
        let mut inner = self.inner.write();
        let LogInner { forward, inverted } = &mut *inner;
        for key in keys {
            if let Some(id) = forward.id_of(key) {
                if forward.record_mut(id).tags.insert(tag.clone()) {
                    inverted.add(tag.clone(), id);
                }
            }
        }
    }

    /// Removes `tags` from the tag set of `key`.
    ///
    /// Tags the record does not carry are ignored. A tag whose last record
    /// is removed disappears from the inverse index entirely. Addressing an
    /// unknown key is a no-op.
    #[tracing::instrument(level = "trace", skip_all)]
    pub fn remove_tags<I>(&self, key: &K, tags: I)
    where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let mut inner = self.inner.write();
        let LogInner { forward, inverted } = &mut *inner;
        let Some(id) = forward.id_of(key) else {
            return;
        };
        let record = forward.record_mut(id);
        for tag in tags.into_iter().map(Into::into) {
            if record.tags.remove(&tag) {
                inverted.remove(&tag, id);
            }
        }
    }

    fn union_tags<I>(
        forward: &mut ForwardIndex<K, V>,
        inverted: &mut InvertedIndex,
        id: RecordId,
        tags: I,
    ) where
        I: IntoIterator,
        I::Item: Into<Tag>,
    {
        let record = forward.record_mut(id);
        for tag in tags.into_iter().map(Into::into) {
            if record.tags.insert(tag.clone()) {
                inverted.add(tag, id);
            }
        }
    }

    /// Returns the current tag set of `key`, empty for an unknown key.
    pub fn tags_for(&self, key: &K) -> BTreeSet<Tag> {
        let inner = self.inner.read();
        inner
            .forward
            .id_of(key)
            .map(|id| inner.forward.record(id).tags.clone())
            .unwrap_or_default()
    }

    /// Returns every tag currently carried by at least one record, sorted.
    pub fn tags(&self) -> Vec<Tag> {
        self.inner.read().inverted.tags()
    }

    /// Returns the number of inserted records.
    pub fn count(&self) -> usize {
        self.inner.read().forward.len()
    }

    /// Returns `true` if no records have been inserted.
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Returns the most recently inserted entry, or `None` on an empty log.
    pub fn last(&self) -> Option<Entry<K, V>>
    where
        V: Clone,
    {
        let inner = self.inner.read();
        let id = inner.forward.last_id()?;
        Some(inner.forward.entry(id))
    }

    /// Returns the key of the most recently inserted record.
    pub fn last_key(&self) -> Option<K> {
        let inner = self.inner.read();
        let id = inner.forward.last_id()?;
        Some(inner.forward.record(id).key.clone())
    }

    /// Returns an iterator over entries in insertion order.
    ///
    /// The record count is snapshotted here: records inserted while the
    /// iterator is live are not observed by it, so an in-progress traversal
    /// is never invalidated. Each step reads the live index, so tag sets
    /// are current at the moment the entry is produced. Call `iter` again
    /// for a fresh snapshot.
    pub fn iter(&self) -> Iter<'_, K, V, A> {
        let end = self.inner.read().forward.len() as RecordId;
        Iter::new(self, end)
    }

    pub(crate) fn read_entry(&self, id: RecordId) -> Entry<K, V>
    where
        V: Clone,
    {
        self.inner.read().forward.entry(id)
    }
}

impl<'a, K: LogKey, V: Clone, A: KeyAllocator<K>> IntoIterator for &'a Log<K, V, A> {
    type Item = Entry<K, V>;
    type IntoIter = Iter<'a, K, V, A>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: LogKey, V, A> fmt::Debug for Log<K, V, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.read();
        f.debug_struct("Log")
            .field("count", &inner.forward.len())
            .field("tags", &inner.inverted.len())
            .finish()
    }
}

impl<K, V, A> fmt::Display for Log<K, V, A>
where
    K: LogKey + fmt::Display,
    V: Clone + fmt::Display,
    A: KeyAllocator<K>,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}
