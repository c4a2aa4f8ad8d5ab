//! Core data types for taglog.
//!
//! This module defines the fundamental data structures used in the public
//! API: tags for labeling records, timestamp keys for identifying them, and
//! entries as the read-side view of a stored record.

use std::collections::BTreeSet;
use std::fmt;
use std::hash::Hash;
use std::time::{SystemTime, UNIX_EPOCH};

/// Bounds required of a log key type.
///
/// A key must be cheap to copy around, usable in hash and ordered lookups,
/// and printable in diagnostics. Any type satisfying the component traits
/// implements `LogKey` automatically; [`Timestamp`] is the key type the
/// default log configuration ships with.
pub trait LogKey: Clone + Eq + Hash + Ord + fmt::Debug {}

impl<T: Clone + Eq + Hash + Ord + fmt::Debug> LogKey for T {}

/// A string label attachable to any number of log records.
///
/// Tags have value semantics: two tags are equal iff their underlying
/// strings are equal, and they hash consistently with that equality. No
/// case or whitespace normalization is performed.
///
/// # Example
///
/// ```
/// use taglog::Tag;
///
/// let tag = Tag::new("deploy");
/// assert_eq!(tag, Tag::from("deploy"));
/// assert_eq!(tag.as_str(), "deploy");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Tag(String);

impl Tag {
    /// Creates a new tag with the given text.
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    /// Returns the tag's text.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Tag {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for Tag {
    fn from(text: String) -> Self {
        Self(text)
    }
}

impl AsRef<str> for Tag {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Tag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A log key measured in microseconds since the Unix epoch.
///
/// Timestamps are totally ordered, hashable, and unique within a log:
/// the allocator never hands out the same microsecond twice, even when
/// the wall clock stalls or regresses (see
/// [`TimestampAllocator`](crate::TimestampAllocator)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Timestamp(i64);

impl Timestamp {
    /// Creates a timestamp from microseconds since the Unix epoch.
    pub fn from_micros(micros: i64) -> Self {
        Self(micros)
    }

    /// Returns the timestamp as microseconds since the Unix epoch.
    pub fn as_micros(self) -> i64 {
        self.0
    }

    /// Converts a [`SystemTime`] to a timestamp.
    ///
    /// Times before the Unix epoch clamp to zero; key uniqueness does not
    /// depend on the clock value (the allocator tiebreaks).
    pub fn from_system_time(time: SystemTime) -> Self {
        let micros = time
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_micros() as i64)
            .unwrap_or(0);
        Self(micros)
    }

    /// The smallest timestamp strictly greater than this one.
    pub(crate) fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A flattened, read-only view of one stored record.
///
/// An entry combines a record's key, its value, and the tag set it carried
/// at the moment the entry was produced. Entries are snapshots, never the
/// source of truth: the log reconstructs them from its live indices on
/// every read, so two entries for the same key read at different times may
/// show different tag sets. Re-query the log for current tag state rather
/// than holding an entry.
///
/// # Example
///
/// ```
/// use taglog::{Log, Tag};
///
/// let log = Log::new();
/// let key = log.insert_tagged("cache warmed".to_string(), ["startup"]);
///
/// let entry = log.get(&key).unwrap();
/// assert_eq!(entry.key, key);
/// assert_eq!(entry.value, "cache warmed");
/// assert!(entry.tags.contains(&Tag::new("startup")));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K, V> {
    /// The key identifying the record.
    pub key: K,
    /// The record's tag set at the time this entry was produced.
    pub tags: BTreeSet<Tag>,
    /// The record's value, immutable for the lifetime of the log.
    pub value: V,
}

impl<K: fmt::Display, V: fmt::Display> fmt::Display for Entry<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tags.is_empty() {
            write!(f, "{}: {}", self.key, self.value)
        } else {
            let tags: Vec<&str> = self.tags.iter().map(Tag::as_str).collect();
            write!(
                f,
                "{}\nTags: {}\nEntry:\n{}",
                self.key,
                tags.join(", "),
                self.value
            )
        }
    }
}
