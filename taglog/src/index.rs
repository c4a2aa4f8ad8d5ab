//! The log's internal index pair.
//!
//! Records live in [`ForwardIndex`]: an insertion-ordered slab addressed by
//! dense `u32` ordinals, with a key lookup table on the side. Tag posting
//! lists live in [`InvertedIndex`] as roaring bitmaps over those ordinals.
//! The two structures are kept as exact duals of each other by the log; a
//! tag appears in a record's tag set iff the record's ordinal appears in
//! that tag's posting list.

use std::collections::{BTreeSet, HashMap};

use roaring::RoaringBitmap;

use crate::error::{Error, Result};
use crate::model::{Entry, LogKey, Tag};

/// Dense ordinal identifying one record; ordinals are assigned in
/// insertion order and never reused.
pub(crate) type RecordId = u32;

/// One stored record: key, immutable value, and current tag set.
#[derive(Debug)]
pub(crate) struct Record<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) tags: BTreeSet<Tag>,
}

/// Insertion-ordered record storage plus key lookup.
#[derive(Debug)]
pub(crate) struct ForwardIndex<K, V> {
    records: Vec<Record<K, V>>,
    ids: HashMap<K, RecordId>,
    /// Greatest key ever stored, generated or bulk-loaded. The allocator
    /// derives the next key from this, which keeps generated keys unique
    /// across both insertion paths.
    max_key: Option<K>,
}

impl<K: LogKey, V> ForwardIndex<K, V> {
    pub(crate) fn new() -> Self {
        Self {
            records: Vec::new(),
            ids: HashMap::new(),
            max_key: None,
        }
    }

    /// Appends a record under a key the caller guarantees to be fresh.
    pub(crate) fn append(&mut self, key: K, value: V, tags: BTreeSet<Tag>) -> RecordId {
        debug_assert!(!self.ids.contains_key(&key), "allocator produced a stale key");
        let id = self.records.len() as RecordId;
        self.note_key(&key);
        self.ids.insert(key.clone(), id);
        self.records.push(Record { key, value, tags });
        id
    }

    /// Appends a record under an externally supplied key.
    pub(crate) fn try_append(&mut self, key: K, value: V, tags: BTreeSet<Tag>) -> Result<RecordId> {
        if self.ids.contains_key(&key) {
            return Err(Error::DuplicateKey(format!("{:?}", key)));
        }
        Ok(self.append(key, value, tags))
    }

    fn note_key(&mut self, key: &K) {
        if self.max_key.as_ref().map_or(true, |max| key > max) {
            self.max_key = Some(key.clone());
        }
    }

    pub(crate) fn id_of(&self, key: &K) -> Option<RecordId> {
        self.ids.get(key).copied()
    }

    pub(crate) fn record(&self, id: RecordId) -> &Record<K, V> {
        &self.records[id as usize]
    }

    pub(crate) fn record_mut(&mut self, id: RecordId) -> &mut Record<K, V> {
        &mut self.records[id as usize]
    }

    pub(crate) fn entry(&self, id: RecordId) -> Entry<K, V>
    where
        V: Clone,
    {
        let record = self.record(id);
        Entry {
            key: record.key.clone(),
            tags: record.tags.clone(),
            value: record.value.clone(),
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn last_id(&self) -> Option<RecordId> {
        self.records.len().checked_sub(1).map(|id| id as RecordId)
    }

    pub(crate) fn max_key(&self) -> Option<&K> {
        self.max_key.as_ref()
    }
}

/// Maps each tag to the posting list of record ordinals carrying it.
#[derive(Debug, Default)]
pub(crate) struct InvertedIndex {
    postings: HashMap<Tag, RoaringBitmap>,
}

impl InvertedIndex {
    pub(crate) fn add(&mut self, tag: Tag, id: RecordId) {
        self.postings.entry(tag).or_default().insert(id);
    }

    /// Removes an ordinal from a tag's posting list, dropping the bucket
    /// when it becomes empty so the index never maps a tag to an empty set.
    pub(crate) fn remove(&mut self, tag: &Tag, id: RecordId) {
        if let Some(bitmap) = self.postings.get_mut(tag) {
            bitmap.remove(id);
            if bitmap.is_empty() {
                self.postings.remove(tag);
            }
        }
    }

    pub(crate) fn get(&self, tag: &Tag) -> Option<&RoaringBitmap> {
        self.postings.get(tag)
    }

    /// Intersects posting lists for the given tags.
    /// Returns ordinals that carry ALL tags.
    pub(crate) fn intersect(&self, tags: &[Tag]) -> RoaringBitmap {
        if tags.is_empty() {
            return RoaringBitmap::new();
        }

        let mut bitmaps: Vec<&RoaringBitmap> = Vec::new();

        for tag in tags {
            match self.postings.get(tag) {
                Some(bitmap) => bitmaps.push(bitmap),
                None => {
                    return RoaringBitmap::new();
                }
            }
        }

        bitmaps.sort_by_key(|b| b.len());

        let mut result = bitmaps[0].clone();
        for bitmap in &bitmaps[1..] {
            result &= *bitmap;
        }

        result
    }

    /// Unions posting lists for the given tags.
    /// Returns ordinals that carry ANY of the tags.
    pub(crate) fn union(&self, tags: &[Tag]) -> RoaringBitmap {
        let mut result = RoaringBitmap::new();

        for tag in tags {
            if let Some(bitmap) = self.postings.get(tag) {
                result |= bitmap;
            }
        }

        result
    }

    /// All tags currently carried by at least one record, sorted.
    pub(crate) fn tags(&self) -> Vec<Tag> {
        let mut tags: Vec<Tag> = self.postings.keys().cloned().collect();
        tags.sort();
        tags
    }

    pub(crate) fn len(&self) -> usize {
        self.postings.len()
    }
}
