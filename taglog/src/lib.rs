//! taglog - an in-memory, append-oriented log store with tag indexing.
//!
//! taglog stores opaque values under unique, strictly increasing timestamp
//! keys and lets callers attach string tags to records after the fact.
//! Values are immutable once written; tag sets are the only mutable state.
//! Records are retrievable by key, by tag, and in insertion order.
//!
//! # Architecture
//!
//! The store keeps records in an insertion-ordered list addressed by dense
//! ordinals and maintains two tag indices over it: a forward index (each
//! record's tag set) and an inverted index (each tag's posting list, a
//! roaring bitmap of ordinals). Both indices mutate together under a
//! single lock, which keeps them exact duals of each other at all times.
//!
//! # Key Concepts
//!
//! - **Log**: the aggregate owning all storage and index consistency.
//! - **Entry**: a read-side snapshot of one record (key, value, current
//!   tags), rebuilt from the live indices on every read.
//! - **Keys**: `Timestamp` microseconds by default, made collision-free by
//!   a monotonic tiebreak; any ordered hashable type via [`KeyAllocator`].
//! - **Iteration**: insertion order, lazily, over a count snapshotted at
//!   iterator creation, so traversals survive concurrent appends.
//!
//! # Example
//!
//! ```
//! use taglog::Log;
//!
//! let log = Log::new();
//! log.insert("reindex started".to_string());
//! log.insert_tagged("shard 3 lagging".to_string(), ["shard-3", "slow"]);
//! log.insert_tagged("shard 3 caught up".to_string(), ["shard-3"]);
//!
//! let shard = log.entries_for_tag("shard-3");
//! assert_eq!(shard.len(), 2);
//!
//! for entry in &log {
//!     println!("{}", entry);
//! }
//! ```

mod clock;
mod error;
mod index;
mod iter;
mod log;
mod model;
mod sequence;

pub use clock::{Clock, MockClock, SystemClock};
pub use error::{Error, Result};
pub use iter::Iter;
pub use log::Log;
pub use model::{Entry, LogKey, Tag, Timestamp};
pub use sequence::{KeyAllocator, TimestampAllocator};
