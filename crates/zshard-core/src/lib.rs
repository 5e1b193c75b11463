//! zshard-core: the sorted-set storage engine.
//!
//! Every key maps to a sorted collection of `(member, score)` pairs that
//! can be queried by score range. Keys are spread across a fixed number
//! of shards by fingerprint so that unrelated keys rarely contend on the
//! same lock.
//!
//! Locking is two-level: a shard lock guards only the existence of the
//! per-key entries in its partition, and each per-key collection carries
//! its own reader/writer lock for the data. A shard lock is always
//! released before a collection lock is taken, and no operation ever
//! holds two collection locks at once.

pub mod collection;
pub mod entities;
pub mod error;
pub mod router;
pub mod shard;
pub mod store;
pub mod types;

pub use collection::SortedCollection;
pub use entities::{ScoredMember, ZGetRequest, ZGetResponse, ZSetRequest, ZSetResponse};
pub use error::StoreError;
pub use router::{Fingerprint, HashAlgorithm, KeyRouter, Route};
pub use store::{SortedSetStore, Store, StoreConfig, DEFAULT_SHARD_COUNT};
pub use types::range::{ScoreBound, ScoreRange};
pub use types::sorted_set::{AddResult, SortedSet};
pub use types::Member;

/// A store whose members are binary-safe byte strings.
pub type BytesStore = Store<bytes::Bytes>;
