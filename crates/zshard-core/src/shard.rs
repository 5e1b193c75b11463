//! The shard table: a fixed array of partitions, each mapping
//! fingerprints to per-key collections behind its own lock.
//!
//! A shard lock protects only the *existence* of entries in its
//! partition. The table hands out `Arc` handles to collections and never
//! exposes its maps or guards, so every caller has released the shard
//! lock by the time it can touch a collection's lock.

use std::sync::Arc;

use ahash::AHashMap;
use parking_lot::RwLock;
use tracing::trace;

use crate::collection::SortedCollection;
use crate::router::{Fingerprint, Route};
use crate::types::Member;

type Partition<M> = AHashMap<Fingerprint, Arc<SortedCollection<M>>>;

/// One partition of the key space. `None` until first written when
/// partitions are allocated lazily.
#[derive(Debug)]
struct Shard<M> {
    entries: RwLock<Option<Partition<M>>>,
}

#[derive(Debug)]
pub struct ShardTable<M> {
    shards: Box<[Shard<M>]>,
}

impl<M: Member> ShardTable<M> {
    /// Builds `shard_count` partitions. With `lazy` set, each partition's
    /// map is allocated on its first insert instead of up front.
    ///
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize, lazy: bool) -> Self {
        assert!(shard_count > 0, "shard count must be at least 1");
        let shards = (0..shard_count)
            .map(|_| Shard {
                entries: RwLock::new(if lazy { None } else { Some(Partition::default()) }),
            })
            .collect();
        Self { shards }
    }

    pub fn shard_count(&self) -> usize {
        self.shards.len()
    }

    /// Returns the collection for `route` if one exists.
    ///
    /// An unallocated partition reads the same as an empty one.
    pub fn locate(&self, route: Route) -> Option<Arc<SortedCollection<M>>> {
        let entries = self.shards[route.shard].entries.read();
        let partition = (*entries).as_ref()?;
        partition.get(&route.fingerprint).cloned()
    }

    /// Returns the collection for `route`, creating an empty one if
    /// absent.
    ///
    /// The fast path only takes the shared lock. On a miss the exclusive
    /// lock is taken and the entry re-checked, so concurrent first
    /// writers for the same fingerprint all end up with the same
    /// collection.
    pub fn locate_or_create(&self, route: Route) -> Arc<SortedCollection<M>> {
        if let Some(existing) = self.locate(route) {
            return existing;
        }

        let mut entries = self.shards[route.shard].entries.write();
        let partition = entries.get_or_insert_with(|| {
            trace!(shard = route.shard, "allocating partition");
            Partition::default()
        });
        Arc::clone(partition.entry(route.fingerprint).or_insert_with(|| {
            trace!(
                shard = route.shard,
                fingerprint = %route.fingerprint,
                "creating sorted collection"
            );
            Arc::new(SortedCollection::new())
        }))
    }

    /// Number of keys with a collection. Each partition is counted under
    /// its own shared lock, so the total is not a global snapshot.
    pub fn key_count(&self) -> usize {
        self.shards
            .iter()
            .map(|shard| (*shard.entries.read()).as_ref().map_or(0, |p| p.len()))
            .sum()
    }

    /// Number of partitions whose map has been allocated.
    pub fn allocated_partitions(&self) -> usize {
        self.shards
            .iter()
            .filter(|shard| shard.entries.read().is_some())
            .count()
    }
}
