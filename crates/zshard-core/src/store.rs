//! The store: the public face of the sharded sorted-set engine.
//!
//! Every operation routes its key, asks the shard table for the key's
//! collection (which takes and releases the shard lock), then works on
//! the collection under the collection's own lock. Each operation
//! touches exactly one key, so at most one collection lock is held at a
//! time and the shard lock is never held while waiting on one.

use tracing::{debug, warn};

use crate::entities::{ScoredMember, ZGetRequest, ZGetResponse, ZSetRequest, ZSetResponse};
use crate::error::StoreError;
use crate::router::{HashAlgorithm, KeyRouter, Route};
use crate::shard::ShardTable;
use crate::types::range::ScoreRange;
use crate::types::{check_score, Member};

/// Default number of shards. More shards mean less lock contention and
/// more fixed memory per store.
pub const DEFAULT_SHARD_COUNT: usize = 2048;

/// Construction-time configuration. Nothing here can change once the
/// store is built.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Number of shards. Must be at least 1. Any positive count works;
    /// powers of two are conventional.
    pub shard_count: usize,
    /// How keys are fingerprinted.
    pub hash: HashAlgorithm,
    /// Allocate each shard's map on first insert rather than up front.
    pub lazy_partitions: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_count: DEFAULT_SHARD_COUNT,
            hash: HashAlgorithm::default(),
            lazy_partitions: true,
        }
    }
}

impl StoreConfig {
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.shard_count == 0 {
            return Err(StoreError::InvalidConfig(
                "shard count must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// The operation surface of a sorted-set store, in request/response form.
pub trait SortedSetStore<M> {
    /// Upserts one member and echoes it back.
    fn zset(&self, request: ZSetRequest<M>) -> ZSetResponse<M>;

    /// Reads an inclusive score range.
    fn zget(&self, request: ZGetRequest) -> ZGetResponse<M>;
}

/// A sharded, thread-safe map from keys to sorted collections.
///
/// Share it across threads behind an `Arc`. Separate stores share
/// nothing: each owns its shards and locks.
#[derive(Debug)]
pub struct Store<M> {
    router: KeyRouter,
    table: ShardTable<M>,
}

impl<M: Member> Store<M> {
    /// Creates a store with `shard_count` shards and default settings.
    ///
    /// Panics if `shard_count` is zero.
    pub fn new(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be at least 1");
        Self::build(StoreConfig {
            shard_count,
            ..StoreConfig::default()
        })
    }

    /// Creates a store from `config`, rejecting invalid settings.
    pub fn with_config(config: StoreConfig) -> Result<Self, StoreError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: StoreConfig) -> Self {
        if !config.shard_count.is_power_of_two() {
            warn!(
                shard_count = config.shard_count,
                "shard count is not a power of two"
            );
        }
        debug!(
            shard_count = config.shard_count,
            hash = %config.hash,
            lazy_partitions = config.lazy_partitions,
            "creating sorted-set store"
        );
        Self {
            router: KeyRouter::new(config.shard_count, config.hash),
            table: ShardTable::new(config.shard_count, config.lazy_partitions),
        }
    }

    /// Upserts `member` under `key` at `score` and echoes the member back.
    ///
    /// Creates the key's collection on first use. NaN scores are rejected
    /// before anything is created.
    pub fn set(&self, key: &str, member: M, score: f64) -> Result<M, StoreError> {
        check_score(score)?;
        let collection = self.table.locate_or_create(self.router.route(key));
        collection.upsert(member.clone(), score)?;
        Ok(member)
    }

    /// Upserts many members of one key under a single acquisition of the
    /// key's lock. Returns how many members were newly added.
    ///
    /// Every score is checked first; one NaN rejects the whole batch and
    /// nothing is applied.
    pub fn zadd(&self, key: &str, members: &[(f64, M)]) -> Result<usize, StoreError> {
        for (score, _) in members {
            check_score(*score)?;
        }
        if members.is_empty() {
            return Ok(0);
        }
        let collection = self.table.locate_or_create(self.router.route(key));
        collection.upsert_many(members.iter().cloned())
    }

    /// Returns every member of `key` with `min <= score <= max`, in
    /// ascending score order.
    ///
    /// An unknown key or an inverted range gives an empty result.
    pub fn get(&self, key: &str, min: f64, max: f64) -> Result<Vec<ScoredMember<M>>, StoreError> {
        self.range_by_score(key, &ScoreRange::inclusive(min, max))
    }

    /// Like [`get`](Self::get) with per-bound exclusivity and an optional
    /// limit.
    ///
    /// Reads never create a collection: an absent key is answered from
    /// the shard's shared lock alone.
    pub fn range_by_score(
        &self,
        key: &str,
        range: &ScoreRange,
    ) -> Result<Vec<ScoredMember<M>>, StoreError> {
        range.validate()?;
        match self.table.locate(self.router.route(key)) {
            Some(collection) => Ok(collection.range_by_score(range)),
            None => Ok(Vec::new()),
        }
    }

    /// Returns the score of `member` under `key`, if present.
    pub fn score(&self, key: &str, member: &M) -> Option<f64> {
        self.table
            .locate(self.router.route(key))
            .and_then(|c| c.score(member))
    }

    /// Returns the 0-based rank of `member` under `key`, if present.
    pub fn rank(&self, key: &str, member: &M) -> Option<usize> {
        self.table
            .locate(self.router.route(key))
            .and_then(|c| c.rank(member))
    }

    /// Returns the number of members under `key`.
    pub fn card(&self, key: &str) -> usize {
        self.table
            .locate(self.router.route(key))
            .map_or(0, |c| c.len())
    }

    /// Returns the shard and fingerprint `key` routes to.
    pub fn route(&self, key: &str) -> Route {
        self.router.route(key)
    }

    pub fn shard_count(&self) -> usize {
        self.table.shard_count()
    }

    pub fn hash_algorithm(&self) -> HashAlgorithm {
        self.router.algorithm()
    }

    /// Number of keys that have a collection.
    pub fn key_count(&self) -> usize {
        self.table.key_count()
    }
}

impl<M: Member> Default for Store<M> {
    fn default() -> Self {
        Self::build(StoreConfig::default())
    }
}

impl<M: Member> SortedSetStore<M> for Store<M> {
    fn zset(&self, request: ZSetRequest<M>) -> ZSetResponse<M> {
        self.set(&request.key, request.member, request.score)
    }

    fn zget(&self, request: ZGetRequest) -> ZGetResponse<M> {
        self.get(&request.key, request.score_min, request.score_max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_echoes_member() {
        let store = Store::new(16);
        assert_eq!(
            store.set("a", "valueeeee".to_string(), 151621.1),
            Ok("valueeeee".to_string())
        );
    }

    #[test]
    fn set_then_get_point_range() {
        let store = Store::new(16);
        store.set("a", "valueeeee".to_string(), 151621.1).unwrap();
        let got = store.get("a", 0.0, 151621.1).unwrap();
        assert_eq!(
            got,
            vec![ScoredMember::new("valueeeee".to_string(), 151621.1)]
        );
        let exact = store.get("a", 151621.1, 151621.1).unwrap();
        assert_eq!(exact.len(), 1);
    }

    #[test]
    fn nan_score_rejected_without_creating_key() {
        let store: Store<String> = Store::new(4);
        let err = store.set("k", "m".into(), f64::NAN).unwrap_err();
        assert!(matches!(err, StoreError::InvalidScore { .. }));
        assert_eq!(store.key_count(), 0);
    }

    #[test]
    fn nan_bound_rejected() {
        let store: Store<String> = Store::new(4);
        assert_eq!(store.get("k", f64::NAN, 1.0), Err(StoreError::InvalidBound));
    }

    #[test]
    fn get_unknown_key_is_empty_and_creates_nothing() {
        let store: Store<String> = Store::new(4);
        assert_eq!(store.get("nonexistent-key", 0.0, 100.0), Ok(vec![]));
        assert_eq!(store.key_count(), 0);
        assert_eq!(store.card("nonexistent-key"), 0);
        assert_eq!(store.score("nonexistent-key", &"m".to_string()), None);
    }

    #[test]
    fn inverted_range_is_empty() {
        let store = Store::new(4);
        store.set("k", 1u64, 5.0).unwrap();
        assert_eq!(store.get("k", 10.0, 0.0), Ok(vec![]));
    }

    #[test]
    fn zadd_is_all_or_nothing() {
        let store = Store::new(4);
        let err = store.zadd(
            "k",
            &[(1.0, "a".to_string()), (f64::NAN, "b".to_string())],
        );
        assert!(matches!(err, Err(StoreError::InvalidScore { .. })));
        assert_eq!(store.card("k"), 0);

        let added = store
            .zadd("k", &[(1.0, "a".to_string()), (2.0, "b".to_string())])
            .unwrap();
        assert_eq!(added, 2);
        assert_eq!(store.rank("k", &"b".to_string()), Some(1));
        assert_eq!(store.zadd("k", &[]), Ok(0));
    }

    #[test]
    fn with_config_rejects_zero_shards() {
        let config = StoreConfig {
            shard_count: 0,
            ..StoreConfig::default()
        };
        assert!(matches!(
            Store::<String>::with_config(config),
            Err(StoreError::InvalidConfig(_))
        ));
    }

    #[test]
    fn default_store_uses_default_config() {
        let store: Store<String> = Store::default();
        assert_eq!(store.shard_count(), DEFAULT_SHARD_COUNT);
        assert_eq!(store.hash_algorithm(), HashAlgorithm::AHash);
    }

    #[test]
    fn sha256_store_round_trip() {
        let store = Store::with_config(StoreConfig {
            shard_count: 8,
            hash: HashAlgorithm::Sha256,
            lazy_partitions: false,
        })
        .unwrap();
        store.set("a", "test".to_string(), 1.0).unwrap();
        assert_eq!(
            store.get("a", 0.0, 1.0).unwrap(),
            vec![ScoredMember::new("test".to_string(), 1.0)]
        );
        assert_eq!(store.route("a").shard, store.route("a").shard);
    }

    #[test]
    fn trait_surface() {
        let store = Store::new(8);
        let resp = store.zset(ZSetRequest {
            key: "a".into(),
            member: "test".to_string(),
            score: 1.0,
        });
        assert_eq!(resp, Ok("test".to_string()));
        let resp = store.zget(ZGetRequest {
            key: "a".into(),
            score_min: 0.0,
            score_max: 1.0,
        });
        assert_eq!(resp, Ok(vec![ScoredMember::new("test".to_string(), 1.0)]));
    }

    #[test]
    #[should_panic(expected = "shard count must be at least 1")]
    fn zero_shards_panics() {
        Store::<String>::new(0);
    }
}
