//! Key routing: maps a key to its shard and its 64-bit fingerprint.
//!
//! The fingerprint doubles as the lookup key inside a shard, so a key's
//! string is hashed exactly once per operation and never stored.
//! Distinct keys with the same fingerprint would share a collection.
//! At 64 bits that is not expected in practice and it is not detected.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use sha2::{Digest, Sha256};

/// A 64-bit hash of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(pub u64);

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.0)
    }
}

/// Where a key lives: the shard that owns it and its fingerprint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Route {
    pub shard: usize,
    pub fingerprint: Fingerprint,
}

/// The hash function used to fingerprint keys.
///
/// The choice only changes how keys spread across shards. Nothing is
/// persisted, so switching algorithms between runs is harmless.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HashAlgorithm {
    /// aHash with fixed keys. Fast, and deterministic within a process,
    /// which is all local sharding needs.
    #[default]
    AHash,
    /// First 8 bytes of SHA-256, little-endian. Slower, but stable
    /// across processes, builds, and platforms.
    Sha256,
}

impl HashAlgorithm {
    pub fn as_str(self) -> &'static str {
        match self {
            HashAlgorithm::AHash => "ahash",
            HashAlgorithm::Sha256 => "sha256",
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HashAlgorithm {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.to_ascii_lowercase().as_str() {
            "ahash" => Ok(HashAlgorithm::AHash),
            "sha256" => Ok(HashAlgorithm::Sha256),
            _ => Err(format!(
                "unknown hash algorithm '{input}'. valid options: ahash, sha256"
            )),
        }
    }
}

/// Pure function: fingerprints a key.
///
/// Both algorithms are stateless per call, so any number of threads can
/// fingerprint concurrently without sharing hasher state.
pub fn fingerprint(key: &str, algorithm: HashAlgorithm) -> Fingerprint {
    match algorithm {
        HashAlgorithm::AHash => {
            let mut hasher = ahash::AHasher::default();
            key.hash(&mut hasher);
            Fingerprint(hasher.finish())
        }
        HashAlgorithm::Sha256 => {
            let digest = Sha256::digest(key.as_bytes());
            let mut prefix = [0u8; 8];
            prefix.copy_from_slice(&digest[..8]);
            Fingerprint(u64::from_le_bytes(prefix))
        }
    }
}

/// Maps keys to `(shard, fingerprint)` for a fixed shard count.
#[derive(Debug, Clone, Copy)]
pub struct KeyRouter {
    shard_count: usize,
    algorithm: HashAlgorithm,
}

impl KeyRouter {
    /// `shard_count` must be nonzero; the store checks it before
    /// building a router.
    pub fn new(shard_count: usize, algorithm: HashAlgorithm) -> Self {
        Self {
            shard_count,
            algorithm,
        }
    }

    pub fn route(&self, key: &str) -> Route {
        let fingerprint = fingerprint(key, self.algorithm);
        Route {
            shard: (fingerprint.0 % self.shard_count as u64) as usize,
            fingerprint,
        }
    }

    pub fn shard_count(&self) -> usize {
        self.shard_count
    }

    pub fn algorithm(&self) -> HashAlgorithm {
        self.algorithm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_key_same_route() {
        for algorithm in [HashAlgorithm::AHash, HashAlgorithm::Sha256] {
            let router = KeyRouter::new(8, algorithm);
            assert_eq!(router.route("foo"), router.route("foo"));
        }
    }

    #[test]
    fn shard_is_fingerprint_mod_count() {
        let router = KeyRouter::new(2048, HashAlgorithm::AHash);
        for i in 0..100 {
            let route = router.route(&format!("key:{i}"));
            assert_eq!(route.shard as u64, route.fingerprint.0 % 2048);
            assert!(route.shard < 2048);
        }
    }

    #[test]
    fn keys_spread_across_shards() {
        let router = KeyRouter::new(4, HashAlgorithm::AHash);
        let mut seen = std::collections::HashSet::new();
        for i in 0..100 {
            seen.insert(router.route(&format!("key:{i}")).shard);
        }
        assert!(seen.len() > 1, "expected keys to spread across shards");
    }

    #[test]
    fn single_shard_always_zero() {
        let router = KeyRouter::new(1, HashAlgorithm::Sha256);
        assert_eq!(router.route("anything").shard, 0);
        assert_eq!(router.route("other").shard, 0);
    }

    #[test]
    fn empty_key_routes() {
        let router = KeyRouter::new(16, HashAlgorithm::AHash);
        assert!(router.route("").shard < 16);
    }

    #[test]
    fn sha256_matches_digest_prefix() {
        // sha256("") = e3b0c44298fc1c14...
        let fp = fingerprint("", HashAlgorithm::Sha256);
        assert_eq!(
            fp.0,
            u64::from_le_bytes([0xe3, 0xb0, 0xc4, 0x42, 0x98, 0xfc, 0x1c, 0x14])
        );
    }

    #[test]
    fn distinct_keys_distinct_fingerprints() {
        for algorithm in [HashAlgorithm::AHash, HashAlgorithm::Sha256] {
            assert_ne!(fingerprint("a", algorithm), fingerprint("b", algorithm));
        }
    }

    #[test]
    fn parse_hash_algorithm() {
        assert_eq!("ahash".parse::<HashAlgorithm>(), Ok(HashAlgorithm::AHash));
        assert_eq!("SHA256".parse::<HashAlgorithm>(), Ok(HashAlgorithm::Sha256));
        assert!("md5".parse::<HashAlgorithm>().is_err());
    }
}
