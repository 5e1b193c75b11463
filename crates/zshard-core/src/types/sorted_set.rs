//! Sorted set data structure: dual-indexed by score and member.
//!
//! Each member is unique and carries an `f64` score. Members are ordered
//! by `(score, member)`, so equal scores are broken by the member's own
//! `Ord`. For string-like members that is lexicographic order, the same
//! rule Redis uses. The order never depends on insertion order.
//!
//! The score index is a `BTreeMap` from score to the set of members
//! holding it, so inserts, updates, removals and the start of a range
//! scan are all O(log n). An `AHashMap<Arc<M>, OrderedFloat<f64>>` gives
//! O(1) member→score lookups. Both indexes share each member through an
//! `Arc`, so a member is stored once on the heap.
//!
//! NaN scores are not accepted. Callers validate with
//! [`check_score`](super::check_score) before inserting.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ahash::AHashMap;
use ordered_float::OrderedFloat;

use super::range::ScoreRange;
use super::Member;

/// Result of a single upsert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
    /// Whether a new member was added.
    pub added: bool,
    /// Whether an existing member's score was changed.
    pub updated: bool,
}

impl AddResult {
    /// No change: member was neither added nor updated.
    pub const UNCHANGED: Self = Self {
        added: false,
        updated: false,
    };
}

/// A set of unique members, each with a floating-point score.
///
/// Rank is the 0-based position in `(score, member)` order, lowest
/// score first.
#[derive(Debug, Clone)]
pub struct SortedSet<M> {
    /// Score-ordered index. Buckets are never left empty.
    by_score: BTreeMap<OrderedFloat<f64>, BTreeSet<Arc<M>>>,
    scores: AHashMap<Arc<M>, OrderedFloat<f64>>,
}

impl<M: Member> SortedSet<M> {
    /// Creates an empty sorted set.
    pub fn new() -> Self {
        Self {
            by_score: BTreeMap::new(),
            scores: AHashMap::new(),
        }
    }

    /// Inserts `member` with `score`, or moves an existing member to its
    /// new score.
    pub fn add(&mut self, member: M, score: f64) -> AddResult {
        debug_assert!(!score.is_nan(), "NaN score reached the sorted set");
        let new_score = OrderedFloat(score);

        let existing = self
            .scores
            .get_key_value(&member)
            .map(|(name, score)| (Arc::clone(name), *score));

        if let Some((name, old_score)) = existing {
            if old_score == new_score {
                return AddResult::UNCHANGED;
            }
            // reuse the existing Arc rather than the caller's copy
            self.unlink(old_score, &name);
            self.scores.insert(Arc::clone(&name), new_score);
            self.by_score.entry(new_score).or_default().insert(name);
            return AddResult {
                added: false,
                updated: true,
            };
        }

        let name = Arc::new(member);
        self.scores.insert(Arc::clone(&name), new_score);
        self.by_score.entry(new_score).or_default().insert(name);
        AddResult {
            added: true,
            updated: false,
        }
    }

    /// Removes a member from the sorted set. Returns `true` if it existed.
    pub fn remove(&mut self, member: &M) -> bool {
        let Some((name, score)) = self.scores.remove_entry(member) else {
            return false;
        };
        self.unlink(score, &name);
        true
    }

    /// Returns the score for a member, or `None` if not present.
    pub fn score(&self, member: &M) -> Option<f64> {
        self.scores.get(member).map(|s| s.0)
    }

    /// Returns the 0-based rank of a member (lowest score = rank 0).
    ///
    /// O(n): counts every member ranked below this one.
    pub fn rank(&self, member: &M) -> Option<usize> {
        let (name, score) = self.scores.get_key_value(member)?;
        let below: usize = self
            .by_score
            .range(..*score)
            .map(|(_, bucket)| bucket.len())
            .sum();
        let name: &M = name;
        let ahead = self.by_score.get(score)?.range::<M, _>(..name).count();
        Some(below + ahead)
    }

    /// Returns every entry whose score lies in `range`, in ascending
    /// `(score, member)` order, truncated to `range.limit` if set.
    ///
    /// An empty interval yields an empty result.
    pub fn range_by_score(&self, range: &ScoreRange) -> Vec<(&M, f64)> {
        if range.is_empty() {
            return Vec::new();
        }

        self.by_score
            .range((range.min.to_bound(), range.max.to_bound()))
            .flat_map(|(score, bucket)| bucket.iter().map(move |m| (&**m, score.0)))
            .take(range.limit.unwrap_or(usize::MAX))
            .collect()
    }

    /// Returns the number of members.
    pub fn len(&self) -> usize {
        self.scores.len()
    }

    /// Returns `true` if the sorted set has no members.
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Returns an iterator over (member, score) pairs in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&M, f64)> {
        self.by_score
            .iter()
            .flat_map(|(score, bucket)| bucket.iter().map(move |m| (&**m, score.0)))
    }

    /// Drops `name` from its score bucket, and the bucket once empty.
    fn unlink(&mut self, score: OrderedFloat<f64>, name: &M) {
        let removed = match self.by_score.get_mut(&score) {
            Some(bucket) => {
                let removed = bucket.remove(name);
                if bucket.is_empty() {
                    self.by_score.remove(&score);
                }
                removed
            }
            None => false,
        };
        debug_assert!(removed, "score index out of sync with member index");
    }
}

impl<M: Member> Default for SortedSet<M> {
    fn default() -> Self {
        Self::new()
    }
}
