//! The per-key sorted collection: a [`SortedSet`] behind its own
//! reader/writer lock.
//!
//! This lock is the only path to a key's data. Writers take it
//! exclusively; readers share it for the whole scan and copy matches
//! out before releasing it, so a result is always a point-in-time
//! snapshot and never reflects a half-applied write.

use parking_lot::RwLock;

use crate::entities::ScoredMember;
use crate::error::StoreError;
use crate::types::range::ScoreRange;
use crate::types::sorted_set::{AddResult, SortedSet};
use crate::types::{check_score, Member};

#[derive(Debug)]
pub struct SortedCollection<M> {
    set: RwLock<SortedSet<M>>,
}

impl<M: Member> SortedCollection<M> {
    pub fn new() -> Self {
        Self {
            set: RwLock::new(SortedSet::new()),
        }
    }

    /// Inserts `member` or moves it to `score`, under the exclusive lock.
    ///
    /// A NaN score is rejected before the lock is taken.
    pub fn upsert(&self, member: M, score: f64) -> Result<AddResult, StoreError> {
        let score = check_score(score)?;
        Ok(self.set.write().add(member, score))
    }

    /// Applies every `(score, member)` pair under a single exclusive
    /// acquisition. Returns how many members were newly added.
    ///
    /// One NaN score rejects the whole batch and nothing is applied.
    pub fn upsert_many(
        &self,
        members: impl IntoIterator<Item = (f64, M)>,
    ) -> Result<usize, StoreError> {
        let members: Vec<_> = members.into_iter().collect();
        for (score, _) in &members {
            check_score(*score)?;
        }
        let mut set = self.set.write();
        Ok(members
            .into_iter()
            .map(|(score, member)| set.add(member, score))
            .filter(|result| result.added)
            .count())
    }

    /// Copies out every entry in `range`, in ascending score order, while
    /// holding the shared lock.
    pub fn range_by_score(&self, range: &ScoreRange) -> Vec<ScoredMember<M>> {
        let set = self.set.read();
        set.range_by_score(range)
            .into_iter()
            .map(|(member, score)| ScoredMember::new(member.clone(), score))
            .collect()
    }

    pub fn score(&self, member: &M) -> Option<f64> {
        self.set.read().score(member)
    }

    pub fn rank(&self, member: &M) -> Option<usize> {
        self.set.read().rank(member)
    }

    /// Removes `member`. Returns `true` if it was present.
    pub fn remove(&self, member: &M) -> bool {
        self.set.write().remove(member)
    }

    pub fn len(&self) -> usize {
        self.set.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.set.read().is_empty()
    }
}

impl<M: Member> Default for SortedCollection<M> {
    fn default() -> Self {
        Self::new()
    }
}
