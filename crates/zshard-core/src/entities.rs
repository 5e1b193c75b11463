//! Request and response shapes for the store's operation surface.

use crate::error::StoreError;

/// One entry of a range result.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMember<M> {
    pub member: M,
    pub score: f64,
}

impl<M> ScoredMember<M> {
    pub fn new(member: M, score: f64) -> Self {
        Self { member, score }
    }
}

/// Upserts `member` under `key` with the given score.
#[derive(Debug, Clone, PartialEq)]
pub struct ZSetRequest<M> {
    pub key: String,
    pub member: M,
    pub score: f64,
}

/// Reads every member of `key` whose score lies in
/// `[score_min, score_max]`.
#[derive(Debug, Clone, PartialEq)]
pub struct ZGetRequest {
    pub key: String,
    pub score_min: f64,
    pub score_max: f64,
}

/// The echoed member on success.
pub type ZSetResponse<M> = Result<M, StoreError>;

/// Matching entries in ascending score order.
pub type ZGetResponse<M> = Result<Vec<ScoredMember<M>>, StoreError>;
