//! Value types held by the store.
//!
//! The per-key ordered collection lives in [`sorted_set`]; score range
//! descriptions live in [`range`].

pub mod range;
pub mod sorted_set;

use std::hash::Hash;

use crate::error::StoreError;

/// Bounds every member type must satisfy.
///
/// `Ord` supplies the tie-break among equal scores, `Hash` the
/// member→score index, and `Clone` lets range reads hand out owned
/// snapshots that outlive the collection lock.
pub trait Member: Ord + Hash + Clone {}

impl<T: Ord + Hash + Clone> Member for T {}

/// Rejects NaN scores. Every other `f64`, infinities included, is a
/// valid score.
pub fn check_score(score: f64) -> Result<f64, StoreError> {
    if score.is_nan() {
        Err(StoreError::InvalidScore { score })
    } else {
        Ok(score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nan_is_rejected() {
        assert!(matches!(
            check_score(f64::NAN),
            Err(StoreError::InvalidScore { .. })
        ));
    }

    #[test]
    fn infinities_are_scores() {
        assert_eq!(check_score(f64::INFINITY), Ok(f64::INFINITY));
        assert_eq!(check_score(f64::NEG_INFINITY), Ok(f64::NEG_INFINITY));
        assert_eq!(check_score(-0.0), Ok(-0.0));
    }
}
