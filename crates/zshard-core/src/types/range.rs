//! Score range descriptions used by range reads.

use std::ops::Bound;

use ordered_float::OrderedFloat;

use crate::error::StoreError;

/// One end of a score range.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScoreBound {
    Inclusive(f64),
    Exclusive(f64),
}

impl ScoreBound {
    pub fn value(self) -> f64 {
        match self {
            ScoreBound::Inclusive(v) | ScoreBound::Exclusive(v) => v,
        }
    }

    pub fn is_exclusive(self) -> bool {
        matches!(self, ScoreBound::Exclusive(_))
    }

    /// This bound as either end of a `BTreeMap` range.
    pub(crate) fn to_bound(self) -> Bound<OrderedFloat<f64>> {
        match self {
            ScoreBound::Inclusive(v) => Bound::Included(OrderedFloat(v)),
            ScoreBound::Exclusive(v) => Bound::Excluded(OrderedFloat(v)),
        }
    }

    /// True if `score` is on the allowed side of this bound when it is
    /// used as the lower end of a range.
    fn admits_from_below(self, score: f64) -> bool {
        match self {
            ScoreBound::Inclusive(min) => score >= min,
            ScoreBound::Exclusive(min) => score > min,
        }
    }

    /// True if `score` is on the allowed side of this bound when it is
    /// used as the upper end of a range.
    fn admits_from_above(self, score: f64) -> bool {
        match self {
            ScoreBound::Inclusive(max) => score <= max,
            ScoreBound::Exclusive(max) => score < max,
        }
    }
}

/// A score interval with an optional cap on the number of results.
///
/// An interval that contains no scores (for example `min > max`, or
/// `(5, 5]`) is valid and simply matches nothing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreRange {
    pub min: ScoreBound,
    pub max: ScoreBound,
    /// Maximum number of entries to return. `None` means no limit.
    pub limit: Option<usize>,
}

impl ScoreRange {
    /// `[min, max]`, no limit.
    pub fn inclusive(min: f64, max: f64) -> Self {
        Self {
            min: ScoreBound::Inclusive(min),
            max: ScoreBound::Inclusive(max),
            limit: None,
        }
    }

    /// Every score, `-inf` through `+inf`.
    pub fn all() -> Self {
        Self::inclusive(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Rejects NaN bounds.
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.min.value().is_nan() || self.max.value().is_nan() {
            return Err(StoreError::InvalidBound);
        }
        Ok(())
    }

    /// True if no score can fall inside the interval: a NaN bound,
    /// `min > max`, or equal ends with either one exclusive.
    pub fn is_empty(&self) -> bool {
        let (min, max) = (self.min.value(), self.max.value());
        if min.is_nan() || max.is_nan() || min > max {
            return true;
        }
        min == max && (self.min.is_exclusive() || self.max.is_exclusive())
    }

    /// True if `score` lies inside the interval.
    pub fn contains(&self, score: f64) -> bool {
        self.min.admits_from_below(score) && self.max.admits_from_above(score)
    }
}
