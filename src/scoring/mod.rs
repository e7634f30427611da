//! Pattern scoring.
//!
//! Each pattern gets a composite score that is the product of up to four
//! factors:
//!
//! 1. **Preferential occurrence** ([`occurrence`]): two-proportion z-score of
//!    the pattern's hit rate in the positive set against the negative set.
//!    Used as is, never weighted.
//! 2. **Position overlap** ([`position`]): how often the pattern's
//!    non-wildcard hit positions are also hit by other patterns, normalised by
//!    `hit sequences x non-wildcard positions`.
//! 3. **Nucleosome occupancy** ([`auxiliary`], optional): mean of
//!    `1 - occupancy` over matched positions, occupancy min-max scaled per
//!    sequence.
//! 4. **Conservation** ([`auxiliary`], optional): mean raw conservation over
//!    matched positions with a non-zero score.
//!
//! ```text
//! score = z * sp^w_sp * sn^w_sn * sc^w_sc
//! ```
//!
//! Absent optional factors contribute 1, as does any factor with weight 0.
//! A negative z (enriched in the negative set) stays negative, so such
//! patterns rank last.
//!
//! Undefined statistics are never coerced to zero: the pattern is reported
//! with [`ScoringError::DivisionByZero`] and left out of the ranking.

use thiserror::Error;

pub mod auxiliary;
pub mod engine;
pub mod occurrence;
pub mod position;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScoringError {
    #[error("Pattern has no match index")]
    NotIndexed,

    #[error("Division by zero in {statistic} score: {reason}")]
    DivisionByZero {
        statistic: &'static str,
        reason: String,
    },
}
