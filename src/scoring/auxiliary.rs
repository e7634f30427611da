//! Nucleosome-occupancy and conservation factors.

use std::collections::BTreeMap;

use crate::catalog::index::IndexResult;
use crate::core::types::SequenceId;
use crate::scoring::ScoringError;
use crate::utils::validation::count_to_f64;

/// Per-(sequence, position) scores from an external table. Positions are
/// 0-based, sequence ids 1-based.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScoreTable {
    scores: BTreeMap<SequenceId, BTreeMap<usize, f64>>,
}

impl ScoreTable {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the score of a position; a repeated position keeps the last value
    pub fn insert(&mut self, seq_id: SequenceId, pos: usize, score: f64) {
        self.scores.entry(seq_id).or_default().insert(pos, score);
    }

    #[must_use]
    pub fn get(&self, seq_id: SequenceId, pos: usize) -> Option<f64> {
        self.scores.get(&seq_id).and_then(|row| row.get(&pos)).copied()
    }

    /// Number of sequences with at least one score
    #[must_use]
    pub fn n_sequences(&self) -> usize {
        self.scores.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.scores.is_empty()
    }

    /// Min-max scale every sequence's scores to [0, 1].
    ///
    /// A sequence whose scores are all equal scales to 0.
    #[must_use]
    pub fn min_max_scaled(mut self) -> Self {
        for row in self.scores.values_mut() {
            let min = row.values().copied().fold(f64::INFINITY, f64::min);
            let max = row.values().copied().fold(f64::NEG_INFINITY, f64::max);
            let interval = max - min;
            for v in row.values_mut() {
                *v = if interval > 0.0 { (*v - min) / interval } else { 0.0 };
            }
        }
        self
    }
}

/// Mean of `1 - occupancy` over every matched position of a pattern that has
/// a score. `occupancy` must already be scaled to [0, 1].
///
/// # Errors
///
/// Returns `ScoringError::DivisionByZero` if no matched position has a score.
pub fn occupancy_score(positive: &IndexResult, occupancy: &ScoreTable) -> Result<f64, ScoringError> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for (seq_id, hit) in positive.iter_hits() {
        for pos in hit.range.clone() {
            if let Some(s) = occupancy.get(seq_id, pos) {
                sum += 1.0 - s;
                n += 1;
            }
        }
    }

    if n == 0 {
        return Err(ScoringError::DivisionByZero {
            statistic: "nucleosome occupancy",
            reason: "no matched position has an occupancy score".to_string(),
        });
    }
    Ok(sum / count_to_f64(n))
}

/// Mean raw conservation score over the matched positions whose score is
/// non-zero.
///
/// # Errors
///
/// Returns `ScoringError::DivisionByZero` if no matched position has a
/// non-zero score.
pub fn conservation_score(
    positive: &IndexResult,
    conservation: &ScoreTable,
) -> Result<f64, ScoringError> {
    let mut sum = 0.0;
    let mut n = 0usize;
    for (seq_id, hit) in positive.iter_hits() {
        for pos in hit.range.clone() {
            match conservation.get(seq_id, pos) {
                Some(s) if s != 0.0 => {
                    sum += s;
                    n += 1;
                }
                _ => {}
            }
        }
    }

    if n == 0 {
        return Err(ScoringError::DivisionByZero {
            statistic: "conservation",
            reason: "no matched position has a non-zero conservation score".to_string(),
        });
    }
    Ok(sum / count_to_f64(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::index::index_sequences;
    use crate::core::symbol::parse_symbols;

    fn positive_hits(pattern: &str, seqs: &[&str]) -> IndexResult {
        let symbols = parse_symbols(pattern).unwrap();
        index_sequences(&symbols, seqs.iter().copied(), false).unwrap()
    }

    #[test]
    fn test_min_max_scaling() {
        let mut table = ScoreTable::new();
        table.insert(1, 0, 2.0);
        table.insert(1, 1, 4.0);
        table.insert(1, 2, 6.0);
        table.insert(2, 0, 5.0);
        table.insert(2, 1, 5.0);

        let scaled = table.min_max_scaled();
        assert!((scaled.get(1, 0).unwrap() - 0.0).abs() < 1e-12);
        assert!((scaled.get(1, 1).unwrap() - 0.5).abs() < 1e-12);
        assert!((scaled.get(1, 2).unwrap() - 1.0).abs() < 1e-12);
        // constant sequence
        assert!((scaled.get(2, 0).unwrap() - 0.0).abs() < 1e-12);
        assert_eq!(scaled.n_sequences(), 2);
    }

    #[test]
    fn test_occupancy_score() {
        let hits = positive_hits("cg", &["acgt"]);
        let mut table = ScoreTable::new();
        table.insert(1, 1, 0.2);
        table.insert(1, 2, 0.6);
        table.insert(1, 3, 1.0);

        // (0.8 + 0.4) / 2
        let score = occupancy_score(&hits, &table).unwrap();
        assert!((score - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_occupancy_score_without_coverage() {
        let hits = positive_hits("cg", &["acgt"]);
        let mut table = ScoreTable::new();
        table.insert(2, 1, 0.2);
        assert!(matches!(
            occupancy_score(&hits, &table),
            Err(ScoringError::DivisionByZero { .. })
        ));
    }

    #[test]
    fn test_conservation_score_skips_zeros() {
        let hits = positive_hits("acg", &["acgt"]);
        let mut table = ScoreTable::new();
        table.insert(1, 0, 0.0);
        table.insert(1, 1, 3.0);
        table.insert(1, 2, 5.0);

        let score = conservation_score(&hits, &table).unwrap();
        assert!((score - 4.0).abs() < 1e-12);
    }

    #[test]
    fn test_conservation_score_all_zero() {
        let hits = positive_hits("acg", &["acgt"]);
        let mut table = ScoreTable::new();
        table.insert(1, 0, 0.0);
        assert!(conservation_score(&hits, &table).is_err());
    }
}
