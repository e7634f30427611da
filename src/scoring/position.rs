use std::collections::HashMap;

use crate::catalog::index::IndexResult;
use crate::core::pattern::Pattern;
use crate::core::types::SequenceId;
use crate::scoring::ScoringError;
use crate::utils::validation::count_to_f64;

/// Number of patterns hitting each non-wildcard (sequence, position) of the
/// positive set.
///
/// Built once over every pattern, then read per pattern: positions hit by many
/// patterns weigh more.
#[derive(Debug, Default)]
pub struct PositionScoreMatrix {
    counts: HashMap<SequenceId, HashMap<usize, u32>>,
}

impl PositionScoreMatrix {
    /// Accumulate the positive-set hits of every indexed pattern
    pub fn accumulate<'a, I>(patterns: I) -> Self
    where
        I: IntoIterator<Item = &'a Pattern>,
    {
        let mut matrix = Self::default();
        for pattern in patterns {
            if let Some(index) = &pattern.match_index {
                matrix.add_hits(&index.positive);
            }
        }
        matrix
    }

    fn add_hits(&mut self, result: &IndexResult) {
        for (seq_id, hit) in result.iter_hits() {
            let row = self.counts.entry(seq_id).or_default();
            for &pos in &hit.nonwildcard_positions {
                *row.entry(pos).or_default() += 1;
            }
        }
    }

    /// Accumulated count at one position; 0 when never hit
    #[must_use]
    pub fn get(&self, seq_id: SequenceId, pos: usize) -> u32 {
        self.counts
            .get(&seq_id)
            .and_then(|row| row.get(&pos))
            .copied()
            .unwrap_or(0)
    }

    /// Position-overlap score of one pattern: the accumulated counts at its
    /// own non-wildcard hit positions, divided by
    /// `hit sequences x non-wildcard positions`.
    ///
    /// With `seqmask`, sequences whose id exceeds the pattern's hit-sequence
    /// count are skipped.
    ///
    /// # Errors
    ///
    /// Returns `ScoringError::DivisionByZero` if the pattern hits no positive
    /// sequence or has no non-wildcard position.
    pub fn score(
        &self,
        positive: &IndexResult,
        n_nonwildcards: usize,
        seqmask: bool,
    ) -> Result<f64, ScoringError> {
        if positive.n_hit_seqs == 0 || n_nonwildcards == 0 {
            return Err(ScoringError::DivisionByZero {
                statistic: "position overlap",
                reason: format!(
                    "{} hit sequences, {} non-wildcard positions",
                    positive.n_hit_seqs, n_nonwildcards
                ),
            });
        }

        let mut total = 0u64;
        for (seq_id, hit) in positive.iter_hits() {
            if seqmask && seq_id > positive.n_hit_seqs {
                continue;
            }
            for &pos in &hit.nonwildcard_positions {
                total += u64::from(self.get(seq_id, pos));
            }
        }

        #[allow(clippy::cast_precision_loss)]
        let total = total as f64;
        Ok(total / (count_to_f64(positive.n_hit_seqs) * count_to_f64(n_nonwildcards)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::index::index_sequences;
    use crate::catalog::index::MatchIndex;

    fn indexed(pattern: &str, positive: &[&str]) -> Pattern {
        let mut p = Pattern::new(pattern).unwrap();
        let pos = index_sequences(&p.symbols, positive.iter().copied(), false).unwrap();
        p.match_index = Some(MatchIndex {
            positive: pos,
            negative: IndexResult::default(),
        });
        p
    }

    #[test]
    fn test_single_pattern_scores_one() {
        let p = indexed("atcg", &["AAATCGAAA"]);
        let matrix = PositionScoreMatrix::accumulate([&p]);
        let index = p.match_index.as_ref().unwrap();
        let score = matrix.score(&index.positive, p.n_nonwildcards, false).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_shared_positions_accumulate() {
        // Both hit positions 3..6 of the sequence
        let a = indexed("atcg", &["aaatcgaaa"]);
        let b = indexed("tcga", &["aaatcgaaa"]);
        let matrix = PositionScoreMatrix::accumulate([&a, &b]);

        assert_eq!(matrix.get(1, 2), 1);
        assert_eq!(matrix.get(1, 3), 2);
        assert_eq!(matrix.get(1, 6), 1);
        assert_eq!(matrix.get(2, 3), 0);

        // atcg: positions 2..6 -> 1 + 2 + 2 + 2 = 7 over 1 x 4
        let index = a.match_index.as_ref().unwrap();
        let score = matrix.score(&index.positive, a.n_nonwildcards, false).unwrap();
        assert!((score - 1.75).abs() < 1e-12);
    }

    #[test]
    fn test_wildcards_are_not_accumulated() {
        let p = indexed("ann", &["acg"]);
        let matrix = PositionScoreMatrix::accumulate([&p]);
        assert_eq!(matrix.get(1, 0), 1);
        assert_eq!(matrix.get(1, 1), 0);
        assert_eq!(matrix.get(1, 2), 0);
    }

    #[test]
    fn test_seqmask_skips_late_sequences() {
        // Hits only in sequences 2 and 3; n_hit_seqs = 2 so sequence 3 is masked
        let p = indexed("gg", &["aaaa", "ggaa", "aagg"]);
        let matrix = PositionScoreMatrix::accumulate([&p]);
        let index = p.match_index.as_ref().unwrap();

        let unmasked = matrix.score(&index.positive, p.n_nonwildcards, false).unwrap();
        let masked = matrix.score(&index.positive, p.n_nonwildcards, true).unwrap();
        assert!((unmasked - 1.0).abs() < 1e-12);
        assert!((masked - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_no_hits_is_division_by_zero() {
        let p = indexed("cccc", &["aaaa"]);
        let matrix = PositionScoreMatrix::accumulate([&p]);
        let index = p.match_index.as_ref().unwrap();
        let err = matrix
            .score(&index.positive, p.n_nonwildcards, false)
            .unwrap_err();
        assert!(matches!(err, ScoringError::DivisionByZero { .. }));
    }
}
