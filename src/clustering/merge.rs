use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::core::pattern::Pattern;
use crate::core::symbol::{reverse_complement_symbols, symbols_to_string, Symbol};
use crate::core::types::Strand;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MergeError {
    #[error("Cannot merge an empty pattern list")]
    EmptyInput,

    #[error("Padded sequences differ in length: {left} vs {right}")]
    LengthMismatch { left: usize, right: usize },
}

/// A member pattern and the orientation it was folded into the consensus with
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MergedMember {
    pub sequence: String,
    pub strand: Strand,

    /// First consensus column covered by the member in orientation `strand`
    pub offset: usize,
}

/// Degenerate pattern summarizing a list of patterns
#[derive(Debug, Clone)]
pub struct ConsensusPattern {
    pub pattern: Pattern,

    /// Members in input order
    pub members: Vec<MergedMember>,
}

/// Placement of the incoming pattern relative to the running consensus
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Placement {
    /// Start of the incoming pattern minus start of the consensus
    offset: isize,
    strand: Strand,
    score: usize,
}

/// Fold `patterns` into one consensus pattern.
///
/// The first pattern seeds the consensus. Each following pattern is tried at
/// every offset with at least one overlapping column, forward and, with
/// `reverse_complement`, reverse-complemented. An offset scores the number of
/// overlapping columns holding the same non-wildcard symbol. The best
/// placement wins; ties go to the forward strand, then to the smallest shift.
/// Both sides are padded with `n` and merged column by column with
/// [`Symbol::union`].
///
/// # Errors
///
/// Returns `MergeError::EmptyInput` for an empty list.
pub fn merge(patterns: &[&Pattern], reverse_complement: bool) -> Result<ConsensusPattern, MergeError> {
    let (first, rest) = patterns.split_first().ok_or(MergeError::EmptyInput)?;

    let mut consensus = first.symbols.clone();
    let mut members = vec![MergedMember {
        sequence: first.sequence.clone(),
        strand: Strand::Forward,
        offset: 0,
    }];

    for pattern in rest {
        let reversed = reverse_complement_symbols(&pattern.symbols);
        let mut best = best_placement(&consensus, &pattern.symbols, Strand::Forward);
        if reverse_complement {
            let candidate = best_placement(&consensus, &reversed, Strand::Reverse);
            if candidate.score > best.score {
                best = candidate;
            }
        }

        let incoming = match best.strand {
            Strand::Forward => &pattern.symbols,
            Strand::Reverse => &reversed,
        };
        let (padded_consensus, padded_incoming) = pad(&consensus, incoming, best.offset);
        consensus = merge_columns(&padded_consensus, &padded_incoming)?;

        let shift = best.offset.unsigned_abs();
        if best.offset < 0 {
            for member in &mut members {
                member.offset += shift;
            }
        }

        debug!(
            "Merged {} at offset {} ({}) -> {}",
            pattern.sequence,
            best.offset,
            best.strand,
            symbols_to_string(&consensus)
        );

        members.push(MergedMember {
            sequence: pattern.sequence.clone(),
            strand: best.strand,
            offset: if best.offset < 0 { 0 } else { shift },
        });
    }

    Ok(ConsensusPattern {
        pattern: Pattern::from_symbols(consensus),
        members,
    })
}

fn best_placement(consensus: &[Symbol], incoming: &[Symbol], strand: Strand) -> Placement {
    let mut best = Placement {
        offset: 0,
        strand,
        score: overlap_score(consensus, incoming, 0),
    };
    for offset in candidate_offsets(consensus.len(), incoming.len()) {
        let score = overlap_score(consensus, incoming, offset);
        if score > best.score {
            best = Placement {
                offset,
                strand,
                score,
            };
        }
    }
    best
}

/// Every offset leaving at least one overlapping column, smallest shift
/// first, zero excluded
fn candidate_offsets(consensus_len: usize, incoming_len: usize) -> impl Iterator<Item = isize> {
    let right = isize::try_from(consensus_len).unwrap_or(isize::MAX) - 1;
    let left = isize::try_from(incoming_len).unwrap_or(isize::MAX) - 1;
    let widest = right.max(left);
    (1..=widest).flat_map(move |shift| {
        let forward = (shift <= right).then_some(shift);
        let backward = (shift <= left).then_some(-shift);
        forward.into_iter().chain(backward)
    })
}

fn overlap_score(consensus: &[Symbol], incoming: &[Symbol], offset: isize) -> usize {
    incoming
        .iter()
        .enumerate()
        .filter(|&(i, symbol)| {
            let Ok(pos) = usize::try_from(offset + isize::try_from(i).unwrap_or(isize::MAX)) else {
                return false;
            };
            !symbol.is_wildcard() && consensus.get(pos) == Some(symbol)
        })
        .count()
}

/// Pad both sides with wildcards so that `incoming` sits at `offset`
fn pad(consensus: &[Symbol], incoming: &[Symbol], offset: isize) -> (Vec<Symbol>, Vec<Symbol>) {
    let shift = offset.unsigned_abs();
    let (lead_consensus, lead_incoming) = if offset >= 0 { (0, shift) } else { (shift, 0) };

    let len = (lead_consensus + consensus.len()).max(lead_incoming + incoming.len());
    let padded = |lead: usize, symbols: &[Symbol]| {
        let mut out = vec![Symbol::Wildcard; lead];
        out.extend_from_slice(symbols);
        out.resize(len, Symbol::Wildcard);
        out
    };

    (
        padded(lead_consensus, consensus),
        padded(lead_incoming, incoming),
    )
}

fn merge_columns(left: &[Symbol], right: &[Symbol]) -> Result<Vec<Symbol>, MergeError> {
    if left.len() != right.len() {
        return Err(MergeError::LengthMismatch {
            left: left.len(),
            right: right.len(),
        });
    }
    Ok(left.iter().zip(right).map(|(&a, &b)| a.union(b)).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn patterns(seqs: &[&str]) -> Vec<Pattern> {
        seqs.iter().map(|s| Pattern::new(s).unwrap()).collect()
    }

    fn merged(seqs: &[&str], rc: bool) -> ConsensusPattern {
        let owned = patterns(seqs);
        let refs: Vec<&Pattern> = owned.iter().collect();
        merge(&refs, rc).unwrap()
    }

    #[test]
    fn test_single_pattern_unchanged() {
        let result = merged(&["acgnt"], true);
        assert_eq!(result.pattern.sequence, "acgnt");
        assert_eq!(result.members.len(), 1);
        assert_eq!(result.members[0].strand, Strand::Forward);
    }

    #[test]
    fn test_identical_patterns() {
        let result = merged(&["atcg", "atcg"], false);
        assert_eq!(result.pattern.sequence, "atcg");
        assert!(result.members.iter().all(|m| m.strand == Strand::Forward));
    }

    #[test]
    fn test_ambiguity_column() {
        let result = merged(&["at", "ac"], false);
        assert_eq!(result.pattern.sequence, "am");
        assert_eq!(result.pattern.symbols[0], Symbol::A);
        assert_eq!(result.pattern.symbols[1], Symbol::AC);
    }

    #[test]
    fn test_shifted_overlap_pads_with_wildcards() {
        // cgta best placed one column right of acgt; overhangs meet padding
        let result = merged(&["acgt", "cgta"], false);
        assert_eq!(result.pattern.sequence, "ncgtn");
        assert_eq!(result.members[1].strand, Strand::Forward);
        assert_eq!(result.members[0].offset, 0);
        assert_eq!(result.members[1].offset, 1);
    }

    #[test]
    fn test_negative_offset() {
        let result = merged(&["cgta", "acgt"], false);
        assert_eq!(result.pattern.sequence, "ncgtn");
        // earlier members move right when the consensus grows on the left
        assert_eq!(result.members[0].offset, 1);
        assert_eq!(result.members[1].offset, 0);
    }

    #[test]
    fn test_reverse_complement_member() {
        // ttgca is the reverse complement of tgcaa
        let result = merged(&["tgcaa", "ttgca"], true);
        assert_eq!(result.pattern.sequence, "tgcaa");
        assert_eq!(result.members[1].strand, Strand::Reverse);

        let forward_only = merged(&["tgcaa", "ttgca"], false);
        assert_eq!(forward_only.members[1].strand, Strand::Forward);
        assert_ne!(forward_only.pattern.sequence, "tgcaa");
    }

    #[test]
    fn test_wildcards_do_not_score() {
        // Only the two a's can anchor; wildcard pairs would favour offset 0
        let result = merged(&["nnnna", "annnn"], false);
        assert_eq!(result.pattern.sequence, "nnnnannnn");
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(merge(&[], true).unwrap_err(), MergeError::EmptyInput);
    }

    #[test]
    fn test_candidate_offsets_order() {
        let offsets: Vec<isize> = candidate_offsets(3, 2).collect();
        assert_eq!(offsets, vec![1, -1, 2]);
    }

    #[test]
    fn test_merge_columns_length_guard() {
        let err = merge_columns(&[Symbol::A], &[Symbol::A, Symbol::C]).unwrap_err();
        assert_eq!(err, MergeError::LengthMismatch { left: 1, right: 2 });
    }
}
