use std::collections::BTreeMap;
use std::ops::Range;

use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::core::symbol::{expand_symbols, reverse_complement_symbols, symbols_to_string, Symbol};
use crate::core::types::{SequenceId, Strand};
use crate::utils::validation::count_to_f64;

#[derive(Error, Debug)]
pub enum IndexError {
    #[error("Cannot index against an empty sequence set")]
    EmptyInput,

    #[error("Cannot index an empty pattern")]
    EmptyPattern,

    #[error("Failed to build matcher for '{pattern}': {source}")]
    Matcher {
        pattern: String,
        #[source]
        source: regex::Error,
    },
}

/// One occurrence of a pattern in a sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hit {
    /// Half-open span of the match in the sequence
    pub range: Range<usize>,

    /// Sequence positions aligned to `n` in the matching orientation
    pub wildcard_positions: Vec<usize>,

    /// Sequence positions aligned to a base or ambiguity code
    pub nonwildcard_positions: Vec<usize>,

    /// Matched text, lower-case, as it reads on the scanned strand
    pub matched: String,

    /// Forward when the pattern matched, reverse when its reverse complement did
    pub strand: Strand,
}

/// Result of scanning one sequence collection with one pattern
#[derive(Debug, Clone, Default)]
pub struct IndexResult {
    /// Sequences scanned
    pub n_seqs: usize,

    /// Sequences with at least one hit
    pub n_hit_seqs: usize,

    /// Total hits across all sequences
    pub n_hit_sites: usize,

    /// Hits per sequence id; only sequences with a hit appear
    pub hits: BTreeMap<SequenceId, Vec<Hit>>,
}

impl IndexResult {
    /// Fraction of sequences hit. `None` when nothing was scanned.
    #[must_use]
    pub fn support(&self) -> Option<f64> {
        if self.n_seqs == 0 {
            None
        } else {
            Some(count_to_f64(self.n_hit_seqs) / count_to_f64(self.n_seqs))
        }
    }

    /// All hits in sequence-id order
    pub fn iter_hits(&self) -> impl Iterator<Item = (SequenceId, &Hit)> {
        self.hits
            .iter()
            .flat_map(|(&id, hits)| hits.iter().map(move |h| (id, h)))
    }
}

/// Positive- and negative-set results for one pattern
#[derive(Debug, Clone, Default)]
pub struct MatchIndex {
    pub positive: IndexResult,
    pub negative: IndexResult,
}

/// Compiled matcher for a pattern and, optionally, its reverse complement.
///
/// Both orientations share one alternation so a scan is a single
/// non-overlapping left-to-right pass; where both match at the same start the
/// forward orientation wins.
pub struct Matcher {
    regex: Regex,
    forward: Vec<Symbol>,
    reverse: Vec<Symbol>,
}

impl Matcher {
    /// Build a matcher for `symbols`.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::EmptyPattern` for an empty pattern or
    /// `IndexError::Matcher` if the expression cannot be compiled.
    pub fn new(symbols: &[Symbol], reverse_complement: bool) -> Result<Self, IndexError> {
        if symbols.is_empty() {
            return Err(IndexError::EmptyPattern);
        }

        let reverse = reverse_complement_symbols(symbols);
        let expression = if reverse_complement {
            format!("({})|({})", expand_symbols(symbols), expand_symbols(&reverse))
        } else {
            format!("({})", expand_symbols(symbols))
        };

        let regex = RegexBuilder::new(&expression)
            .case_insensitive(true)
            .build()
            .map_err(|source| IndexError::Matcher {
                pattern: symbols_to_string(symbols),
                source,
            })?;

        Ok(Self {
            regex,
            forward: symbols.to_vec(),
            reverse,
        })
    }

    /// Non-overlapping hits in `sequence`, left to right
    pub fn find_hits(&self, sequence: &str) -> Vec<Hit> {
        self.regex
            .captures_iter(sequence)
            .filter_map(|caps| {
                let (m, strand, symbols) = if let Some(m) = caps.get(1) {
                    (m, Strand::Forward, &self.forward)
                } else {
                    (caps.get(2)?, Strand::Reverse, &self.reverse)
                };

                let mut wildcard_positions = Vec::new();
                let mut nonwildcard_positions = Vec::new();
                for (offset, symbol) in symbols.iter().enumerate() {
                    if symbol.is_wildcard() {
                        wildcard_positions.push(m.start() + offset);
                    } else {
                        nonwildcard_positions.push(m.start() + offset);
                    }
                }

                Some(Hit {
                    range: m.range(),
                    wildcard_positions,
                    nonwildcard_positions,
                    matched: m.as_str().to_ascii_lowercase(),
                    strand,
                })
            })
            .collect()
    }
}

/// Scan `sequences` with a pattern, recording every hit.
///
/// Sequence ids are assigned 1, 2, ... in iteration order.
///
/// # Errors
///
/// Returns `IndexError::EmptyInput` when `sequences` yields nothing, or a
/// matcher construction error.
pub fn index_sequences<'a, I>(
    symbols: &[Symbol],
    sequences: I,
    reverse_complement: bool,
) -> Result<IndexResult, IndexError>
where
    I: IntoIterator<Item = &'a str>,
{
    let matcher = Matcher::new(symbols, reverse_complement)?;
    let mut result = IndexResult::default();

    for (i, sequence) in sequences.into_iter().enumerate() {
        let seq_id = i + 1;
        result.n_seqs = seq_id;

        let hits = matcher.find_hits(sequence);
        if hits.is_empty() {
            continue;
        }
        result.n_hit_seqs += 1;
        result.n_hit_sites += hits.len();
        result.hits.insert(seq_id, hits);
    }

    if result.n_seqs == 0 {
        return Err(IndexError::EmptyInput);
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::symbol::parse_symbols;

    fn index(pattern: &str, seqs: &[&str], rc: bool) -> IndexResult {
        let symbols = parse_symbols(pattern).unwrap();
        index_sequences(&symbols, seqs.iter().copied(), rc).unwrap()
    }

    #[test]
    fn test_single_forward_hit() {
        let result = index("atcg", &["AAATCGAAA"], false);
        assert_eq!(result.n_seqs, 1);
        assert_eq!(result.n_hit_seqs, 1);
        assert_eq!(result.n_hit_sites, 1);

        let hit = &result.hits[&1][0];
        assert_eq!(hit.range, 2..6);
        assert_eq!(hit.matched, "atcg");
        assert_eq!(hit.strand, Strand::Forward);
        assert_eq!(hit.nonwildcard_positions, vec![2, 3, 4, 5]);
        assert!(hit.wildcard_positions.is_empty());
    }

    #[test]
    fn test_no_hits_leaves_map_empty() {
        let result = index("atcg", &["GGGGGGGGG"], false);
        assert_eq!(result.n_seqs, 1);
        assert_eq!(result.n_hit_seqs, 0);
        assert!(result.hits.is_empty());
        assert!((result.support().unwrap() - 0.0).abs() < 1e-12);
    }

    #[test]
    fn test_wildcard_positions() {
        let result = index("anc", &["ttagcaa"], false);
        let hit = &result.hits[&1][0];
        assert_eq!(hit.range, 2..5);
        assert_eq!(hit.matched, "agc");
        assert_eq!(hit.wildcard_positions, vec![3]);
        assert_eq!(hit.nonwildcard_positions, vec![2, 4]);
    }

    #[test]
    fn test_ambiguity_code_is_not_wildcard() {
        let result = index("aw", &["at", "aa", "ac"], false);
        assert_eq!(result.n_hit_seqs, 2);
        let hit = &result.hits[&1][0];
        assert_eq!(hit.nonwildcard_positions, vec![0, 1]);
    }

    #[test]
    fn test_reverse_complement_hits() {
        // reverse complement of aacg is cgtt
        let result = index("aacg", &["ttcgttaa"], true);
        assert_eq!(result.n_hit_seqs, 1);
        let hit = &result.hits[&1][0];
        assert_eq!(hit.range, 2..6);
        assert_eq!(hit.matched, "cgtt");
        assert_eq!(hit.strand, Strand::Reverse);

        // Disabled complement awareness sees nothing
        let result = index("aacg", &["ttcgttaa"], false);
        assert_eq!(result.n_hit_seqs, 0);
    }

    #[test]
    fn test_reverse_wildcard_positions_follow_orientation() {
        // ann reverse-complemented is nnt: wildcards lead
        let result = index("ann", &["gggt"], true);
        let hit = &result.hits[&1][0];
        assert_eq!(hit.strand, Strand::Reverse);
        assert_eq!(hit.range, 1..4);
        assert_eq!(hit.wildcard_positions, vec![1, 2]);
        assert_eq!(hit.nonwildcard_positions, vec![3]);
    }

    #[test]
    fn test_palindrome_reports_forward() {
        let result = index("acgt", &["acgt"], true);
        assert_eq!(result.n_hit_sites, 1);
        assert_eq!(result.hits[&1][0].strand, Strand::Forward);
    }

    #[test]
    fn test_multiple_non_overlapping_hits() {
        let result = index("aa", &["aaaaa", "caac", "gggg"], false);
        assert_eq!(result.n_seqs, 3);
        assert_eq!(result.n_hit_seqs, 2);
        // aaaaa yields [0,2) and [2,4) only
        assert_eq!(result.hits[&1].len(), 2);
        assert_eq!(result.hits[&1][1].range, 2..4);
        assert_eq!(result.n_hit_sites, 3);
        assert!(!result.hits.contains_key(&3));
    }

    #[test]
    fn test_matched_length_equals_pattern_length() {
        let result = index("annt", &["acgtaggtttaact"], true);
        for (_, hit) in result.iter_hits() {
            assert_eq!(hit.matched.len(), 4);
            assert_eq!(hit.range.len(), 4);
        }
    }

    #[test]
    fn test_empty_input() {
        let symbols = parse_symbols("acgt").unwrap();
        let err = index_sequences(&symbols, std::iter::empty(), true).unwrap_err();
        assert!(matches!(err, IndexError::EmptyInput));
    }

    #[test]
    fn test_empty_pattern() {
        let err = index_sequences(&[], ["acgt"], false).unwrap_err();
        assert!(matches!(err, IndexError::EmptyPattern));
    }
}
