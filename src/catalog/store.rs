use std::collections::HashMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::catalog::index::{index_sequences, IndexError, MatchIndex};
use crate::core::pattern::Pattern;
use crate::core::sequence::SequenceSet;
use crate::core::types::PatternId;

/// A stage of the per-pattern pipeline, used when reporting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Indexing,
    Scoring,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Indexing => write!(f, "indexing"),
            Self::Scoring => write!(f, "scoring"),
        }
    }
}

/// A failure isolated to a single pattern
#[derive(Debug)]
pub struct PatternFailure {
    pub pattern: String,
    pub stage: Stage,
    pub error: anyhow::Error,
}

/// The de-duplicated set of patterns for a run.
///
/// Patterns live in an arena indexed by [`PatternId`], in insertion order.
/// With complement awareness, a pattern whose reverse complement is already
/// present replaces that entry in place and keeps its key.
#[derive(Debug, Default)]
pub struct PatternCatalog {
    reverse_complement: bool,

    patterns: Vec<Pattern>,

    /// Canonical key of each slot, parallel to `patterns`
    keys: Vec<String>,

    /// Index: canonical key -> slot
    key_to_id: HashMap<String, PatternId>,
}

impl PatternCatalog {
    #[must_use]
    pub fn new(reverse_complement: bool) -> Self {
        Self {
            reverse_complement,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn reverse_complement(&self) -> bool {
        self.reverse_complement
    }

    /// Insert a pattern, returning its slot.
    ///
    /// The most recently added pattern wins a key collision.
    pub fn add(&mut self, pattern: Pattern) -> PatternId {
        let existing = if self.reverse_complement {
            self.key_to_id
                .get(&pattern.reverse_complement())
                .or_else(|| self.key_to_id.get(&pattern.sequence))
        } else {
            self.key_to_id.get(&pattern.sequence)
        };

        if let Some(&id) = existing {
            debug!(
                "Pattern {} replaces {} under key {}",
                pattern.sequence, self.patterns[id.0].sequence, self.keys[id.0]
            );
            self.patterns[id.0] = pattern;
            return id;
        }

        let id = PatternId(self.patterns.len());
        self.key_to_id.insert(pattern.sequence.clone(), id);
        self.keys.push(pattern.sequence.clone());
        self.patterns.push(pattern);
        id
    }

    #[must_use]
    pub fn get(&self, id: PatternId) -> Option<&Pattern> {
        self.patterns.get(id.0)
    }

    /// Canonical key of a slot
    #[must_use]
    pub fn key(&self, id: PatternId) -> Option<&str> {
        self.keys.get(id.0).map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Patterns with their ids, in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (PatternId, &Pattern)> {
        self.patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (PatternId(i), p))
    }

    /// Index every pattern against the positive and negative sets.
    ///
    /// Patterns are indexed independently (in parallel); a pattern that fails
    /// is left without a match index and reported, the others are unaffected.
    ///
    /// # Errors
    ///
    /// Returns `IndexError::EmptyInput` if either set is empty.
    pub fn build_all(
        &mut self,
        positive: &SequenceSet,
        negative: &SequenceSet,
    ) -> Result<Vec<PatternFailure>, IndexError> {
        if positive.is_empty() || negative.is_empty() {
            return Err(IndexError::EmptyInput);
        }

        info!(
            "Indexing {} patterns against {} positive and {} negative sequences",
            self.patterns.len(),
            positive.len(),
            negative.len()
        );

        let reverse_complement = self.reverse_complement;
        let failures: Vec<PatternFailure> = self
            .patterns
            .par_iter_mut()
            .filter_map(|pattern| {
                let built = index_sequences(
                    &pattern.symbols,
                    positive.sequences(),
                    reverse_complement,
                )
                .and_then(|pos| {
                    let neg =
                        index_sequences(&pattern.symbols, negative.sequences(), reverse_complement)?;
                    Ok(MatchIndex {
                        positive: pos,
                        negative: neg,
                    })
                });

                match built {
                    Ok(index) => {
                        pattern.match_index = Some(index);
                        None
                    }
                    Err(e) => {
                        pattern.match_index = None;
                        Some(PatternFailure {
                            pattern: pattern.sequence.clone(),
                            stage: Stage::Indexing,
                            error: e.into(),
                        })
                    }
                }
            })
            .collect();

        Ok(failures)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pattern(s: &str) -> Pattern {
        Pattern::new(s).unwrap()
    }

    #[test]
    fn test_add_distinct() {
        let mut catalog = PatternCatalog::new(true);
        let a = catalog.add(pattern("aacg"));
        let b = catalog.add(pattern("ggta"));
        assert_eq!(a, PatternId(0));
        assert_eq!(b, PatternId(1));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_reverse_complement_replaces_in_place() {
        let mut catalog = PatternCatalog::new(true);
        catalog.add(pattern("aacg"));
        catalog.add(pattern("tttt"));
        // cgtt is the reverse complement of aacg
        let id = catalog.add(pattern("CGTT"));

        assert_eq!(id, PatternId(0));
        assert_eq!(catalog.len(), 2);
        assert_eq!(catalog.key(id), Some("aacg"));
        assert_eq!(catalog.get(id).unwrap().sequence, "cgtt");

        let order: Vec<&str> = catalog.iter().map(|(_, p)| p.sequence.as_str()).collect();
        assert_eq!(order, vec!["cgtt", "tttt"]);
    }

    #[test]
    fn test_without_complement_awareness_keeps_both() {
        let mut catalog = PatternCatalog::new(false);
        catalog.add(pattern("aacg"));
        catalog.add(pattern("cgtt"));
        assert_eq!(catalog.len(), 2);

        // exact duplicates still collapse
        catalog.add(pattern("AACG"));
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_build_all() {
        let mut catalog = PatternCatalog::new(false);
        catalog.add(pattern("atcg"));
        catalog.add(pattern("gggg"));

        let positive = SequenceSet::from_sequences(["AAATCGAAA"]).unwrap();
        let negative = SequenceSet::from_sequences(["GGGGGGGGG"]).unwrap();
        let failures = catalog.build_all(&positive, &negative).unwrap();
        assert!(failures.is_empty());

        let atcg = catalog.get(PatternId(0)).unwrap().match_index.as_ref().unwrap();
        assert_eq!(atcg.positive.n_hit_seqs, 1);
        assert_eq!(atcg.negative.n_hit_seqs, 0);

        let gggg = catalog.get(PatternId(1)).unwrap().match_index.as_ref().unwrap();
        assert_eq!(gggg.positive.n_hit_seqs, 0);
        assert_eq!(gggg.negative.n_hit_seqs, 1);
        assert_eq!(gggg.negative.n_hit_sites, 2);
    }

    #[test]
    fn test_build_all_empty_set() {
        let mut catalog = PatternCatalog::new(false);
        catalog.add(pattern("atcg"));
        let positive = SequenceSet::from_sequences(["acgt"]).unwrap();
        let err = catalog
            .build_all(&positive, &SequenceSet::default())
            .unwrap_err();
        assert!(matches!(err, IndexError::EmptyInput));
    }

    #[test]
    fn test_build_all_isolates_failures() {
        let mut catalog = PatternCatalog::new(false);
        catalog.add(Pattern::from_symbols(Vec::new()));
        catalog.add(pattern("acgt"));

        let set = SequenceSet::from_sequences(["acgt"]).unwrap();
        let failures = catalog.build_all(&set, &set).unwrap();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].stage, Stage::Indexing);
        assert!(catalog.get(PatternId(0)).unwrap().match_index.is_none());
        assert!(catalog.get(PatternId(1)).unwrap().match_index.is_some());
    }
}
