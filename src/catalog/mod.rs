//! Pattern catalog storage and match indexing.
//!
//! The catalog holds every pattern of a run, de-duplicated under reverse
//! complement equivalence when the sequences are double-stranded DNA. Each
//! pattern carries a [`MatchIndex`](index::MatchIndex) with its hits in the
//! positive and negative sets.
//!
//! ## Example
//!
//! ```rust
//! use rank_motif::catalog::store::PatternCatalog;
//! use rank_motif::core::pattern::Pattern;
//! use rank_motif::core::sequence::SequenceSet;
//!
//! let mut catalog = PatternCatalog::new(true);
//! catalog.add(Pattern::new("aacg").unwrap());
//! // reverse complement of aacg, replaces it
//! catalog.add(Pattern::new("cgtt").unwrap());
//! assert_eq!(catalog.len(), 1);
//!
//! let positive = SequenceSet::from_sequences(["ttaacgtt"]).unwrap();
//! let negative = SequenceSet::from_sequences(["gggggggg"]).unwrap();
//! let failures = catalog.build_all(&positive, &negative).unwrap();
//! assert!(failures.is_empty());
//! ```
//!
//! ## Matching
//!
//! Each pattern is compiled to a character-class expression (`n` becomes
//! `[acgt]`, `w` becomes `[at]`, ...). With complement awareness the reverse
//! complement is an alternative of the same expression, so each sequence is
//! scanned once, left to right, without overlapping hits.

pub mod index;
pub mod store;
