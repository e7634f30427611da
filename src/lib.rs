//! # rank-motif
//!
//! A library for ranking, de-duplicating and clustering degenerate nucleotide
//! motifs.
//!
//! Given a list of short patterns over the nucleotide alphabet (bases, the
//! `n` wildcard and the two-base IUPAC ambiguity codes), a positive sequence
//! set and a negative sequence set, `rank-motif` finds the patterns that best
//! separate the two sets and collapses redundant ones into representative
//! clusters.
//!
//! ## Pipeline
//!
//! 1. **Indexing**: every pattern is matched against both sets, optionally on
//!    both strands
//! 2. **Scoring**: preferential occurrence, position overlap and optional
//!    occupancy/conservation factors are combined into one composite score
//! 3. **Clustering**: ranked patterns are grouped by the similarity of their
//!    position frequency matrices
//! 4. **Merging**: each cluster is folded into a degenerate consensus pattern
//!    with its own PFM
//!
//! ## Example
//!
//! ```rust
//! use rank_motif::{ClusterConfig, ClusterEngine, Pattern, PatternCatalog, ScoringEngine, SequenceSet};
//! use rank_motif::scoring::engine::ScoringOptions;
//!
//! let positive = SequenceSet::from_sequences(["ttacgtaa", "ccacgtgg"]).unwrap();
//! let negative = SequenceSet::from_sequences(["gggggggg", "ccacctgg"]).unwrap();
//!
//! let mut catalog = PatternCatalog::new(true);
//! catalog.add(Pattern::new("acgt").unwrap());
//! catalog.add(Pattern::new("acnt").unwrap());
//! catalog.build_all(&positive, &negative).unwrap();
//!
//! let report = ScoringEngine::new(ScoringOptions::default()).score(&catalog);
//! for (id, score) in report.scores.ranked() {
//!     println!("{}: {:.3}", catalog.get(id).unwrap().sequence, score);
//! }
//!
//! let clustering = ClusterEngine::new(&catalog, ClusterConfig::default())
//!     .run(&report.scores)
//!     .unwrap();
//! assert!(!clustering.clusters.is_empty());
//! ```
//!
//! ## Modules
//!
//! - [`core`]: Symbols, patterns and sequence sets
//! - [`catalog`]: Pattern matching and the de-duplicated pattern catalog
//! - [`scoring`]: Composite pattern scores
//! - [`clustering`]: PFMs, clustering and consensus merging
//! - [`parsing`]: Parsers for FASTA, pattern lists, score tables and PFM files
//! - [`cli`]: Command-line interface implementation

pub mod catalog;
pub mod cli;
pub mod clustering;
pub mod core;
pub mod parsing;
pub mod scoring;
pub mod utils;

// Re-export commonly used types for convenience
pub use catalog::store::PatternCatalog;
pub use clustering::engine::{ClusterConfig, ClusterEngine};
pub use core::pattern::Pattern;
pub use core::sequence::SequenceSet;
pub use core::types::*;
pub use scoring::engine::ScoringEngine;
