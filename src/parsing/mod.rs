//! Parsers for the tool's input files.
//!
//! This module provides parsers for:
//!
//! - **FASTA files**: positive and negative sequence sets, plain or gzip
//! - **Pattern lists**: one degenerate pattern per line
//! - **Score tables**: nucleosome-occupancy and conservation scores
//! - **PFM files**: position frequency matrices as written by `rank`
//!
//! ## Example
//!
//! ```rust,no_run
//! use rank_motif::parsing::fasta::parse_fasta_file;
//! use rank_motif::parsing::patterns::parse_pattern_file;
//! use std::path::Path;
//!
//! let positive = parse_fasta_file(Path::new("positive.fa")).unwrap();
//! let patterns = parse_pattern_file(Path::new("patterns.txt")).unwrap();
//! println!("{} sequences, {} patterns", positive.len(), patterns.len());
//! ```
//!
//! ## Score table columns
//!
//! Tab-separated, at least five fields per row:
//!
//! | Field | Description |
//! |-------|-------------|
//! | 0 | Sequence id, 1-based in FASTA order |
//! | 1 | Position, 1-based |
//! | 4 | Score |

use thiserror::Error;

use crate::core::symbol::SymbolError;

pub mod fasta;
pub mod patterns;
pub mod pfm;
pub mod score_table;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("noodles error: {0}")]
    Noodles(String),

    #[error("Invalid sequence '{record}': {source}")]
    InvalidSymbol {
        record: String,
        #[source]
        source: SymbolError,
    },

    #[error("Too many records: {0} reached the maximum allowed")]
    TooManyRecords(usize),
}
