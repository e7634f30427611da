//! Command-line interface for rank-motif.
//!
//! This module implements the CLI using clap. Available commands:
//!
//! - **rank**: Score, cluster and merge a pattern list against positive and
//!   negative sequence sets, writing result files to an output directory
//! - **compare**: Compute the similarity of two PFM files
//!
//! ## Usage
//!
//! ```text
//! # Rank patterns and write results to out/
//! rank-motif rank --pset pos.fa --nset neg.fa --plist patterns.txt --seqtype dna --out out
//!
//! # Add nucleosome-occupancy scores and emit a JSON summary
//! rank-motif rank --pset pos.fa --nset neg.fa --plist patterns.txt --seqtype dna \
//!     --out out --oc occupancy.tsv --format json
//!
//! # Compare two cluster PFMs, allowing the reverse complement
//! rank-motif compare out/cluster_1.pfm.txt out/cluster_2.pfm.txt --gc 0.42 -r
//! ```

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub mod compare;
pub mod rank;

#[derive(Parser)]
#[command(name = "rank-motif")]
#[command(author = "Fulcrum Genomics")]
#[command(version)]
#[command(about = "Rank, de-duplicate and cluster degenerate nucleotide motifs")]
#[command(
    long_about = "rank-motif ranks a list of degenerate nucleotide patterns by how well they separate a positive sequence set from a negative one.\n\nThe top patterns are then grouped by the similarity of their position frequency matrices, and each group is merged into a consensus pattern with its own PFM."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format of the summary printed to stdout
    #[arg(short, long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Write log messages to this file instead of stderr
    #[arg(long, global = true, value_name = "FILE")]
    pub log: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Rank and cluster a pattern list
    Rank(rank::RankArgs),

    /// Compute the similarity of two PFM files
    Compare(compare::CompareArgs),
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}
