//! Core data types for motif ranking.
//!
//! This module provides the fundamental types used throughout the library:
//!
//! - [`Symbol`](symbol::Symbol): One position of a pattern: a base, the `n` wildcard
//!   or a two-base ambiguity code
//! - [`Pattern`](pattern::Pattern): A degenerate nucleotide query with its match index
//! - [`SequenceSet`](sequence::SequenceSet): The positive or negative sequence collection
//! - [`Strand`](types::Strand), [`PatternId`](types::PatternId),
//!   [`ClusterId`](types::ClusterId): Identifiers and orientation
//!
//! ## Alphabet
//!
//! | Symbol | Bases | Complement |
//! |--------|-------|------------|
//! | a, t, c, g | itself | t, a, g, c |
//! | n | any | n |
//! | w | A/T | w |
//! | s | C/G | s |
//! | m | A/C | k |
//! | k | G/T | m |
//! | r | A/G | y |
//! | y | C/T | r |
//!
//! Only `n` is a wildcard. Ambiguity codes count as non-wildcard positions
//! for position scoring.

pub mod pattern;
pub mod sequence;
pub mod symbol;
pub mod types;
