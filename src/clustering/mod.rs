//! Clustering of ranked patterns.
//!
//! - [`engine`]: greedy seed-and-grow clustering over the ranked patterns,
//!   comparing position frequency matrices
//! - [`pfm`]: PFM construction and the offset/orientation similarity search
//! - [`merge`]: folding a cluster's patterns into one degenerate consensus
//! - [`report`]: per-cluster consensus sites, support and final PFM

pub mod engine;
pub mod merge;
pub mod pfm;
pub mod report;
