use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::catalog::index::IndexError;
use crate::catalog::store::PatternCatalog;
use crate::clustering::merge::MergeError;
use crate::clustering::pfm::{similarity, Pfm, PfmError};
use crate::core::pattern::Pattern;
use crate::core::types::{ClusterId, PatternId};
use crate::scoring::engine::ScoreMap;

#[derive(Error, Debug)]
pub enum ClusterError {
    #[error("Ranked pattern {0} is not in the catalog")]
    UnknownPattern(PatternId),

    #[error("Pattern '{0}' has no match index")]
    NotIndexed(String),

    #[error("Failed to build PFM for pattern '{pattern}': {source}")]
    Pfm {
        pattern: String,
        #[source]
        source: PfmError,
    },

    #[error("Failed to merge cluster {cluster}: {source}")]
    Merge {
        cluster: ClusterId,
        #[source]
        source: MergeError,
    },

    #[error("Failed to index consensus pattern '{pattern}': {source}")]
    Index {
        pattern: String,
        #[source]
        source: IndexError,
    },
}

/// Clustering limits and PFM-similarity settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterConfig {
    /// Maximum number of clusters opened
    pub max_clusters: usize,

    /// Maximum members per cluster, seed included
    pub max_patterns_per_cluster: usize,

    /// Minimum PFM similarity to the seed for a pattern to join
    pub similarity_threshold: f64,

    /// Maximum PFM alignment window; `None` derives it from the matrices
    pub max_window: Option<usize>,

    /// GC fraction of the background columns padding PFM alignments
    pub background_gc: f64,

    /// Also compare each candidate's reverse-complement PFM
    pub reverse_complement: bool,
}

impl Default for ClusterConfig {
    fn default() -> Self {
        Self {
            max_clusters: 5,
            max_patterns_per_cluster: 5,
            similarity_threshold: 0.8,
            max_window: None,
            background_gc: 0.5,
            reverse_complement: true,
        }
    }
}

/// Clustering state of one ranked pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assignment {
    Unassigned,
    AssignedTo(ClusterId),
}

/// A group of similar patterns: seed first, then members in rank order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub id: ClusterId,
    pub members: Vec<PatternId>,
}

impl Cluster {
    #[must_use]
    pub fn seed(&self) -> PatternId {
        self.members[0]
    }
}

/// Outcome of a clustering pass
#[derive(Debug, Clone)]
pub struct Clustering {
    pub clusters: Vec<Cluster>,

    /// Final state of every ranked pattern, in rank order
    pub assignments: Vec<(PatternId, Assignment)>,
}

/// Greedy clustering of ranked patterns by PFM similarity.
///
/// The highest-ranked unassigned pattern seeds a cluster; every lower-ranked
/// unassigned pattern whose PFM is similar enough to the seed's joins it until
/// the cluster is full. This repeats until the ranking is exhausted or the
/// cluster cap is reached.
pub struct ClusterEngine<'a> {
    catalog: &'a PatternCatalog,
    config: ClusterConfig,
    pfms: HashMap<PatternId, Pfm>,
}

impl<'a> ClusterEngine<'a> {
    #[must_use]
    pub fn new(catalog: &'a PatternCatalog, config: ClusterConfig) -> Self {
        Self {
            catalog,
            config,
            pfms: HashMap::new(),
        }
    }

    /// Cluster the patterns of `scores` by descending composite score.
    ///
    /// # Errors
    ///
    /// Returns a `ClusterError` if a ranked pattern is missing from the
    /// catalog or its PFM cannot be built. Any error aborts the pass.
    pub fn run(&mut self, scores: &ScoreMap) -> Result<Clustering, ClusterError> {
        let ranked: Vec<PatternId> = scores.ranked().into_iter().map(|(id, _)| id).collect();
        let mut states = vec![Assignment::Unassigned; ranked.len()];
        let mut clusters: Vec<Cluster> = Vec::new();
        let capacity = self.config.max_patterns_per_cluster.max(1);

        info!(
            "Clustering {} ranked patterns (max {} clusters of {})",
            ranked.len(),
            self.config.max_clusters,
            capacity
        );

        for seed_rank in 0..ranked.len() {
            if states[seed_rank] != Assignment::Unassigned {
                continue;
            }
            if clusters.len() >= self.config.max_clusters {
                break;
            }

            let cluster_id = ClusterId(clusters.len() + 1);
            let seed = ranked[seed_rank];
            states[seed_rank] = Assignment::AssignedTo(cluster_id);
            let mut members = vec![seed];

            for rank in (seed_rank + 1)..ranked.len() {
                if members.len() >= capacity {
                    break;
                }
                if states[rank] != Assignment::Unassigned {
                    continue;
                }

                let candidate = ranked[rank];
                let score = self.similarity(seed, candidate)?;
                if score >= self.config.similarity_threshold {
                    debug!("Pattern {} joins cluster {} ({:.3})", candidate, cluster_id, score);
                    states[rank] = Assignment::AssignedTo(cluster_id);
                    members.push(candidate);
                }
            }

            info!("Cluster {} has {} patterns", cluster_id, members.len());
            clusters.push(Cluster {
                id: cluster_id,
                members,
            });
        }

        Ok(Clustering {
            clusters,
            assignments: ranked.into_iter().zip(states).collect(),
        })
    }

    fn similarity(&mut self, seed: PatternId, candidate: PatternId) -> Result<f64, ClusterError> {
        self.ensure_pfm(seed)?;
        self.ensure_pfm(candidate)?;
        let (a, b) = (&self.pfms[&seed], &self.pfms[&candidate]);
        let result = similarity(
            a,
            b,
            self.config.background_gc,
            self.config.max_window,
            self.config.reverse_complement,
        )
        .map_err(|source| ClusterError::Pfm {
            pattern: self.sequence(candidate),
            source,
        })?;
        Ok(result.score)
    }

    fn ensure_pfm(&mut self, id: PatternId) -> Result<(), ClusterError> {
        if !self.pfms.contains_key(&id) {
            let pattern = self.catalog.get(id).ok_or(ClusterError::UnknownPattern(id))?;
            let pfm = pattern_pfm(pattern)?;
            self.pfms.insert(id, pfm);
        }
        Ok(())
    }

    fn sequence(&self, id: PatternId) -> String {
        self.catalog
            .get(id)
            .map_or_else(|| id.to_string(), |p| p.sequence.clone())
    }
}

/// PFM of a pattern's strand-corrected matches in the positive set
///
/// # Errors
///
/// Returns `ClusterError::NotIndexed` for a pattern without a match index or
/// `ClusterError::Pfm` if it has no usable matches.
pub fn pattern_pfm(pattern: &Pattern) -> Result<Pfm, ClusterError> {
    let index = pattern
        .match_index
        .as_ref()
        .ok_or_else(|| ClusterError::NotIndexed(pattern.sequence.clone()))?;
    Pfm::from_matches(
        index
            .positive
            .iter_hits()
            .map(|(_, hit)| (hit.strand, hit.matched.as_str())),
    )
    .map_err(|source| ClusterError::Pfm {
        pattern: pattern.sequence.clone(),
        source,
    })
}
