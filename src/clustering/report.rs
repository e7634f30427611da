use std::collections::HashSet;

use serde::Serialize;
use tracing::debug;

use crate::catalog::index::index_sequences;
use crate::catalog::store::PatternCatalog;
use crate::clustering::engine::{Cluster, ClusterError};
use crate::clustering::merge::{merge, MergedMember};
use crate::clustering::pfm::Pfm;
use crate::core::pattern::Pattern;
use crate::core::sequence::SequenceSet;
use crate::core::symbol::Symbol;
use crate::core::types::{ClusterId, Strand};

/// A cluster member with its orientation relative to the consensus
#[derive(Debug, Clone, Serialize)]
pub struct MemberSummary {
    pub sequence: String,
    pub strand: Strand,

    /// Fraction of positive sequences hit
    pub support: f64,
}

/// A consensus-pattern site in the positive set
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SiteMatch {
    /// Name of the positive-set record
    pub gene_name: String,

    /// 0-based start of the match
    pub start: usize,

    /// Matched text as it reads on the scanned strand
    pub sequence: String,

    pub strand: Strand,
}

/// Everything written for one cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterSummary {
    pub id: ClusterId,

    /// Members in cluster order, seed first
    pub members: Vec<MemberSummary>,

    pub consensus: String,
    pub consensus_support: f64,

    pub matches: Vec<SiteMatch>,

    /// PFM of the members' strand-corrected sites in the consensus frame
    pub pfm: Pfm,
}

/// Merge every cluster and collect its consensus matches and PFM.
///
/// Nothing is returned unless every cluster succeeds.
///
/// # Errors
///
/// Returns a `ClusterError` if a cluster cannot be merged, its consensus
/// cannot be indexed, or its members have no sites to build a PFM from.
pub fn summarize_clusters(
    clusters: &[Cluster],
    catalog: &PatternCatalog,
    positive: &SequenceSet,
) -> Result<Vec<ClusterSummary>, ClusterError> {
    clusters
        .iter()
        .map(|cluster| summarize(cluster, catalog, positive))
        .collect()
}

fn summarize(
    cluster: &Cluster,
    catalog: &PatternCatalog,
    positive: &SequenceSet,
) -> Result<ClusterSummary, ClusterError> {
    let reverse_complement = catalog.reverse_complement();
    let patterns = cluster
        .members
        .iter()
        .map(|&id| catalog.get(id).ok_or(ClusterError::UnknownPattern(id)))
        .collect::<Result<Vec<&Pattern>, _>>()?;

    let consensus = merge(&patterns, reverse_complement).map_err(|source| ClusterError::Merge {
        cluster: cluster.id,
        source,
    })?;

    let members = patterns
        .iter()
        .zip(&consensus.members)
        .map(|(pattern, merged)| {
            let support = pattern
                .positive_support()
                .ok_or_else(|| ClusterError::NotIndexed(pattern.sequence.clone()))?;
            Ok(MemberSummary {
                sequence: pattern.sequence.clone(),
                strand: merged.strand,
                support,
            })
        })
        .collect::<Result<Vec<_>, ClusterError>>()?;

    let consensus_text = consensus.pattern.sequence.clone();
    let index = index_sequences(
        &consensus.pattern.symbols,
        positive.sequences(),
        reverse_complement,
    )
    .map_err(|source| ClusterError::Index {
        pattern: consensus_text.clone(),
        source,
    })?;

    let matches: Vec<SiteMatch> = index
        .iter_hits()
        .map(|(seq_id, hit)| SiteMatch {
            gene_name: positive
                .get(seq_id)
                .map_or_else(|| seq_id.to_string(), |r| r.name.clone()),
            start: hit.range.start,
            sequence: hit.matched.clone(),
            strand: hit.strand,
        })
        .collect();

    let sites = member_sites(&patterns, &consensus.members, consensus.pattern.len(), positive)?;
    let pfm = Pfm::from_sequences(&sites).map_err(|source| ClusterError::Pfm {
        pattern: consensus_text.clone(),
        source,
    })?;

    debug!(
        "Cluster {}: consensus {} with {} matches, PFM from {} member sites",
        cluster.id,
        consensus_text,
        matches.len(),
        sites.len()
    );

    Ok(ClusterSummary {
        id: cluster.id,
        members,
        consensus: consensus_text,
        consensus_support: index.support().unwrap_or(0.0),
        matches,
        pfm,
    })
}

/// Consensus-frame text of every distinct positive-set site of the members.
///
/// Each member hit is placed at the member's merge offset and strand, so
/// sites found by several members count once. Columns running past either
/// end of the sequence read as `n` and are left out of the PFM counts.
fn member_sites(
    patterns: &[&Pattern],
    merged: &[MergedMember],
    width: usize,
    positive: &SequenceSet,
) -> Result<Vec<String>, ClusterError> {
    let mut seen = HashSet::new();
    let mut sites = Vec::new();

    for (pattern, member) in patterns.iter().zip(merged) {
        let index = pattern
            .match_index
            .as_ref()
            .ok_or_else(|| ClusterError::NotIndexed(pattern.sequence.clone()))?;

        for (seq_id, hit) in index.positive.iter_hits() {
            let strand = hit.strand.compose(member.strand);
            let offset = signed(member.offset);
            // forward: column c sits at anchor + c; reverse: at anchor - 1 - c
            let anchor = match strand {
                Strand::Forward => signed(hit.range.start) - offset,
                Strand::Reverse => signed(hit.range.end) + offset,
            };
            if !seen.insert((seq_id, strand, anchor)) {
                continue;
            }
            let Some(record) = positive.get(seq_id) else {
                continue;
            };
            sites.push(site_text(record.sequence.as_bytes(), strand, anchor, width));
        }
    }

    Ok(sites)
}

fn site_text(sequence: &[u8], strand: Strand, anchor: isize, width: usize) -> String {
    (0..signed(width))
        .map(|column| {
            let pos = match strand {
                Strand::Forward => anchor + column,
                Strand::Reverse => anchor - 1 - column,
            };
            let base = usize::try_from(pos)
                .ok()
                .and_then(|p| sequence.get(p))
                .and_then(|&b| Symbol::from_byte(b, 0).ok());
            let base = match strand {
                Strand::Forward => base,
                Strand::Reverse => base.map(Symbol::complement),
            };
            base.map_or('n', Symbol::to_char)
        })
        .collect()
}

fn signed(n: usize) -> isize {
    isize::try_from(n).unwrap_or(isize::MAX)
}
