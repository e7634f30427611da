use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::catalog::store::{PatternCatalog, PatternFailure, Stage};
use crate::core::pattern::Pattern;
use crate::core::types::PatternId;
use crate::scoring::auxiliary::{conservation_score, occupancy_score, ScoreTable};
use crate::scoring::occurrence::preferential_occurrence;
use crate::scoring::position::PositionScoreMatrix;
use crate::scoring::ScoringError;

/// Integer exponents applied to the position, occupancy and conservation
/// factors. The preferential-occurrence z-score is never weighted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoringWeights {
    /// Exponent of the position-overlap factor
    pub sp: u32,
    /// Exponent of the nucleosome-occupancy factor
    pub sn: u32,
    /// Exponent of the conservation factor
    pub sc: u32,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self { sp: 1, sn: 1, sc: 1 }
    }
}

/// Configuration for the scoring engine
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScoringOptions {
    pub weights: ScoringWeights,

    /// Skip sequences whose id exceeds the pattern's hit-sequence count when
    /// computing the position-overlap factor
    pub seqmask: bool,
}

/// All factors of one pattern's score
#[derive(Debug, Clone, Serialize)]
pub struct PatternScore {
    pub id: PatternId,

    /// Preferential-occurrence z-score
    pub z_score: f64,

    /// Position-overlap factor before weighting
    pub position: f64,

    /// Nucleosome-occupancy factor before weighting, when a table was given
    pub occupancy: Option<f64>,

    /// Conservation factor before weighting, when a table was given
    pub conservation: Option<f64>,

    /// `z * sp^w_sp * sn^w_sn * sc^w_sc`
    pub composite: f64,
}

/// Composite scores of every successfully scored pattern, in catalog order
#[derive(Debug, Clone, Default)]
pub struct ScoreMap {
    entries: Vec<PatternScore>,
    slots: HashMap<PatternId, usize>,
}

impl ScoreMap {
    #[must_use]
    pub fn new(entries: Vec<PatternScore>) -> Self {
        let slots = entries.iter().enumerate().map(|(i, s)| (s.id, i)).collect();
        Self { entries, slots }
    }

    #[must_use]
    pub fn get(&self, id: PatternId) -> Option<&PatternScore> {
        self.slots.get(&id).and_then(|&i| self.entries.get(i))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PatternScore> {
        self.entries.iter()
    }

    /// Pattern ids by descending composite score; ties keep catalog order
    #[must_use]
    pub fn ranked(&self) -> Vec<(PatternId, f64)> {
        let mut ranked: Vec<(PatternId, f64)> =
            self.entries.iter().map(|s| (s.id, s.composite)).collect();
        ranked.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        ranked
    }
}

/// Scores plus the patterns that could not be scored
#[derive(Debug, Default)]
pub struct ScoringReport {
    pub scores: ScoreMap,
    pub failures: Vec<PatternFailure>,
}

/// Computes the composite score of every pattern in a catalog
pub struct ScoringEngine {
    options: ScoringOptions,
    occupancy: Option<ScoreTable>,
    conservation: Option<ScoreTable>,
}

impl ScoringEngine {
    #[must_use]
    pub fn new(options: ScoringOptions) -> Self {
        Self {
            options,
            occupancy: None,
            conservation: None,
        }
    }

    /// Add a raw nucleosome-occupancy table; it is min-max scaled per sequence
    #[must_use]
    pub fn with_occupancy(mut self, table: ScoreTable) -> Self {
        self.occupancy = Some(table.min_max_scaled());
        self
    }

    /// Add a conservation table, used unscaled
    #[must_use]
    pub fn with_conservation(mut self, table: ScoreTable) -> Self {
        self.conservation = Some(table);
        self
    }

    /// Score every pattern of the catalog.
    ///
    /// The position-score matrix is accumulated over all indexed patterns
    /// first, then read per pattern. A pattern whose statistics are undefined
    /// is reported in `failures` and left out of the score map.
    #[must_use]
    pub fn score(&self, catalog: &PatternCatalog) -> ScoringReport {
        info!("Scoring {} patterns", catalog.len());

        let matrix = PositionScoreMatrix::accumulate(catalog.iter().map(|(_, p)| p));

        let mut report = ScoringReport::default();
        let mut entries = Vec::with_capacity(catalog.len());
        for (id, pattern) in catalog.iter() {
            match self.score_pattern(id, pattern, &matrix) {
                Ok(score) => {
                    debug!(
                        "{}: z={:.4} sp={:.4} composite={:.4}",
                        pattern.sequence, score.z_score, score.position, score.composite
                    );
                    entries.push(score);
                }
                Err(e) => report.failures.push(PatternFailure {
                    pattern: pattern.sequence.clone(),
                    stage: Stage::Scoring,
                    error: e.into(),
                }),
            }
        }

        report.scores = ScoreMap::new(entries);
        report
    }

    fn score_pattern(
        &self,
        id: PatternId,
        pattern: &Pattern,
        matrix: &PositionScoreMatrix,
    ) -> Result<PatternScore, ScoringError> {
        let index = pattern.match_index.as_ref().ok_or(ScoringError::NotIndexed)?;
        let weights = self.options.weights;

        let z_score = preferential_occurrence(&index.positive, &index.negative)?;
        let position = matrix.score(&index.positive, pattern.n_nonwildcards, self.options.seqmask)?;
        let occupancy = self
            .occupancy
            .as_ref()
            .map(|table| occupancy_score(&index.positive, table))
            .transpose()?;
        let conservation = self
            .conservation
            .as_ref()
            .map(|table| conservation_score(&index.positive, table))
            .transpose()?;

        let composite = z_score
            * weighted(position, weights.sp)
            * occupancy.map_or(1.0, |s| weighted(s, weights.sn))
            * conservation.map_or(1.0, |s| weighted(s, weights.sc));

        Ok(PatternScore {
            id,
            z_score,
            position,
            occupancy,
            conservation,
            composite,
        })
    }
}

/// `factor^weight`; a weight of 0 gives 1
fn weighted(factor: f64, weight: u32) -> f64 {
    factor.powi(i32::try_from(weight).unwrap_or(i32::MAX))
}
