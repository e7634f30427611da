use serde::Serialize;
use thiserror::Error;

use crate::core::types::Strand;
use crate::utils::validation::count_to_f64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PfmError {
    #[error("Cannot build a PFM from no sequences")]
    EmptyInput,

    #[error("Sequence of length {found} does not fit a {expected}-column PFM")]
    LengthMismatch { expected: usize, found: usize },

    #[error("PFM column {0} has no observed base")]
    EmptyColumn(usize),
}

/// Row order of every PFM column
pub const BASES: [char; 4] = ['a', 't', 'c', 'g'];

fn base_row(base: u8) -> Option<usize> {
    match base.to_ascii_lowercase() {
        b'a' => Some(0),
        b't' => Some(1),
        b'c' => Some(2),
        b'g' => Some(3),
        _ => None,
    }
}

/// Position frequency matrix; each column holds A, T, C, G frequencies
/// summing to 1.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Pfm {
    columns: Vec<[f64; 4]>,
}

impl Pfm {
    /// Count bases per column and normalise each column by its total.
    ///
    /// # Errors
    ///
    /// Returns `PfmError::EmptyInput` for no sequences, `LengthMismatch` if the
    /// sequences differ in length, or `EmptyColumn` if some column has no A, C,
    /// G or T.
    pub fn from_sequences<S: AsRef<str>>(sequences: &[S]) -> Result<Self, PfmError> {
        let ncol = sequences
            .first()
            .map(|s| s.as_ref().len())
            .ok_or(PfmError::EmptyInput)?;
        if ncol == 0 {
            return Err(PfmError::EmptyInput);
        }

        let mut counts = vec![[0usize; 4]; ncol];
        for seq in sequences {
            let seq = seq.as_ref();
            if seq.len() != ncol {
                return Err(PfmError::LengthMismatch {
                    expected: ncol,
                    found: seq.len(),
                });
            }
            for (col, b) in seq.bytes().enumerate() {
                if let Some(row) = base_row(b) {
                    counts[col][row] += 1;
                }
            }
        }

        let columns = counts
            .into_iter()
            .enumerate()
            .map(|(i, c)| {
                let total: usize = c.iter().sum();
                if total == 0 {
                    return Err(PfmError::EmptyColumn(i));
                }
                let total = count_to_f64(total);
                Ok(c.map(|n| count_to_f64(n) / total))
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { columns })
    }

    /// Build from matched substrings, reverse-complementing reverse-strand
    /// matches first.
    ///
    /// # Errors
    ///
    /// See [`Pfm::from_sequences`].
    pub fn from_matches<'a, I>(matches: I) -> Result<Self, PfmError>
    where
        I: IntoIterator<Item = (Strand, &'a str)>,
    {
        let oriented: Vec<String> = matches
            .into_iter()
            .map(|(strand, seq)| match strand {
                Strand::Forward => seq.to_ascii_lowercase(),
                Strand::Reverse => reverse_complement_bases(seq),
            })
            .collect();
        Self::from_sequences(&oriented)
    }

    /// Build from four equal-length rows in A, T, C, G order, as read from a
    /// PFM file. Rows are taken as given.
    ///
    /// # Errors
    ///
    /// Returns `PfmError::LengthMismatch` if the rows differ in length or
    /// `EmptyInput` if they are empty.
    pub fn from_rows(rows: [&[f64]; 4]) -> Result<Self, PfmError> {
        let ncol = rows[0].len();
        if ncol == 0 {
            return Err(PfmError::EmptyInput);
        }
        if let Some(row) = rows.iter().find(|r| r.len() != ncol) {
            return Err(PfmError::LengthMismatch {
                expected: ncol,
                found: row.len(),
            });
        }
        let columns = (0..ncol)
            .map(|i| [rows[0][i], rows[1][i], rows[2][i], rows[3][i]])
            .collect();
        Ok(Self { columns })
    }

    /// Number of columns
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    #[must_use]
    pub fn columns(&self) -> &[[f64; 4]] {
        &self.columns
    }

    /// One base's frequencies across all columns; `row` indexes [`BASES`]
    #[must_use]
    pub fn row(&self, row: usize) -> Vec<f64> {
        self.columns.iter().map(|c| c[row]).collect()
    }

    /// Columns reversed with A/T and C/G swapped
    #[must_use]
    pub fn reverse_complement(&self) -> Self {
        let columns = self
            .columns
            .iter()
            .rev()
            .map(|&[a, t, c, g]| [t, a, g, c])
            .collect();
        Self { columns }
    }
}

fn reverse_complement_bases(seq: &str) -> String {
    seq.bytes()
        .rev()
        .map(|b| match b.to_ascii_lowercase() {
            b'a' => 't',
            b't' => 'a',
            b'c' => 'g',
            b'g' => 'c',
            other => char::from(other),
        })
        .collect()
}

/// Best alignment found by [`similarity`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PfmSimilarity {
    /// Mean column similarity of the best alignment, in [0, 1]
    pub score: f64,

    /// Orientation of the first matrix; always forward
    pub orientation_a: Strand,

    /// Orientation of the second matrix in the best alignment
    pub orientation_b: Strand,
}

/// Background column for the flanks of an alignment
fn background_column(gc: f64) -> [f64; 4] {
    let at = (1.0 - gc) / 2.0;
    let cg = gc / 2.0;
    [at, at, cg, cg]
}

/// Minimum overlap used by [`similarity`]: at most the shorter length minus
/// 2, at least 1. `None` takes the maximum.
#[must_use]
pub fn effective_window(len_a: usize, len_b: usize, max_window: Option<usize>) -> usize {
    let cap = len_a.min(len_b).saturating_sub(2);
    max_window.unwrap_or(cap).min(cap).max(1)
}

/// Similarity of two PFMs over every relative offset.
///
/// The matrices are slid past each other keeping at least `window` columns
/// of overlap (see [`effective_window`]); uncovered flanks are padded with
/// background columns from `background_gc`. Each alignment scores the mean of
/// `1 - |colA - colB| / sqrt(2)` over its columns and the best alignment
/// wins. With `reverse_complement`, `b` is also tried reverse-complemented;
/// the forward orientation is kept on ties.
///
/// # Errors
///
/// Returns `PfmError::EmptyInput` if either matrix has no columns.
pub fn similarity(
    a: &Pfm,
    b: &Pfm,
    background_gc: f64,
    max_window: Option<usize>,
    reverse_complement: bool,
) -> Result<PfmSimilarity, PfmError> {
    if a.is_empty() || b.is_empty() {
        return Err(PfmError::EmptyInput);
    }

    let window = effective_window(a.len(), b.len(), max_window);
    let background = background_column(background_gc);

    let mut best = PfmSimilarity {
        score: best_offset_score(a, b, window, &background),
        orientation_a: Strand::Forward,
        orientation_b: Strand::Forward,
    };

    if reverse_complement {
        let score = best_offset_score(a, &b.reverse_complement(), window, &background);
        if score > best.score {
            best.score = score;
            best.orientation_b = Strand::Reverse;
        }
    }

    Ok(best)
}

fn best_offset_score(a: &Pfm, b: &Pfm, window: usize, background: &[f64; 4]) -> f64 {
    let (len_a, len_b) = (a.len(), b.len());
    let mut best = 0.0;

    // a starts at column i and b at column j of the alignment
    for i in 0..=(len_b - window) {
        for j in 0..=(len_a - window) {
            let (left_a, left_b) = if j > i { (0, j - i) } else { (i - j, 0) };
            let (end_a, end_b) = (len_a + i, len_b + j);
            let (right_a, right_b) = if end_b > end_a {
                (end_b - end_a, 0)
            } else {
                (0, end_a - end_b)
            };

            let padded_a = Padded::new(a, left_a, right_a, background);
            let padded_b = Padded::new(b, left_b, right_b, background);
            let score = column_similarity(&padded_a, &padded_b);
            if score > best {
                best = score;
            }
        }
    }

    best
}

/// A PFM with background columns on either side
struct Padded<'a> {
    pfm: &'a Pfm,
    left: usize,
    right: usize,
    background: &'a [f64; 4],
}

impl<'a> Padded<'a> {
    fn new(pfm: &'a Pfm, left: usize, right: usize, background: &'a [f64; 4]) -> Self {
        Self {
            pfm,
            left,
            right,
            background,
        }
    }

    fn len(&self) -> usize {
        self.left + self.pfm.len() + self.right
    }

    fn column(&self, i: usize) -> &[f64; 4] {
        if i < self.left || i >= self.left + self.pfm.len() {
            self.background
        } else {
            &self.pfm.columns[i - self.left]
        }
    }
}

fn column_similarity(a: &Padded<'_>, b: &Padded<'_>) -> f64 {
    let len = a.len();
    let total: f64 = (0..len)
        .map(|i| {
            let (ca, cb) = (a.column(i), b.column(i));
            let distance = ca
                .iter()
                .zip(cb)
                .map(|(x, y)| (x - y).powi(2))
                .sum::<f64>()
                .sqrt();
            1.0 - distance / std::f64::consts::SQRT_2
        })
        .sum();
    total / count_to_f64(len)
}
