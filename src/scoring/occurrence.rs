use crate::catalog::index::IndexResult;
use crate::scoring::ScoringError;
use crate::utils::validation::count_to_f64;

/// Two-proportion z-score of a pattern's hit rate in the positive set against
/// the negative set.
///
/// With `fp` and `fn` the fractions of sequences hit and `f` the pooled
/// fraction:
///
/// ```text
/// z = (fp - fn) / sqrt(f (1 - f) (1/Np + 1/Nn))
/// ```
///
/// # Errors
///
/// Returns `ScoringError::DivisionByZero` when either set is empty or the
/// pooled fraction is 0 or 1 (the pattern hits no sequence, or every one).
pub fn preferential_occurrence(
    positive: &IndexResult,
    negative: &IndexResult,
) -> Result<f64, ScoringError> {
    z_score(
        positive.n_hit_seqs,
        positive.n_seqs,
        negative.n_hit_seqs,
        negative.n_seqs,
    )
}

/// z-score from raw counts; see [`preferential_occurrence`]
///
/// # Errors
///
/// Returns `ScoringError::DivisionByZero` for an empty set or a degenerate
/// pooled fraction.
pub fn z_score(
    hits_positive: usize,
    total_positive: usize,
    hits_negative: usize,
    total_negative: usize,
) -> Result<f64, ScoringError> {
    if total_positive == 0 || total_negative == 0 {
        return Err(ScoringError::DivisionByZero {
            statistic: "preferential occurrence",
            reason: format!(
                "empty sequence set ({total_positive} positive, {total_negative} negative)"
            ),
        });
    }

    let np = count_to_f64(total_positive);
    let nn = count_to_f64(total_negative);
    let fp = count_to_f64(hits_positive) / np;
    let fn_ = count_to_f64(hits_negative) / nn;
    let f = (np * fp + nn * fn_) / (np + nn);

    let variance = f * (1.0 - f) * (1.0 / np + 1.0 / nn);
    if variance <= 0.0 {
        return Err(ScoringError::DivisionByZero {
            statistic: "preferential occurrence",
            reason: format!("pooled hit fraction is {f}"),
        });
    }

    Ok((fp - fn_) / variance.sqrt())
}
