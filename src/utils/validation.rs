//! Centralized validation and helper functions.

/// Maximum number of records allowed in a single FASTA file (DOS protection)
pub const MAX_SEQUENCES: usize = 1_000_000;

/// Maximum number of patterns allowed in a single pattern list (DOS protection)
pub const MAX_PATTERNS: usize = 1_000_000;

/// Convert a count to `f64` for ratio arithmetic.
///
/// Counts in this crate never approach 2^52, so the conversion is exact.
///
/// # Examples
///
/// ```
/// use rank_motif::utils::validation::count_to_f64;
///
/// assert_eq!(count_to_f64(3) / count_to_f64(4), 0.75);
/// ```
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn count_to_f64(n: usize) -> f64 {
    n as f64
}

/// Check if adding another record would exceed `limit`.
///
/// Call this with the current count BEFORE adding a new record.
/// Returns an error message if adding would exceed the limit, None if safe to add.
///
/// # Example
/// ```ignore
/// if check_record_limit(records.len(), MAX_SEQUENCES, "sequences").is_some() {
///     return Err(...);
/// }
/// records.push(new_record); // Safe to add
/// ```
#[must_use]
pub fn check_record_limit(count: usize, limit: usize, what: &str) -> Option<String> {
    if count >= limit {
        Some(format!(
            "Too many {what}: adding another would exceed maximum of {limit}"
        ))
    } else {
        None
    }
}

/// Check that a GC fraction lies in [0, 1].
///
/// # Errors
///
/// Returns a message naming the offending value.
pub fn validate_gc_fraction(gc: f64) -> Result<f64, String> {
    if (0.0..=1.0).contains(&gc) {
        Ok(gc)
    } else {
        Err(format!("GC fraction must be within [0, 1], got {gc}"))
    }
}
