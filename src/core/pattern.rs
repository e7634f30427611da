use crate::catalog::index::MatchIndex;
use crate::core::symbol::{
    parse_symbols, reverse_complement_symbols, symbols_to_string, Symbol, SymbolError,
};

/// A degenerate nucleotide pattern
#[derive(Debug, Clone)]
pub struct Pattern {
    /// Lower-case text form
    pub sequence: String,

    /// Parsed symbols, same length as `sequence`
    pub symbols: Vec<Symbol>,

    /// Number of `n` positions
    pub n_wildcards: usize,

    /// Number of positions that are a base or a two-base ambiguity code
    pub n_nonwildcards: usize,

    /// Matches against the positive and negative sets, once indexed
    pub match_index: Option<MatchIndex>,
}

impl Pattern {
    /// Parse a pattern, ignoring case.
    ///
    /// # Errors
    ///
    /// Returns `SymbolError::InvalidSymbol` if `sequence` contains a character
    /// outside the nucleotide alphabet.
    pub fn new(sequence: &str) -> Result<Self, SymbolError> {
        Ok(Self::from_symbols(parse_symbols(sequence)?))
    }

    #[must_use]
    pub fn from_symbols(symbols: Vec<Symbol>) -> Self {
        let n_wildcards = symbols.iter().filter(|s| s.is_wildcard()).count();
        Self {
            sequence: symbols_to_string(&symbols),
            n_nonwildcards: symbols.len() - n_wildcards,
            n_wildcards,
            symbols,
            match_index: None,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Lower-case text of the reverse complement
    #[must_use]
    pub fn reverse_complement(&self) -> String {
        symbols_to_string(&reverse_complement_symbols(&self.symbols))
    }

    /// Fraction of positive-set sequences hit, if indexed
    #[must_use]
    pub fn positive_support(&self) -> Option<f64> {
        self.match_index.as_ref().and_then(|m| m.positive.support())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pattern_counts() {
        let p = Pattern::new("ATnnCw").unwrap();
        assert_eq!(p.sequence, "atnncw");
        assert_eq!(p.len(), 6);
        assert_eq!(p.n_wildcards, 2);
        // ambiguity codes count as non-wildcard
        assert_eq!(p.n_nonwildcards, 4);
        assert!(p.match_index.is_none());
    }

    #[test]
    fn test_pattern_reverse_complement() {
        let p = Pattern::new("aacn").unwrap();
        assert_eq!(p.reverse_complement(), "ngtt");
    }

    #[test]
    fn test_pattern_invalid() {
        assert!(Pattern::new("acgx").is_err());
    }
}
