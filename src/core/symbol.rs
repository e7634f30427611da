//! Nucleotide alphabet, reverse complements and matcher character classes.

use std::fmt;

use thiserror::Error;

use crate::utils::validation::count_to_f64;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SymbolError {
    #[error("Invalid symbol '{symbol}' at position {position}")]
    InvalidSymbol { symbol: char, position: usize },
}

// Base bit masks; a symbol is the set of bases it accepts.
const MASK_A: u8 = 0b0001;
const MASK_C: u8 = 0b0010;
const MASK_G: u8 = 0b0100;
const MASK_T: u8 = 0b1000;
const MASK_ANY: u8 = MASK_A | MASK_C | MASK_G | MASK_T;

/// One position of a pattern or sequence.
///
/// The two-base ambiguity codes use their IUPAC letters in text form:
/// `w` (A/T), `m` (A/C), `r` (A/G), `y` (C/T), `k` (G/T), `s` (C/G).
/// `n` is the full wildcard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Symbol {
    A,
    T,
    C,
    G,
    Wildcard,
    AT,
    AC,
    AG,
    TC,
    TG,
    CG,
}

impl Symbol {
    /// Parse a single byte, ignoring case
    pub fn from_byte(byte: u8, position: usize) -> Result<Self, SymbolError> {
        let symbol = match byte.to_ascii_lowercase() {
            b'a' => Self::A,
            b't' => Self::T,
            b'c' => Self::C,
            b'g' => Self::G,
            b'n' => Self::Wildcard,
            b'w' => Self::AT,
            b'm' => Self::AC,
            b'r' => Self::AG,
            b'y' => Self::TC,
            b'k' => Self::TG,
            b's' => Self::CG,
            _ => {
                return Err(SymbolError::InvalidSymbol {
                    symbol: char::from(byte),
                    position,
                })
            }
        };
        Ok(symbol)
    }

    /// Lower-case text form
    #[must_use]
    pub fn to_char(self) -> char {
        match self {
            Self::A => 'a',
            Self::T => 't',
            Self::C => 'c',
            Self::G => 'g',
            Self::Wildcard => 'n',
            Self::AT => 'w',
            Self::AC => 'm',
            Self::AG => 'r',
            Self::TC => 'y',
            Self::TG => 'k',
            Self::CG => 's',
        }
    }

    /// The set of bases accepted at this position, as a bit mask
    #[must_use]
    pub fn mask(self) -> u8 {
        match self {
            Self::A => MASK_A,
            Self::T => MASK_T,
            Self::C => MASK_C,
            Self::G => MASK_G,
            Self::Wildcard => MASK_ANY,
            Self::AT => MASK_A | MASK_T,
            Self::AC => MASK_A | MASK_C,
            Self::AG => MASK_A | MASK_G,
            Self::TC => MASK_T | MASK_C,
            Self::TG => MASK_T | MASK_G,
            Self::CG => MASK_C | MASK_G,
        }
    }

    /// Smallest symbol accepting every base in `mask`.
    ///
    /// Three or more bases (and the empty set) fall back to the wildcard.
    #[must_use]
    pub fn from_mask(mask: u8) -> Self {
        match mask {
            MASK_A => Self::A,
            MASK_T => Self::T,
            MASK_C => Self::C,
            MASK_G => Self::G,
            m if m == MASK_A | MASK_T => Self::AT,
            m if m == MASK_A | MASK_C => Self::AC,
            m if m == MASK_A | MASK_G => Self::AG,
            m if m == MASK_T | MASK_C => Self::TC,
            m if m == MASK_T | MASK_G => Self::TG,
            m if m == MASK_C | MASK_G => Self::CG,
            _ => Self::Wildcard,
        }
    }

    /// Column-wise merge of two symbols: identical bases stay, two distinct
    /// bases become their ambiguity code, anything wider becomes `n`.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        Self::from_mask(self.mask() | other.mask())
    }

    #[must_use]
    pub fn complement(self) -> Self {
        match self {
            Self::A => Self::T,
            Self::T => Self::A,
            Self::C => Self::G,
            Self::G => Self::C,
            Self::Wildcard => Self::Wildcard,
            Self::AT => Self::AT,
            Self::CG => Self::CG,
            Self::AC => Self::TG,
            Self::TG => Self::AC,
            Self::AG => Self::TC,
            Self::TC => Self::AG,
        }
    }

    /// Matcher character class for this symbol
    #[must_use]
    pub fn class(self) -> &'static str {
        match self {
            Self::A => "a",
            Self::T => "t",
            Self::C => "c",
            Self::G => "g",
            Self::Wildcard => "[acgt]",
            Self::AT => "[at]",
            Self::AC => "[ac]",
            Self::AG => "[ag]",
            Self::TC => "[ct]",
            Self::TG => "[gt]",
            Self::CG => "[cg]",
        }
    }

    /// True only for the full wildcard; ambiguity codes are not wildcards
    #[must_use]
    pub fn is_wildcard(self) -> bool {
        self == Self::Wildcard
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_char())
    }
}

/// Parse a whole sequence into symbols.
///
/// # Errors
///
/// Returns `SymbolError::InvalidSymbol` for the first character outside the
/// alphabet.
pub fn parse_symbols(seq: &str) -> Result<Vec<Symbol>, SymbolError> {
    seq.bytes()
        .enumerate()
        .map(|(i, b)| Symbol::from_byte(b, i))
        .collect()
}

/// Render symbols back into lower-case text
#[must_use]
pub fn symbols_to_string(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.to_char()).collect()
}

/// Reverse complement of symbols already parsed
#[must_use]
pub fn reverse_complement_symbols(symbols: &[Symbol]) -> Vec<Symbol> {
    symbols.iter().rev().map(|s| s.complement()).collect()
}

/// Reverse complement of a text sequence. The result is lower-case.
///
/// # Errors
///
/// Returns `SymbolError::InvalidSymbol` if `seq` contains a character outside
/// the alphabet.
pub fn reverse_complement(seq: &str) -> Result<String, SymbolError> {
    let symbols = parse_symbols(seq)?;
    Ok(symbols_to_string(&reverse_complement_symbols(&symbols)))
}

/// Expand a sequence into a character-class expression suitable for a
/// regular-expression matcher, e.g. `anw` becomes `a[acgt][at]`.
///
/// # Errors
///
/// Returns `SymbolError::InvalidSymbol` if `seq` contains a character outside
/// the alphabet.
pub fn expand_to_class(seq: &str) -> Result<String, SymbolError> {
    Ok(expand_symbols(&parse_symbols(seq)?))
}

/// Character-class expression for symbols already parsed
#[must_use]
pub fn expand_symbols(symbols: &[Symbol]) -> String {
    symbols.iter().map(|s| s.class()).collect()
}

/// Fraction of G and C among the unambiguous bases of `sequences`.
///
/// Returns `None` when the sequences contain no A, C, G or T.
pub fn gc_content<'a, I>(sequences: I) -> Option<f64>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut gc = 0usize;
    let mut total = 0usize;
    for seq in sequences {
        for b in seq.bytes() {
            match b.to_ascii_lowercase() {
                b'g' | b'c' => {
                    gc += 1;
                    total += 1;
                }
                b'a' | b't' => total += 1,
                _ => {}
            }
        }
    }

    if total == 0 {
        None
    } else {
        Some(count_to_f64(gc) / count_to_f64(total))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reverse_complement() {
        assert_eq!(reverse_complement("atcg").unwrap(), "cgat");
        assert_eq!(reverse_complement("AACN").unwrap(), "ngtt");
        assert_eq!(reverse_complement("").unwrap(), "");
    }

    #[test]
    fn test_reverse_complement_ambiguity_codes() {
        // w and s are self-complementary; m<->k, r<->y
        assert_eq!(reverse_complement("wsmkry").unwrap(), "rymksw");
    }

    #[test]
    fn test_reverse_complement_is_involution() {
        for seq in ["atcg", "annnt", "wsmkry", "gattaca", "nnnn", "acgtacgtmm"] {
            let once = reverse_complement(seq).unwrap();
            assert_eq!(reverse_complement(&once).unwrap(), seq);
        }
    }

    #[test]
    fn test_reverse_complement_invalid_symbol() {
        let err = reverse_complement("atxg").unwrap_err();
        assert_eq!(
            err,
            SymbolError::InvalidSymbol {
                symbol: 'x',
                position: 2
            }
        );
        assert!(reverse_complement("at-g").is_err());
    }

    #[test]
    fn test_expand_to_class() {
        assert_eq!(expand_to_class("atcg").unwrap(), "atcg");
        assert_eq!(expand_to_class("anw").unwrap(), "a[acgt][at]");
        assert_eq!(expand_to_class("MRYKS").unwrap(), "[ac][ag][ct][gt][cg]");
        assert!(expand_to_class("z").is_err());
    }

    #[test]
    fn test_union() {
        assert_eq!(Symbol::A.union(Symbol::A), Symbol::A);
        assert_eq!(Symbol::A.union(Symbol::C), Symbol::AC);
        assert_eq!(Symbol::T.union(Symbol::G), Symbol::TG);
        assert_eq!(Symbol::C.union(Symbol::G), Symbol::CG);
        assert_eq!(Symbol::AC.union(Symbol::A), Symbol::AC);
        assert_eq!(Symbol::AC.union(Symbol::T), Symbol::Wildcard);
        assert_eq!(Symbol::A.union(Symbol::Wildcard), Symbol::Wildcard);
    }

    #[test]
    fn test_wildcard_only_for_n() {
        assert!(Symbol::Wildcard.is_wildcard());
        assert!(!Symbol::AT.is_wildcard());
        assert!(!Symbol::A.is_wildcard());
    }

    #[test]
    fn test_gc_content() {
        let gc = gc_content(["aacc", "GGTT"]).unwrap();
        assert!((gc - 0.5).abs() < 1e-12);

        // Wildcards are not counted
        let gc = gc_content(["gnnn"]).unwrap();
        assert!((gc - 1.0).abs() < 1e-12);

        assert!(gc_content(["nnnn"]).is_none());
    }
}
