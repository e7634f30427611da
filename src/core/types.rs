use serde::{Deserialize, Serialize};

/// 1-based position of a sequence within the set it was read from
pub type SequenceId = usize;

/// Index of a pattern within the [`PatternCatalog`](crate::catalog::store::PatternCatalog)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PatternId(pub usize);

impl std::fmt::Display for PatternId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 1-based cluster number
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClusterId(pub usize);

impl std::fmt::Display for ClusterId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Orientation of a match or of a pattern relative to another
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Strand {
    /// As given (code 1)
    Forward,
    /// Reverse complement (code 2)
    Reverse,
}

impl Strand {
    /// Numeric code used in result files: 1 forward, 2 reverse
    #[must_use]
    pub fn code(self) -> u8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => 2,
        }
    }

    /// Orientation after also flipping by `other`
    #[must_use]
    pub fn compose(self, other: Self) -> Self {
        if self == other {
            Self::Forward
        } else {
            Self::Reverse
        }
    }
}

impl std::fmt::Display for Strand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forward => write!(f, "+"),
            Self::Reverse => write!(f, "-"),
        }
    }
}

/// Nucleotide sequence type; DNA patterns are matched on both strands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SequenceType {
    Dna,
    Rna,
}

impl SequenceType {
    #[must_use]
    pub fn reverse_complement(self) -> bool {
        matches!(self, Self::Dna)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strand_codes() {
        assert_eq!(Strand::Forward.code(), 1);
        assert_eq!(Strand::Reverse.code(), 2);
        assert_eq!(Strand::Forward.to_string(), "+");
        assert_eq!(Strand::Reverse.to_string(), "-");
    }

    #[test]
    fn test_strand_compose() {
        assert_eq!(Strand::Forward.compose(Strand::Forward), Strand::Forward);
        assert_eq!(Strand::Reverse.compose(Strand::Reverse), Strand::Forward);
        assert_eq!(Strand::Forward.compose(Strand::Reverse), Strand::Reverse);
    }

    #[test]
    fn test_sequence_type() {
        assert!(SequenceType::Dna.reverse_complement());
        assert!(!SequenceType::Rna.reverse_complement());
    }
}
