use serde::{Deserialize, Serialize};

use crate::core::symbol::{gc_content, Symbol, SymbolError};
use crate::core::types::SequenceId;

/// A named nucleotide sequence, stored lower-case
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequenceRecord {
    /// Record name (gene name in result files)
    pub name: String,

    /// Lower-case sequence
    pub sequence: String,
}

impl SequenceRecord {
    /// Create a record, lower-casing and validating the sequence.
    ///
    /// # Errors
    ///
    /// Returns `SymbolError::InvalidSymbol` if the sequence contains a
    /// character outside the nucleotide alphabet.
    pub fn new(name: impl Into<String>, sequence: &str) -> Result<Self, SymbolError> {
        for (i, b) in sequence.bytes().enumerate() {
            Symbol::from_byte(b, i)?;
        }
        Ok(Self {
            name: name.into(),
            sequence: sequence.to_ascii_lowercase(),
        })
    }
}

/// An ordered sequence collection. Identifiers are 1-based in read order.
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    pub records: Vec<SequenceRecord>,
}

impl SequenceSet {
    #[must_use]
    pub fn new(records: Vec<SequenceRecord>) -> Self {
        Self { records }
    }

    /// Build an unnamed set from raw sequences; records are named by their id.
    ///
    /// # Errors
    ///
    /// Returns `SymbolError::InvalidSymbol` for the first invalid sequence.
    pub fn from_sequences<'a, I>(sequences: I) -> Result<Self, SymbolError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let records = sequences
            .into_iter()
            .enumerate()
            .map(|(i, s)| SequenceRecord::new((i + 1).to_string(), s))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { records })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sequences in read order
    pub fn sequences(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.sequence.as_str())
    }

    /// Record for a 1-based identifier
    #[must_use]
    pub fn get(&self, id: SequenceId) -> Option<&SequenceRecord> {
        id.checked_sub(1).and_then(|i| self.records.get(i))
    }

    /// Empirical GC content of the whole set
    #[must_use]
    pub fn gc_content(&self) -> Option<f64> {
        gc_content(self.sequences())
    }
}
