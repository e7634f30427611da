//! Parser for FASTA sequence sets using noodles.
//!
//! Supports both uncompressed and gzip/bgzip compressed files.
//!
//! Supported extensions:
//! - `.fa`, `.fasta`, `.fna` (uncompressed)
//! - `.fa.gz`, `.fasta.gz`, `.fna.gz` (gzip compressed)
//! - `.fa.bgz`, `.fasta.bgz`, `.fna.bgz` (bgzip compressed)

use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;
use noodles::fasta;
use tracing::debug;

use crate::core::sequence::{SequenceRecord, SequenceSet};
use crate::parsing::ParseError;
use crate::utils::validation::{check_record_limit, MAX_SEQUENCES};

/// Check if the path is a gzipped file
#[allow(clippy::case_sensitive_file_extension_comparisons)] // Already lowercased
fn is_gzipped(path: &Path) -> bool {
    let path_str = path.to_string_lossy().to_lowercase();
    path_str.ends_with(".gz") || path_str.ends_with(".bgz")
}

/// Read a FASTA file into a sequence set.
///
/// Record names become gene names; sequences are lower-cased and checked
/// against the nucleotide alphabet.
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, `ParseError::Noodles` if
/// parsing fails, `ParseError::InvalidSymbol` for a sequence outside the
/// alphabet, `ParseError::InvalidFormat` if no sequences are found, or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_fasta_file(path: &Path) -> Result<SequenceSet, ParseError> {
    let file = std::fs::File::open(path)?;
    let set = if is_gzipped(path) {
        let mut reader = fasta::io::Reader::new(BufReader::new(MultiGzDecoder::new(file)));
        parse_fasta_reader(&mut reader)?
    } else {
        let mut reader = fasta::io::Reader::new(BufReader::new(file));
        parse_fasta_reader(&mut reader)?
    };

    debug!("Read {} sequences from {}", set.len(), path.display());
    Ok(set)
}

/// Parse from a noodles FASTA reader
fn parse_fasta_reader<R: BufRead>(
    reader: &mut fasta::io::Reader<R>,
) -> Result<SequenceSet, ParseError> {
    let mut records = Vec::new();

    for result in reader.records() {
        let record = result
            .map_err(|e| ParseError::Noodles(format!("Failed to parse FASTA record: {e}")))?;

        // Check record limit for DOS protection
        if check_record_limit(records.len(), MAX_SEQUENCES, "sequences").is_some() {
            return Err(ParseError::TooManyRecords(records.len()));
        }

        let name = String::from_utf8_lossy(record.name()).to_string();
        let sequence = String::from_utf8_lossy(record.sequence().as_ref()).to_string();
        let record = SequenceRecord::new(name.clone(), &sequence)
            .map_err(|source| ParseError::InvalidSymbol { record: name, source })?;
        records.push(record);
    }

    if records.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No sequences found in FASTA file".to_string(),
        ));
    }

    Ok(SequenceSet::new(records))
}

#[cfg(test)]
mod tests {
    use super::*;
    use flate2::write::GzEncoder;
    use flate2::Compression;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_fasta_file() {
        let fasta_content = b">geneA description\nACGTACGT\nACGT\n>geneB\nggnn\n";

        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(fasta_content).unwrap();
        temp.flush().unwrap();

        let set = parse_fasta_file(temp.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.records[0].name, "geneA");
        assert_eq!(set.records[0].sequence, "acgtacgtacgt");
        assert_eq!(set.records[1].name, "geneB");
        assert_eq!(set.records[1].sequence, "ggnn");
        assert_eq!(set.get(2).unwrap().name, "geneB");
    }

    #[test]
    fn test_parse_gzipped_fasta() {
        let temp = NamedTempFile::with_suffix(".fa.gz").unwrap();
        let mut encoder = GzEncoder::new(temp.reopen().unwrap(), Compression::default());
        encoder.write_all(b">chr1\nAAATCGAAA\n").unwrap();
        encoder.finish().unwrap();

        let set = parse_fasta_file(temp.path()).unwrap();
        assert_eq!(set.len(), 1);
        assert_eq!(set.records[0].sequence, "aaatcgaaa");
    }

    #[test]
    fn test_parse_empty_fasta() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b"").unwrap();
        temp.flush().unwrap();

        let result = parse_fasta_file(temp.path());
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_fasta_invalid_symbol() {
        let mut temp = NamedTempFile::with_suffix(".fa").unwrap();
        temp.write_all(b">bad\nACGX\n").unwrap();
        temp.flush().unwrap();

        match parse_fasta_file(temp.path()) {
            Err(ParseError::InvalidSymbol { record, .. }) => assert_eq!(record, "bad"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_is_gzipped() {
        assert!(is_gzipped(Path::new("pos.fa.gz")));
        assert!(is_gzipped(Path::new("pos.FA.BGZ")));
        assert!(!is_gzipped(Path::new("pos.fa")));
    }
}
