use std::path::Path;

use tracing::warn;

use crate::core::pattern::Pattern;
use crate::parsing::ParseError;
use crate::utils::validation::{check_record_limit, MAX_PATTERNS};

/// Parse a pattern list file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_pattern_file(path: &Path) -> Result<Vec<Pattern>, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_pattern_text(&content)
}

/// Parse one pattern per line.
///
/// Lines are trimmed; blank lines and `#` comments are skipped. A line that
/// is not a valid pattern is logged and skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if no valid pattern is found, or
/// `ParseError::TooManyRecords` if the limit is exceeded.
pub fn parse_pattern_text(text: &str) -> Result<Vec<Pattern>, ParseError> {
    let mut patterns = Vec::new();

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        match Pattern::new(line) {
            Ok(pattern) => {
                if check_record_limit(patterns.len(), MAX_PATTERNS, "patterns").is_some() {
                    return Err(ParseError::TooManyRecords(patterns.len()));
                }
                patterns.push(pattern);
            }
            Err(e) => warn!("Skipping pattern '{}' on line {}: {}", line, i + 1, e),
        }
    }

    if patterns.is_empty() {
        return Err(ParseError::InvalidFormat(
            "No valid patterns found".to_string(),
        ));
    }

    Ok(patterns)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_pattern_text() {
        let text = "# motifs\nACGTn\n\n  ttwc  \nac-t\nGGS\n";
        let patterns = parse_pattern_text(text).unwrap();
        let seqs: Vec<&str> = patterns.iter().map(|p| p.sequence.as_str()).collect();
        assert_eq!(seqs, vec!["acgtn", "ttwc", "ggs"]);
    }

    #[test]
    fn test_parse_pattern_text_without_patterns() {
        assert!(matches!(
            parse_pattern_text("# nothing\n\nxyz\n"),
            Err(ParseError::InvalidFormat(_))
        ));
    }
}
