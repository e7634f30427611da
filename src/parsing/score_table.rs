use std::path::Path;

use crate::parsing::ParseError;
use crate::scoring::auxiliary::ScoreTable;

/// Parse a nucleosome-occupancy or conservation score table
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_score_table_file(path: &Path) -> Result<ScoreTable, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_score_table_text(&content)
}

/// Parse tab-separated rows of `seq_id, position, _, _, score[, ...]`.
///
/// Positions are 1-based in the file and stored 0-based. Blank lines and `#`
/// comments are skipped.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if a row has fewer than five fields,
/// holds an unparsable id, position or score, or if no rows are found.
pub fn parse_score_table_text(text: &str) -> Result<ScoreTable, ParseError> {
    let mut table = ScoreTable::new();
    let mut rows = 0usize;

    for (i, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Line numbers in errors are 1-based for user friendliness
        let line_num = i + 1;

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() < 5 {
            return Err(ParseError::InvalidFormat(format!(
                "Line {line_num} has fewer than 5 fields"
            )));
        }

        let seq_id: usize = fields[0].trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid sequence id on line {}: '{}'",
                line_num, fields[0]
            ))
        })?;
        let position = fields[1]
            .trim()
            .parse::<usize>()
            .ok()
            .and_then(|p| p.checked_sub(1))
            .ok_or_else(|| {
                ParseError::InvalidFormat(format!(
                    "Invalid position on line {}: '{}'",
                    line_num, fields[1]
                ))
            })?;
        let score: f64 = fields[4].trim().parse().map_err(|_| {
            ParseError::InvalidFormat(format!(
                "Invalid score on line {}: '{}'",
                line_num, fields[4]
            ))
        })?;

        table.insert(seq_id, position, score);
        rows += 1;
    }

    if rows == 0 {
        return Err(ParseError::InvalidFormat(
            "No scores found in file".to_string(),
        ));
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_score_table_text() {
        let text = "1\t1\tx\tx\t0.5\n1\t2\tx\tx\t1.5\textra\n\n2\t10\tx\tx\t-3\n";
        let table = parse_score_table_text(text).unwrap();

        // the first row is kept
        assert_eq!(table.get(1, 0), Some(0.5));
        assert_eq!(table.get(1, 1), Some(1.5));
        assert_eq!(table.get(2, 9), Some(-3.0));
        assert_eq!(table.n_sequences(), 2);
    }

    #[test]
    fn test_parse_score_table_rejects_short_rows() {
        let err = parse_score_table_text("1\t1\t0.5\n").unwrap_err();
        assert!(err.to_string().contains("fewer than 5 fields"));
    }

    #[test]
    fn test_parse_score_table_rejects_zero_position() {
        assert!(parse_score_table_text("1\t0\tx\tx\t0.5\n").is_err());
        assert!(parse_score_table_text("1\t1\tx\tx\tabc\n").is_err());
        assert!(parse_score_table_text("").is_err());
    }
}
