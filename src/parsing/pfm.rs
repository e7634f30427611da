use std::fmt::Write as _;
use std::path::Path;

use crate::clustering::pfm::Pfm;
use crate::parsing::ParseError;

/// A PFM file: header name and matrix
#[derive(Debug, Clone, PartialEq)]
pub struct NamedPfm {
    pub name: String,
    pub pfm: Pfm,
}

/// Parse a PFM file
///
/// # Errors
///
/// Returns `ParseError::Io` if the file cannot be read, or other parse errors
/// if the content is invalid.
pub fn parse_pfm_file(path: &Path) -> Result<NamedPfm, ParseError> {
    let content = std::fs::read_to_string(path)?;
    parse_pfm_text(&content)
}

/// Parse a `<name>\t<columns>` header line followed by four tab-separated
/// rows in A, T, C, G order.
///
/// # Errors
///
/// Returns `ParseError::InvalidFormat` if the header or a row is missing or
/// malformed, or a row's length disagrees with the header.
pub fn parse_pfm_text(text: &str) -> Result<NamedPfm, ParseError> {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());

    let header = lines
        .next()
        .ok_or_else(|| ParseError::InvalidFormat("Empty PFM file".to_string()))?;
    let (name, columns) = header
        .split_once('\t')
        .ok_or_else(|| ParseError::InvalidFormat(format!("Invalid PFM header: '{header}'")))?;
    let columns: usize = columns.trim().parse().map_err(|_| {
        ParseError::InvalidFormat(format!("Invalid PFM column count: '{columns}'"))
    })?;

    let mut rows: Vec<Vec<f64>> = Vec::with_capacity(4);
    for base in ['A', 'T', 'C', 'G'] {
        let line = lines
            .next()
            .ok_or_else(|| ParseError::InvalidFormat(format!("Missing PFM row for {base}")))?;
        let row = line
            .split('\t')
            .map(|v| v.trim().parse::<f64>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| ParseError::InvalidFormat(format!("Invalid value in {base} row: {e}")))?;
        if row.len() != columns {
            return Err(ParseError::InvalidFormat(format!(
                "{base} row has {} values, header says {columns}",
                row.len()
            )));
        }
        rows.push(row);
    }

    let pfm = Pfm::from_rows([
        rows[0].as_slice(),
        rows[1].as_slice(),
        rows[2].as_slice(),
        rows[3].as_slice(),
    ])
    .map_err(|e| ParseError::InvalidFormat(e.to_string()))?;

    Ok(NamedPfm {
        name: name.trim().to_string(),
        pfm,
    })
}

/// Render a PFM in the format read by [`parse_pfm_text`]
#[must_use]
pub fn format_pfm(name: &str, pfm: &Pfm) -> String {
    let mut out = format!("{name}\t{}\n", pfm.len());
    for row in 0..4 {
        let values: Vec<String> = pfm.row(row).iter().map(f64::to_string).collect();
        let _ = writeln!(out, "{}", values.join("\t"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pfm() {
        let pfm = Pfm::from_sequences(&["acg", "acc"]).unwrap();
        let text = format_pfm("cluster_1", &pfm);
        assert_eq!(
            text,
            "cluster_1\t3\n1\t0\t0\n0\t0\t0\n0\t1\t0.5\n0\t0\t0.5\n"
        );
    }

    #[test]
    fn test_parse_pfm_text() {
        let text = "cluster_2\t2\n0.5\t0\n0.5\t0\n0\t1\n0\t0\n";
        let parsed = parse_pfm_text(text).unwrap();
        assert_eq!(parsed.name, "cluster_2");
        assert_eq!(parsed.pfm.len(), 2);
        assert_eq!(parsed.pfm.columns()[0], [0.5, 0.5, 0.0, 0.0]);
        assert_eq!(parsed.pfm.columns()[1], [0.0, 0.0, 1.0, 0.0]);
    }

    #[test]
    fn test_parse_formatted_pfm() {
        let pfm = Pfm::from_sequences(&["acgt", "aggt", "tcga"]).unwrap();
        let parsed = parse_pfm_text(&format_pfm("m", &pfm)).unwrap();
        assert_eq!(parsed.pfm, pfm);
    }

    #[test]
    fn test_parse_pfm_text_errors() {
        assert!(parse_pfm_text("").is_err());
        assert!(parse_pfm_text("cluster_1\n1\n0\n0\n0\n").is_err());
        assert!(parse_pfm_text("cluster_1\t2\n1\t0\n0\t0\n0\t1\n").is_err());
        assert!(parse_pfm_text("cluster_1\t2\n1\n0\n0\n0\n").is_err());
    }
}
