//! Reference datasets arrive as comma-delimited text, some fields quoted
//! with embedded commas/newlines. This is a small hand-rolled reader in the
//! spirit of the fixed-width record readers used for FAA subscriber files:
//! malformed rows are the caller's problem to skip, never a load failure.

use std::io::prelude::*;

use crate::error::Result;

#[derive(Debug)]
pub struct CsvFile {
    rows: Vec<Vec<String>>,
}

impl CsvFile {
    pub fn from_text(text: &str) -> CsvFile {
        CsvFile {
            rows: parse_quoted(text),
        }
    }

    pub fn from_reader<B: Read>(reader: &mut B) -> Result<CsvFile> {
        let mut buf = Vec::new();
        reader.read_to_end(&mut buf)?;
        Ok(CsvFile::from_text(&String::from_utf8_lossy(&buf)))
    }

    /// Index of the first header column matching any of the given names,
    /// case-insensitively.
    pub fn header_index(&self, names: &[&str]) -> Option<usize> {
        let header = self.rows.first()?;
        for name in names {
            let pos = header
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name));
            if pos.is_some() {
                return pos;
            }
        }
        None
    }

    /// Data rows (everything after the header row).
    pub fn records(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().skip(1).map(|r| r.as_slice())
    }

    /// All rows including the header, for headerless tables.
    pub fn raw_rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(|r| r.as_slice())
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Trimmed field at `idx`, or "" when the row is short.
pub fn field(row: &[String], idx: usize) -> &str {
    row.get(idx).map(|s| s.trim()).unwrap_or("")
}

// Quote-aware split. Doubled quotes inside a quoted field escape a literal
// quote; \r is dropped; rows whose fields are all empty are dropped.
fn parse_quoted(text: &str) -> Vec<Vec<String>> {
    let mut rows = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut fld = String::new();
    let mut in_quotes = false;

    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    fld.push('"');
                    chars.next();
                } else {
                    in_quotes = false;
                }
            } else {
                fld.push(c);
            }
        } else {
            match c {
                '"' => in_quotes = true,
                ',' => {
                    row.push(std::mem::replace(&mut fld, String::new()));
                }
                '\r' => {}
                '\n' => {
                    row.push(std::mem::replace(&mut fld, String::new()));
                    if row.iter().any(|f| !f.is_empty()) {
                        rows.push(std::mem::replace(&mut row, Vec::new()));
                    } else {
                        row.clear();
                    }
                }
                _ => fld.push(c),
            }
        }
    }

    if !fld.is_empty() || !row.is_empty() {
        row.push(fld);
        if row.iter().any(|f| !f.is_empty()) {
            rows.push(row);
        }
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_rows() {
        let f = CsvFile::from_text("A,B,C\n1,2,3\n4,5,6\n");
        assert_eq!(f.header_index(&["b"]), Some(1));
        let rows: Vec<_> = f.records().collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(field(rows[0], 2), "3");
    }

    #[test]
    fn quoted_fields_with_commas_and_newlines() {
        let f = CsvFile::from_text("PLAY,ROUTE\n\"A, B\",\"X\nY\"\n");
        let rows: Vec<_> = f.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "A, B");
        assert_eq!(rows[0][1], "X\nY");
    }

    #[test]
    fn escaped_quotes_and_blank_rows() {
        let f = CsvFile::from_text("H1,H2\n\"say \"\"hi\"\"\",x\n,,\n\n");
        let rows: Vec<_> = f.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0], "say \"hi\"");
    }

    #[test]
    fn missing_trailing_newline() {
        let f = CsvFile::from_text("A,B\n1,2");
        let rows: Vec<_> = f.records().collect();
        assert_eq!(rows.len(), 1);
        assert_eq!(field(rows[0], 1), "2");
    }

    #[test]
    fn header_alternates() {
        let f = CsvFile::from_text("Play Name,Route String\nx,y\n");
        assert_eq!(f.header_index(&["play", "play name"]), Some(0));
        assert_eq!(f.header_index(&["route", "route string"]), Some(1));
        assert_eq!(f.header_index(&["nope"]), None);
    }
}
