//! Delimited numeric table reader.
//!
//! One point per line, one coordinate per field. `#` comment lines and
//! blank lines are skipped. Line and column numbers in errors are 1-based
//! and count physical lines of the input.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::points::PointSet;
use crate::{MknnError, Result};

/// Candidates tried by [`Delimiter::sniff`], in priority order.
const SNIFF_ORDER: [char; 4] = ['\t', ',', ';', '|'];

/// Field separator of a point table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Delimiter {
    /// A single separator character. Fields are trimmed.
    Char(char),
    /// Runs of whitespace.
    Whitespace,
}

impl Delimiter {
    /// Guess the delimiter of a data line: the first of tab, comma,
    /// semicolon, pipe present in it, else whitespace.
    #[must_use]
    pub fn sniff(line: &str) -> Self {
        SNIFF_ORDER
            .iter()
            .copied()
            .find(|&c| line.contains(c))
            .map_or(Delimiter::Whitespace, Delimiter::Char)
    }

    fn split<'a>(self, line: &'a str) -> Box<dyn Iterator<Item = &'a str> + 'a> {
        match self {
            Delimiter::Char(c) => Box::new(line.split(c).map(str::trim)),
            Delimiter::Whitespace => Box::new(line.split_whitespace()),
        }
    }
}

impl fmt::Display for Delimiter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Delimiter::Char('\t') => f.write_str("tab"),
            Delimiter::Char(c) => write!(f, "{c}"),
            Delimiter::Whitespace => f.write_str("whitespace"),
        }
    }
}

impl FromStr for Delimiter {
    type Err = MknnError;

    /// Accepts `tab`, `\t`, `space`, `whitespace`, or any single character.
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "tab" | "\\t" | "\t" => Ok(Delimiter::Char('\t')),
            "space" | "whitespace" | " " => Ok(Delimiter::Whitespace),
            _ => {
                let mut chars = s.chars();
                match (chars.next(), chars.next()) {
                    (Some(c), None) => Ok(Delimiter::Char(c)),
                    _ => Err(MknnError::InvalidParameter(format!(
                        "delimiter must be a single character, 'tab' or 'whitespace', got '{s}'"
                    ))),
                }
            }
        }
    }
}

/// How to read a point table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// `None` sniffs the delimiter from the first data line.
    pub delimiter: Option<Delimiter>,
    /// Leading lines dropped before anything else, e.g. a header.
    pub skip_rows: usize,
    /// Treat the last field of every row as a label and ignore it.
    pub drop_last_column: bool,
}

/// Read a point table from `path`.
pub fn read_points(path: impl AsRef<Path>, options: &ReadOptions) -> Result<PointSet> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let points = parse_points(&text, options)?;
    debug!(
        path = %path.display(),
        points = points.len(),
        dimension = points.dimension(),
        "points loaded"
    );
    Ok(points)
}

/// Parse a point table held in memory.
///
/// # Errors
///
/// - `MalformedInput` for a non-numeric field, a row whose field count
///   differs from the first row, or a row left without coordinates.
/// - `NonFiniteCoordinate` for `nan` or `inf` fields.
/// - `IndexConstruction` if there are no data rows.
pub fn parse_points(text: &str, options: &ReadOptions) -> Result<PointSet> {
    let mut delimiter = options.delimiter;
    let mut dimension = None;
    let mut data = Vec::new();

    let rows = text
        .lines()
        .enumerate()
        .skip(options.skip_rows)
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

    for (line_no, line) in rows {
        let delim = *delimiter.get_or_insert_with(|| Delimiter::sniff(line));
        let mut fields: Vec<&str> = delim.split(line).collect();
        if options.drop_last_column {
            fields.pop();
        }
        if fields.is_empty() {
            return Err(MknnError::MalformedInput {
                line: line_no,
                column: 1,
                message: "row has no coordinate columns".to_string(),
            });
        }

        let expected = *dimension.get_or_insert(fields.len());
        if fields.len() != expected {
            return Err(MknnError::MalformedInput {
                line: line_no,
                column: fields.len().min(expected) + 1,
                message: format!("expected {expected} coordinates, found {}", fields.len()),
            });
        }

        for (col, field) in fields.iter().enumerate() {
            let value = field.parse::<f32>().map_err(|_| MknnError::MalformedInput {
                line: line_no,
                column: col + 1,
                message: format!("'{field}' is not a number"),
            })?;
            data.push(value);
        }
    }

    match dimension {
        Some(dimension) => PointSet::new(dimension, data),
        None => Err(MknnError::IndexConstruction(
            "input contains no data rows".to_string(),
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opts() -> ReadOptions {
        ReadOptions::default()
    }

    #[test]
    fn sniff_priority() {
        assert_eq!(Delimiter::sniff("1\t2,3"), Delimiter::Char('\t'));
        assert_eq!(Delimiter::sniff("1,2;3"), Delimiter::Char(','));
        assert_eq!(Delimiter::sniff("1;2"), Delimiter::Char(';'));
        assert_eq!(Delimiter::sniff("1|2"), Delimiter::Char('|'));
        assert_eq!(Delimiter::sniff("1   2"), Delimiter::Whitespace);
    }

    #[test]
    fn parses_comma_table_with_comments() {
        let points = parse_points("# x,y\n0, 0\n\n0,1\n5,5\n", &opts()).unwrap();
        assert_eq!(points.len(), 3);
        assert_eq!(points.dimension(), 2);
        assert_eq!(points.point(2), &[5.0, 5.0]);
    }

    #[test]
    fn skip_rows_and_drop_label() {
        let options = ReadOptions {
            skip_rows: 1,
            drop_last_column: true,
            ..opts()
        };
        let points = parse_points("x y label\n1 2 a\n3 4 b\n", &options).unwrap();
        assert_eq!(points.dimension(), 2);
        assert_eq!(points.point(1), &[3.0, 4.0]);
    }

    #[test]
    fn non_numeric_field_reports_position() {
        let err = parse_points("1,2\n3,x\n", &opts()).unwrap_err();
        assert!(matches!(err, MknnError::MalformedInput { line: 2, column: 2, .. }));
    }

    #[test]
    fn ragged_rows_are_rejected() {
        let err = parse_points("1 2 3\n4 5\n", &opts()).unwrap_err();
        assert!(matches!(err, MknnError::MalformedInput { line: 2, .. }));
    }

    #[test]
    fn explicit_delimiter_overrides_sniffing() {
        let options = ReadOptions {
            delimiter: Some(Delimiter::Char(';')),
            ..opts()
        };
        assert!(parse_points("1,5;2\n3;4\n", &options).is_err());
        assert_eq!(parse_points("1.5;2\n3;4\n", &options).unwrap().len(), 2);
    }

    #[test]
    fn empty_input() {
        assert!(matches!(
            parse_points("# nothing\n\n", &opts()),
            Err(MknnError::IndexConstruction(_))
        ));
    }

    #[test]
    fn nan_is_rejected() {
        assert!(matches!(
            parse_points("1 2\nnan 3\n", &opts()),
            Err(MknnError::NonFiniteCoordinate { point: 1, dimension: 0 })
        ));
    }

    #[test]
    fn delimiter_from_str() {
        assert_eq!("tab".parse::<Delimiter>().unwrap(), Delimiter::Char('\t'));
        assert_eq!("space".parse::<Delimiter>().unwrap(), Delimiter::Whitespace);
        assert_eq!(",".parse::<Delimiter>().unwrap(), Delimiter::Char(','));
        assert!(",;".parse::<Delimiter>().is_err());
    }
}
