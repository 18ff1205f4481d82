use std::fmt;
use std::io::{self, BufRead, Write};
use thiserror::Error;

/// Width every cell of a written table is padded to.
pub const COLUMN_WIDTH: usize = 30;

#[derive(Debug, Error)]
pub enum TableError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Table has no header row")]
    MissingHeader,

    #[error("Line {line}: expected {expected} columns, found {found}")]
    ColumnCount {
        line: usize,
        expected: usize,
        found: usize,
    },

    #[error("Line {line}: cannot parse '{value}' in column '{column}' as a number")]
    Parse {
        line: usize,
        column: String,
        value: String,
    },

    #[error("Required column '{0}' is missing")]
    MissingColumn(String),

    #[error("Column '{column}' holds {value}, which is not a valid count")]
    InvalidCount { column: String, value: f64 },

    #[error("Existing header [{found}] does not match the expected layout [{expected}]")]
    HeaderMismatch { expected: String, found: String },

    #[error("Table has no data rows")]
    NoRecords,
}

/// A whitespace-delimited numeric table: one header row, then data rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    header: Vec<String>,
    rows: Vec<Vec<f64>>,
}

impl Table {
    pub fn new(header: Vec<String>, rows: Vec<Vec<f64>>) -> Self {
        Self { header, rows }
    }

    /// Parses a table. Blank lines are skipped; the first non-blank line is
    /// the header and every later line must have the same number of tokens.
    pub fn parse(reader: impl BufRead) -> Result<Self, TableError> {
        let mut header: Option<Vec<String>> = None;
        let mut rows = Vec::new();

        for (index, line) in reader.lines().enumerate() {
            let line = line?;
            let line_number = index + 1;
            let tokens: Vec<&str> = line.split_whitespace().collect();
            if tokens.is_empty() {
                continue;
            }

            let Some(columns) = &header else {
                header = Some(tokens.iter().map(|t| t.to_string()).collect());
                continue;
            };

            if tokens.len() != columns.len() {
                return Err(TableError::ColumnCount {
                    line: line_number,
                    expected: columns.len(),
                    found: tokens.len(),
                });
            }

            let row = tokens
                .iter()
                .zip(columns)
                .map(|(token, column)| {
                    parse_number(token).ok_or_else(|| TableError::Parse {
                        line: line_number,
                        column: column.clone(),
                        value: token.to_string(),
                    })
                })
                .collect::<Result<Vec<_>, _>>()?;
            rows.push(row);
        }

        let header = header.ok_or(TableError::MissingHeader)?;
        Ok(Self { header, rows })
    }

    pub fn header(&self) -> &[String] {
        &self.header
    }

    pub fn rows(&self) -> &[Vec<f64>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.header.iter().position(|h| h == name)
    }

    pub fn require_column(&self, name: &str) -> Result<usize, TableError> {
        self.column_index(name)
            .ok_or_else(|| TableError::MissingColumn(name.to_string()))
    }

    pub fn rename_column(&mut self, index: usize, name: impl Into<String>) {
        if let Some(slot) = self.header.get_mut(index) {
            *slot = name.into();
        }
    }

    /// Every value of the named column, in row order.
    pub fn column(&self, name: &str) -> Result<Vec<f64>, TableError> {
        let idx = self.require_column(name)?;
        Ok(self.rows.iter().map(|row| row[idx]).collect())
    }

    pub fn float(&self, row: usize, name: &str) -> Result<f64, TableError> {
        let idx = self.require_column(name)?;
        self.rows
            .get(row)
            .map(|r| r[idx])
            .ok_or(TableError::NoRecords)
    }

    pub fn count(&self, row: usize, name: &str) -> Result<usize, TableError> {
        let value = self.float(row, name)?;
        if !value.is_finite() || value < 0.0 || value.fract() != 0.0 {
            return Err(TableError::InvalidCount {
                column: name.to_string(),
                value,
            });
        }
        Ok(value as usize)
    }

    /// Keeps only the rows for which `keep` returns true.
    pub fn retain_rows(&mut self, mut keep: impl FnMut(&[f64]) -> bool) {
        self.rows.retain(|row| keep(row));
    }
}

fn parse_number(token: &str) -> Option<f64> {
    match token {
        "NaN" | "nan" | "-nan" | "NA" => Some(f64::NAN),
        _ => token.parse().ok(),
    }
}

/// One cell of a written table.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Cell {
    Float(f64),
    Count(usize),
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Count(n) => write!(f, "{n}"),
        }
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Float(value)
    }
}

impl From<usize> for Cell {
    fn from(value: usize) -> Self {
        Cell::Count(value)
    }
}

pub(crate) fn write_row<I, D>(writer: &mut impl Write, cells: I) -> io::Result<()>
where
    I: IntoIterator<Item = D>,
    D: fmt::Display,
{
    for cell in cells {
        write!(writer, "{:<width$} ", cell.to_string(), width = COLUMN_WIDTH)?;
    }
    writeln!(writer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn parses_header_and_rows_skipping_blank_lines() {
        let text = "STEP  PRESSURE TOT_DENS\n\n100 1.5 700\n200 2.5 710\n";
        let table = Table::parse(Cursor::new(text)).unwrap();
        assert_eq!(table.header(), &["STEP", "PRESSURE", "TOT_DENS"]);
        assert_eq!(table.len(), 2);
        assert_eq!(table.column("TOT_DENS").unwrap(), vec![700.0, 710.0]);
        assert_eq!(table.float(1, "PRESSURE").unwrap(), 2.5);
    }

    #[test]
    fn missing_value_tokens_parse_as_nan() {
        let text = "A B C D\nNaN nan -nan NA\n";
        let table = Table::parse(Cursor::new(text)).unwrap();
        assert!(table.rows()[0].iter().all(|v| v.is_nan()));
    }

    #[test]
    fn ragged_row_is_rejected_with_line_number() {
        let text = "A B\n1 2\n3\n";
        let err = Table::parse(Cursor::new(text)).unwrap_err();
        assert!(matches!(
            err,
            TableError::ColumnCount {
                line: 3,
                expected: 2,
                found: 1
            }
        ));
    }

    #[test]
    fn non_numeric_cell_names_its_column() {
        let text = "A B\n1 oops\n";
        match Table::parse(Cursor::new(text)).unwrap_err() {
            TableError::Parse { line, column, value } => {
                assert_eq!(line, 2);
                assert_eq!(column, "B");
                assert_eq!(value, "oops");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn empty_input_has_no_header() {
        assert!(matches!(
            Table::parse(Cursor::new("\n\n")),
            Err(TableError::MissingHeader)
        ));
    }

    #[test]
    fn missing_column_is_reported_by_name() {
        let table = Table::parse(Cursor::new("A\n1\n")).unwrap();
        match table.column("B").unwrap_err() {
            TableError::MissingColumn(name) => assert_eq!(name, "B"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn count_rejects_fractional_values() {
        let table = Table::parse(Cursor::new("N M\n3 2.5\n")).unwrap();
        assert_eq!(table.count(0, "N").unwrap(), 3);
        assert!(matches!(
            table.count(0, "M"),
            Err(TableError::InvalidCount { .. })
        ));
    }

    #[test]
    fn rows_are_padded_to_fixed_width() {
        let mut out = Vec::new();
        write_row(&mut out, [Cell::Float(1.5), Cell::Count(2)]).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.len(), 2 * (COLUMN_WIDTH + 1) + 1);
        assert!(text.starts_with("1.5 "));
        assert_eq!(&text[COLUMN_WIDTH + 1..COLUMN_WIDTH + 2], "2");
        assert!(text.ends_with(" \n"));
    }

    #[test]
    fn retain_rows_filters_in_place() {
        let mut table = Table::parse(Cursor::new("STEP X\n1 10\n2 20\n3 30\n")).unwrap();
        table.retain_rows(|row| row[0] >= 2.0);
        assert_eq!(table.column("X").unwrap(), vec![20.0, 30.0]);
    }
}
