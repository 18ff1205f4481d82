use super::table::{Table, TableError};
use crate::core::stats::nan_mean;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

pub const STEP_COLUMN: &str = "STEP";
pub const MOLE_FRACTION_PREFIX: &str = "MOLFRACT_";

/// Block-averaged time series of one simulation box.
///
/// The simulation engine writes the step column as `#STEP`; it is renamed
/// to [`STEP_COLUMN`] on load regardless of its original spelling.
#[derive(Debug, Clone)]
pub struct BlockAverages {
    table: Table,
}

impl BlockAverages {
    pub fn read_from(reader: impl BufRead) -> Result<Self, TableError> {
        let mut table = Table::parse(reader)?;
        table.rename_column(0, STEP_COLUMN);
        Ok(Self { table })
    }

    pub fn read_from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = File::open(path)?;
        Self::read_from(BufReader::new(file))
    }

    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Drops rows whose step lies outside `[start, finish]` (inclusive; open
    /// ends are unbounded).
    pub fn restrict_steps(&mut self, start: Option<u64>, finish: Option<u64>) {
        let lower = start.map_or(f64::NEG_INFINITY, |s| s as f64);
        let upper = finish.map_or(f64::INFINITY, |f| f as f64);
        self.table
            .retain_rows(|row| row[0] >= lower && row[0] <= upper);
    }

    /// Mean of a column over the remaining rows, ignoring NaN entries.
    ///
    /// NaN when no rows remain.
    pub fn column_mean(&self, column: &str) -> Result<f64, TableError> {
        let values = self.table.column(column)?;
        Ok(nan_mean(&values))
    }

    /// Species names carried as `MOLFRACT_<species>` columns, in header order.
    pub fn species(&self) -> Vec<String> {
        self.table
            .header()
            .iter()
            .filter_map(|h| h.strip_prefix(MOLE_FRACTION_PREFIX))
            .map(str::to_string)
            .collect()
    }

    pub fn table(&self) -> &Table {
        &self.table
    }
}
