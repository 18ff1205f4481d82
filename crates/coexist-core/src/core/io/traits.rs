use super::table::{Cell, Table, TableError, write_row};
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// A record type that is stored as one row of a fixed-width text table.
///
/// Implementors describe their column titles and cell values; reading,
/// atomic rewriting and header-once appending are provided on top of that.
pub trait TabularRecord: Sized {
    /// Column titles, in the order produced by [`TabularRecord::cells`].
    fn titles(&self) -> Vec<String>;

    /// Cell values of this record.
    fn cells(&self) -> Vec<Cell>;

    /// Builds a record from row `row` of a parsed table.
    ///
    /// # Errors
    ///
    /// Returns an error if a required column is missing or holds an
    /// invalid value.
    fn from_row(table: &Table, row: usize) -> Result<Self, TableError>;

    /// Reads every record of a table.
    fn read_all_from(reader: impl BufRead) -> Result<Vec<Self>, TableError> {
        let table = Table::parse(reader)?;
        (0..table.len())
            .map(|row| Self::from_row(&table, row))
            .collect()
    }

    fn read_all_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<Self>, TableError> {
        let file = File::open(path)?;
        Self::read_all_from(BufReader::new(file))
    }

    /// Reads the first record of a table.
    ///
    /// # Errors
    ///
    /// Returns [`TableError::NoRecords`] when the table has a header but no rows.
    fn read_first_from_path<P: AsRef<Path>>(path: P) -> Result<Self, TableError> {
        let file = File::open(path)?;
        let table = Table::parse(BufReader::new(file))?;
        if table.is_empty() {
            return Err(TableError::NoRecords);
        }
        Self::from_row(&table, 0)
    }

    /// Writes a header followed by the given records.
    fn write_all_to(records: &[Self], writer: &mut impl Write) -> Result<(), TableError> {
        let first = records.first().ok_or(TableError::NoRecords)?;
        write_row(writer, first.titles())?;
        for record in records {
            write_row(writer, record.cells())?;
        }
        Ok(())
    }

    /// Replaces the file at `path` with a table holding `records`.
    ///
    /// The content is written to a temporary file in the same directory and
    /// then persisted over the target, so readers never observe a partial table.
    fn write_all_to_path<P: AsRef<Path>>(records: &[Self], path: P) -> Result<(), TableError> {
        let path = path.as_ref();
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or_else(|| Path::new("."));
        let mut temp = NamedTempFile::new_in(dir)?;
        {
            let mut writer = BufWriter::new(temp.as_file_mut());
            Self::write_all_to(records, &mut writer)?;
            writer.flush()?;
        }
        temp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    /// Writes this record as a single-row table, replacing any previous content.
    fn write_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), TableError> {
        Self::write_all_to_path(std::slice::from_ref(self), path)
    }

    /// Appends `records` to the table at `path`.
    ///
    /// A missing or empty file is created with a header first. An existing
    /// header must match the records' titles exactly. All rows are rendered
    /// up front and written with one call.
    fn append_all_to_path<P: AsRef<Path>>(records: &[Self], path: P) -> Result<(), TableError> {
        let path = path.as_ref();
        let first = match records.first() {
            Some(first) => first,
            None => return Ok(()),
        };
        let titles = first.titles();

        let existing = read_header(path)?;
        let mut buffer = Vec::new();
        match existing {
            Some(found) if found != titles => {
                return Err(TableError::HeaderMismatch {
                    expected: titles.join(" "),
                    found: found.join(" "),
                });
            }
            Some(_) => {}
            None => write_row(&mut buffer, &titles)?,
        }
        for record in records {
            write_row(&mut buffer, record.cells())?;
        }

        let mut file = OpenOptions::new().create(true).append(true).open(path)?;
        file.write_all(&buffer)?;
        file.flush()?;
        Ok(())
    }
}

/// Header tokens of an existing table, or `None` when the file is absent or blank.
fn read_header(path: &Path) -> Result<Option<Vec<String>>, TableError> {
    let file = match File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e.into()),
    };
    for line in BufReader::new(file).lines() {
        let line = line?;
        let tokens: Vec<String> = line.split_whitespace().map(str::to_string).collect();
        if !tokens.is_empty() {
            return Ok(Some(tokens));
        }
    }
    Ok(None)
}
