use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};
use csv::{ReaderBuilder, StringRecord, WriterBuilder};

use super::{format_number, CellAddress, CellRecord, RecordError};
use crate::constants::WORKSHEET_PREFIX;

/// A worksheet stored as a header-less CSV file. Line 1 is row 1 and the
/// first field of a line is column A.
///
/// Fully empty lines are blank rows. A quoted field spanning several lines
/// still counts as one row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CsvSheet {
    rows: Vec<Vec<String>>,
}

impl CsvSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_reader<R: io::Read>(mut reader: R) -> Result<Self, RecordError> {
        let mut input = Vec::new();
        reader.read_to_end(&mut input)?;
        let mut rdr = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(input.as_slice());

        // The reader skips empty lines, so each record's row is recovered from
        // the line breaks in front of it, less those inside quoted fields.
        let mut rows: Vec<Vec<String>> = Vec::new();
        let mut record = StringRecord::new();
        let mut counted_to = 0;
        let mut lines = 0;
        let mut embedded = 0;
        loop {
            let start = rdr.position().byte() as usize;
            if !rdr.read_record(&mut record)? {
                break;
            }
            let content_start = start
                + input[start..]
                    .iter()
                    .take_while(|b| matches!(b, b'\r' | b'\n'))
                    .count();
            lines += line_breaks(&input[counted_to..content_start]);
            counted_to = content_start;

            while rows.len() < lines - embedded {
                rows.push(Vec::new());
            }
            let fields: Vec<String> = record.iter().map(str::to_string).collect();
            embedded += fields.iter().map(|f| line_breaks(f.as_bytes())).sum::<usize>();
            rows.push(fields);
        }
        Ok(CsvSheet { rows })
    }

    pub fn open(path: impl AsRef<Path>) -> Result<Self, RecordError> {
        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    /// Writes the grid back out, padding every row to the widest one.
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), RecordError> {
        let width = self.rows.iter().map(Vec::len).max().unwrap_or(0);
        let mut wtr = WriterBuilder::new().has_headers(false).from_writer(writer);
        for row in &self.rows {
            let padded = row
                .iter()
                .map(String::as_str)
                .chain(std::iter::repeat("").take(width - row.len()));
            wtr.write_record(padded)?;
        }
        wtr.flush()?;
        Ok(())
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), RecordError> {
        let file = std::fs::File::create(path)?;
        self.to_writer(file)
    }

    pub fn rows(&self) -> usize {
        self.rows.len()
    }

    fn cell(&self, address: CellAddress) -> Option<&str> {
        self.rows
            .get(address.row)
            .and_then(|row| row.get(address.column))
            .map(String::as_str)
    }

    fn cell_mut(&mut self, address: CellAddress) -> &mut String {
        if self.rows.len() <= address.row {
            self.rows.resize_with(address.row + 1, Vec::new);
        }
        let row = &mut self.rows[address.row];
        if row.len() <= address.column {
            row.resize_with(address.column + 1, String::new);
        }
        &mut row[address.column]
    }
}

impl CellRecord for CsvSheet {
    fn read_cell(&self, address: &str) -> Result<Option<String>, RecordError> {
        let address: CellAddress = address.parse()?;
        Ok(self
            .cell(address)
            .filter(|raw| !raw.trim().is_empty())
            .map(str::to_string))
    }

    fn write_cell(&mut self, address: &str, value: f64) -> Result<(), RecordError> {
        let address: CellAddress = address.parse()?;
        *self.cell_mut(address) = format_number(value);
        Ok(())
    }
}

/// Counts line breaks; `\r\n` is one.
fn line_breaks(bytes: &[u8]) -> usize {
    let mut count = 0;
    let mut iter = bytes.iter().peekable();
    while let Some(&byte) = iter.next() {
        match byte {
            b'\n' => count += 1,
            b'\r' => {
                count += 1;
                iter.next_if_eq(&&b'\n');
            }
            _ => {}
        }
    }
    count
}

/// Name of a fresh worksheet copy, e.g. `plane_19-10-1432`.
pub fn worksheet_name(now: DateTime<Local>) -> String {
    format!("{}_{}", WORKSHEET_PREFIX, now.format("%d-%m-%H%M"))
}

/// Path of a worksheet copy placed next to `template`.
pub fn worksheet_path(template: &Path, now: DateTime<Local>) -> PathBuf {
    let name = format!("{}.csv", worksheet_name(now));
    match template.parent() {
        Some(dir) => dir.join(name),
        None => PathBuf::from(name),
    }
}
