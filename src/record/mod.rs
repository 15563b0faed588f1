pub mod address;
pub mod csv_sheet;
pub mod memory;

use thiserror::Error;

pub use address::CellAddress;
pub use csv_sheet::CsvSheet;
pub use memory::MemoryRecord;

#[derive(Debug, Error)]
pub enum RecordError {
    #[error("Invalid cell address `{0}`")]
    InvalidAddress(String),

    #[error("Cell {0} is unavailable")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),
}

/// An externally owned, cell-addressed store of model values.
///
/// Every call is one blocking round trip. `read_cell` returns `Ok(None)` for
/// a blank cell; the raw text is parsed by the caller.
pub trait CellRecord {
    fn read_cell(&self, address: &str) -> Result<Option<String>, RecordError>;

    fn write_cell(&mut self, address: &str, value: f64) -> Result<(), RecordError>;
}

impl<R: CellRecord + ?Sized> CellRecord for &mut R {
    fn read_cell(&self, address: &str) -> Result<Option<String>, RecordError> {
        (**self).read_cell(address)
    }

    fn write_cell(&mut self, address: &str, value: f64) -> Result<(), RecordError> {
        (**self).write_cell(address, value)
    }
}

/// Formats a number the way it is written into a record. `f64`'s `Display`
/// is shortest-round-trip, so a pushed value reads back bit-identical.
pub fn format_number(value: f64) -> String {
    value.to_string()
}
