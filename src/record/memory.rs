use std::collections::{HashMap, HashSet};

use super::{format_number, CellAddress, CellRecord, RecordError};

/// Map-backed record. Reads and writes can be made to fail per address,
/// which stands in for a flaky remote sheet.
#[derive(Debug, Clone, Default)]
pub struct MemoryRecord {
    cells: HashMap<CellAddress, String>,
    failing_reads: HashSet<CellAddress>,
    failing_writes: HashSet<CellAddress>,
    writes: Vec<(CellAddress, f64)>,
}

impl MemoryRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a record from `(address, raw text)` pairs.
    pub fn from_cells<'a, I>(cells: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut record = Self::new();
        for (address, raw) in cells {
            record.set_raw(address, raw)?;
        }
        Ok(record)
    }

    /// Writes raw text without touching the write journal, as an
    /// out-of-band editor would.
    pub fn set_raw(&mut self, address: &str, raw: &str) -> Result<(), RecordError> {
        let address: CellAddress = address.parse()?;
        if raw.trim().is_empty() {
            self.cells.remove(&address);
        } else {
            self.cells.insert(address, raw.to_string());
        }
        Ok(())
    }

    pub fn raw(&self, address: &str) -> Option<&str> {
        let address: CellAddress = address.parse().ok()?;
        self.cells.get(&address).map(String::as_str)
    }

    pub fn fail_reads_at(&mut self, address: &str) -> Result<(), RecordError> {
        self.failing_reads.insert(address.parse()?);
        Ok(())
    }

    pub fn fail_writes_at(&mut self, address: &str) -> Result<(), RecordError> {
        self.failing_writes.insert(address.parse()?);
        Ok(())
    }

    pub fn clear_faults(&mut self) {
        self.failing_reads.clear();
        self.failing_writes.clear();
    }

    /// Every successful `write_cell` call, in order.
    pub fn writes(&self) -> &[(CellAddress, f64)] {
        &self.writes
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl CellRecord for MemoryRecord {
    fn read_cell(&self, address: &str) -> Result<Option<String>, RecordError> {
        let address: CellAddress = address.parse()?;
        if self.failing_reads.contains(&address) {
            return Err(RecordError::Unavailable(address.to_string()));
        }
        Ok(self.cells.get(&address).cloned())
    }

    fn write_cell(&mut self, address: &str, value: f64) -> Result<(), RecordError> {
        let address: CellAddress = address.parse()?;
        if self.failing_writes.contains(&address) {
            return Err(RecordError::Unavailable(address.to_string()));
        }
        self.cells.insert(address, format_number(value));
        self.writes.push((address, value));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_write() {
        let mut record = MemoryRecord::new();
        assert_eq!(record.read_cell("C31").unwrap(), None);

        record.write_cell("C31", 1.2).unwrap();
        assert_eq!(record.read_cell("c31").unwrap().as_deref(), Some("1.2"));
        assert_eq!(record.writes().len(), 1);
    }

    #[test]
    fn test_set_raw_is_not_journaled() {
        let mut record = MemoryRecord::from_cells([("I16", "15"), ("I18", "0.6")]).unwrap();
        record.set_raw("I16", "16").unwrap();
        assert_eq!(record.raw("I16"), Some("16"));
        assert!(record.writes().is_empty());

        record.set_raw("I16", "  ").unwrap();
        assert_eq!(record.read_cell("I16").unwrap(), None);
        assert_eq!(record.len(), 1);
    }

    #[test]
    fn test_fault_injection() {
        let mut record = MemoryRecord::from_cells([("I16", "15")]).unwrap();
        record.fail_reads_at("I16").unwrap();
        record.fail_writes_at("I17").unwrap();

        assert!(matches!(
            record.read_cell("I16"),
            Err(RecordError::Unavailable(_))
        ));
        assert!(record.write_cell("I17", 1.0).is_err());
        assert!(record.writes().is_empty());

        record.clear_faults();
        assert!(record.read_cell("I16").is_ok());
    }

    #[test]
    fn test_invalid_address() {
        let mut record = MemoryRecord::new();
        assert!(matches!(
            record.write_cell("16I", 1.0),
            Err(RecordError::InvalidAddress(_))
        ));
    }
}
