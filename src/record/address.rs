use std::fmt;
use std::str::FromStr;

use super::RecordError;

/// A cell position in A1 notation, stored zero-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CellAddress {
    pub column: usize,
    pub row: usize,
}

impl CellAddress {
    pub fn new(column: usize, row: usize) -> Self {
        CellAddress { column, row }
    }

    fn column_label(&self) -> String {
        let mut label = Vec::new();
        let mut n = self.column + 1;
        while n > 0 {
            let rem = (n - 1) % 26;
            label.push(b'A' + rem as u8);
            n = (n - 1) / 26;
        }
        label.reverse();
        String::from_utf8_lossy(&label).into_owned()
    }
}

impl FromStr for CellAddress {
    type Err = RecordError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RecordError::InvalidAddress(s.to_string());
        let trimmed = s.trim();
        let split = trimmed
            .find(|c: char| c.is_ascii_digit())
            .ok_or_else(invalid)?;
        let (letters, digits) = trimmed.split_at(split);

        if letters.is_empty() || !letters.chars().all(|c| c.is_ascii_alphabetic()) {
            return Err(invalid());
        }
        if digits.starts_with('0') || !digits.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid());
        }

        let column = letters.chars().try_fold(0usize, |acc, c| {
            let value = (c.to_ascii_uppercase() as u8 - b'A') as usize + 1;
            acc.checked_mul(26)?.checked_add(value)
        });
        let row: usize = digits.parse().map_err(|_| invalid())?;

        match column {
            Some(column) => Ok(CellAddress::new(column - 1, row - 1)),
            None => Err(invalid()),
        }
    }
}

impl fmt::Display for CellAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.column_label(), self.row + 1)
    }
}
