use std::{fmt::Formatter, num::ParseIntError, str::FromStr};

/// Position of a row inside a worksheet. Row 1 is always the header row.
///
/// Only meaningful until the next write from anyone: other sessions appending
/// or inserting rows shift positions, so callers re-locate a record by its key
/// columns before updating it instead of holding on to a `RowLocation`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowLocation {
    index: u32,
}

impl RowLocation {
    pub const HEADER: RowLocation = RowLocation { index: 0 };

    pub fn from_index(index: u32) -> Self {
        RowLocation { index }
    }

    pub fn from_row(row: u32) -> Self {
        RowLocation {
            index: row.saturating_sub(1), // Convert to zero-based index
        }
    }

    /// Location of the `n`th data row (zero-based), i.e. the row right below
    /// the header for `n == 0`.
    pub fn of_data_row(n: usize) -> Self {
        let n = u32::try_from(n).unwrap_or(u32::MAX - 1);
        RowLocation::from_index(n.saturating_add(1))
    }

    pub fn from_row_str(row: &str) -> Result<Self, ParseIntError> {
        let row = row.trim().parse::<u32>()?;
        Ok(RowLocation::from_row(row))
    }

    /// Returns the row number as a 1-based index.
    /// # Examples
    /// ```
    /// use smartfarm_sheets::domain::sheets::row_location::RowLocation;
    /// let row = RowLocation::from_index(0);
    /// assert_eq!(row.row(), 1);
    /// let row = RowLocation::from_index(4);
    /// assert_eq!(row.row(), 5);
    /// ```
    pub fn row(&self) -> u32 {
        self.index.saturating_add(1)
    }

    /// Returns the row index as a zero-based index.
    pub fn index(&self) -> u32 {
        self.index
    }

    pub fn is_header(&self) -> bool {
        self.index == 0
    }

    /// Zero-based position among data rows, `None` for the header.
    pub fn data_index(&self) -> Option<usize> {
        self.index.checked_sub(1).map(|i| i as usize)
    }
}

impl std::fmt::Display for RowLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.row())
    }
}

impl std::fmt::Debug for RowLocation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "RowLocation(index: {}, row: {})", self.index(), self.row())
    }
}

impl FromStr for RowLocation {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RowLocation::from_row_str(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_row_display() {
        let row = RowLocation::from_index(0);
        assert_eq!(row.to_string(), "1");
    }

    #[test]
    fn test_row_debug() {
        let row = RowLocation::from_index(4);
        assert_eq!(format!("{:?}", row), "RowLocation(index: 4, row: 5)");
    }

    #[test]
    fn test_index_from_row() {
        let row = RowLocation::from_row(5);
        assert_eq!(row.index(), 4);
    }

    #[test]
    fn test_header_is_row_one() {
        assert!(RowLocation::from_row(1).is_header());
        assert_eq!(RowLocation::HEADER.row(), 1);
        assert_eq!(RowLocation::HEADER.data_index(), None);
    }

    #[test]
    fn test_data_rows_start_at_two() {
        let first = RowLocation::of_data_row(0);
        assert_eq!(first.row(), 2);
        assert_eq!(first.data_index(), Some(0));
        assert_eq!(RowLocation::of_data_row(9).row(), 11);
    }

    #[test]
    fn test_row_from_str() {
        let row: RowLocation = " 5".parse().unwrap();
        assert_eq!(row, RowLocation::from_row(5));
    }

    #[test]
    fn test_row_from_str_error() {
        let result: Result<RowLocation, _> = "abc".parse();
        assert!(result.is_err());
    }

    #[test]
    fn test_zero_row_saturates_to_header() {
        let row = RowLocation::from_row(0);
        assert_eq!(row.index(), 0);
        assert_eq!(row.row(), 1);
    }
}
