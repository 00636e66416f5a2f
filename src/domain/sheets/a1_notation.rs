use std::fmt::Formatter;

use super::{column::Column, row_location::RowLocation};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct A1Notation(pub String);

impl std::fmt::Display for A1Notation {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<A1Notation> for String {
    fn from(a1_notation: A1Notation) -> Self {
        a1_notation.0
    }
}

impl AsRef<str> for A1Notation {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

pub trait ToA1Notation {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellPosition {
    pub col: Column,
    pub row: RowLocation,
}

impl CellPosition {
    pub fn new(row: RowLocation, col: Column) -> Self {
        Self { col, row }
    }
}

/// Sheet titles are always quoted, embedded quotes are doubled.
pub fn quote_sheet_title(title: &str) -> String {
    format!("'{}'", title.replace('\'', "''"))
}

/// Range covering every cell of a worksheet.
pub fn whole_sheet(title: &str) -> A1Notation {
    A1Notation(quote_sheet_title(title))
}

/// Range covering a single full row of a worksheet.
pub fn full_row(title: &str, row: RowLocation) -> A1Notation {
    A1Notation(format!("{}!{}:{}", quote_sheet_title(title), row, row))
}

impl ToA1Notation for CellPosition {
    fn to_a1_notation(&self, sheet_name: Option<&str>) -> A1Notation {
        match sheet_name {
            Some(sheet_name) => A1Notation(format!(
                "{}!{}{}",
                quote_sheet_title(sheet_name),
                self.col,
                self.row
            )),
            None => A1Notation(format!("{}{}", self.col, self.row)),
        }
    }
}
