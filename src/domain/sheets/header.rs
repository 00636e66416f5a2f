use super::column::Column;

/// Canonical form of a column name: surrounding whitespace removed, upper-cased.
///
/// Every lookup of a column by name goes through this function.
pub fn normalize_column_name(name: &str) -> String {
    name.trim().to_uppercase()
}

/// The first row of a worksheet, with normalized names.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderRow {
    columns: Vec<String>,
}

impl HeaderRow {
    pub fn new<S: AsRef<str>>(cells: &[S]) -> Self {
        Self {
            columns: cells
                .iter()
                .map(|cell| normalize_column_name(cell.as_ref()))
                .collect(),
        }
    }

    /// Column holding `name`, compared after normalization. The first match wins
    /// when a header repeats a name.
    pub fn position(&self, name: &str) -> Option<Column> {
        let wanted = normalize_column_name(name);
        self.columns
            .iter()
            .position(|column| !column.is_empty() && *column == wanted)
            .map(Column::from_index)
    }

    pub fn names(&self) -> &[String] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.iter().all(|c| c.is_empty())
    }
}
