use std::collections::BTreeMap;

use serde::Serialize;

use super::header::{normalize_column_name, HeaderRow};

/// One data row keyed by normalized column name.
///
/// Cells past the end of a short row read as empty strings, the same way a
/// blank cell does.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct Record {
    fields: BTreeMap<String, String>,
}

impl Record {
    /// When the header repeats a name, the first column holding it wins, the
    /// same one `HeaderRow::position` resolves for writes.
    pub fn from_row<S: AsRef<str>>(header: &HeaderRow, row: &[S]) -> Self {
        let mut fields = BTreeMap::new();
        for (i, name) in header.names().iter().enumerate() {
            if name.is_empty() || fields.contains_key(name) {
                continue;
            }
            let value = row.get(i).map(|v| v.as_ref().to_string()).unwrap_or_default();
            fields.insert(name.clone(), value);
        }

        Self { fields }
    }

    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .get(&normalize_column_name(column))
            .map(String::as_str)
    }

    /// Cell text, empty when the column does not exist.
    pub fn text(&self, column: &str) -> &str {
        self.get(column).unwrap_or("")
    }

    /// Caller-side numeric coercion: blank or unparsable cells count as zero.
    pub fn number(&self, column: &str) -> f64 {
        self.get(column)
            .and_then(|v| v.trim().parse::<f64>().ok())
            .filter(|n| n.is_finite())
            .unwrap_or(0.0)
    }

    /// True when every `(column, expected)` pair matches exactly.
    pub fn matches<K: AsRef<str>, V: AsRef<str>>(&self, keys: &[(K, V)]) -> bool {
        keys.iter()
            .all(|(column, expected)| self.get(column.as_ref()) == Some(expected.as_ref()))
    }
}
