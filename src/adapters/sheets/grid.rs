use serde_json::Value;

use crate::domain::sheets::worksheet::Grid;

/// Cell text of a value returned by an `UNFORMATTED_VALUE` read.
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Bool(b) => if *b { "TRUE" } else { "FALSE" }.to_string(),
        Value::Number(n) => match n.as_f64() {
            Some(f) if f.fract() == 0.0 && f.abs() < 1e15 => format!("{}", f as i64),
            _ => n.to_string(),
        },
        other => other.to_string().replace('\"', ""),
    }
}

pub trait IntoGrid {
    fn into_grid(self) -> Grid;
}

impl IntoGrid for Vec<Vec<Value>> {
    fn into_grid(self) -> Grid {
        self.into_iter()
            .map(|row| row.iter().map(cell_text).collect())
            .collect()
    }
}
