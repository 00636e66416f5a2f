use google_sheets4::api::ValueRange;

use crate::domain::sheets::cell_value::CellValue;

pub trait ValueRangeFactory {
    fn from_single_cell(cell_value: &CellValue) -> Self;
    fn from_row(row: &[CellValue]) -> Self;
}

impl ValueRangeFactory for ValueRange {
    fn from_single_cell(cell_value: &CellValue) -> Self {
        ValueRange {
            major_dimension: None,
            range: None,
            values: Some(vec![vec![cell_value.to_json()]]),
        }
    }

    fn from_row(row: &[CellValue]) -> Self {
        Self {
            major_dimension: Some("ROWS".to_string()),
            range: None,
            values: Some(vec![row.iter().map(CellValue::to_json).collect()]),
        }
    }
}
