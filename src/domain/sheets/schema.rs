//! Physical layout of the SmartFarm spreadsheet.
//!
//! Column names are written here exactly as they appear in the header rows.
//! Lookups normalize them, appends use the order of `COLUMNS`.

use super::cell_value::CellValue;
use super::header::normalize_column_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorksheetSchema {
    pub worksheet: &'static str,
    pub columns: &'static [&'static str],
}

impl WorksheetSchema {
    /// Lays out named values in column order. Columns without a value are left
    /// empty, values for unknown columns are dropped.
    pub fn ordered_row(&self, values: Vec<(&str, CellValue)>) -> Vec<CellValue> {
        let mut values = values
            .into_iter()
            .map(|(column, value)| (normalize_column_name(column), value))
            .collect::<Vec<_>>();

        self.columns
            .iter()
            .map(|column| {
                let wanted = normalize_column_name(column);
                values
                    .iter()
                    .position(|(name, _)| *name == wanted)
                    .map(|i| values.swap_remove(i).1)
                    .unwrap_or(CellValue::Empty)
            })
            .collect()
    }

    pub fn header(&self) -> Vec<CellValue> {
        self.columns.iter().map(|c| CellValue::from(*c)).collect()
    }
}

pub mod clients {
    use super::WorksheetSchema;

    pub const WORKSHEET: &str = "Hoja 1";

    pub const TIMESTAMP: &str = "Fecha y Hora";
    pub const CATEGORY: &str = "Categoría de Evaluación";
    pub const CLIENT_ID: &str = "ID Cliente";
    pub const CLIENT_NAME: &str = "Cliente";
    pub const BRANCH: &str = "Sucursal";
    pub const CLIENT_TYPE: &str = "Tipo de Cliente";
    pub const TOTAL_SCORE: &str = "Puntaje Total SmartFarm";

    pub const SCHEMA: WorksheetSchema = WorksheetSchema {
        worksheet: WORKSHEET,
        columns: &[
            TIMESTAMP,
            CATEGORY,
            CLIENT_ID,
            CLIENT_NAME,
            BRANCH,
            CLIENT_TYPE,
            TOTAL_SCORE,
        ],
    };
}

/// Per-category score sheets: these two columns, then one column per rubric
/// item named after the item.
pub mod evaluation_detail {
    pub const TIMESTAMP: &str = "Fecha y Hora";
    pub const CLIENT_ID: &str = "ID Cliente";
}

pub mod projects {
    use super::WorksheetSchema;

    pub const WORKSHEET: &str = "Proyectos Analyzer";

    pub const TIMESTAMP: &str = "Fecha y Hora";
    pub const CLIENT_ID: &str = "ID Cliente";
    pub const CLIENT_NAME: &str = "Cliente";
    pub const BRANCH: &str = "Sucursal";
    pub const CATEGORY: &str = "Categoría";
    pub const PROJECT_TYPE: &str = "Tipo de Proyecto";
    pub const PROJECT_NAME: &str = "Nombre del Proyecto";
    pub const LOCATION: &str = "Ubicación";

    pub const PLANNING_STATUS: &str = "Planificación - Estado";
    pub const PLANNING_HOURS: &str = "Planificación - Horas";
    pub const DATA_COLLECTION_STATUS: &str = "Recopilación de Datos - Estado";
    pub const DATA_COLLECTION_HOURS: &str = "Recopilación de Datos - Horas";
    pub const REPORT_STATUS: &str = "Generación de informe - Estado";
    pub const REPORT_HOURS: &str = "Generación de informe - Horas";

    pub const SCHEMA: WorksheetSchema = WorksheetSchema {
        worksheet: WORKSHEET,
        columns: &[
            TIMESTAMP,
            CLIENT_ID,
            CLIENT_NAME,
            BRANCH,
            CATEGORY,
            PROJECT_TYPE,
            PROJECT_NAME,
            LOCATION,
            PLANNING_STATUS,
            PLANNING_HOURS,
            DATA_COLLECTION_STATUS,
            DATA_COLLECTION_HOURS,
            REPORT_STATUS,
            REPORT_HOURS,
        ],
    };
}

pub mod sales {
    use super::WorksheetSchema;

    pub const WORKSHEET: &str = "Ventas SmartFarm";

    pub const REGISTERED_AT: &str = "Fecha de Registro";
    pub const CLIENT_ID: &str = "ID Cliente";
    pub const CLIENT_NAME: &str = "Cliente";
    pub const SALE_TYPE: &str = "Tipo de Venta";
    pub const STATUS: &str = "Estado de la Venta";
    pub const AMOUNT: &str = "Monto";
    pub const DETAIL: &str = "Detalle de la Oportunidad/Venta";

    pub const SCHEMA: WorksheetSchema = WorksheetSchema {
        worksheet: WORKSHEET,
        columns: &[
            REGISTERED_AT,
            CLIENT_ID,
            CLIENT_NAME,
            SALE_TYPE,
            STATUS,
            AMOUNT,
            DETAIL,
        ],
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_row_follows_schema_order() {
        let row = sales::SCHEMA.ordered_row(vec![
            (sales::AMOUNT, CellValue::fixed2(10.0)),
            ("estado de la venta", "Posible".into()),
            (sales::CLIENT_ID, "123456".into()),
            ("Unknown", "ignored".into()),
        ]);

        assert_eq!(
            row,
            vec![
                CellValue::Empty,
                CellValue::from("123456"),
                CellValue::Empty,
                CellValue::Empty,
                CellValue::from("Posible"),
                CellValue::from("10.00"),
                CellValue::Empty,
            ]
        );
    }

    #[test]
    fn test_header_matches_columns() {
        let header = clients::SCHEMA.header();
        assert_eq!(header.len(), 7);
        assert_eq!(header[2], CellValue::from(clients::CLIENT_ID));
    }
}
