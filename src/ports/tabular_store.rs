use thiserror::Error;

use crate::domain::sheets::{a1_notation::CellPosition, cell_value::CellValue, worksheet::Grid};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SheetStoreError {
    #[error("Service account private key is malformed")]
    MalformedKey,
    #[error("Could not authenticate against the spreadsheet service")]
    Authentication,
    #[error("Column '{column}' not found in worksheet '{worksheet}'")]
    ColumnNotFound { worksheet: String, column: String },
    #[error("Worksheet '{0}' not found")]
    WorksheetNotFound(String),
    #[error("Spreadsheet service request failed")]
    RemoteService,
}

pub type Result<T> = error_stack::Result<T, SheetStoreError>;

/// Raw cell access to the worksheets of one spreadsheet document.
///
/// Implementations do no caching of cell contents: every call observes the
/// current remote state.
#[async_trait::async_trait]
pub trait TabularStore: Send + Sync {
    /// Every row of `worksheet`, header included. `None` when the document has
    /// no worksheet with that title.
    async fn read_rows(&self, worksheet: &str) -> Result<Option<Grid>>;

    /// Titles of every worksheet in the document, sorted.
    async fn worksheet_titles(&self) -> Result<Vec<String>>;

    /// First row of `worksheet`, empty when the worksheet is blank.
    async fn read_header(&self, worksheet: &str) -> Result<Vec<String>> {
        let rows = self
            .read_rows(worksheet)
            .await?
            .ok_or_else(|| SheetStoreError::WorksheetNotFound(worksheet.to_string()))?;
        Ok(rows.into_iter().next().unwrap_or_default())
    }

    /// Appends `row` after the last non-empty row, cell by cell in the given order.
    async fn append_row(&self, worksheet: &str, row: Vec<CellValue>) -> Result<()>;

    /// Overwrites a single cell. This is the only path that modifies existing
    /// rows.
    async fn write_cell(
        &self,
        worksheet: &str,
        position: CellPosition,
        value: CellValue,
    ) -> Result<()>;
}
