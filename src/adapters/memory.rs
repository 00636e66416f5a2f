use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use error_stack::report;
use tokio::sync::RwLock;
use tracing::instrument;

use crate::domain::sheets::{a1_notation::CellPosition, cell_value::CellValue, worksheet::Grid};
use crate::ports::tabular_store::{Result, SheetStoreError, TabularStore};

/// A spreadsheet document held in memory, for exercising the record store
/// and services without the remote service.
#[derive(Debug, Default)]
pub struct InMemoryTabularStore {
    worksheets: RwLock<HashMap<String, Grid>>,
    reads: AtomicUsize,
    unavailable: AtomicBool,
}

impl InMemoryTabularStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_worksheet<S: AsRef<str>>(&self, title: &str, rows: &[Vec<S>]) {
        let grid = rows
            .iter()
            .map(|row| row.iter().map(|c| c.as_ref().to_string()).collect())
            .collect();
        self.worksheets.write().await.insert(title.to_string(), grid);
    }

    pub async fn snapshot(&self, title: &str) -> Option<Grid> {
        self.worksheets.read().await.get(title).cloned()
    }

    /// Number of `read_rows` calls served so far.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// While set, every call fails as a transport failure would.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(report!(SheetStoreError::RemoteService)
                .attach_printable("in-memory store marked unavailable"));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl TabularStore for InMemoryTabularStore {
    #[instrument(skip(self))]
    async fn read_rows(&self, worksheet: &str) -> Result<Option<Grid>> {
        self.check_available()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.worksheets.read().await.get(worksheet).cloned())
    }

    async fn worksheet_titles(&self) -> Result<Vec<String>> {
        self.check_available()?;
        let mut titles = self.worksheets.read().await.keys().cloned().collect::<Vec<_>>();
        titles.sort();
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn append_row(&self, worksheet: &str, row: Vec<CellValue>) -> Result<()> {
        self.check_available()?;
        let mut guard = self.worksheets.write().await;
        let grid = guard
            .get_mut(worksheet)
            .ok_or_else(|| SheetStoreError::WorksheetNotFound(worksheet.to_string()))?;

        // Like the remote service, land after the last row holding any value.
        let last_used = grid
            .iter()
            .rposition(|r| r.iter().any(|c| !c.is_empty()))
            .map_or(0, |i| i + 1);
        grid.truncate(last_used);
        grid.push(row.iter().map(ToString::to_string).collect());
        Ok(())
    }

    #[instrument(skip(self))]
    async fn write_cell(
        &self,
        worksheet: &str,
        position: CellPosition,
        value: CellValue,
    ) -> Result<()> {
        self.check_available()?;
        let mut guard = self.worksheets.write().await;
        let grid = guard
            .get_mut(worksheet)
            .ok_or_else(|| SheetStoreError::WorksheetNotFound(worksheet.to_string()))?;

        let (row, col) = (position.row.index() as usize, position.col.index());
        if grid.len() <= row {
            grid.resize_with(row + 1, Vec::new);
        }
        let cells = &mut grid[row];
        if cells.len() <= col {
            cells.resize(col + 1, String::new());
        }
        cells[col] = value.to_string();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::sheets::{column::Column, row_location::RowLocation};

    #[tokio::test]
    async fn test_append_lands_after_last_used_row() {
        let store = InMemoryTabularStore::new();
        store
            .add_worksheet("Hoja 1", &[vec!["A", "B"], vec!["1", "2"], vec!["", ""]])
            .await;

        store
            .append_row("Hoja 1", vec!["3".into(), CellValue::Number(4.0)])
            .await
            .unwrap();

        let grid = store.snapshot("Hoja 1").await.unwrap();
        assert_eq!(grid.len(), 3);
        assert_eq!(grid[2], vec!["3", "4"]);
    }

    #[tokio::test]
    async fn test_write_cell_grows_ragged_rows() {
        let store = InMemoryTabularStore::new();
        store.add_worksheet("S", &[vec!["A", "B", "C"], vec!["x"]]).await;

        let pos = CellPosition::new(RowLocation::from_row(2), Column::from_index(2));
        store.write_cell("S", pos, "z".into()).await.unwrap();

        assert_eq!(store.snapshot("S").await.unwrap()[1], vec!["x", "", "z"]);
    }

    #[tokio::test]
    async fn test_missing_worksheet() {
        let store = InMemoryTabularStore::new();
        assert_eq!(store.read_rows("nope").await.unwrap(), None);

        let err = store.append_row("nope", vec![]).await.unwrap_err();
        assert_eq!(
            err.current_context(),
            &SheetStoreError::WorksheetNotFound("nope".into())
        );

        let err = store.read_header("nope").await.unwrap_err();
        assert!(matches!(
            err.current_context(),
            SheetStoreError::WorksheetNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_unavailable_store_fails_every_call() {
        let store = InMemoryTabularStore::new();
        store.add_worksheet("S", &[vec!["A"]]).await;
        store.set_unavailable(true);

        let err = store.read_rows("S").await.unwrap_err();
        assert_eq!(err.current_context(), &SheetStoreError::RemoteService);
        assert_eq!(store.reads(), 0);
    }
}
