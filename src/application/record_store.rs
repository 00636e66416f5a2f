use std::{sync::Arc, time::Duration};

use error_stack::{report, ResultExt};
use futures::future::join_all;
use tracing::{debug, instrument};

use crate::adapters::cache::TtlMap;
use crate::domain::sheets::{
    a1_notation::CellPosition,
    cell_value::CellValue,
    column::Column,
    header::HeaderRow,
    record::Record,
    row_location::RowLocation,
    schema::WorksheetSchema,
    worksheet::Grid,
};
use crate::ports::tabular_store::{Result, SheetStoreError, TabularStore};

/// Record-level access to the worksheets of one spreadsheet document.
///
/// Reads through `load_all` are cached per worksheet for `read_ttl`. Nothing
/// here invalidates that cache on its own: callers that write call
/// `invalidate` afterwards or accept stale reads until expiry. `find_row`,
/// `update_cell` and the header lookups always go to the live sheet.
pub struct SheetRecordStore {
    store: Arc<dyn TabularStore>,
    reads: TtlMap<String, Arc<Vec<Record>>>,
}

impl std::fmt::Debug for SheetRecordStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetRecordStore")
            .field("store", &"<TabularStore>")
            .finish()
    }
}

fn records_of(grid: Grid) -> Vec<Record> {
    let mut rows = grid.into_iter();
    let Some(header) = rows.next() else {
        return Vec::new();
    };
    let header = HeaderRow::new(&header);
    if header.is_empty() {
        return Vec::new();
    }
    rows.map(|row| Record::from_row(&header, &row)).collect()
}

impl SheetRecordStore {
    pub fn new(store: Arc<dyn TabularStore>, read_ttl: Duration) -> Self {
        Self {
            store,
            reads: TtlMap::new(read_ttl),
        }
    }

    /// Data rows of `worksheet` as records keyed by normalized header name.
    /// An absent or header-only worksheet yields no records.
    #[instrument(skip(self))]
    pub async fn load_all(&self, worksheet: &str) -> Result<Vec<Record>> {
        if let Some(records) = self.reads.get(worksheet).await {
            debug!("Serving {} records from read cache", records.len());
            return Ok(records.as_ref().clone());
        }

        let grid = self.store.read_rows(worksheet).await?;
        if grid.is_none() {
            debug!("Worksheet absent, treating as empty");
        }
        let records = Arc::new(grid.map(records_of).unwrap_or_default());
        self.reads
            .insert(worksheet.to_string(), Arc::clone(&records))
            .await;

        Ok(records.as_ref().clone())
    }

    /// `load_all` over several worksheets at once, results in input order.
    pub async fn load_many(&self, worksheets: &[&str]) -> Result<Vec<Vec<Record>>> {
        join_all(worksheets.iter().map(|worksheet| self.load_all(worksheet)))
            .await
            .into_iter()
            .collect()
    }

    /// Appends `row` as-is, in the worksheet's existing column order.
    #[instrument(skip(self))]
    pub async fn append(&self, worksheet: &str, row: Vec<CellValue>) -> Result<()> {
        self.store.append_row(worksheet, row).await
    }

    /// Appends named values laid out by `schema`.
    pub async fn append_named(
        &self,
        schema: &WorksheetSchema,
        values: Vec<(&str, CellValue)>,
    ) -> Result<()> {
        self.append(schema.worksheet, schema.ordered_row(values))
            .await
    }

    /// Titles of every worksheet in the document, always live.
    pub async fn worksheet_titles(&self) -> Result<Vec<String>> {
        self.store.worksheet_titles().await
    }

    /// Current header row of `worksheet`.
    pub async fn header(&self, worksheet: &str) -> Result<HeaderRow> {
        Ok(HeaderRow::new(&self.store.read_header(worksheet).await?))
    }

    fn resolve_column(header: &HeaderRow, worksheet: &str, column_name: &str) -> Result<Column> {
        header.position(column_name).ok_or_else(|| {
            report!(SheetStoreError::ColumnNotFound {
                worksheet: worksheet.to_string(),
                column: column_name.to_string(),
            })
        })
    }

    #[instrument(skip(self))]
    pub async fn update_cell(
        &self,
        worksheet: &str,
        row: RowLocation,
        column_name: &str,
        value: CellValue,
    ) -> Result<()> {
        let header = self.header(worksheet).await?;
        let column = Self::resolve_column(&header, worksheet, column_name)?;

        self.store
            .write_cell(worksheet, CellPosition::new(row, column), value)
            .await
            .attach_printable_lazy(|| format!("Updating {} at row {}", column_name, row))
    }

    /// Current location of the first data row whose every key column holds
    /// exactly the expected value. Scans the live sheet.
    pub async fn find_row<K: AsRef<str>, V: AsRef<str>>(
        &self,
        worksheet: &str,
        keys: &[(K, V)],
    ) -> Result<Option<RowLocation>> {
        Ok(self
            .find_record(worksheet, keys)
            .await?
            .map(|(row, _)| row))
    }

    /// `find_row` that also returns the matched row as a record, read from
    /// the same live scan.
    #[instrument(skip(self, keys))]
    pub async fn find_record<K: AsRef<str>, V: AsRef<str>>(
        &self,
        worksheet: &str,
        keys: &[(K, V)],
    ) -> Result<Option<(RowLocation, Record)>> {
        let grid = self
            .store
            .read_rows(worksheet)
            .await?
            .ok_or_else(|| report!(SheetStoreError::WorksheetNotFound(worksheet.to_string())))?;

        let mut rows = grid.iter();
        let header = HeaderRow::new(rows.next().map(Vec::as_slice).unwrap_or_default());

        let columns = keys
            .iter()
            .map(|(column, expected)| {
                Self::resolve_column(&header, worksheet, column.as_ref())
                    .map(|c| (c.index(), expected.as_ref()))
            })
            .collect::<Result<Vec<_>>>()?;

        if columns.is_empty() {
            return Ok(None);
        }

        Ok(rows
            .enumerate()
            .find(|(_, row)| {
                columns.iter().all(|(index, expected)| {
                    row.get(*index).map(String::as_str).unwrap_or("") == *expected
                })
            })
            .map(|(n, row)| (RowLocation::of_data_row(n), Record::from_row(&header, row))))
    }

    /// Resolves every change column against the live header of `worksheet`.
    /// Nothing is written, so callers can check several worksheets before
    /// touching any of them.
    pub async fn resolve_changes(
        &self,
        worksheet: &str,
        changes: Vec<(&str, CellValue)>,
    ) -> Result<Vec<(Column, CellValue)>> {
        let header = self.header(worksheet).await?;
        changes
            .into_iter()
            .map(|(name, value)| {
                Self::resolve_column(&header, worksheet, name).map(|column| (column, value))
            })
            .collect()
    }

    /// Writes already resolved cells on `row`, one cell at a time.
    #[instrument(skip(self, cells))]
    pub async fn apply_changes(
        &self,
        worksheet: &str,
        row: RowLocation,
        cells: Vec<(Column, CellValue)>,
    ) -> Result<()> {
        for (column, value) in cells {
            self.store
                .write_cell(worksheet, CellPosition::new(row, column), value)
                .await?;
        }
        Ok(())
    }

    /// Locates a record by `keys` and rewrites `changes` on it, one cell per
    /// change. Every change column is checked against the header before the
    /// first write. `None` when no row matches.
    #[instrument(skip(self, keys, changes))]
    pub async fn update_record<K: AsRef<str>, V: AsRef<str>>(
        &self,
        worksheet: &str,
        keys: &[(K, V)],
        changes: Vec<(&str, CellValue)>,
    ) -> Result<Option<RowLocation>> {
        let Some(row) = self.find_row(worksheet, keys).await? else {
            return Ok(None);
        };

        let cells = self.resolve_changes(worksheet, changes).await?;
        self.apply_changes(worksheet, row, cells).await?;
        Ok(Some(row))
    }

    /// Writes the schema's header row when the worksheet holds no values at
    /// all. Returns whether it did.
    #[instrument(skip(self))]
    pub async fn ensure_header(&self, schema: &WorksheetSchema) -> Result<bool> {
        let grid = self
            .store
            .read_rows(schema.worksheet)
            .await?
            .ok_or_else(|| {
                report!(SheetStoreError::WorksheetNotFound(schema.worksheet.to_string()))
            })?;

        if grid.iter().flatten().any(|cell| !cell.trim().is_empty()) {
            return Ok(false);
        }
        self.append(schema.worksheet, schema.header()).await?;
        Ok(true)
    }

    pub async fn invalidate(&self, worksheet: &str) {
        self.reads.remove(worksheet).await;
    }

    pub async fn invalidate_all(&self) {
        self.reads.clear().await;
    }
}
