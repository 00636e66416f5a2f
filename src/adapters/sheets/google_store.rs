use std::{collections::HashMap, sync::Arc};

use error_stack::Report;
use google_sheets4::api::ValueRange;
use tokio::sync::RwLock;
use tracing::{instrument, warn};

use crate::domain::sheets::{
    a1_notation::{full_row, whole_sheet, CellPosition, ToA1Notation},
    cell_value::CellValue,
    row_location::RowLocation,
    worksheet::{Grid, WorksheetHandle},
};
use crate::ports::tabular_store::{Result, SheetStoreError, TabularStore};

use super::{
    client_context::ClientContext,
    spreadsheet_manager::{SpreadsheetManager, SpreadsheetManagerError},
    value_range_factory::ValueRangeFactory,
};

/// `TabularStore` over the Google Sheets v4 API.
///
/// Worksheet handles are cached for the life of the store; a title missing
/// from the cache triggers one metadata refetch before it is reported absent.
#[derive(Debug)]
pub struct GoogleSheetsStore {
    context: Arc<ClientContext>,
    worksheets: RwLock<Option<HashMap<String, WorksheetHandle>>>,
}

impl GoogleSheetsStore {
    pub fn new(context: Arc<ClientContext>) -> Self {
        Self {
            context,
            worksheets: RwLock::new(None),
        }
    }

    /// Maps a manager failure onto the store taxonomy. An unauthorized
    /// response drops the cached client so the next call re-authenticates.
    async fn lift<T>(
        &self,
        result: error_stack::Result<T, SpreadsheetManagerError>,
    ) -> Result<T> {
        match result {
            Ok(value) => Ok(value),
            Err(report) if *report.current_context() == SpreadsheetManagerError::Unauthorized => {
                warn!("Spreadsheet service rejected the credentials, dropping cached client");
                self.context.invalidate().await;
                Err(report.change_context(SheetStoreError::Authentication))
            }
            Err(report) => Err(report.change_context(SheetStoreError::RemoteService)),
        }
    }

    async fn refresh_worksheets(
        &self,
        manager: &SpreadsheetManager,
    ) -> Result<HashMap<String, WorksheetHandle>> {
        let fetched = self.lift(manager.fetch_worksheets().await).await?;

        // -- MUTEX WRITE --
        let mut guard = self.worksheets.write().await;
        guard.replace(fetched.clone());
        // -- END MUTEX WRITE --

        Ok(fetched)
    }

    #[instrument(skip(self, manager))]
    async fn resolve(
        &self,
        manager: &SpreadsheetManager,
        worksheet: &str,
    ) -> Result<Option<WorksheetHandle>> {
        let cached = {
            // -- MUTEX READ --
            let guard = self.worksheets.read().await;
            guard.as_ref().map(|map| map.get(worksheet).cloned())
            // -- END MUTEX READ --
        };

        match cached {
            Some(Some(handle)) => Ok(Some(handle)),
            _ => Ok(self
                .refresh_worksheets(manager)
                .await?
                .get(worksheet)
                .cloned()),
        }
    }

    async fn require(
        &self,
        manager: &SpreadsheetManager,
        worksheet: &str,
    ) -> Result<WorksheetHandle> {
        self.resolve(manager, worksheet)
            .await?
            .ok_or_else(|| Report::new(SheetStoreError::WorksheetNotFound(worksheet.to_string())))
    }
}

#[async_trait::async_trait]
impl TabularStore for GoogleSheetsStore {
    #[instrument(skip(self))]
    async fn read_rows(&self, worksheet: &str) -> Result<Option<Grid>> {
        let manager = self.context.get_client().await?;
        let Some(handle) = self.resolve(&manager, worksheet).await? else {
            return Ok(None);
        };

        let grid = self
            .lift(manager.read_range(&whole_sheet(&handle.title)).await)
            .await?;
        Ok(Some(grid))
    }

    #[instrument(skip(self))]
    async fn worksheet_titles(&self) -> Result<Vec<String>> {
        let manager = self.context.get_client().await?;
        let mut titles = self
            .refresh_worksheets(&manager)
            .await?
            .into_keys()
            .collect::<Vec<_>>();
        titles.sort();
        Ok(titles)
    }

    #[instrument(skip(self))]
    async fn read_header(&self, worksheet: &str) -> Result<Vec<String>> {
        let manager = self.context.get_client().await?;
        let handle = self.require(&manager, worksheet).await?;

        let grid = self
            .lift(
                manager
                    .read_range(&full_row(&handle.title, RowLocation::HEADER))
                    .await,
            )
            .await?;
        Ok(grid.into_iter().next().unwrap_or_default())
    }

    #[instrument(skip(self))]
    async fn append_row(&self, worksheet: &str, row: Vec<CellValue>) -> Result<()> {
        let manager = self.context.get_client().await?;
        let handle = self.require(&manager, worksheet).await?;

        self.lift(
            manager
                .append_row(&whole_sheet(&handle.title), ValueRange::from_row(&row))
                .await,
        )
        .await
    }

    #[instrument(skip(self))]
    async fn write_cell(
        &self,
        worksheet: &str,
        position: CellPosition,
        value: CellValue,
    ) -> Result<()> {
        let manager = self.context.get_client().await?;
        let handle = self.require(&manager, worksheet).await?;

        self.lift(
            manager
                .write_range(
                    &position.to_a1_notation(Some(&handle.title)),
                    ValueRange::from_single_cell(&value),
                )
                .await,
        )
        .await
    }
}
