use std::{collections::HashMap, fmt::Debug};

use error_stack::{Report, ResultExt};
use google_sheets4::{api::ValueRange, Sheets};
use serde_json::Value;
use thiserror::Error;
use tracing::instrument;

use crate::adapters::config::sheets_config::SheetsConfig;
use crate::domain::sheets::{
    a1_notation::A1Notation,
    worksheet::{Grid, WorksheetHandle},
};

use super::{
    auth,
    grid::IntoGrid,
    http_client::{self, HttpsConnector},
};

pub type SheetsHub = Sheets<HttpsConnector>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpreadsheetManagerError {
    #[error("Failed to fetch spreadsheet metadata")]
    FailedToFetchMetadata,
    #[error("Failed to fetch range")]
    FailedToFetchRange,
    #[error("Failed to append row")]
    FailedToAppendRow,
    #[error("Failed to write range")]
    FailedToWriteRange,
    #[error("Request was not authorized")]
    Unauthorized,
}

/// An authenticated connection to one spreadsheet document.
pub struct SpreadsheetManager {
    spreadsheet_id: String,
    hub: SheetsHub,
}

impl Debug for SpreadsheetManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "SpreadsheetManager {{ spreadsheet_id: {:?} }}",
            self.spreadsheet_id
        )
    }
}

/// True for failures that a fresh token could fix.
pub fn is_auth_failure(error: &google_sheets4::Error) -> bool {
    match error {
        google_sheets4::Error::MissingToken(_) => true,
        google_sheets4::Error::BadRequest(body) => matches!(
            body.pointer("/error/code").and_then(Value::as_u64),
            Some(401)
        ),
        google_sheets4::Error::Failure(response) => {
            response.status() == google_sheets4::hyper::StatusCode::UNAUTHORIZED
        }
        _ => false,
    }
}

fn classify(
    error: google_sheets4::Error,
    otherwise: SpreadsheetManagerError,
) -> Report<SpreadsheetManagerError> {
    let context = if is_auth_failure(&error) {
        SpreadsheetManagerError::Unauthorized
    } else {
        otherwise
    };
    Report::new(error).change_context(context)
}

impl SpreadsheetManager {
    #[instrument(name = "SpreadsheetManager::new", skip(config), fields(spreadsheet_id = %config.spreadsheet_id))]
    pub async fn new(
        config: &SheetsConfig,
    ) -> crate::ports::tabular_store::Result<Self> {
        let secret = auth::configured_key(config)?;
        let client = http_client::http_client();
        let auth = auth::auth(secret, client.clone()).await?;
        let hub: SheetsHub = Sheets::new(client, auth);

        Ok(SpreadsheetManager {
            spreadsheet_id: config.spreadsheet_id.clone(),
            hub,
        })
    }

    pub fn spreadsheet_id(&self) -> &str {
        &self.spreadsheet_id
    }

    /// Every worksheet of the document, keyed by title.
    #[instrument]
    pub async fn fetch_worksheets(
        &self,
    ) -> error_stack::Result<HashMap<String, WorksheetHandle>, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .get(&self.spreadsheet_id)
            .doit()
            .await
            .map_err(|e| classify(e, SpreadsheetManagerError::FailedToFetchMetadata))?;

        let sheets = response
            .1
            .sheets
            .ok_or(SpreadsheetManagerError::FailedToFetchMetadata)
            .attach_printable("Sheets not present in spreadsheet response")?;

        Ok(sheets
            .into_iter()
            .filter_map(|sheet| {
                let properties = sheet.properties?;
                let title = properties.title?;
                let sheet_id = properties.sheet_id?;
                Some((title.clone(), WorksheetHandle { title, sheet_id }))
            })
            .collect())
    }

    #[instrument]
    pub async fn read_range(
        &self,
        range: &A1Notation,
    ) -> error_stack::Result<Grid, SpreadsheetManagerError> {
        let response = self
            .hub
            .spreadsheets()
            .values_get(&self.spreadsheet_id, range.as_ref())
            .value_render_option("UNFORMATTED_VALUE")
            .date_time_render_option("FORMATTED_STRING")
            .doit()
            .await
            .map_err(|e| classify(e, SpreadsheetManagerError::FailedToFetchRange))
            .attach_printable_lazy(|| format!("Failed to fetch values for range {}", range))?;

        // A blank range comes back without `values`.
        Ok(response.1.values.unwrap_or_default().into_grid())
    }

    #[instrument(skip(value_range))]
    pub async fn append_row(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_append(value_range, &self.spreadsheet_id, range.as_ref())
            .value_input_option("RAW")
            .insert_data_option("INSERT_ROWS")
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| classify(e, SpreadsheetManagerError::FailedToAppendRow))
            .attach_printable_lazy(|| format!("Failed to append to range {}", range))
    }

    #[instrument(skip(value_range))]
    pub async fn write_range(
        &self,
        range: &A1Notation,
        value_range: ValueRange,
    ) -> error_stack::Result<(), SpreadsheetManagerError> {
        self.hub
            .spreadsheets()
            .values_update(value_range, &self.spreadsheet_id, range.as_ref())
            .value_input_option("RAW")
            .doit()
            .await
            .map(|_| ())
            .map_err(|e| classify(e, SpreadsheetManagerError::FailedToWriteRange))
            .attach_printable_lazy(|| format!("Failed to write to range {}", range))
    }
}
