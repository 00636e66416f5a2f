use std::sync::Arc;

use chrono::NaiveDateTime;
use error_stack::{report, ResultExt};
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::sheets::{
    cell_value::CellValue,
    record::Record,
    schema::{clients, sales},
};
use crate::domain::smartfarm::{
    evaluation::{validate_client_id, ClientRef, TIMESTAMP_FORMAT},
    sale::{NewSale, SaleStatus, SalesKpis},
};

use super::record_store::SheetRecordStore;

#[derive(Error, Debug)]
pub enum SaleError {
    #[error("Invalid sale: {0}")]
    InvalidInput(String),
    #[error("Client {0} has no evaluation on record")]
    UnknownClient(String),
    #[error("No sale of client {client_id} registered at '{registered_at}'")]
    NotFound {
        client_id: String,
        registered_at: String,
    },
    #[error("Spreadsheet operation failed")]
    Store,
}

type Result<T> = error_stack::Result<T, SaleError>;

fn validate_amount(amount: f64) -> Result<()> {
    if amount.is_finite() && amount >= 0.0 {
        Ok(())
    } else {
        Err(report!(SaleError::InvalidInput(format!(
            "Amount must be a non-negative number, got {}",
            amount
        ))))
    }
}

#[derive(Debug, Clone)]
pub struct SalesPipeline {
    store: Arc<SheetRecordStore>,
}

impl SalesPipeline {
    pub fn new(store: Arc<SheetRecordStore>) -> Self {
        Self { store }
    }

    /// Records an opportunity for an evaluated client. A blank sales worksheet
    /// gets its header row first.
    #[instrument(skip(self, sale), fields(client_id = %sale.client_id))]
    pub async fn register(&self, sale: &NewSale, at: NaiveDateTime) -> Result<String> {
        validate_client_id(&sale.client_id)
            .map_err(|e| report!(SaleError::InvalidInput(e.to_string())))?;
        validate_amount(sale.amount)?;

        let evaluations = self
            .store
            .load_all(clients::WORKSHEET)
            .await
            .change_context(SaleError::Store)?;
        let client = ClientRef::latest(&evaluations, &sale.client_id)
            .ok_or_else(|| report!(SaleError::UnknownClient(sale.client_id.clone())))?;

        if self
            .store
            .ensure_header(&sales::SCHEMA)
            .await
            .change_context(SaleError::Store)?
        {
            info!("Wrote header row to empty '{}' worksheet", sales::WORKSHEET);
        }

        let registered_at = at.format(TIMESTAMP_FORMAT).to_string();
        self.store
            .append_named(
                &sales::SCHEMA,
                vec![
                    (sales::REGISTERED_AT, registered_at.as_str().into()),
                    (sales::CLIENT_ID, client.client_id.as_str().into()),
                    (sales::CLIENT_NAME, client.client_name.as_str().into()),
                    (sales::SALE_TYPE, sale.sale_type.to_string().into()),
                    (sales::STATUS, sale.status.to_string().into()),
                    (sales::AMOUNT, CellValue::Number(sale.amount)),
                    (sales::DETAIL, sale.detail.trim().into()),
                ],
            )
            .await
            .change_context(SaleError::Store)?;
        self.store.invalidate(sales::WORKSHEET).await;

        Ok(registered_at)
    }

    /// Changes status, amount and detail of a recorded sale.
    #[instrument(skip(self, detail))]
    pub async fn update(
        &self,
        client_id: &str,
        registered_at: &str,
        status: SaleStatus,
        amount: f64,
        detail: &str,
    ) -> Result<()> {
        validate_amount(amount)?;

        self.store
            .update_record(
                sales::WORKSHEET,
                &[(sales::CLIENT_ID, client_id), (sales::REGISTERED_AT, registered_at)],
                vec![
                    (sales::STATUS, status.to_string().into()),
                    (sales::AMOUNT, CellValue::fixed2(amount)),
                    (sales::DETAIL, detail.trim().into()),
                ],
            )
            .await
            .change_context(SaleError::Store)?
            .ok_or_else(|| {
                report!(SaleError::NotFound {
                    client_id: client_id.to_string(),
                    registered_at: registered_at.to_string(),
                })
            })?;

        self.store.invalidate(sales::WORKSHEET).await;
        Ok(())
    }

    pub async fn list(&self) -> Result<Vec<Record>> {
        self.store
            .load_all(sales::WORKSHEET)
            .await
            .change_context(SaleError::Store)
    }

    pub async fn kpis(&self) -> Result<SalesKpis> {
        Ok(SalesKpis::compute(&self.list().await?))
    }
}
