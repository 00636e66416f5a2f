use std::{sync::Arc, time::Duration};

use smartfarm_sheets::{
    adapters::{
        config::sheets_config::SheetsConfig,
        sheets::{client_context::ClientContext, google_store::GoogleSheetsStore},
    },
    ports::tabular_store::TabularStore,
    ClientEvaluations, Dashboard, ProjectTracker, SalesPipeline, SheetRecordStore,
};

/// Every application service, sharing one record store and its read cache.
#[derive(Debug, Clone)]
pub struct Services {
    pub records: Arc<SheetRecordStore>,
    pub evaluations: ClientEvaluations,
    pub projects: ProjectTracker,
    pub sales: SalesPipeline,
    pub dashboard: Dashboard,
}

impl Services {
    pub fn over(store: Arc<dyn TabularStore>, read_ttl: Duration) -> Self {
        let records = Arc::new(SheetRecordStore::new(store, read_ttl));
        Self {
            evaluations: ClientEvaluations::new(Arc::clone(&records)),
            projects: ProjectTracker::new(Arc::clone(&records)),
            sales: SalesPipeline::new(Arc::clone(&records)),
            dashboard: Dashboard::new(Arc::clone(&records)),
            records,
        }
    }
}

pub struct ServiceFactory;

impl ServiceFactory {
    /// Services over the configured spreadsheet. Nothing is fetched until the
    /// first command runs.
    pub fn create(config: &SheetsConfig) -> Services {
        let context = Arc::new(ClientContext::new(config.clone()));
        let store: Arc<dyn TabularStore> = Arc::new(GoogleSheetsStore::new(context));
        Services::over(store, config.read_ttl())
    }
}
