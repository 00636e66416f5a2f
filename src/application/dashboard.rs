use std::{collections::BTreeMap, sync::Arc};

use error_stack::ResultExt;
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::sheets::{record::Record, schema::clients};
use crate::domain::smartfarm::{
    self,
    analytics::{
        group_stats, leaderboard, overview, score_distribution, GroupStats, LeaderboardEntry,
        LeaderboardFilter, Overview, ScoreBin,
    },
};

use super::record_store::SheetRecordStore;

#[derive(Error, Debug)]
#[error("Could not load worksheets for the dashboard")]
pub struct DashboardError;

type Result<T> = error_stack::Result<T, DashboardError>;

/// Read-only views over the main evaluation sheet.
#[derive(Debug, Clone)]
pub struct Dashboard {
    store: Arc<SheetRecordStore>,
}

impl Dashboard {
    pub fn new(store: Arc<SheetRecordStore>) -> Self {
        Self { store }
    }

    async fn evaluations(&self) -> Result<Vec<Record>> {
        self.store
            .load_all(clients::WORKSHEET)
            .await
            .change_context(DashboardError)
    }

    pub async fn overview(&self) -> Result<Overview> {
        Ok(overview(&self.evaluations().await?))
    }

    pub async fn leaderboard(&self, filter: &LeaderboardFilter) -> Result<Vec<LeaderboardEntry>> {
        Ok(leaderboard(&self.evaluations().await?, filter))
    }

    /// Score statistics grouped by `column`, e.g. `Sucursal` or
    /// `Categoría de Evaluación`.
    pub async fn group_stats(&self, column: &str) -> Result<BTreeMap<String, GroupStats>> {
        Ok(group_stats(&self.evaluations().await?, column))
    }

    pub async fn distribution(&self, bins: usize) -> Result<Vec<ScoreBin>> {
        Ok(score_distribution(&self.evaluations().await?, bins))
    }

    /// Drops every cached read and reloads all known worksheets concurrently.
    /// Returns the data row count per worksheet.
    #[instrument(skip(self))]
    pub async fn refresh(&self) -> Result<BTreeMap<String, usize>> {
        let worksheets = smartfarm::worksheets();

        self.store.invalidate_all().await;
        let loaded = self
            .store
            .load_many(&worksheets)
            .await
            .change_context(DashboardError)?;

        info!("Reloaded {} worksheets", worksheets.len());
        Ok(worksheets
            .into_iter()
            .map(str::to_string)
            .zip(loaded.iter().map(Vec::len))
            .collect())
    }
}
