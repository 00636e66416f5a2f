use std::{
    collections::{BTreeMap, BTreeSet},
    sync::Arc,
};

use chrono::NaiveDateTime;
use error_stack::{report, ResultExt};
use serde::Serialize;
use strum::IntoEnumIterator;
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::sheets::{
    cell_value::CellValue,
    schema::{clients, projects},
};
use crate::domain::smartfarm::{
    evaluation::{percentage, validate_client_id, ClientRef, TIMESTAMP_FORMAT},
    project::{GlobalStatus, NewProject, ProjectFilter, ProjectStage, ProjectView, StageProgress},
};

use super::record_store::SheetRecordStore;

#[derive(Error, Debug)]
pub enum ProjectError {
    #[error("Invalid project: {0}")]
    InvalidInput(String),
    #[error("Client {0} has no evaluation on record")]
    UnknownClient(String),
    #[error("No project of client {client_id} registered at '{timestamp}'")]
    NotFound {
        client_id: String,
        timestamp: String,
    },
    #[error("Spreadsheet operation failed")]
    Store,
}

type Result<T> = error_stack::Result<T, ProjectError>;

/// Dashboard figures over the filtered projects. `registered`,
/// `unique_clients` and `penetration_rate` ignore the filter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectSummary {
    pub projects: usize,
    pub completed: usize,
    /// Completed over filtered projects, in percent.
    pub completion_rate: f64,
    pub total_hours: f64,
    pub by_type: BTreeMap<String, usize>,
    pub hours_by_stage: BTreeMap<String, f64>,
    pub registered: usize,
    /// Distinct client ids in the main evaluation sheet.
    pub unique_clients: usize,
    /// Registered projects over unique clients, in percent.
    pub penetration_rate: f64,
}

impl ProjectSummary {
    pub fn of(views: &[ProjectView], filter: &ProjectFilter, unique_clients: usize) -> Self {
        let filtered = views.iter().filter(|v| filter.accepts(v)).collect::<Vec<_>>();

        let mut by_type = BTreeMap::new();
        let mut hours_by_stage = ProjectStage::iter()
            .map(|s| (s.to_string(), 0.0))
            .collect::<BTreeMap<_, _>>();

        for view in &filtered {
            *by_type.entry(view.project_type.clone()).or_insert(0) += 1;
            for (stage, progress) in &view.stages {
                *hours_by_stage.entry(stage.clone()).or_insert(0.0) += progress.hours;
            }
        }

        let completed = filtered
            .iter()
            .filter(|v| v.global_status == GlobalStatus::Completed)
            .count();

        Self {
            projects: filtered.len(),
            completed,
            completion_rate: percentage(completed as f64, filtered.len() as f64),
            total_hours: filtered.iter().map(|v| v.total_hours).sum(),
            by_type,
            hours_by_stage,
            registered: views.len(),
            unique_clients,
            penetration_rate: percentage(views.len() as f64, unique_clients as f64),
        }
    }
}

fn validate_hours(stages: &[StageProgress; 3]) -> Result<()> {
    match stages.iter().find(|s| !s.hours.is_finite() || s.hours < 0.0) {
        Some(stage) => Err(report!(ProjectError::InvalidInput(format!(
            "Stage hours must be a non-negative number, got {}",
            stage.hours
        )))),
        None => Ok(()),
    }
}

fn stage_cells(stages: &[StageProgress; 3]) -> Vec<(&'static str, CellValue)> {
    ProjectStage::iter()
        .zip(stages)
        .flat_map(|(stage, progress)| {
            [
                (stage.status_column(), progress.status.to_string().into()),
                (stage.hours_column(), CellValue::fixed2(progress.hours)),
            ]
        })
        .collect()
}

/// Implementation projects tracked per client in the `Proyectos Analyzer`
/// worksheet.
#[derive(Debug, Clone)]
pub struct ProjectTracker {
    store: Arc<SheetRecordStore>,
}

impl ProjectTracker {
    pub fn new(store: Arc<SheetRecordStore>) -> Self {
        Self { store }
    }

    /// Registers a project for an already evaluated client. Name, branch and
    /// category are copied from the client's latest evaluation.
    #[instrument(skip(self, project), fields(client_id = %project.client_id))]
    pub async fn register(&self, project: &NewProject, at: NaiveDateTime) -> Result<String> {
        validate_client_id(&project.client_id)
            .map_err(|e| report!(ProjectError::InvalidInput(e.to_string())))?;
        if project.name.trim().is_empty() {
            return Err(report!(ProjectError::InvalidInput(
                "Project name must not be empty".to_string()
            )));
        }
        validate_hours(&project.stages)?;

        let evaluations = self
            .store
            .load_all(clients::WORKSHEET)
            .await
            .change_context(ProjectError::Store)?;
        let client = ClientRef::latest(&evaluations, &project.client_id)
            .ok_or_else(|| report!(ProjectError::UnknownClient(project.client_id.clone())))?;

        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let mut values: Vec<(&str, CellValue)> = vec![
            (projects::TIMESTAMP, timestamp.as_str().into()),
            (projects::CLIENT_ID, client.client_id.as_str().into()),
            (projects::CLIENT_NAME, client.client_name.as_str().into()),
            (projects::BRANCH, client.branch.as_str().into()),
            (projects::CATEGORY, client.category.as_str().into()),
            (projects::PROJECT_TYPE, project.project_type.to_string().into()),
            (projects::PROJECT_NAME, project.name.trim().into()),
            (projects::LOCATION, project.location.trim().into()),
        ];
        values.extend(stage_cells(&project.stages));

        self.store
            .append_named(&projects::SCHEMA, values)
            .await
            .change_context(ProjectError::Store)?;
        self.store.invalidate(projects::WORKSHEET).await;

        info!("Registered project '{}'", project.name.trim());
        Ok(timestamp)
    }

    /// Rewrites status and hours of all three stages.
    #[instrument(skip(self, stages))]
    pub async fn update_stages(
        &self,
        client_id: &str,
        timestamp: &str,
        stages: &[StageProgress; 3],
    ) -> Result<()> {
        validate_hours(stages)?;

        self.store
            .update_record(
                projects::WORKSHEET,
                &[(projects::CLIENT_ID, client_id), (projects::TIMESTAMP, timestamp)],
                stage_cells(stages),
            )
            .await
            .change_context(ProjectError::Store)?
            .ok_or_else(|| {
                report!(ProjectError::NotFound {
                    client_id: client_id.to_string(),
                    timestamp: timestamp.to_string(),
                })
            })?;

        self.store.invalidate(projects::WORKSHEET).await;
        Ok(())
    }

    async fn views(&self) -> Result<Vec<ProjectView>> {
        let records = self
            .store
            .load_all(projects::WORKSHEET)
            .await
            .change_context(ProjectError::Store)?;
        Ok(records.iter().map(ProjectView::from_record).collect())
    }

    pub async fn list(&self, filter: &ProjectFilter) -> Result<Vec<ProjectView>> {
        let mut views = self.views().await?;
        views.retain(|v| filter.accepts(v));
        Ok(views)
    }

    pub async fn summary(&self, filter: &ProjectFilter) -> Result<ProjectSummary> {
        let (views, evaluations) = futures::try_join!(self.views(), async {
            self.store
                .load_all(clients::WORKSHEET)
                .await
                .change_context(ProjectError::Store)
        })?;

        let unique_clients = evaluations
            .iter()
            .map(|r| r.text(clients::CLIENT_ID).trim())
            .filter(|id| !id.is_empty())
            .collect::<BTreeSet<_>>()
            .len();
        Ok(ProjectSummary::of(&views, filter, unique_clients))
    }
}
