use serde::Serialize;
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use crate::domain::sheets::record::Record;
use crate::domain::sheets::schema::projects;

use super::cell_is;
use super::rubric::Branch;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(ascii_case_insensitive)]
pub enum ProjectType {
    #[strum(to_string = "AutoPath")]
    AutoPath,
    #[strum(to_string = "Autotrac Turn Automation")]
    AutotracTurnAutomation,
    #[strum(to_string = "ExactApply")]
    ExactApply,
    #[strum(to_string = "Grain Sensing")]
    GrainSensing,
    #[strum(to_string = "Harvest Lab")]
    HarvestLab,
    #[strum(to_string = "Machine Sync")]
    MachineSync,
    #[strum(to_string = "Pulverizadora PLA")]
    SprayerPla,
    #[strum(to_string = "Sembradora JD")]
    PlanterJd,
    #[strum(to_string = "Sembradora PLA")]
    PlanterPla,
    #[strum(to_string = "S7 Automation")]
    S7Automation,
    #[strum(to_string = "S700 Combine Advisor")]
    S700CombineAdvisor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
pub enum ProjectStage {
    #[strum(to_string = "Planificación")]
    Planning,
    #[strum(to_string = "Recopilación de Datos")]
    DataCollection,
    #[strum(to_string = "Generación de informe")]
    Report,
}

impl ProjectStage {
    pub fn status_column(&self) -> &'static str {
        match self {
            ProjectStage::Planning => projects::PLANNING_STATUS,
            ProjectStage::DataCollection => projects::DATA_COLLECTION_STATUS,
            ProjectStage::Report => projects::REPORT_STATUS,
        }
    }

    pub fn hours_column(&self) -> &'static str {
        match self {
            ProjectStage::Planning => projects::PLANNING_HOURS,
            ProjectStage::DataCollection => projects::DATA_COLLECTION_HOURS,
            ProjectStage::Report => projects::REPORT_HOURS,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumString, EnumIter, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum StageStatus {
    #[default]
    #[strum(to_string = "No Iniciado", serialize = "not-started")]
    NotStarted,
    #[strum(to_string = "En Proceso", serialize = "in-progress")]
    InProgress,
    #[strum(to_string = "Completado", serialize = "done")]
    Completed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter, Serialize)]
#[strum(ascii_case_insensitive)]
pub enum GlobalStatus {
    #[strum(to_string = "Completado", serialize = "completed", serialize = "done")]
    Completed,
    #[strum(to_string = "En Proceso", serialize = "in-progress")]
    InProgress,
    #[strum(to_string = "Pendiente", serialize = "pending")]
    Pending,
}

/// Completed only when every stage is, in progress as soon as one stage is.
pub fn global_status(stages: &[StageStatus]) -> GlobalStatus {
    if stages.iter().all(|s| *s == StageStatus::Completed) {
        GlobalStatus::Completed
    } else if stages.contains(&StageStatus::InProgress) {
        GlobalStatus::InProgress
    } else {
        GlobalStatus::Pending
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct StageProgress {
    pub status: StageStatus,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewProject {
    pub client_id: String,
    pub project_type: ProjectType,
    pub name: String,
    pub location: String,
    pub stages: [StageProgress; 3],
}

/// A project row with its derived progress.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectView {
    pub timestamp: String,
    pub client_id: String,
    pub client_name: String,
    pub branch: String,
    pub project_type: String,
    pub name: String,
    pub location: String,
    pub stages: Vec<(String, StageProgress)>,
    pub global_status: GlobalStatus,
    pub total_hours: f64,
}

impl ProjectView {
    pub fn from_record(record: &Record) -> Self {
        let stages = ProjectStage::iter()
            .map(|stage| {
                let status = record
                    .text(stage.status_column())
                    .trim()
                    .parse::<StageStatus>()
                    .unwrap_or_default();
                let progress = StageProgress {
                    status,
                    hours: record.number(stage.hours_column()),
                };
                (stage.to_string(), progress)
            })
            .collect::<Vec<_>>();

        let statuses = stages.iter().map(|(_, p)| p.status).collect::<Vec<_>>();

        Self {
            timestamp: record.text(projects::TIMESTAMP).to_string(),
            client_id: record.text(projects::CLIENT_ID).to_string(),
            client_name: record.text(projects::CLIENT_NAME).to_string(),
            branch: record.text(projects::BRANCH).to_string(),
            project_type: record.text(projects::PROJECT_TYPE).to_string(),
            name: record.text(projects::PROJECT_NAME).to_string(),
            location: record.text(projects::LOCATION).to_string(),
            global_status: global_status(&statuses),
            total_hours: stages.iter().map(|(_, p)| p.hours).sum(),
            stages,
        }
    }
}

/// Narrows the project dashboard. Unset fields accept everything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProjectFilter {
    pub branch: Option<Branch>,
    pub project_type: Option<ProjectType>,
    pub status: Option<GlobalStatus>,
}

impl ProjectFilter {
    pub fn accepts(&self, view: &ProjectView) -> bool {
        cell_is(self.branch.as_ref(), &view.branch)
            && cell_is(self.project_type.as_ref(), &view.project_type)
            && self.status.map_or(true, |s| s == view.global_status)
    }
}
