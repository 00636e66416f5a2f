use thiserror::Error;

use crate::domain::smartfarm::analytics::LeaderboardFilter;
use crate::domain::smartfarm::evaluation::ClientEvaluation;
use crate::domain::smartfarm::project::{NewProject, ProjectFilter, StageProgress};
use crate::domain::smartfarm::sale::{NewSale, SaleStatus};

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid command: {details}")]
    InvalidCommand { details: String },
    #[error("Command execution failed: {details}")]
    ExecutionFailed { details: String },
}

#[derive(Debug, Clone)]
pub enum Command {
    CheckCredentials,
    NormalizeKey {
        raw: String,
    },
    Records {
        worksheet: String,
    },
    Overview,
    Leaderboard {
        filter: LeaderboardFilter,
    },
    GroupStats {
        column: String,
    },
    Distribution {
        bins: usize,
    },
    Refresh,
    ClientReport {
        client_id: String,
        timestamp: Option<String>,
    },
    RegisterEvaluation(ClientEvaluation),
    UpdateEvaluation {
        timestamp: String,
        evaluation: ClientEvaluation,
    },
    Projects {
        filter: ProjectFilter,
    },
    ProjectSummary {
        filter: ProjectFilter,
    },
    RegisterProject(NewProject),
    UpdateProject {
        client_id: String,
        timestamp: String,
        stages: [StageProgress; 3],
    },
    SalesKpis,
    RegisterSale(NewSale),
    UpdateSale {
        client_id: String,
        registered_at: String,
        status: SaleStatus,
        amount: f64,
        detail: String,
    },
}

#[async_trait::async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, command: Command) -> error_stack::Result<String, CommandError>;
}
