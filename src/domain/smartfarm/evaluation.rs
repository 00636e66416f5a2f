use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::domain::sheets::record::Record;
use crate::domain::sheets::schema::clients;

use super::rubric::{Branch, ClientType, EvaluationCategory};

static CLIENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("client id pattern is valid"));

pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EvaluationValidationError {
    #[error("Client id must have exactly 6 digits, got '{0}'")]
    InvalidClientId(String),
    #[error("Client name must not be empty")]
    EmptyName,
    #[error("Expected {expected} scores for {category}, got {got}")]
    ScoreCountMismatch {
        category: EvaluationCategory,
        expected: usize,
        got: usize,
    },
    #[error("Score {score} for '{item}' exceeds the maximum of {max}")]
    ScoreOutOfRange {
        item: &'static str,
        score: u32,
        max: u32,
    },
}

pub fn validate_client_id(client_id: &str) -> Result<(), EvaluationValidationError> {
    if CLIENT_ID.is_match(client_id) {
        Ok(())
    } else {
        Err(EvaluationValidationError::InvalidClientId(
            client_id.to_string(),
        ))
    }
}

/// Client data shared by the main row of an evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientProfile {
    pub client_id: String,
    pub client_name: String,
    pub branch: Branch,
    pub client_type: ClientType,
}

/// A scored evaluation, one score per rubric item of `category`, in rubric order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientEvaluation {
    pub profile: ClientProfile,
    pub category: EvaluationCategory,
    pub scores: Vec<u32>,
}

impl ClientEvaluation {
    pub fn validate(&self) -> Result<(), EvaluationValidationError> {
        validate_client_id(&self.profile.client_id)?;
        if self.profile.client_name.trim().is_empty() {
            return Err(EvaluationValidationError::EmptyName);
        }
        validate_scores(self.category, &self.scores)
    }

    pub fn total(&self) -> u32 {
        self.scores.iter().sum()
    }
}

pub fn validate_scores(
    category: EvaluationCategory,
    scores: &[u32],
) -> Result<(), EvaluationValidationError> {
    let items = category.items();
    if scores.len() != items.len() {
        return Err(EvaluationValidationError::ScoreCountMismatch {
            category,
            expected: items.len(),
            got: scores.len(),
        });
    }

    for (item, score) in items.iter().zip(scores) {
        if *score > item.max_score {
            return Err(EvaluationValidationError::ScoreOutOfRange {
                item: item.name,
                score: *score,
                max: item.max_score,
            });
        }
    }
    Ok(())
}

/// A client as known from the most recent main-sheet row carrying its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClientRef {
    pub client_id: String,
    pub client_name: String,
    pub branch: String,
    pub category: String,
}

impl ClientRef {
    pub fn latest(records: &[Record], client_id: &str) -> Option<Self> {
        records
            .iter()
            .rev()
            .find(|r| r.text(clients::CLIENT_ID) == client_id)
            .map(|r| ClientRef {
                client_id: client_id.to_string(),
                client_name: r.text(clients::CLIENT_NAME).to_string(),
                branch: r.text(clients::BRANCH).to_string(),
                category: r.text(clients::CATEGORY).to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemScore {
    pub item: &'static str,
    pub obtained: f64,
    pub max: u32,
    pub percentage: f64,
}

/// Per-item breakdown of one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationReport {
    pub client_id: String,
    pub client_name: String,
    pub timestamp: String,
    pub category: String,
    pub items: Vec<ItemScore>,
    pub total_obtained: f64,
    pub total_possible: u32,
    pub percentage: f64,
}

impl EvaluationReport {
    /// `main` is the row in the main sheet, `detail` the row with the same
    /// client id and timestamp in the category sheet.
    pub fn build(main: &Record, detail: &Record, category: EvaluationCategory) -> Self {
        let items = category
            .items()
            .iter()
            .map(|item| {
                let obtained = detail.number(item.name);
                ItemScore {
                    item: item.name,
                    obtained,
                    max: item.max_score,
                    percentage: percentage(obtained, item.max_score as f64),
                }
            })
            .collect::<Vec<_>>();

        let total_obtained = items.iter().map(|i| i.obtained).sum::<f64>();
        let total_possible = category.max_total();

        Self {
            client_id: main.text(clients::CLIENT_ID).to_string(),
            client_name: main.text(clients::CLIENT_NAME).to_string(),
            timestamp: main.text(clients::TIMESTAMP).to_string(),
            category: category.to_string(),
            items,
            total_obtained,
            total_possible,
            percentage: percentage(total_obtained, total_possible as f64),
        }
    }
}

pub(crate) fn percentage(part: f64, whole: f64) -> f64 {
    if whole > 0.0 {
        part / whole * 100.0
    } else {
        0.0
    }
}
