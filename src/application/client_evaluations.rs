use std::sync::Arc;

use chrono::NaiveDateTime;
use error_stack::{report, ResultExt};
use thiserror::Error;
use tracing::{info, instrument};

use crate::domain::sheets::{
    cell_value::CellValue,
    record::Record,
    schema::{clients, evaluation_detail},
};
use crate::domain::smartfarm::{
    evaluation::{ClientEvaluation, EvaluationReport, TIMESTAMP_FORMAT},
    rubric::EvaluationCategory,
};

use super::record_store::SheetRecordStore;

#[derive(Error, Debug)]
pub enum ClientEvaluationError {
    #[error("Invalid evaluation: {0}")]
    InvalidInput(String),
    #[error("No evaluation of client {client_id} at '{timestamp}'")]
    NotFound {
        client_id: String,
        timestamp: String,
    },
    #[error("Spreadsheet operation failed")]
    Store,
}

type Result<T> = error_stack::Result<T, ClientEvaluationError>;

/// Registering, editing and reporting scored client evaluations.
///
/// Each evaluation is one row in the main sheet plus one row with the item
/// scores in its category sheet, both keyed by client id and timestamp.
#[derive(Debug, Clone)]
pub struct ClientEvaluations {
    store: Arc<SheetRecordStore>,
}

impl ClientEvaluations {
    pub fn new(store: Arc<SheetRecordStore>) -> Self {
        Self { store }
    }

    /// Appends the evaluation and returns the timestamp that now identifies it.
    #[instrument(skip(self, evaluation), fields(client_id = %evaluation.profile.client_id))]
    pub async fn register(&self, evaluation: &ClientEvaluation, at: NaiveDateTime) -> Result<String> {
        evaluation
            .validate()
            .map_err(|e| report!(ClientEvaluationError::InvalidInput(e.to_string())))?;

        let timestamp = at.format(TIMESTAMP_FORMAT).to_string();
        let profile = &evaluation.profile;

        self.store
            .append_named(
                &clients::SCHEMA,
                vec![
                    (clients::TIMESTAMP, timestamp.as_str().into()),
                    (clients::CATEGORY, evaluation.category.to_string().into()),
                    (clients::CLIENT_ID, profile.client_id.as_str().into()),
                    (clients::CLIENT_NAME, profile.client_name.trim().into()),
                    (clients::BRANCH, profile.branch.to_string().into()),
                    (clients::CLIENT_TYPE, profile.client_type.to_string().into()),
                    (clients::TOTAL_SCORE, evaluation.total().into()),
                ],
            )
            .await
            .change_context(ClientEvaluationError::Store)?;

        let mut detail = vec![
            CellValue::from(timestamp.as_str()),
            CellValue::from(profile.client_id.as_str()),
        ];
        detail.extend(evaluation.scores.iter().map(|s| CellValue::from(*s)));
        self.store
            .append(evaluation.category.worksheet(), detail)
            .await
            .change_context(ClientEvaluationError::Store)
            .attach_printable("Main row was written, category row was not")?;

        self.store.invalidate(clients::WORKSHEET).await;
        self.store.invalidate(evaluation.category.worksheet()).await;

        info!("Registered {} evaluation at {}", evaluation.category, timestamp);
        Ok(timestamp)
    }

    /// Rewrites name, branch, type and total of an existing evaluation and
    /// every item score in its category sheet.
    ///
    /// The category is the one stored on the main row and cannot change here.
    /// Both rows and every column are resolved before the first write.
    #[instrument(skip(self, evaluation))]
    pub async fn update(&self, timestamp: &str, evaluation: &ClientEvaluation) -> Result<()> {
        evaluation
            .validate()
            .map_err(|e| report!(ClientEvaluationError::InvalidInput(e.to_string())))?;

        let profile = &evaluation.profile;
        let not_found = || ClientEvaluationError::NotFound {
            client_id: profile.client_id.clone(),
            timestamp: timestamp.to_string(),
        };

        let (main_row, main) = self
            .store
            .find_record(
                clients::WORKSHEET,
                &[
                    (clients::CLIENT_ID, profile.client_id.as_str()),
                    (clients::TIMESTAMP, timestamp),
                ],
            )
            .await
            .change_context(ClientEvaluationError::Store)?
            .ok_or_else(|| report!(not_found()))?;

        let category = stored_category(&main)?;
        if category != evaluation.category {
            return Err(report!(ClientEvaluationError::InvalidInput(format!(
                "Evaluation is filed under {}, not {}",
                category, evaluation.category
            ))));
        }

        let detail_row = self
            .store
            .find_row(
                category.worksheet(),
                &[
                    (evaluation_detail::CLIENT_ID, profile.client_id.as_str()),
                    (evaluation_detail::TIMESTAMP, timestamp),
                ],
            )
            .await
            .change_context(ClientEvaluationError::Store)?
            .ok_or_else(|| report!(not_found()))
            .attach_printable_lazy(|| format!("No score row in worksheet '{}'", category.worksheet()))?;

        let main_cells = self
            .store
            .resolve_changes(
                clients::WORKSHEET,
                vec![
                    (clients::CLIENT_NAME, profile.client_name.trim().into()),
                    (clients::BRANCH, profile.branch.to_string().into()),
                    (clients::CLIENT_TYPE, profile.client_type.to_string().into()),
                    (clients::TOTAL_SCORE, evaluation.total().into()),
                ],
            )
            .await
            .change_context(ClientEvaluationError::Store)?;

        let scores = category
            .items()
            .iter()
            .zip(&evaluation.scores)
            .map(|(item, score)| (item.name, CellValue::from(*score)))
            .collect::<Vec<_>>();
        let detail_cells = self
            .store
            .resolve_changes(category.worksheet(), scores)
            .await
            .change_context(ClientEvaluationError::Store)?;

        self.store
            .apply_changes(clients::WORKSHEET, main_row, main_cells)
            .await
            .change_context(ClientEvaluationError::Store)?;
        self.store
            .apply_changes(category.worksheet(), detail_row, detail_cells)
            .await
            .change_context(ClientEvaluationError::Store)
            .attach_printable("Main row was updated, category row was not")?;

        self.store.invalidate(clients::WORKSHEET).await;
        self.store.invalidate(category.worksheet()).await;
        Ok(())
    }

    /// Item breakdown of one evaluation. Without a timestamp the client's
    /// latest evaluation is used.
    #[instrument(skip(self))]
    pub async fn report(&self, client_id: &str, timestamp: Option<&str>) -> Result<EvaluationReport> {
        let main_rows = self
            .store
            .load_all(clients::WORKSHEET)
            .await
            .change_context(ClientEvaluationError::Store)?;

        let main = main_rows
            .iter()
            .rev()
            .filter(|r| r.text(clients::CLIENT_ID) == client_id)
            .find(|r| timestamp.map_or(true, |t| r.text(clients::TIMESTAMP) == t))
            .ok_or_else(|| {
                report!(ClientEvaluationError::NotFound {
                    client_id: client_id.to_string(),
                    timestamp: timestamp.unwrap_or("latest").to_string(),
                })
            })?;

        let category = stored_category(main)?;

        let main_timestamp = main.text(clients::TIMESTAMP);
        let detail_rows = self
            .store
            .load_all(category.worksheet())
            .await
            .change_context(ClientEvaluationError::Store)?;

        let detail = detail_rows
            .iter()
            .find(|r| {
                r.matches(&[
                    (evaluation_detail::CLIENT_ID, client_id),
                    (evaluation_detail::TIMESTAMP, main_timestamp),
                ])
            })
            .ok_or_else(|| {
                report!(ClientEvaluationError::NotFound {
                    client_id: client_id.to_string(),
                    timestamp: main_timestamp.to_string(),
                })
            })
            .attach_printable_lazy(|| format!("No score row in worksheet '{}'", category.worksheet()))?;

        Ok(EvaluationReport::build(main, detail, category))
    }
}

fn stored_category(main: &Record) -> Result<EvaluationCategory> {
    main.text(clients::CATEGORY)
        .trim()
        .parse::<EvaluationCategory>()
        .map_err(|_| {
            report!(ClientEvaluationError::InvalidInput(format!(
                "Unknown evaluation category '{}'",
                main.text(clients::CATEGORY)
            )))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::InMemoryTabularStore;
    use crate::domain::smartfarm::{
        evaluation::ClientProfile,
        rubric::{Branch, ClientType},
    };
    use chrono::NaiveDate;
    use std::time::Duration;

    async fn fixture() -> (Arc<InMemoryTabularStore>, ClientEvaluations) {
        let memory = Arc::new(InMemoryTabularStore::new());
        memory
            .add_worksheet("Hoja 1", &[clients::SCHEMA.columns.to_vec()])
            .await;
        let mut detail_header = vec!["Fecha y Hora", "ID Cliente"];
        detail_header.extend(EvaluationCategory::Livestock.items().iter().map(|i| i.name));
        memory.add_worksheet("Ganadería", &[detail_header]).await;

        let store = Arc::new(SheetRecordStore::new(memory.clone(), Duration::from_secs(300)));
        (memory, ClientEvaluations::new(store))
    }

    fn evaluation(name: &str, scores: Vec<u32>) -> ClientEvaluation {
        ClientEvaluation {
            profile: ClientProfile {
                client_id: "123456".into(),
                client_name: name.into(),
                branch: Branch::Arroyito,
                client_type: ClientType::Type2,
            },
            category: EvaluationCategory::Livestock,
            scores,
        }
    }

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 30, 0)
            .unwrap()
    }

    #[tokio::test]
    async fn test_register_writes_main_and_detail_rows() {
        let (memory, service) = fixture().await;

        let timestamp = service.register(&evaluation("La Pampa", vec![5; 13]), at()).await.unwrap();
        assert_eq!(timestamp, "2025-03-14 09:30:00");

        let main = memory.snapshot("Hoja 1").await.unwrap();
        assert_eq!(
            main[1],
            vec!["2025-03-14 09:30:00", "Ganadería", "123456", "La Pampa", "Arroyito", "Tipo 2", "65"]
        );

        let detail = memory.snapshot("Ganadería").await.unwrap();
        assert_eq!(detail[1].len(), 15);
        assert_eq!(detail[1][..3], ["2025-03-14 09:30:00", "123456", "5"]);
    }

    #[tokio::test]
    async fn test_register_rejects_invalid_input_without_writing() {
        let (memory, service) = fixture().await;
        let mut bad = evaluation("La Pampa", vec![5; 13]);
        bad.profile.client_id = "12345".into();

        let err = service.register(&bad, at()).await.unwrap_err();
        assert!(matches!(err.current_context(), ClientEvaluationError::InvalidInput(_)));
        assert_eq!(memory.snapshot("Hoja 1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_then_report() {
        let (_, service) = fixture().await;
        let timestamp = service.register(&evaluation("La Pampa", vec![0; 13]), at()).await.unwrap();

        let mut scores = vec![0; 13];
        scores[0] = 15;
        scores[2] = 10;
        service
            .update(&timestamp, &evaluation("Estancia La Pampa", scores))
            .await
            .unwrap();

        let report = service.report("123456", Some(&timestamp)).await.unwrap();
        assert_eq!(report.client_name, "Estancia La Pampa");
        assert_eq!(report.total_obtained, 25.0);
        assert_eq!(report.total_possible, 150);
        assert_eq!(report.items[0].percentage, 100.0);
        assert_eq!(report.items[2].percentage, 50.0);
    }

    #[tokio::test]
    async fn test_update_unknown_evaluation() {
        let (_, service) = fixture().await;
        let err = service
            .update("2020-01-01 00:00:00", &evaluation("X", vec![0; 13]))
            .await
            .unwrap_err();
        assert!(matches!(err.current_context(), ClientEvaluationError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_under_other_category_writes_nothing() {
        let (memory, service) = fixture().await;
        let timestamp = service.register(&evaluation("La Pampa", vec![5; 13]), at()).await.unwrap();
        let main_before = memory.snapshot("Hoja 1").await.unwrap();
        let detail_before = memory.snapshot("Ganadería").await.unwrap();

        let mut grains = evaluation("Renamed", vec![5; 16]);
        grains.category = EvaluationCategory::Grains;
        let err = service.update(&timestamp, &grains).await.unwrap_err();

        assert!(matches!(err.current_context(), ClientEvaluationError::InvalidInput(_)));
        assert_eq!(memory.snapshot("Hoja 1").await.unwrap(), main_before);
        assert_eq!(memory.snapshot("Ganadería").await.unwrap(), detail_before);
    }

    #[tokio::test]
    async fn test_update_without_score_row_leaves_main_row() {
        let (memory, service) = fixture().await;
        let timestamp = service.register(&evaluation("La Pampa", vec![5; 13]), at()).await.unwrap();
        let detail_header = memory.snapshot("Ganadería").await.unwrap()[0].clone();
        memory.add_worksheet("Ganadería", &[detail_header]).await;
        let main_before = memory.snapshot("Hoja 1").await.unwrap();

        let err = service
            .update(&timestamp, &evaluation("Renamed", vec![1; 13]))
            .await
            .unwrap_err();

        assert!(matches!(err.current_context(), ClientEvaluationError::NotFound { .. }));
        assert_eq!(memory.snapshot("Hoja 1").await.unwrap(), main_before);
    }

    #[tokio::test]
    async fn test_report_defaults_to_latest() {
        let (_, service) = fixture().await;
        service.register(&evaluation("Old", vec![1; 13]), at()).await.unwrap();
        let later = at() + chrono::Duration::days(30);
        service.register(&evaluation("New", vec![2; 13]), later).await.unwrap();

        let report = service.report("123456", None).await.unwrap();
        assert_eq!(report.client_name, "New");
        assert_eq!(report.total_obtained, 26.0);
    }

    #[tokio::test]
    async fn test_store_failure_is_wrapped() {
        let (memory, service) = fixture().await;
        memory.set_unavailable(true);
        let err = service.report("123456", None).await.unwrap_err();
        assert!(matches!(err.current_context(), ClientEvaluationError::Store));
        assert!(err.contains::<crate::ports::tabular_store::SheetStoreError>());
    }
}
