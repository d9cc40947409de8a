use super::bulk_submitter::submit_sequential;
use super::question_api_client::{QuestionApi, QuestionApiError};
use crate::domain::a001_question::excel_export::{export_records, ExportError};
use crate::domain::a001_question::excel_import::rows_from_json;
use crate::domain::a001_question::prepare_batch;
use crate::shared::tabular::{read_rows, TabularError};
use chrono::Utc;
use contracts::domain::a001_question::ImportRow;
use contracts::usecases::common::UseCaseMetadata;
use contracts::usecases::u501_import_questions::{
    ExportFormat, ImportOutcome, ImportPreview, ImportQuestions, ImportRowsRequest,
};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Another import is already running")]
    Busy,

    #[error("Cannot read source file: {0}")]
    Source(#[from] TabularError),

    #[error("Question API unavailable: {0}")]
    Remote(#[from] QuestionApiError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

/// Готовый файл выгрузки
#[derive(Debug)]
pub struct ExportFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// Executor для UseCase импорта вопросов
pub struct ImportExecutor {
    api: Arc<dyn QuestionApi>,
    key_prefix: String,
    /// Одновременно выполняется не больше одного batch
    in_flight: Mutex<()>,
}

impl ImportExecutor {
    pub fn new(api: Arc<dyn QuestionApi>, key_prefix: impl Into<String>) -> Self {
        Self {
            api,
            key_prefix: key_prefix.into(),
            in_flight: Mutex::new(()),
        }
    }

    /// Импорт загруженного файла (xlsx/csv)
    pub async fn import_file(
        &self,
        collection: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportOutcome, ImportError> {
        let collection = require_collection(collection)?;
        let _guard = self.in_flight.try_lock().map_err(|_| ImportError::Busy)?;

        let rows = read_rows(file_name, bytes)?;
        self.run(collection, file_name, rows).await
    }

    /// Импорт строк, уже разобранных на клиенте
    pub async fn import_rows(&self, request: ImportRowsRequest) -> Result<ImportOutcome, ImportError> {
        let collection = require_collection(&request.collection)?.to_string();
        let _guard = self.in_flight.try_lock().map_err(|_| ImportError::Busy)?;

        let source_name = request
            .source_name
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| "rows".to_string());
        let rows = rows_from_json(request.rows);
        self.run(&collection, &source_name, rows).await
    }

    /// Пробный прогон: разбор, валидация и ключи без отправки
    pub async fn preview_file(
        &self,
        collection: &str,
        file_name: &str,
        bytes: &[u8],
    ) -> Result<ImportPreview, ImportError> {
        let collection = require_collection(collection)?;
        let rows = read_rows(file_name, bytes)?;
        let existing = self.existing_keys(collection).await?;
        let batch = prepare_batch(&rows, existing, &self.key_prefix);

        Ok(ImportPreview {
            source_name: file_name.to_string(),
            total_rows: batch.total_rows,
            records: batch.records.into_iter().map(|p| p.record).collect(),
            errors: batch.errors,
            warnings: batch.warnings,
        })
    }

    /// Выгрузка коллекции в формате, пригодном для повторного импорта
    pub async fn export(
        &self,
        collection: &str,
        format: ExportFormat,
    ) -> Result<ExportFile, ImportError> {
        let collection = require_collection(collection)?;
        let records = self.api.list_questions(collection).await?;
        let bytes = export_records(&records, format)?;

        tracing::info!(
            "Exported {} questions from {} as {}",
            records.len(),
            collection,
            format.extension()
        );

        Ok(ExportFile {
            file_name: format!(
                "{}_{}.{}",
                collection,
                Utc::now().format("%Y%m%d_%H%M%S"),
                format.extension()
            ),
            content_type: format.content_type(),
            bytes,
        })
    }

    async fn existing_keys(&self, collection: &str) -> Result<Vec<String>, ImportError> {
        let existing = self.api.list_questions(collection).await.map_err(|e| {
            tracing::error!("Failed to fetch existing keys for {}: {}", collection, e);
            e
        })?;
        Ok(existing.into_iter().map(|q| q.key).collect())
    }

    async fn run(
        &self,
        collection: &str,
        source_name: &str,
        rows: Vec<ImportRow>,
    ) -> Result<ImportOutcome, ImportError> {
        let batch_id = Uuid::new_v4().to_string();
        let started_at = Utc::now();
        tracing::info!(
            "{} started: batch_id={}, collection={}, source={}, rows={}",
            ImportQuestions::full_name(),
            batch_id,
            collection,
            source_name,
            rows.len()
        );

        let existing = self.existing_keys(collection).await?;
        let batch = prepare_batch(&rows, existing, &self.key_prefix);
        let skipped_count = batch.skipped_count();

        let tally = submit_sequential(self.api.as_ref(), collection, &batch.records).await;
        let failed_count = tally.errors.len();

        let mut errors = batch.errors;
        errors.extend(tally.errors);
        errors.sort_by_key(|e| e.row);

        let outcome = ImportOutcome {
            batch_id,
            collection: collection.to_string(),
            source_name: source_name.to_string(),
            total_rows: batch.total_rows,
            imported_count: tally.imported_keys.len(),
            skipped_count,
            failed_count,
            errors,
            warnings: batch.warnings,
            imported_keys: tally.imported_keys,
            started_at,
            finished_at: Utc::now(),
        };

        let elapsed_ms = (outcome.finished_at - outcome.started_at).num_milliseconds();
        tracing::info!(
            "{} finished: batch_id={}, {}, warnings={}, elapsed_ms={}",
            ImportQuestions::full_name(),
            outcome.batch_id,
            outcome.summary(),
            outcome.warnings.len(),
            elapsed_ms
        );

        Ok(outcome)
    }
}

fn require_collection(collection: &str) -> Result<&str, ImportError> {
    let collection = collection.trim();
    if collection.is_empty() {
        return Err(ImportError::InvalidRequest(
            "collection is required".to_string(),
        ));
    }
    Ok(collection)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_questions::mock_api::MockQuestionApi;
    use contracts::domain::a001_question::CellValue;
    use contracts::usecases::u501_import_questions::{ImportStatus, RowErrorKind};
    use std::collections::HashMap;
    use tokio::sync::Notify;

    const CSV: &str = "Soru,Cevap,Şık 1,Şık 2,Şık 3\n\
                       Başkent?,Ankara,Ankara,İzmir,Bursa\n\
                       Tek şık?,x,x,,\n\
                       Yıl?,1923,1920,1923,\n";

    fn executor(api: MockQuestionApi) -> (Arc<MockQuestionApi>, ImportExecutor) {
        let api = Arc::new(api);
        let executor = ImportExecutor::new(api.clone(), "soru");
        (api, executor)
    }

    fn json_row(text: &str, options: &[&str]) -> HashMap<String, CellValue> {
        let mut row = HashMap::new();
        row.insert("Soru".to_string(), CellValue::from(text));
        for (i, option) in options.iter().enumerate() {
            row.insert(format!("Seçenek {}", i + 1), CellValue::from(*option));
        }
        row
    }

    #[tokio::test]
    async fn test_import_file_counts_imported_and_skipped() {
        let (api, executor) = executor(MockQuestionApi::new().with_existing(&["soru4"]));

        let outcome = executor
            .import_file("tarih", "sorular.csv", CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(outcome.total_rows, 3);
        assert_eq!(outcome.imported_count, 2);
        assert_eq!(outcome.skipped_count, 1);
        assert_eq!(outcome.failed_count, 0);
        assert_eq!(outcome.imported_keys, vec!["soru5", "soru6"]);
        assert_eq!(outcome.errors[0].row, 3);
        assert_eq!(outcome.status(), ImportStatus::CompletedWithErrors);
        assert_eq!(api.created_keys(), vec!["soru5", "soru6"]);
        assert!(outcome.finished_at >= outcome.started_at);
    }

    #[tokio::test]
    async fn test_existing_max_suffix_key_does_not_stall_import() {
        let (api, executor) =
            executor(MockQuestionApi::new().with_existing(&["soru18446744073709551615"]));

        let outcome = executor
            .import_file("tarih", "sorular.csv", CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(outcome.imported_keys, vec!["soru1", "soru2"]);
        assert_eq!(api.created_keys(), vec!["soru1", "soru2"]);
        assert!(executor.in_flight.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_submit_failure_is_reported_not_raised() {
        let (_, executor) = executor(MockQuestionApi::new().failing_on("soru1"));
        let request = ImportRowsRequest {
            collection: "quiz".to_string(),
            source_name: None,
            rows: vec![json_row("?", &["a", "b"])],
        };

        let outcome = executor.import_rows(request).await.unwrap();

        assert_eq!(outcome.imported_count, 0);
        assert_eq!(outcome.failed_count, 1);
        assert_eq!(outcome.errors.len(), 1);
        assert_eq!(outcome.errors[0].kind, RowErrorKind::SubmitFailed);
        assert_eq!(outcome.errors[0].key.as_deref(), Some("soru1"));
        assert_eq!(outcome.source_name, "rows");
    }

    #[tokio::test]
    async fn test_list_failure_aborts_before_any_create() {
        let (api, executor) = executor(MockQuestionApi::new().with_list_failure());

        let err = executor
            .import_file("tarih", "sorular.csv", CSV.as_bytes())
            .await
            .unwrap_err();

        assert!(matches!(err, ImportError::Remote(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_unreadable_source_is_rejected() {
        let (api, executor) = executor(MockQuestionApi::new());

        let err = executor
            .import_file("tarih", "sorular.pdf", b"%PDF")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Source(_)));

        let err = executor
            .import_file("tarih", "broken.xlsx", b"not a zip")
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::Source(_)));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_blank_collection_is_invalid() {
        let (_, executor) = executor(MockQuestionApi::new());
        let err = executor
            .import_file("  ", "sorular.csv", CSV.as_bytes())
            .await
            .unwrap_err();
        assert!(matches!(err, ImportError::InvalidRequest(_)));
    }

    #[tokio::test]
    async fn test_second_batch_is_rejected_while_first_runs() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let (api, executor) =
            executor(MockQuestionApi::new().gated(entered.clone(), release.clone()));
        let executor = Arc::new(executor);

        let first = {
            let executor = executor.clone();
            tokio::spawn(async move {
                executor
                    .import_rows(ImportRowsRequest {
                        collection: "quiz".to_string(),
                        source_name: Some("first.xlsx".to_string()),
                        rows: vec![json_row("?", &["a", "b"])],
                    })
                    .await
            })
        };

        entered.notified().await;
        let second = executor
            .import_file("quiz", "second.csv", CSV.as_bytes())
            .await;
        assert!(matches!(second, Err(ImportError::Busy)));

        release.notify_one();
        let outcome = first.await.unwrap().unwrap();
        assert_eq!(outcome.imported_count, 1);
        assert_eq!(api.created_keys(), vec!["soru1"]);

        // После завершения первого batch guard снят
        assert!(executor.in_flight.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_preview_assigns_keys_without_submitting() {
        let (api, executor) = executor(MockQuestionApi::new().with_existing(&["soru1"]));

        let preview = executor
            .preview_file("tarih", "sorular.csv", CSV.as_bytes())
            .await
            .unwrap();

        assert_eq!(preview.total_rows, 3);
        assert_eq!(preview.records.len(), 2);
        assert_eq!(preview.records[0].key, "soru2");
        assert_eq!(preview.errors.len(), 1);
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn test_export_names_file_by_collection() {
        let (_, executor) = executor(MockQuestionApi::new().with_existing(&["soru1", "soru2"]));

        let file = executor.export("tarih", ExportFormat::Csv).await.unwrap();

        assert!(file.file_name.starts_with("tarih_"));
        assert!(file.file_name.ends_with(".csv"));
        assert_eq!(file.content_type, ExportFormat::Csv.content_type());
        let text = String::from_utf8(file.bytes).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
