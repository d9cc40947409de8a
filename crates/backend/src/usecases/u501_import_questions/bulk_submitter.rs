use super::question_api_client::QuestionApi;
use crate::domain::a001_question::PreparedRecord;
use contracts::shared::question_api::CreateQuestionRequest;
use contracts::usecases::u501_import_questions::{RowError, RowErrorKind};

/// Итог отправки: что создано и что упало
#[derive(Debug, Default)]
pub struct SubmitTally {
    pub imported_keys: Vec<String>,
    pub errors: Vec<RowError>,
}

/// Отправляет записи по одной, в порядке строк файла.
/// Ошибка одной записи не прерывает batch.
pub async fn submit_sequential(
    api: &dyn QuestionApi,
    collection: &str,
    records: &[PreparedRecord],
) -> SubmitTally {
    let mut tally = SubmitTally::default();

    for prepared in records {
        let request = CreateQuestionRequest::from(&prepared.record);
        let key = prepared.record.key.clone();

        let failure = match api.create_question(collection, &request).await {
            Ok(response) if response.success => None,
            Ok(response) => Some(
                response
                    .error
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "rejected by question API".to_string()),
            ),
            Err(e) => Some(e.to_string()),
        };

        match failure {
            None => {
                tracing::debug!("Row {}: question {} created", prepared.row, key);
                tally.imported_keys.push(key);
            }
            Some(reason) => {
                tracing::warn!("Row {}: failed to create question {}: {}", prepared.row, key, reason);
                tally.errors.push(RowError {
                    row: prepared.row,
                    key: Some(key),
                    kind: RowErrorKind::SubmitFailed,
                    reason,
                });
            }
        }
    }

    tally
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_questions::mock_api::MockQuestionApi;
    use contracts::domain::a001_question::QuestionRecord;

    fn prepared(row: usize, key: &str) -> PreparedRecord {
        PreparedRecord {
            row,
            record: QuestionRecord {
                key: key.to_string(),
                text: Some("?".to_string()),
                answer: None,
                options: vec!["a".to_string(), "b".to_string()],
            },
        }
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let api = MockQuestionApi::new()
            .failing_on("soru2")
            .rejecting("soru3", "duplicate key");
        let records = vec![
            prepared(2, "soru1"),
            prepared(3, "soru2"),
            prepared(4, "soru3"),
            prepared(5, "soru4"),
        ];

        let tally = submit_sequential(&api, "quiz", &records).await;

        assert_eq!(tally.imported_keys, vec!["soru1", "soru4"]);
        assert_eq!(tally.errors.len(), 2);
        assert_eq!(tally.errors[0].row, 3);
        assert_eq!(tally.errors[0].kind, RowErrorKind::SubmitFailed);
        assert_eq!(tally.errors[1].reason, "duplicate key");
        assert_eq!(api.created_keys(), vec!["soru1", "soru2", "soru3", "soru4"]);
    }

    #[tokio::test]
    async fn test_submits_in_row_order_to_collection() {
        let api = MockQuestionApi::new();
        let records = vec![prepared(2, "b"), prepared(3, "a")];

        submit_sequential(&api, "tarih", &records).await;

        let calls = api.calls();
        assert_eq!(calls[0].0, "tarih");
        assert_eq!(calls[0].1.question_key, "b");
        assert_eq!(calls[1].1.question_key, "a");
    }
}
