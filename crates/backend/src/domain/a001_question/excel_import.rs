use super::draft::QuestionDraft;
use super::key_assigner::KeyAssigner;
use super::validator::validate;
use contracts::domain::a001_question::{CellValue, ImportRow, QuestionRecord};
use contracts::usecases::u501_import_questions::{RowError, RowErrorKind, RowWarning};
use std::collections::HashMap;

/// Запись, готовая к отправке
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedRecord {
    pub row: usize,
    pub record: QuestionRecord,
}

/// Результат нормализации, валидации и назначения ключей для одного batch
#[derive(Debug, Clone, Default)]
pub struct PreparedBatch {
    pub total_rows: usize,
    pub records: Vec<PreparedRecord>,
    /// Только отказы валидации (kind = Rejected)
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
}

impl PreparedBatch {
    pub fn skipped_count(&self) -> usize {
        self.errors.len()
    }
}

/// Строки, пришедшие из браузера JSON-ом. Заголовок считается строкой 1
pub fn rows_from_json(rows: Vec<HashMap<String, CellValue>>) -> Vec<ImportRow> {
    rows.into_iter()
        .enumerate()
        .map(|(idx, cells)| ImportRow {
            row_number: idx + 2,
            cells: cells.into_iter().filter(|(_, v)| !v.is_empty()).collect(),
        })
        .filter(|row| !row.cells.is_empty())
        .collect()
}

/// Нормализует строки, отбрасывает невалидные и назначает ключи принятым.
///
/// Явные ключи всех строк резервируются заранее, поэтому сгенерированный ключ
/// не совпадет с ключом, который встретится ниже по файлу. Отклоненные строки
/// номер из счетчика не расходуют.
pub fn prepare_batch<I, S>(rows: &[ImportRow], existing_keys: I, key_prefix: &str) -> PreparedBatch
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let drafts: Vec<QuestionDraft> = rows.iter().map(QuestionDraft::from_row).collect();

    let mut assigner = KeyAssigner::new(key_prefix, existing_keys);
    for key in drafts.iter().filter_map(|d| d.key.as_deref()) {
        assigner.reserve(key);
    }

    let mut batch = PreparedBatch {
        total_rows: rows.len(),
        ..Default::default()
    };

    for draft in drafts {
        let warnings = match validate(&draft) {
            Ok(warnings) => warnings,
            Err(reason) => {
                tracing::debug!("Row {} rejected: {:?}", draft.row, reason);
                batch.errors.push(RowError {
                    row: draft.row,
                    key: draft.key.clone(),
                    kind: RowErrorKind::Rejected,
                    reason: reason.to_string(),
                });
                continue;
            }
        };

        let key = match assigner.assign(draft.key.as_deref()) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!("Row {}: {}", draft.row, e);
                batch.errors.push(RowError {
                    row: draft.row,
                    key: None,
                    kind: RowErrorKind::Rejected,
                    reason: e.to_string(),
                });
                continue;
            }
        };
        batch
            .warnings
            .extend(warnings.into_iter().map(|warning| RowWarning {
                row: draft.row,
                key: Some(key.clone()),
                reason: warning.to_string(),
            }));

        let row = draft.row;
        batch.records.push(PreparedRecord {
            row,
            record: draft.into_record(key),
        });
    }

    batch
}
