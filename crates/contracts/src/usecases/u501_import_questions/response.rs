use crate::domain::a001_question::QuestionRecord;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RowErrorKind {
    /// Строка не прошла валидацию и не отправлялась
    Rejected,
    /// API отклонило запись или запрос не дошел
    SubmitFailed,
}

/// Ошибка по конкретной строке файла
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowError {
    /// Номер строки в листе
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub kind: RowErrorKind,
    pub reason: String,
}

/// Предупреждение: строка импортируется, но требует внимания
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RowWarning {
    pub row: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    Completed,
    CompletedWithErrors,
}

/// Итог одного импорта (batch)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportOutcome {
    pub batch_id: String,
    pub collection: String,
    pub source_name: String,
    /// Непустых строк данных в источнике
    pub total_rows: usize,
    pub imported_count: usize,
    /// Отклонено валидацией
    pub skipped_count: usize,
    /// Не удалось отправить
    pub failed_count: usize,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
    pub imported_keys: Vec<String>,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl ImportOutcome {
    pub fn status(&self) -> ImportStatus {
        if self.errors.is_empty() {
            ImportStatus::Completed
        } else {
            ImportStatus::CompletedWithErrors
        }
    }

    /// Короткое сообщение для тоста в UI
    pub fn summary(&self) -> String {
        format!(
            "{} imported, {} skipped, {} failed",
            self.imported_count, self.skipped_count, self.failed_count
        )
    }
}

/// Результат пробного импорта: ничего не отправлено
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportPreview {
    pub source_name: String,
    pub total_rows: usize,
    /// Записи с ключами, которые были бы назначены при импорте
    pub records: Vec<QuestionRecord>,
    pub errors: Vec<RowError>,
    pub warnings: Vec<RowWarning>,
}
