use crate::domain::a001_question::CellValue;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Импорт строк, уже разобранных на стороне браузера
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportRowsRequest {
    /// Коллекция (квиз), в которую добавляются вопросы
    pub collection: String,
    /// Имя исходного файла, только для отчета
    #[serde(default)]
    pub source_name: Option<String>,
    /// Строки в порядке листа: заголовок -> значение
    pub rows: Vec<HashMap<String, CellValue>>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportFormat {
    #[default]
    Xlsx,
    Csv,
}

impl ExportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => "xlsx",
            ExportFormat::Csv => "csv",
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ExportFormat::Xlsx => {
                "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
            }
            ExportFormat::Csv => "text/csv; charset=utf-8",
        }
    }
}

/// Query-параметры экспорта коллекции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportQuery {
    pub collection: String,
    #[serde(default)]
    pub format: ExportFormat,
}
