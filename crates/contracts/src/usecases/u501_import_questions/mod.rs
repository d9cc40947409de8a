pub mod request;
pub mod response;

pub use request::{ExportFormat, ExportQuery, ImportRowsRequest};
pub use response::{ImportOutcome, ImportPreview, ImportStatus, RowError, RowErrorKind, RowWarning};

use crate::usecases::common::UseCaseMetadata;

pub struct ImportQuestions;

impl UseCaseMetadata for ImportQuestions {
    fn usecase_index() -> &'static str {
        "u501"
    }

    fn usecase_name() -> &'static str {
        "import_questions"
    }

    fn display_name() -> &'static str {
        "Soru içe aktarma"
    }

    fn description() -> &'static str {
        "Загрузка вопросов квиза из xlsx/csv и отправка их во внешнее API"
    }
}
