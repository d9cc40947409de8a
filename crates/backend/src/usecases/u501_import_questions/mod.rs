pub mod bulk_submitter;
pub mod executor;
pub mod question_api_client;

#[cfg(test)]
pub mod mock_api;

pub use executor::{ExportFile, ImportError, ImportExecutor};
pub use question_api_client::{HttpQuestionApi, QuestionApi, QuestionApiError};
