pub mod draft;
pub mod excel_export;
pub mod excel_import;
pub mod header_normalizer;
pub mod key_assigner;
pub mod validator;

pub use draft::QuestionDraft;
pub use excel_import::{prepare_batch, PreparedBatch, PreparedRecord};
pub use key_assigner::{KeyAssigner, KeysExhausted};
