pub mod aggregate;
pub mod excel;

pub use aggregate::{CanonicalField, QuestionRecord};
pub use excel::{CellValue, ImportRow};
