use super::header_normalizer::{normalize_row, CanonicalRow};
use contracts::domain::a001_question::{CanonicalField, ImportRow, QuestionRecord};

/// Вопрос из строки файла до назначения ключа
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuestionDraft {
    /// Номер строки в листе
    pub row: usize,
    /// Явный ключ из файла
    pub key: Option<String>,
    pub text: Option<String>,
    pub answer: Option<String>,
    /// Заполненные варианты в порядке option1..option4
    pub options: Vec<String>,
}

impl QuestionDraft {
    pub fn from_row(row: &ImportRow) -> Self {
        Self::from_canonical(row.row_number, &normalize_row(row))
    }

    pub fn from_canonical(row: usize, canonical: &CanonicalRow) -> Self {
        let options = CanonicalField::OPTIONS
            .iter()
            .filter_map(|field| canonical.get(field))
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
            .map(str::to_string)
            .collect();

        Self {
            row,
            key: non_empty(canonical.get(&CanonicalField::Key)),
            text: non_empty(canonical.get(&CanonicalField::Text)),
            answer: non_empty(canonical.get(&CanonicalField::Answer)),
            options,
        }
    }

    pub fn into_record(self, key: String) -> QuestionRecord {
        QuestionRecord {
            key,
            text: self.text,
            answer: self.answer,
            options: self.options,
        }
    }
}

fn non_empty(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
