use serde::{Deserialize, Serialize};

/// Максимальное количество вариантов ответа у вопроса
pub const MAX_OPTIONS: usize = 4;

/// Каноническое поле вопроса, не зависящее от написания заголовка в файле
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CanonicalField {
    Key,
    Text,
    Answer,
    Option1,
    Option2,
    Option3,
    Option4,
}

impl CanonicalField {
    /// Все поля в порядке колонок экспорта
    pub const ALL: [CanonicalField; 7] = [
        CanonicalField::Key,
        CanonicalField::Text,
        CanonicalField::Answer,
        CanonicalField::Option1,
        CanonicalField::Option2,
        CanonicalField::Option3,
        CanonicalField::Option4,
    ];

    pub const OPTIONS: [CanonicalField; MAX_OPTIONS] = [
        CanonicalField::Option1,
        CanonicalField::Option2,
        CanonicalField::Option3,
        CanonicalField::Option4,
    ];

    /// Имя колонки в экспортируемом файле (оно же принимается при импорте)
    pub fn column_name(&self) -> &'static str {
        match self {
            CanonicalField::Key => "key",
            CanonicalField::Text => "text",
            CanonicalField::Answer => "answer",
            CanonicalField::Option1 => "option1",
            CanonicalField::Option2 => "option2",
            CanonicalField::Option3 => "option3",
            CanonicalField::Option4 => "option4",
        }
    }

    /// Номер варианта ответа (1..=4) для полей option*
    pub fn option_number(&self) -> Option<usize> {
        match self {
            CanonicalField::Option1 => Some(1),
            CanonicalField::Option2 => Some(2),
            CanonicalField::Option3 => Some(3),
            CanonicalField::Option4 => Some(4),
            _ => None,
        }
    }
}

/// Нормализованный вопрос коллекции
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionRecord {
    /// Уникальный ключ внутри коллекции (например, "soru12")
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    /// Непустые варианты ответа в исходном порядке, не больше MAX_OPTIONS
    #[serde(default)]
    pub options: Vec<String>,
}

impl QuestionRecord {
    /// Значение канонического поля в виде, пригодном для записи в ячейку
    pub fn field_value(&self, field: CanonicalField) -> Option<&str> {
        match field {
            CanonicalField::Key => Some(self.key.as_str()),
            CanonicalField::Text => self.text.as_deref(),
            CanonicalField::Answer => self.answer.as_deref(),
            other => other
                .option_number()
                .and_then(|n| self.options.get(n - 1))
                .map(String::as_str),
        }
    }
}
