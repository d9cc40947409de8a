use super::draft::QuestionDraft;
use thiserror::Error;

/// Минимум заполненных вариантов для импорта
pub const MIN_OPTIONS: usize = 2;

/// Причина отказа в импорте строки
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RejectReason {
    #[error("insufficient options")]
    InsufficientOptions { found: usize },
}

/// Строка импортируется, но с замечанием
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationWarning {
    /// Ответ не совпадает ни с одним вариантом. Только предупреждение:
    /// в ручном вводе и в импорте это всегда трактуется одинаково
    #[error("answer not among options")]
    AnswerNotAmongOptions { answer: String },
}

pub fn validate(draft: &QuestionDraft) -> Result<Vec<ValidationWarning>, RejectReason> {
    let filled: Vec<&str> = draft
        .options
        .iter()
        .map(|o| o.trim())
        .filter(|o| !o.is_empty())
        .collect();

    if filled.len() < MIN_OPTIONS {
        return Err(RejectReason::InsufficientOptions {
            found: filled.len(),
        });
    }

    let mut warnings = Vec::new();
    if let Some(answer) = draft.answer.as_deref().map(str::trim).filter(|a| !a.is_empty()) {
        if !filled.contains(&answer) {
            warnings.push(ValidationWarning::AnswerNotAmongOptions {
                answer: answer.to_string(),
            });
        }
    }

    Ok(warnings)
}
