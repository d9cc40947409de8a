//! Wire-формат внешнего API вопросов (коллекции квизов)

use crate::domain::a001_question::QuestionRecord;
use serde::{Deserialize, Serialize};

/// Тело запроса на создание вопроса
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateQuestionRequest {
    #[serde(alias = "key")]
    pub question_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub question_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub answer: Option<String>,
    pub options: Vec<String>,
}

impl From<&QuestionRecord> for CreateQuestionRequest {
    fn from(record: &QuestionRecord) -> Self {
        Self {
            question_key: record.key.clone(),
            question_text: record.text.clone(),
            answer: record.answer.clone(),
            options: record.options.clone(),
        }
    }
}

/// Ответ API на создание
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateQuestionResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Вопрос в том виде, в каком его отдает API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoteQuestion {
    #[serde(alias = "key")]
    pub question_key: String,
    #[serde(default)]
    pub question_text: Option<String>,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub options: Vec<String>,
}

impl From<RemoteQuestion> for QuestionRecord {
    fn from(q: RemoteQuestion) -> Self {
        QuestionRecord {
            key: q.question_key,
            text: q.question_text,
            answer: q.answer,
            options: q.options,
        }
    }
}

/// Ответ API со списком вопросов коллекции
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListQuestionsResponse {
    pub success: bool,
    #[serde(default)]
    pub questions: Vec<RemoteQuestion>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_request_uses_camel_case() {
        let record = QuestionRecord {
            key: "soru3".to_string(),
            text: Some("Başkent?".to_string()),
            answer: Some("Ankara".to_string()),
            options: vec!["Ankara".to_string(), "İzmir".to_string()],
        };
        let json = serde_json::to_value(CreateQuestionRequest::from(&record)).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "questionKey": "soru3",
                "questionText": "Başkent?",
                "answer": "Ankara",
                "options": ["Ankara", "İzmir"]
            })
        );
    }

    #[test]
    fn test_remote_question_accepts_plain_key() {
        let q: RemoteQuestion = serde_json::from_str(r#"{"key": "soru9"}"#).unwrap();
        assert_eq!(q.question_key, "soru9");
        assert!(q.options.is_empty());
    }
}
