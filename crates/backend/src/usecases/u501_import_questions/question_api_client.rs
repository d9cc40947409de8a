use crate::shared::config::QuestionApiConfig;
use async_trait::async_trait;
use contracts::domain::a001_question::QuestionRecord;
use contracts::shared::question_api::{
    CreateQuestionRequest, CreateQuestionResponse, ListQuestionsResponse,
};
use thiserror::Error;

/// Ошибки обращения к API вопросов
#[derive(Debug, Error)]
pub enum QuestionApiError {
    #[error("HTTP client error: {0}")]
    Client(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("API returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to parse API response: {0}")]
    Decode(String),

    #[error("API rejected request: {0}")]
    Rejected(String),
}

/// Внешнее API коллекций вопросов
#[async_trait]
pub trait QuestionApi: Send + Sync {
    /// Все вопросы коллекции (нужны ключи для генерации новых и экспорт)
    async fn list_questions(&self, collection: &str)
        -> Result<Vec<QuestionRecord>, QuestionApiError>;

    /// Создать один вопрос. `success: false` в ответе - не ошибка транспорта
    async fn create_question(
        &self,
        collection: &str,
        request: &CreateQuestionRequest,
    ) -> Result<CreateQuestionResponse, QuestionApiError>;
}

/// HTTP-клиент API вопросов
pub struct HttpQuestionApi {
    client: reqwest::Client,
    base_url: String,
    api_token: Option<String>,
}

impl HttpQuestionApi {
    pub fn new(config: &QuestionApiConfig) -> Result<Self, QuestionApiError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| QuestionApiError::Client(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_token: config.api_token.clone(),
        })
    }

    fn collection_url(&self, collection: &str) -> String {
        format!(
            "{}/collections/{}/questions",
            self.base_url,
            urlencoding::encode(collection)
        )
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.api_token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send(
        &self,
        request: reqwest::RequestBuilder,
    ) -> Result<(reqwest::StatusCode, String), QuestionApiError> {
        let response = self
            .authorize(request)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(network_error)?;

        let status = response.status();
        let body = response.text().await.map_err(network_error)?;
        Ok((status, body))
    }
}

fn network_error(e: reqwest::Error) -> QuestionApiError {
    let message = if e.is_timeout() {
        format!("Request timeout: {}", e)
    } else if e.is_connect() {
        format!("Connection error: {}", e)
    } else {
        e.to_string()
    };
    tracing::error!("{}", message);
    QuestionApiError::Network(message)
}

/// Первые 500 символов тела (UTF-8 безопасно) для логов и ошибок
fn preview(body: &str) -> String {
    let preview: String = body.chars().take(500).collect();
    if preview.len() < body.len() {
        format!("{}...", preview)
    } else {
        preview
    }
}

#[async_trait]
impl QuestionApi for HttpQuestionApi {
    async fn list_questions(
        &self,
        collection: &str,
    ) -> Result<Vec<QuestionRecord>, QuestionApiError> {
        let url = self.collection_url(collection);
        tracing::info!("Fetching questions from: {}", url);

        let (status, body) = self.send(self.client.get(&url)).await?;
        if !status.is_success() {
            tracing::error!("Question list request failed: {} {}", status, preview(&body));
            return Err(QuestionApiError::Status {
                status: status.as_u16(),
                body: preview(&body),
            });
        }

        let parsed: ListQuestionsResponse = serde_json::from_str(&body)
            .map_err(|e| QuestionApiError::Decode(format!("{}. Response: {}", e, preview(&body))))?;
        if !parsed.success {
            return Err(QuestionApiError::Rejected(
                parsed.error.unwrap_or_else(|| "list request failed".to_string()),
            ));
        }

        tracing::info!("Collection {} has {} questions", collection, parsed.questions.len());
        Ok(parsed.questions.into_iter().map(QuestionRecord::from).collect())
    }

    async fn create_question(
        &self,
        collection: &str,
        request: &CreateQuestionRequest,
    ) -> Result<CreateQuestionResponse, QuestionApiError> {
        let url = self.collection_url(collection);
        let (status, body) = self.send(self.client.post(&url).json(request)).await?;

        // API может вернуть {success:false, error} и с 4xx - берем текст ошибки оттуда
        match serde_json::from_str::<CreateQuestionResponse>(&body) {
            Ok(parsed) if status.is_success() || !parsed.success => Ok(parsed),
            Err(e) if status.is_success() => Err(QuestionApiError::Decode(format!(
                "{}. Response: {}",
                e,
                preview(&body)
            ))),
            _ => Err(QuestionApiError::Status {
                status: status.as_u16(),
                body: preview(&body),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base_url: &str) -> HttpQuestionApi {
        HttpQuestionApi::new(&QuestionApiConfig {
            base_url: base_url.to_string(),
            timeout_secs: 5,
            api_token: None,
        })
        .unwrap()
    }

    #[test]
    fn test_collection_url_encodes_segment() {
        let api = client("https://api.example.test/v1/");
        assert_eq!(
            api.collection_url("KPSS 2024/tarih"),
            "https://api.example.test/v1/collections/KPSS%202024%2Ftarih/questions"
        );
    }

    #[test]
    fn test_preview_truncates_long_bodies() {
        let body = "ş".repeat(600);
        let p = preview(&body);
        assert!(p.ends_with("..."));
        assert_eq!(p.chars().count(), 503);
        assert_eq!(preview("short"), "short");
    }

    #[tokio::test]
    async fn test_unreachable_api_is_network_error() {
        // Порт 9 (discard) на localhost обычно закрыт
        let api = client("http://127.0.0.1:9");
        let err = api.list_questions("quiz").await.unwrap_err();
        assert!(matches!(err, QuestionApiError::Network(_)));
    }
}
