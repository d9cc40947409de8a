//! In-memory QuestionApi для тестов

use super::question_api_client::{QuestionApi, QuestionApiError};
use async_trait::async_trait;
use contracts::domain::a001_question::QuestionRecord;
use contracts::shared::question_api::{CreateQuestionRequest, CreateQuestionResponse};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::Notify;

#[derive(Default)]
pub struct MockQuestionApi {
    existing: Vec<QuestionRecord>,
    list_fails: bool,
    failing: Vec<String>,
    rejecting: HashMap<String, String>,
    calls: Mutex<Vec<(String, CreateQuestionRequest)>>,
    /// (вошли в create, отпустить create)
    gate: Option<(Arc<Notify>, Arc<Notify>)>,
}

impl MockQuestionApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_existing(mut self, keys: &[&str]) -> Self {
        self.existing = keys
            .iter()
            .map(|key| QuestionRecord {
                key: key.to_string(),
                text: Some(format!("{key}?")),
                answer: Some("a".to_string()),
                options: vec!["a".to_string(), "b".to_string()],
            })
            .collect();
        self
    }

    pub fn with_list_failure(mut self) -> Self {
        self.list_fails = true;
        self
    }

    /// Транспортная ошибка на этом ключе
    pub fn failing_on(mut self, key: &str) -> Self {
        self.failing.push(key.to_string());
        self
    }

    /// API отвечает `success: false`
    pub fn rejecting(mut self, key: &str, error: &str) -> Self {
        self.rejecting.insert(key.to_string(), error.to_string());
        self
    }

    /// create ждет `release`, предварительно сигналя в `entered`
    pub fn gated(mut self, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
        self.gate = Some((entered, release));
        self
    }

    pub fn calls(&self) -> Vec<(String, CreateQuestionRequest)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn created_keys(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .map(|(_, request)| request.question_key)
            .collect()
    }
}

#[async_trait]
impl QuestionApi for MockQuestionApi {
    async fn list_questions(
        &self,
        _collection: &str,
    ) -> Result<Vec<QuestionRecord>, QuestionApiError> {
        if self.list_fails {
            return Err(QuestionApiError::Status {
                status: 503,
                body: "maintenance".to_string(),
            });
        }
        Ok(self.existing.clone())
    }

    async fn create_question(
        &self,
        collection: &str,
        request: &CreateQuestionRequest,
    ) -> Result<CreateQuestionResponse, QuestionApiError> {
        self.calls
            .lock()
            .unwrap()
            .push((collection.to_string(), request.clone()));

        if let Some((entered, release)) = &self.gate {
            entered.notify_one();
            release.notified().await;
        }

        if self.failing.contains(&request.question_key) {
            return Err(QuestionApiError::Network("connection reset".to_string()));
        }
        if let Some(error) = self.rejecting.get(&request.question_key) {
            return Ok(CreateQuestionResponse {
                success: false,
                error: Some(error.clone()),
            });
        }
        Ok(CreateQuestionResponse {
            success: true,
            error: None,
        })
    }
}
