use axum::{
    extract::{Multipart, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use contracts::usecases::common::UseCaseError;
use contracts::usecases::u501_import_questions::{
    ExportQuery, ImportOutcome, ImportPreview, ImportRowsRequest,
};

use crate::routes::AppState;
use crate::usecases::u501_import_questions::ImportError;

type HandlerError = (StatusCode, Json<UseCaseError>);

impl From<&ImportError> for UseCaseError {
    fn from(e: &ImportError) -> Self {
        match e {
            ImportError::InvalidRequest(msg) => UseCaseError::validation(msg.clone()),
            ImportError::Busy => UseCaseError::busy(e.to_string()),
            ImportError::Source(source) => {
                UseCaseError::source_read("Cannot read source file").with_details(source.to_string())
            }
            ImportError::Remote(remote) => UseCaseError::external("Question API unavailable")
                .with_details(remote.to_string()),
            ImportError::Export(export) => {
                UseCaseError::internal("Export failed").with_details(export.to_string())
            }
        }
    }
}

fn status_of(e: &ImportError) -> StatusCode {
    match e {
        ImportError::InvalidRequest(_) | ImportError::Source(_) => StatusCode::BAD_REQUEST,
        ImportError::Busy => StatusCode::CONFLICT,
        ImportError::Remote(_) => StatusCode::BAD_GATEWAY,
        ImportError::Export(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn error_response(e: ImportError) -> HandlerError {
    let status = status_of(&e);
    if status.is_server_error() {
        tracing::error!("Question import failed: {}", e);
    } else {
        tracing::warn!("Question import refused: {}", e);
    }
    (status, Json(UseCaseError::from(&e)))
}

fn bad_request(message: impl Into<String>) -> HandlerError {
    (
        StatusCode::BAD_REQUEST,
        Json(UseCaseError::validation(message)),
    )
}

/// Поля multipart-формы импорта
struct UploadForm {
    collection: String,
    file_name: String,
    bytes: Vec<u8>,
}

async fn read_upload(multipart: &mut Multipart) -> Result<UploadForm, HandlerError> {
    let mut collection = None;
    let mut file = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request(format!("Malformed multipart body: {}", e)))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "collection" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| bad_request(format!("Cannot read collection: {}", e)))?;
                collection = Some(value);
            }
            "file" => {
                let file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| bad_request(format!("Cannot read file: {}", e)))?;
                file = Some((file_name, bytes.to_vec()));
            }
            other => tracing::debug!("Ignoring multipart field {}", other),
        }
    }

    let collection = collection.ok_or_else(|| bad_request("Field 'collection' is required"))?;
    let (file_name, bytes) = file.ok_or_else(|| bad_request("Field 'file' is required"))?;

    Ok(UploadForm {
        collection,
        file_name,
        bytes,
    })
}

/// POST /api/questions/import
pub async fn import_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportOutcome>, HandlerError> {
    let form = read_upload(&mut multipart).await?;
    tracing::info!(
        "Import file {} ({} bytes) into {}",
        form.file_name,
        form.bytes.len(),
        form.collection
    );

    state
        .executor
        .import_file(&form.collection, &form.file_name, &form.bytes)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /api/questions/import/preview
pub async fn preview_file(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<ImportPreview>, HandlerError> {
    let form = read_upload(&mut multipart).await?;

    state
        .executor
        .preview_file(&form.collection, &form.file_name, &form.bytes)
        .await
        .map(Json)
        .map_err(error_response)
}

/// POST /api/questions/import-rows
pub async fn import_rows(
    State(state): State<AppState>,
    Json(request): Json<ImportRowsRequest>,
) -> Result<Json<ImportOutcome>, HandlerError> {
    tracing::info!(
        "Import {} rows into {}",
        request.rows.len(),
        request.collection
    );

    state
        .executor
        .import_rows(request)
        .await
        .map(Json)
        .map_err(error_response)
}

/// GET /api/questions/export?collection=...&format=xlsx|csv
pub async fn export(
    State(state): State<AppState>,
    Query(query): Query<ExportQuery>,
) -> Result<Response, HandlerError> {
    let file = state
        .executor
        .export(&query.collection, query.format)
        .await
        .map_err(error_response)?;

    let disposition = format!("attachment; filename=\"{}\"", file.file_name);
    Ok((
        [
            (header::CONTENT_TYPE, file.content_type.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        file.bytes,
    )
        .into_response())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::usecases::u501_import_questions::QuestionApiError;

    #[test]
    fn test_error_mapping() {
        let cases = [
            (
                ImportError::InvalidRequest("collection is required".to_string()),
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
            ),
            (ImportError::Busy, StatusCode::CONFLICT, "IMPORT_IN_PROGRESS"),
            (
                ImportError::Remote(QuestionApiError::Network("refused".to_string())),
                StatusCode::BAD_GATEWAY,
                "EXTERNAL_ERROR",
            ),
        ];

        for (error, status, code) in cases {
            let (actual_status, Json(body)) = error_response(error);
            assert_eq!(actual_status, status);
            assert_eq!(body.code, code);
        }
    }

    #[test]
    fn test_remote_error_keeps_details() {
        let error = ImportError::Remote(QuestionApiError::Status {
            status: 503,
            body: "maintenance".to_string(),
        });
        let body = UseCaseError::from(&error);
        assert!(body.details.unwrap().contains("maintenance"));
    }
}
