// src/handlers/documents.rs

use axum::{
    extract::{Multipart, Path, State},
    http::{header, HeaderValue, StatusCode},
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::requests::Document,
    services::document_service::UploadedFile,
};

// Corpo multipart esperado no upload (apenas para a documentação)
#[allow(dead_code)]
#[derive(utoipa::ToSchema)]
pub struct DocumentUploadForm {
    #[schema(value_type = String, format = Binary)]
    pub file: Vec<u8>,
    #[schema(example = "pdf")]
    pub file_type: Option<String>,
}

// GET /api/requests/{id}/documents
#[utoipa::path(
    get,
    path = "/api/requests/{id}/documents",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Documentos da solicitação", body = Vec<Document>),
        (status = 404, description = "Solicitação não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_documents(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
) -> Result<Json<Vec<Document>>, ApiError> {
    let documents = app_state
        .document_service
        .list(request_id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(documents))
}

// POST /api/requests/{id}/documents
#[utoipa::path(
    post,
    path = "/api/requests/{id}/documents",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body(content = DocumentUploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Documento anexado", body = Document),
        (status = 400, description = "Upload inválido"),
        (status = 404, description = "Solicitação não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn upload_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(request_id): Path<Uuid>,
    multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let upload = read_upload(multipart).await.map_err(|e| e.to_api_error(&locale))?;

    let document = app_state
        .document_service
        .upload(request_id, upload, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(document)))
}

// Lê os campos `file` e `file_type`; outros campos são ignorados
async fn read_upload(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    let mut file: Option<(String, Option<String>, Vec<u8>)> = None;
    let mut file_type = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| AppError::InvalidUpload("upload_malformed"))?
    {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("file").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|_| AppError::InvalidUpload("upload_malformed"))?;
                file = Some((file_name, content_type, bytes.to_vec()));
            }
            Some("file_type") => {
                let value = field
                    .text()
                    .await
                    .map_err(|_| AppError::InvalidUpload("upload_malformed"))?;
                file_type = Some(value);
            }
            _ => {}
        }
    }

    let (file_name, content_type, bytes) = file.ok_or(AppError::InvalidUpload("upload_missing_file"))?;
    Ok(UploadedFile { file_name, content_type, bytes, file_type })
}

// GET /api/documents/{id}
#[utoipa::path(
    get,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 200, description = "Conteúdo do arquivo", content_type = "application/octet-stream"),
        (status = 404, description = "Documento não encontrado ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn download_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let stored = app_state
        .document_service
        .download(id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    let disposition = HeaderValue::from_str(&content_disposition(&stored.file_name))
        .map_err(|e| AppError::InternalServerError(e.into()).to_api_error(&locale))?;

    Ok((
        [
            (header::CONTENT_TYPE, HeaderValue::from_static(stored.content_type)),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        stored.bytes,
    ))
}

// DELETE /api/documents/{id}
#[utoipa::path(
    delete,
    path = "/api/documents/{id}",
    tag = "Documents",
    params(("id" = Uuid, Path, description = "ID do documento")),
    responses(
        (status = 204, description = "Removido (linha e arquivo)"),
        (status = 404, description = "Documento não encontrado ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_document(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .document_service
        .delete(id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}

/// attachment com nome ASCII de reserva e o nome real em `filename*` (RFC 5987).
fn content_disposition(file_name: &str) -> String {
    let fallback: String = file_name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();

    let mut encoded = String::new();
    for byte in file_name.bytes() {
        if byte.is_ascii_alphanumeric() || matches!(byte, b'.' | b'-' | b'_' | b'~') {
            encoded.push(byte as char);
        } else {
            encoded.push_str(&format!("%{:02X}", byte));
        }
    }

    format!("attachment; filename=\"{}\"; filename*=UTF-8''{}", fallback, encoded)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disposition_keeps_ascii_names() {
        assert_eq!(
            content_disposition("scan-1.pdf"),
            "attachment; filename=\"scan-1.pdf\"; filename*=UTF-8''scan-1.pdf"
        );
    }

    #[test]
    fn disposition_encodes_cyrillic_names() {
        let value = content_disposition("паспорт.pdf");
        assert!(value.starts_with("attachment; filename=\"_______.pdf\""));
        assert!(value.ends_with("filename*=UTF-8''%D0%BF%D0%B0%D1%81%D0%BF%D0%BE%D1%80%D1%82.pdf"));
        assert!(HeaderValue::from_str(&value).is_ok());
    }
}
