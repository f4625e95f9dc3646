// src/common/error.rs

use std::collections::HashMap;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::{common::i18n, middleware::i18n::Locale};

// Erro de domínio: é o que repositórios e serviços retornam.
// Os handlers convertem para `ApiError` já traduzido para o idioma do cliente.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Status não informado")]
    MissingStatus,

    #[error("Status inválido: {0}")]
    InvalidStatus(String),

    // A string é a chave da mensagem no catálogo
    #[error("Upload inválido: {0}")]
    InvalidUpload(&'static str),

    #[error("Referência inválida no campo {0}")]
    InvalidReference(&'static str),

    #[error("E-mail já existe")]
    EmailAlreadyExists,

    #[error("Violação de unicidade: {0}")]
    UniqueConstraintViolation(&'static str),

    #[error("Credenciais inválidas")]
    InvalidCredentials,

    #[error("Token inválido")]
    InvalidToken,

    #[error("Autenticação necessária")]
    AuthenticationRequired,

    #[error("Acesso negado")]
    Forbidden,

    #[error("Não encontrado: {0}")]
    NotFound(&'static str),

    #[error("Erro de banco de dados: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro de E/S: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Erro interno do servidor: {0}")]
    InternalServerError(#[from] anyhow::Error),

    #[error("Erro de Bcrypt: {0}")]
    BcryptError(#[from] bcrypt::BcryptError),

    #[error("Erro de JWT: {0}")]
    JwtError(#[from] jsonwebtoken::errors::Error),
}

// Erro de resposta HTTP, já com a mensagem final.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub error: String,
    pub details: Option<Value>,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::MissingStatus
            | AppError::InvalidStatus(_)
            | AppError::InvalidUpload(_)
            | AppError::InvalidReference(_) => StatusCode::BAD_REQUEST,
            AppError::EmailAlreadyExists | AppError::UniqueConstraintViolation(_) => StatusCode::CONFLICT,
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            AppError::Forbidden => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::DatabaseError(_)
            | AppError::IoError(_)
            | AppError::InternalServerError(_)
            | AppError::BcryptError(_)
            | AppError::JwtError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Traduz o erro para o idioma pedido e monta o corpo da resposta.
    pub fn to_api_error(&self, locale: &Locale) -> ApiError {
        let lang = locale.lang();
        let status = self.status_code();

        let (error, details) = match self {
            AppError::ValidationError(errors) => {
                let mut details: HashMap<String, Vec<String>> = HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages = field_errors
                        .iter()
                        .map(|e| {
                            let key = e.message.as_deref().unwrap_or(e.code.as_ref());
                            i18n::translate(lang, key)
                        })
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                (i18n::translate(lang, "validation_failed"), Some(json!(details)))
            }
            AppError::MissingStatus => (i18n::translate(lang, "status_missing"), None),
            AppError::InvalidStatus(_) => (
                i18n::translate(lang, "status_invalid")
                    .replace("{allowed}", &crate::models::requests::RequestStatus::allowed_list()),
                None,
            ),
            AppError::InvalidUpload(key) => (i18n::translate(lang, key), None),
            AppError::InvalidReference(field) => {
                let message = i18n::translate(lang, "invalid_reference");
                let mut details = serde_json::Map::new();
                details.insert(field.to_string(), json!([message.clone()]));
                (message, Some(Value::Object(details)))
            }
            AppError::EmailAlreadyExists => (i18n::translate(lang, "email_taken"), None),
            AppError::UniqueConstraintViolation(key) => (i18n::translate(lang, key), None),
            AppError::InvalidCredentials => (i18n::translate(lang, "invalid_credentials"), None),
            AppError::InvalidToken => (i18n::translate(lang, "invalid_token"), None),
            AppError::AuthenticationRequired => (i18n::translate(lang, "authentication_required"), None),
            AppError::Forbidden => (i18n::translate(lang, "forbidden"), None),
            AppError::NotFound(key) => (i18n::translate(lang, key), None),

            // Todo o resto vira 500. O detalhe fica só no log.
            e => {
                tracing::error!("Erro Interno do Servidor: {}", e);
                (i18n::translate(lang, "internal_error"), None)
            }
        };

        ApiError { status, error, details }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = match self.details {
            Some(details) => json!({ "error": self.error, "details": details }),
            None => json!({ "error": self.error }),
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use validator::{ValidationError, ValidationErrors};

    #[test]
    fn maps_variants_to_http_status() {
        assert_eq!(AppError::MissingStatus.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::InvalidStatus("done".into()).status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(AppError::AuthenticationRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(AppError::Forbidden.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(AppError::NotFound("request_not_found").status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::EmailAlreadyExists.status_code(), StatusCode::CONFLICT);
        assert_eq!(
            AppError::DatabaseError(sqlx::Error::RowNotFound).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn invalid_status_lists_allowed_values() {
        let api = AppError::InvalidStatus("done".into()).to_api_error(&Locale::new("en"));
        assert_eq!(api.status, StatusCode::BAD_REQUEST);
        assert!(api.error.contains("new, in_progress, completed, rejected"));
    }

    #[test]
    fn validation_details_are_translated_per_field() {
        let mut errors = ValidationErrors::new();
        let mut err = ValidationError::new("range");
        err.message = Some("duration_out_of_range".into());
        errors.add("duration_days", err);

        let api = AppError::ValidationError(errors).to_api_error(&Locale::new("ru"));
        let details = api.details.expect("details");
        let messages = details["duration_days"].as_array().expect("array");
        assert_eq!(messages[0], "Срок выполнения должен быть от 1 до 365 дней");
    }

    #[test]
    fn internal_errors_hide_details() {
        let api = AppError::InternalServerError(anyhow::anyhow!("segredo")).to_api_error(&Locale::new("en"));
        assert_eq!(api.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!api.error.contains("segredo"));
    }
}
