// src/models/requests.rs

use std::{fmt, str::FromStr};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::common::error::AppError;

// --- Status da solicitação ---
// Conjunto plano: qualquer status pode ir para qualquer outro.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "request_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    New,
    InProgress,
    Completed,
    Rejected,
}

impl RequestStatus {
    pub const ALL: [RequestStatus; 4] = [
        RequestStatus::New,
        RequestStatus::InProgress,
        RequestStatus::Completed,
        RequestStatus::Rejected,
    ];

    /// Status considerados "em andamento".
    pub const ACTIVE: [RequestStatus; 2] = [RequestStatus::New, RequestStatus::InProgress];

    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::New => "new",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::Completed => "completed",
            RequestStatus::Rejected => "rejected",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            RequestStatus::New => "Новая",
            RequestStatus::InProgress => "В обработке",
            RequestStatus::Completed => "Завершена",
            RequestStatus::Rejected => "Отклонена",
        }
    }

    pub fn allowed_list() -> String {
        Self::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
    }

    /// Valida o status vindo do cliente: ausente/vazio e desconhecido são erros distintos.
    pub fn parse_required(value: Option<&str>) -> Result<Self, AppError> {
        match value.map(str::trim) {
            None | Some("") => Err(AppError::MissingStatus),
            Some(v) => v.parse(),
        }
    }
}

impl FromStr for RequestStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::InvalidStatus(s.to_string()))
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Solicitação com os dados das entidades relacionadas (JOIN)
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct RequestDetail {
    pub id: Uuid,
    pub user_id: Uuid,
    #[schema(example = "Иванов Иван Иванович")]
    pub user_full_name: String,
    #[schema(example = "ivanov@example.ru")]
    pub user_email: String,
    pub service_id: Uuid,
    #[schema(example = "Выдача паспорта РФ")]
    pub service_name: String,
    pub office_id: Option<Uuid>,
    pub office_address: Option<String>,
    pub status: RequestStatus,
    #[sqlx(skip)]
    #[schema(example = "Новая")]
    pub status_display: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RequestDetail {
    /// Preenche o rótulo do status, que não vem do banco.
    pub fn with_display(mut self) -> Self {
        self.status_display = self.status.display_name().to_string();
        self
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateRequestPayload {
    pub service_id: Uuid,
    pub office_id: Option<Uuid>,
    // Apenas administradores podem abrir solicitação em nome de outro usuário
    pub user_id: Option<Uuid>,
    #[schema(example = "new")]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateRequestPayload {
    pub service_id: Option<Uuid>,
    // Ausente: mantém. `null`: remove a agência. Valor: troca.
    #[serde(default, deserialize_with = "present")]
    #[schema(value_type = Option<Uuid>)]
    pub office_id: Option<Option<Uuid>>,
    #[schema(example = "in_progress")]
    pub status: Option<String>,
}

// Campo presente vira Some, mesmo quando o valor é null
fn present<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ChangeStatusPayload {
    #[schema(example = "completed")]
    pub status: Option<String>,
}

// --- Documentos ---
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "document_file_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum FileType {
    Image,
    Pdf,
    Other,
}

impl FileType {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "image" => Some(FileType::Image),
            "pdf" => Some(FileType::Pdf),
            "other" => Some(FileType::Other),
            _ => None,
        }
    }

    /// Deduz o tipo pelo content-type e, na falta dele, pela extensão.
    pub fn infer(content_type: Option<&str>, file_name: &str) -> Self {
        let content_type = content_type.unwrap_or_default().to_ascii_lowercase();
        if content_type.starts_with("image/") {
            return FileType::Image;
        }
        if content_type == "application/pdf" {
            return FileType::Pdf;
        }

        let extension = file_name
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_ascii_lowercase())
            .unwrap_or_default();
        match extension.as_str() {
            "jpg" | "jpeg" | "png" | "gif" | "bmp" | "webp" | "tif" | "tiff" => FileType::Image,
            "pdf" => FileType::Pdf,
            _ => FileType::Other,
        }
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Document {
    pub id: Uuid,
    pub request_id: Uuid,
    // Caminho relativo a MEDIA_ROOT
    #[schema(example = "documents/2025/03/14/5f1c..._passport.pdf")]
    pub file: String,
    pub file_type: FileType,
    pub uploaded_at: DateTime<Utc>,
    pub uploaded_by: Option<Uuid>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_payload_tells_null_office_from_absent() {
        let office = Uuid::new_v4();

        let absent: UpdateRequestPayload = serde_json::from_value(serde_json::json!({})).unwrap();
        assert_eq!(absent.office_id, None);

        let cleared: UpdateRequestPayload =
            serde_json::from_value(serde_json::json!({ "office_id": null })).unwrap();
        assert_eq!(cleared.office_id, Some(None));

        let moved: UpdateRequestPayload =
            serde_json::from_value(serde_json::json!({ "office_id": office })).unwrap();
        assert_eq!(moved.office_id, Some(Some(office)));
    }

    #[test]
    fn parses_every_known_status() {
        for status in RequestStatus::ALL {
            assert_eq!(status.as_str().parse::<RequestStatus>().unwrap(), status);
        }
    }

    #[test]
    fn rejects_unknown_status() {
        assert!(matches!("done".parse::<RequestStatus>(), Err(AppError::InvalidStatus(_))));
        assert!(matches!("NEW".parse::<RequestStatus>(), Err(AppError::InvalidStatus(_))));
    }

    #[test]
    fn missing_status_is_its_own_error() {
        assert!(matches!(RequestStatus::parse_required(None), Err(AppError::MissingStatus)));
        assert!(matches!(RequestStatus::parse_required(Some("  ")), Err(AppError::MissingStatus)));
        assert_eq!(
            RequestStatus::parse_required(Some("rejected")).unwrap(),
            RequestStatus::Rejected
        );
    }

    #[test]
    fn status_serializes_as_snake_case() {
        assert_eq!(serde_json::to_string(&RequestStatus::InProgress).unwrap(), "\"in_progress\"");
        assert_eq!(RequestStatus::InProgress.display_name(), "В обработке");
    }

    #[test]
    fn infers_file_type() {
        assert_eq!(FileType::infer(Some("image/png"), "scan"), FileType::Image);
        assert_eq!(FileType::infer(Some("application/pdf"), "x.bin"), FileType::Pdf);
        assert_eq!(FileType::infer(None, "Паспорт.PDF"), FileType::Pdf);
        assert_eq!(FileType::infer(Some("application/octet-stream"), "photo.jpeg"), FileType::Image);
        assert_eq!(FileType::infer(None, "notes.txt"), FileType::Other);
        assert_eq!(FileType::infer(None, "no_extension"), FileType::Other);
    }

    #[test]
    fn parses_explicit_file_type() {
        assert_eq!(FileType::parse(" PDF "), Some(FileType::Pdf));
        assert_eq!(FileType::parse("video"), None);
    }
}
