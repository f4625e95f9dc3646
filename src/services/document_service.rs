// src/services/document_service.rs

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::DocumentRepository,
    models::{
        auth::User,
        requests::{Document, FileType},
    },
    services::request_service::RequestService,
};

const DOCUMENTS_DIR: &str = "documents";
const MAX_NAME_CHARS: usize = 100;

// Arquivo recebido via multipart, ainda não persistido
#[derive(Debug)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
    // Valor explícito do campo `file_type`, se enviado
    pub file_type: Option<String>,
}

// Arquivo lido do disco para download
#[derive(Debug)]
pub struct StoredFile {
    pub file_name: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

#[derive(Clone)]
pub struct DocumentService {
    repo: DocumentRepository,
    requests: RequestService,
    media_root: PathBuf,
    pool: PgPool,
}

impl DocumentService {
    pub fn new(repo: DocumentRepository, requests: RequestService, media_root: PathBuf, pool: PgPool) -> Self {
        Self { repo, requests, media_root, pool }
    }

    pub async fn list(&self, request_id: Uuid, caller: &User) -> Result<Vec<Document>, AppError> {
        self.requests.get(request_id, caller).await?;
        self.repo.list_for_request(request_id).await
    }

    pub async fn upload(&self, request_id: Uuid, upload: UploadedFile, caller: &User) -> Result<Document, AppError> {
        self.requests.get(request_id, caller).await?;

        if upload.bytes.is_empty() {
            return Err(AppError::InvalidUpload("upload_empty_file"));
        }
        let file_type = match upload.file_type.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
            Some(value) => FileType::parse(value).ok_or(AppError::InvalidUpload("upload_invalid_file_type"))?,
            None => FileType::infer(upload.content_type.as_deref(), &upload.file_name),
        };

        let relative = storage_path(Utc::now(), Uuid::new_v4(), &upload.file_name);
        let absolute = self.media_root.join(&relative);
        if let Some(parent) = absolute.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&absolute, &upload.bytes).await?;

        let document = match self
            .repo
            .create(&self.pool, request_id, &relative, file_type, caller.id)
            .await
        {
            Ok(document) => document,
            Err(e) => {
                // Sem linha no banco o arquivo fica órfão
                if let Err(io_err) = tokio::fs::remove_file(&absolute).await {
                    tracing::warn!(path = %absolute.display(), "Falha ao remover upload órfão: {}", io_err);
                }
                return Err(e);
            }
        };

        tracing::info!(
            document_id = %document.id,
            request_id = %request_id,
            size = upload.bytes.len(),
            "Documento anexado"
        );
        Ok(document)
    }

    pub async fn download(&self, id: Uuid, caller: &User) -> Result<StoredFile, AppError> {
        let document = self.visible_document(id, caller).await?;

        let bytes = match tokio::fs::read(self.media_root.join(&document.file)).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(document_id = %id, file = %document.file, "Arquivo do documento ausente no disco");
                return Err(AppError::NotFound("document_not_found"));
            }
            Err(e) => return Err(e.into()),
        };

        let file_name = original_name(&document.file).to_string();
        Ok(StoredFile {
            content_type: content_type_for(&file_name),
            file_name,
            bytes,
        })
    }

    /// Remove a linha e depois o arquivo; arquivo já ausente não é erro.
    pub async fn delete(&self, id: Uuid, caller: &User) -> Result<(), AppError> {
        let document = self.visible_document(id, caller).await?;

        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("document_not_found"));
        }
        match tokio::fs::remove_file(self.media_root.join(&document.file)).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => tracing::warn!(document_id = %id, "Falha ao remover arquivo do documento: {}", e),
        }

        tracing::info!(document_id = %id, "Documento removido");
        Ok(())
    }

    // O documento herda a visibilidade da solicitação
    async fn visible_document(&self, id: Uuid, caller: &User) -> Result<Document, AppError> {
        let document = self
            .repo
            .find(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("document_not_found"))?;

        match self.requests.get(document.request_id, caller).await {
            Ok(_) => Ok(document),
            Err(AppError::NotFound(_)) => Err(AppError::NotFound("document_not_found")),
            Err(e) => Err(e),
        }
    }
}

/// documents/AAAA/MM/DD/<uuid>_<nome>
pub fn storage_path(now: DateTime<Utc>, id: Uuid, file_name: &str) -> String {
    format!(
        "{}/{}/{}_{}",
        DOCUMENTS_DIR,
        now.format("%Y/%m/%d"),
        id,
        sanitize_file_name(file_name)
    )
}

/// Nome sem diretórios e só com caracteres seguros para o sistema de arquivos.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = base
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let trimmed: String = cleaned.trim_start_matches('.').chars().take(MAX_NAME_CHARS).collect();

    if trimmed.is_empty() { "file".to_string() } else { trimmed }
}

/// Nome original (já sanitizado), sem diretórios e sem o prefixo `<uuid>_`.
pub fn original_name(relative: &str) -> &str {
    let base = relative.rsplit('/').next().unwrap_or(relative);
    match base.split_once('_') {
        Some((prefix, rest)) if Uuid::parse_str(prefix).is_ok() => rest,
        _ => base,
    }
}

pub fn content_type_for(file_name: &str) -> &'static str {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();
    match extension.as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "bmp" => "image/bmp",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "txt" => "text/plain; charset=utf-8",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn storage_path_is_partitioned_by_date() {
        let now = Utc.with_ymd_and_hms(2025, 3, 7, 15, 30, 0).unwrap();
        let id = Uuid::nil();
        assert_eq!(
            storage_path(now, id, "паспорт скан.pdf"),
            "documents/2025/03/07/00000000-0000-0000-0000-000000000000_паспорт_скан.pdf"
        );
    }

    #[test]
    fn sanitize_strips_directories_and_unsafe_chars() {
        assert_eq!(sanitize_file_name("../../etc/passwd"), "passwd");
        assert_eq!(sanitize_file_name("C:\\Users\\anna\\фото 1.jpg"), "фото_1.jpg");
        assert_eq!(sanitize_file_name(".hidden"), "hidden");
        assert_eq!(sanitize_file_name(""), "file");
        assert_eq!(sanitize_file_name("a".repeat(300).as_str()).len(), MAX_NAME_CHARS);
    }

    #[test]
    fn original_name_drops_uuid_prefix() {
        let id = Uuid::new_v4();
        let path = format!("documents/2025/03/07/{}_scan_final.pdf", id);
        assert_eq!(original_name(&path), "scan_final.pdf");
        assert_eq!(original_name("documents/legacy.pdf"), "legacy.pdf");
    }

    #[test]
    fn content_type_follows_extension() {
        assert_eq!(content_type_for("scan.PDF"), "application/pdf");
        assert_eq!(content_type_for("photo.jpeg"), "image/jpeg");
        assert_eq!(content_type_for("archive"), "application/octet-stream");
    }
}
