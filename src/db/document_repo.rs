// src/db/document_repo.rs

use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    models::requests::{Document, FileType},
};

const DOCUMENT_COLUMNS: &str = "id, request_id, file, file_type, uploaded_at, uploaded_by";

#[derive(Clone)]
pub struct DocumentRepository {
    pool: PgPool,
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_for_request(&self, request_id: Uuid) -> Result<Vec<Document>, AppError> {
        let documents = sqlx::query_as::<_, Document>(&format!(
            "SELECT {DOCUMENT_COLUMNS} FROM documents WHERE request_id = $1 ORDER BY uploaded_at DESC, id"
        ))
        .bind(request_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(documents)
    }

    pub async fn find<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Document>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let document = sqlx::query_as::<_, Document>(&format!("SELECT {DOCUMENT_COLUMNS} FROM documents WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(document)
    }

    pub async fn create<'e, E>(
        &self,
        executor: E,
        request_id: Uuid,
        file: &str,
        file_type: FileType,
        uploaded_by: Uuid,
    ) -> Result<Document, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, Document>(&format!(
            r#"
            INSERT INTO documents (request_id, file, file_type, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING {DOCUMENT_COLUMNS}
            "#
        ))
        .bind(request_id)
        .bind(file)
        .bind(file_type)
        .bind(uploaded_by)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, &["request_id", "uploaded_by"]))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM documents WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
