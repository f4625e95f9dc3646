// src/db/appointment_repo.rs

use chrono::{DateTime, Utc};
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    filters::PageRequest,
    models::appointments::{Appointment, AppointmentStatus},
};

const APPOINTMENT_SELECT: &str = r#"
    SELECT
        a.id, a.user_id,
        u.full_name AS user_full_name,
        a.service_id,
        s.name AS service_name,
        a.office_id,
        o.address AS office_address,
        a.appointment_datetime, a.status, a.created_at
    FROM appointments a
    JOIN users u ON u.id = a.user_id
    JOIN services s ON s.id = a.service_id
    JOIN mfc_offices o ON o.id = a.office_id
"#;

// $1 = e-mail do dono (NULL para staff)
const OWNER_SCOPE: &str = "($1::text IS NULL OR u.email = $1)";

#[derive(Clone)]
pub struct AppointmentRepository {
    pool: PgPool,
}

impl AppointmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `owner_email` = None lista todos os agendamentos.
    pub async fn list(
        &self,
        owner_email: Option<&str>,
        page: PageRequest,
    ) -> Result<(i64, Vec<Appointment>), AppError> {
        let count = sqlx::query_scalar::<_, i64>(&format!(
            "SELECT COUNT(*) FROM appointments a JOIN users u ON u.id = a.user_id WHERE {OWNER_SCOPE}"
        ))
        .bind(owner_email)
        .fetch_one(&self.pool)
        .await?;

        let appointments = sqlx::query_as::<_, Appointment>(&format!(
            "{APPOINTMENT_SELECT} WHERE {OWNER_SCOPE} ORDER BY a.appointment_datetime DESC, a.id LIMIT $2 OFFSET $3"
        ))
        .bind(owner_email)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((count, appointments))
    }

    pub async fn find<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        owner_email: Option<&str>,
    ) -> Result<Option<Appointment>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let appointment = sqlx::query_as::<_, Appointment>(&format!(
            "{APPOINTMENT_SELECT} WHERE {OWNER_SCOPE} AND a.id = $2"
        ))
        .bind(owner_email)
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(appointment)
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        service_id: Uuid,
        office_id: Uuid,
        appointment_datetime: DateTime<Utc>,
        status: AppointmentStatus,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO appointments (user_id, service_id, office_id, appointment_datetime, status)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(service_id)
        .bind(office_id)
        .bind(appointment_datetime)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, &["user_id", "service_id", "office_id"]))
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM appointments WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
