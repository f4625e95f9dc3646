// src/db/catalog_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    filters::ServiceQuery,
    models::catalog::{
        CategoryPayload, CategoryServiceCount, MfcOffice, OfficePayload, Service, ServiceCategory,
        ServiceCategoryWithCount, ServicePayload,
    },
};

// Serviço com a categoria (JOIN) e as agências agregadas num array, uma linha por serviço
const SERVICE_SELECT: &str = r#"
    SELECT
        s.id, s.name, s.description, s.category_id,
        c.name AS category_name,
        s.duration_days,
        ARRAY(
            SELECT so.office_id FROM service_offices so
            WHERE so.service_id = s.id
            ORDER BY so.office_id
        ) AS office_ids
    FROM services s
    JOIN service_categories c ON c.id = s.category_id
"#;

const SERVICE_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM services s
    JOIN service_categories c ON c.id = s.category_id
"#;

#[derive(Clone)]
pub struct CatalogRepository {
    pool: PgPool,
}

impl CatalogRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<ServiceCategoryWithCount>, AppError> {
        let categories = sqlx::query_as::<_, ServiceCategoryWithCount>(
            r#"
            SELECT c.id, c.name, c.description,
                   (SELECT COUNT(*) FROM services s WHERE s.category_id = c.id) AS services_count
            FROM service_categories c
            ORDER BY c.name, c.id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(categories)
    }

    pub async fn find_category<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<ServiceCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let category = sqlx::query_as::<_, ServiceCategory>(
            "SELECT id, name, description FROM service_categories WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(category)
    }

    pub async fn create_category<'e, E>(&self, executor: E, payload: &CategoryPayload) -> Result<ServiceCategory, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            INSERT INTO service_categories (name, description)
            VALUES ($1, $2)
            RETURNING id, name, description
            "#,
        )
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, Some(AppError::UniqueConstraintViolation("category_name_taken")), &[]))
    }

    pub async fn update_category<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &CategoryPayload,
    ) -> Result<Option<ServiceCategory>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, ServiceCategory>(
            r#"
            UPDATE service_categories SET name = $2, description = $3
            WHERE id = $1
            RETURNING id, name, description
            "#,
        )
        .bind(id)
        .bind(payload.name.trim())
        .bind(payload.description.as_deref())
        .fetch_optional(executor)
        .await
        .map_err(|e| map_constraint_error(e, Some(AppError::UniqueConstraintViolation("category_name_taken")), &[]))
    }

    /// Remove a categoria (e, em cascata, os seus serviços). Retorna false se não existia.
    pub async fn delete_category<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM service_categories WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // =========================================================================
    //  AGÊNCIAS (MFC)
    // =========================================================================

    pub async fn list_offices(&self) -> Result<Vec<MfcOffice>, AppError> {
        let offices = sqlx::query_as::<_, MfcOffice>(
            r#"
            SELECT id, address, district, working_hours
            FROM mfc_offices
            ORDER BY district NULLS FIRST, address, id
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(offices)
    }

    pub async fn find_office<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<MfcOffice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let office = sqlx::query_as::<_, MfcOffice>(
            "SELECT id, address, district, working_hours FROM mfc_offices WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(executor)
        .await?;

        Ok(office)
    }

    pub async fn create_office<'e, E>(&self, executor: E, payload: &OfficePayload) -> Result<MfcOffice, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let office = sqlx::query_as::<_, MfcOffice>(
            r#"
            INSERT INTO mfc_offices (address, district, working_hours)
            VALUES ($1, $2, $3)
            RETURNING id, address, district, working_hours
            "#,
        )
        .bind(payload.address.trim())
        .bind(payload.district.as_deref())
        .bind(payload.working_hours.as_deref())
        .fetch_one(executor)
        .await?;

        Ok(office)
    }

    pub async fn update_office<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        payload: &OfficePayload,
    ) -> Result<Option<MfcOffice>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let office = sqlx::query_as::<_, MfcOffice>(
            r#"
            UPDATE mfc_offices SET address = $2, district = $3, working_hours = $4
            WHERE id = $1
            RETURNING id, address, district, working_hours
            "#,
        )
        .bind(id)
        .bind(payload.address.trim())
        .bind(payload.district.as_deref())
        .bind(payload.working_hours.as_deref())
        .fetch_optional(executor)
        .await?;

        Ok(office)
    }

    pub async fn delete_office<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM mfc_offices WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Serviços prestados numa agência.
    pub async fn list_office_services(&self, office_id: Uuid) -> Result<Vec<Service>, AppError> {
        let services = sqlx::query_as::<_, Service>(&format!(
            r#"{SERVICE_SELECT}
            WHERE EXISTS (
                SELECT 1 FROM service_offices so
                WHERE so.service_id = s.id AND so.office_id = $1
            )
            ORDER BY s.name, s.id"#
        ))
        .bind(office_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(services)
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    /// Listagem filtrada: retorna o total (sem paginação) e a página pedida.
    pub async fn list_services(&self, query: &ServiceQuery) -> Result<(i64, Vec<Service>), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new(SERVICE_COUNT);
        query.push_where(&mut count_qb);
        let count = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(SERVICE_SELECT);
        query.push_where(&mut qb);
        query.order.push_sql(&mut qb, "s.id");
        query.page.push_sql(&mut qb);

        tracing::debug!(sql = qb.sql(), "Listando serviços");
        let services = qb.build_query_as::<Service>().fetch_all(&self.pool).await?;

        Ok((count, services))
    }

    pub async fn find_service<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<Service>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let service = sqlx::query_as::<_, Service>(&format!("{SERVICE_SELECT} WHERE s.id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;

        Ok(service)
    }

    /// Insere o serviço e devolve o id; as agências são gravadas à parte.
    pub async fn insert_service<'e, E>(&self, executor: E, payload: &ServicePayload) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO services (name, description, category_id, duration_days)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(&payload.name)
        .bind(payload.description.as_deref())
        .bind(payload.category_id)
        .bind(payload.duration_days)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, &["category_id"]))
    }

    pub async fn update_service<'e, E>(&self, executor: E, id: Uuid, payload: &ServicePayload) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE services
            SET name = $2, description = $3, category_id = $4, duration_days = $5
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(&payload.name)
        .bind(payload.description.as_deref())
        .bind(payload.category_id)
        .bind(payload.duration_days)
        .execute(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, &["category_id"]))?;

        Ok(result.rows_affected() > 0)
    }

    pub async fn clear_service_offices<'e, E>(&self, executor: E, service_id: Uuid) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query("DELETE FROM service_offices WHERE service_id = $1")
            .bind(service_id)
            .execute(executor)
            .await?;
        Ok(())
    }

    pub async fn link_service_offices<'e, E>(
        &self,
        executor: E,
        service_id: Uuid,
        office_ids: &[Uuid],
    ) -> Result<(), AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        if office_ids.is_empty() {
            return Ok(());
        }
        sqlx::query(
            r#"
            INSERT INTO service_offices (service_id, office_id)
            SELECT $1, office_id FROM UNNEST($2::uuid[]) AS t(office_id)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(service_id)
        .bind(office_ids)
        .execute(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, &["office_ids"]))?;
        Ok(())
    }

    pub async fn delete_service<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM services WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    // --- Estatísticas ---

    pub async fn count_services(&self) -> Result<i64, AppError> {
        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    pub async fn count_services_by_category(&self) -> Result<Vec<CategoryServiceCount>, AppError> {
        let rows = sqlx::query_as::<_, CategoryServiceCount>(
            r#"
            SELECT c.name AS category_name, COUNT(s.id) AS count
            FROM services s
            JOIN service_categories c ON c.id = s.category_id
            GROUP BY c.name
            ORDER BY c.name
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(rows)
    }

    /// Média bruta (None quando não há serviços).
    pub async fn average_duration(&self) -> Result<Option<f64>, AppError> {
        let avg = sqlx::query_scalar::<_, Option<f64>>("SELECT AVG(duration_days)::float8 FROM services")
            .fetch_one(&self.pool)
            .await?;
        Ok(avg)
    }
}
