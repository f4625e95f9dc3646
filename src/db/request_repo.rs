// src/db/request_repo.rs

use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{db_utils::map_constraint_error, error::AppError},
    filters::{push_where, Expr, RequestPredicate, RequestQuery},
    models::requests::{RequestDetail, RequestStatus},
};

// Aliases fixos: os predicados de filtro dependem deles (r, u, s, o)
const REQUEST_SELECT: &str = r#"
    SELECT
        r.id, r.user_id,
        u.full_name AS user_full_name,
        u.email AS user_email,
        r.service_id,
        s.name AS service_name,
        r.office_id,
        o.address AS office_address,
        r.status, r.created_at, r.updated_at
    FROM requests r
    JOIN users u ON u.id = r.user_id
    JOIN services s ON s.id = r.service_id
    LEFT JOIN mfc_offices o ON o.id = r.office_id
"#;

const REQUEST_COUNT: &str = r#"
    SELECT COUNT(*)
    FROM requests r
    JOIN users u ON u.id = r.user_id
    JOIN services s ON s.id = r.service_id
    LEFT JOIN mfc_offices o ON o.id = r.office_id
"#;

const REQUEST_REFERENCES: &[&str] = &["user_id", "service_id", "office_id"];

#[derive(Clone)]
pub struct RequestRepository {
    pool: PgPool,
}

impl RequestRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list(&self, query: &RequestQuery) -> Result<(i64, Vec<RequestDetail>), AppError> {
        let mut count_qb = QueryBuilder::<Postgres>::new(REQUEST_COUNT);
        query.push_where(&mut count_qb);
        let count = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        query.push_where(&mut qb);
        query.order.push_sql(&mut qb, "r.id");
        query.page.push_sql(&mut qb);

        tracing::debug!(sql = qb.sql(), "Listando solicitações");
        let requests = qb.build_query_as::<RequestDetail>().fetch_all(&self.pool).await?;

        Ok((count, requests.into_iter().map(RequestDetail::with_display).collect()))
    }

    /// Todas as linhas que satisfazem o filtro, mais recentes primeiro e sem paginação.
    pub async fn list_matching(&self, filter: &Expr<RequestPredicate>) -> Result<Vec<RequestDetail>, AppError> {
        let mut qb = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        push_where(&mut qb, Some(filter));
        qb.push(" ORDER BY r.created_at DESC, r.id");

        let requests = qb.build_query_as::<RequestDetail>().fetch_all(&self.pool).await?;
        Ok(requests.into_iter().map(RequestDetail::with_display).collect())
    }

    /// Busca uma solicitação restrita pelo filtro (normalmente id + escopo de quem chama).
    pub async fn find_one<'e, E>(
        &self,
        executor: E,
        filter: &Expr<RequestPredicate>,
    ) -> Result<Option<RequestDetail>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let mut qb = QueryBuilder::<Postgres>::new(REQUEST_SELECT);
        push_where(&mut qb, Some(filter));

        let request = qb.build_query_as::<RequestDetail>().fetch_optional(executor).await?;
        Ok(request.map(RequestDetail::with_display))
    }

    pub async fn insert<'e, E>(
        &self,
        executor: E,
        user_id: Uuid,
        service_id: Uuid,
        office_id: Option<Uuid>,
        status: RequestStatus,
    ) -> Result<Uuid, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO requests (user_id, service_id, office_id, status)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            "#,
        )
        .bind(user_id)
        .bind(service_id)
        .bind(office_id)
        .bind(status)
        .fetch_one(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, REQUEST_REFERENCES))
    }

    /// Atualização parcial: campos None mantêm o valor atual.
    /// `office_id` é `Some(None)` para desvincular a agência.
    pub async fn update<'e, E>(
        &self,
        executor: E,
        id: Uuid,
        service_id: Option<Uuid>,
        office_id: Option<Option<Uuid>>,
        status: Option<RequestStatus>,
    ) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query(
            r#"
            UPDATE requests
            SET service_id = COALESCE($2, service_id),
                office_id = CASE WHEN $3 THEN $4::uuid ELSE office_id END,
                status = COALESCE($5, status),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .bind(service_id)
        .bind(office_id.is_some())
        .bind(office_id.flatten())
        .bind(status)
        .execute(executor)
        .await
        .map_err(|e| map_constraint_error(e, None, REQUEST_REFERENCES))?;

        Ok(result.rows_affected() > 0)
    }

    /// Sobrescreve o status sem checar a transição.
    pub async fn set_status<'e, E>(&self, executor: E, id: Uuid, status: RequestStatus) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("UPDATE requests SET status = $2, updated_at = NOW() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn delete<'e, E>(&self, executor: E, id: Uuid) -> Result<bool, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let result = sqlx::query("DELETE FROM requests WHERE id = $1")
            .bind(id)
            .execute(executor)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
