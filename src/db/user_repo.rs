use sqlx::{Executor, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::{
    common::{
        db_utils::{contains_pattern, map_constraint_error},
        error::AppError,
    },
    filters::PageRequest,
    models::auth::{User, UserRole},
};

const USER_COLUMNS: &str =
    "id, full_name, email, phone, role, password_hash, created_at, updated_at";

// O repositório de usuários, responsável pelas interações com a tabela 'users'
#[derive(Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // Busca um usuário pelo seu e-mail
    pub async fn find_by_email<'e, E>(&self, executor: E, email: &str) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1"))
            .bind(email)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Busca um usuário pelo seu ID
    pub async fn find_by_id<'e, E>(&self, executor: E, id: Uuid) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1"))
            .bind(id)
            .fetch_optional(executor)
            .await?;
        Ok(user)
    }

    // Cria um novo usuário no banco de dados
    pub async fn create_user<'e, E>(
        &self,
        executor: E,
        full_name: &str,
        email: &str,
        phone: Option<&str>,
        role: UserRole,
        hashed_password: &str,
    ) -> Result<User, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        sqlx::query_as::<_, User>(&format!(
            "INSERT INTO users (full_name, email, phone, role, password_hash) \
             VALUES ($1, $2, $3, $4, $5) RETURNING {USER_COLUMNS}"
        ))
        .bind(full_name)
        .bind(email)
        .bind(phone)
        .bind(role)
        .bind(hashed_password)
        .fetch_one(executor)
        .await
        // Converte erro de violação de chave única em um erro mais amigável
        .map_err(|e| map_constraint_error(e, Some(AppError::EmailAlreadyExists), &[]))
    }

    /// Listagem administrativa com busca por nome, e-mail ou telefone.
    pub async fn list(
        &self,
        search: Option<&str>,
        page: PageRequest,
    ) -> Result<(i64, Vec<User>), AppError> {
        let pattern = search.map(contains_pattern);

        let mut count_qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM users");
        push_search(&mut count_qb, pattern.as_deref());
        let count = count_qb.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut qb = QueryBuilder::<Postgres>::new(format!("SELECT {USER_COLUMNS} FROM users"));
        push_search(&mut qb, pattern.as_deref());
        qb.push(" ORDER BY created_at DESC, id");
        page.push_sql(&mut qb);
        let users = qb.build_query_as::<User>().fetch_all(&self.pool).await?;

        Ok((count, users))
    }

    pub async fn set_role<'e, E>(&self, executor: E, id: Uuid, role: UserRole) -> Result<Option<User>, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let user = sqlx::query_as::<_, User>(&format!(
            "UPDATE users SET role = $2, updated_at = NOW() WHERE id = $1 RETURNING {USER_COLUMNS}"
        ))
        .bind(id)
        .bind(role)
        .fetch_optional(executor)
        .await?;
        Ok(user)
    }
}

fn push_search(qb: &mut QueryBuilder<'_, Postgres>, pattern: Option<&str>) {
    if let Some(pattern) = pattern {
        qb.push(" WHERE (full_name ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR email ILIKE ")
            .push_bind(pattern.to_string())
            .push(" OR phone ILIKE ")
            .push_bind(pattern.to_string())
            .push(")");
    }
}
