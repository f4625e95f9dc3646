// src/services/auth.rs

use bcrypt::{hash, verify};
use chrono::Utc;
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::UserRepository,
    filters::{PageRequest, Paginated},
    models::auth::{Claims, RegisterUserPayload, User, UserRole},
};

const TOKEN_TTL_DAYS: i64 = 7;

#[derive(Clone)]
pub struct AuthService {
    user_repo: UserRepository,
    jwt_secret: String,
    // E-mails (em minúsculas) que já se registram como administradores
    admin_emails: Vec<String>,
    pool: PgPool,
}

impl AuthService {
    pub fn new(user_repo: UserRepository, jwt_secret: String, admin_emails: Vec<String>, pool: PgPool) -> Self {
        Self { user_repo, jwt_secret, admin_emails, pool }
    }

    pub async fn register_user(&self, payload: &RegisterUserPayload) -> Result<String, AppError> {
        // Hashing fora do runtime async
        let password_clone = payload.password.clone();
        let hashed_password = tokio::task::spawn_blocking(move || hash(&password_clone, bcrypt::DEFAULT_COST))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de hashing: {}", e))??;

        let email = payload.email.trim().to_lowercase();
        let role = self.role_for(&email);
        let phone = payload.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());

        let new_user = self
            .user_repo
            .create_user(&self.pool, payload.full_name.trim(), &email, phone, role, &hashed_password)
            .await?;

        tracing::info!(user_id = %new_user.id, role = ?new_user.role, "Usuário registrado");
        self.create_token(new_user.id)
    }

    pub async fn login_user(&self, email: &str, password: &str) -> Result<String, AppError> {
        let user = self
            .user_repo
            .find_by_email(&self.pool, &email.trim().to_lowercase())
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        let password_clone = password.to_owned();
        let password_hash_clone = user.password_hash.clone();

        // Executa a verificação em um thread separado
        let is_password_valid = tokio::task::spawn_blocking(move || verify(&password_clone, &password_hash_clone))
            .await
            .map_err(|e| anyhow::anyhow!("Falha na task de verificação de senha: {}", e))??;

        if !is_password_valid {
            return Err(AppError::InvalidCredentials);
        }

        self.create_token(user.id)
    }

    /// Token válido cujo usuário não existe mais também é token inválido.
    pub async fn validate_token(&self, token: &str) -> Result<User, AppError> {
        let user_id = self.decode_token(token)?;
        self.user_repo
            .find_by_id(&self.pool, user_id)
            .await?
            .ok_or(AppError::InvalidToken)
    }

    pub async fn list_users(&self, search: Option<&str>, page: PageRequest) -> Result<Paginated<User>, AppError> {
        let (count, users) = self.user_repo.list(search, page).await?;
        Ok(Paginated::new(page, count, users))
    }

    pub async fn set_role(&self, user_id: Uuid, role: UserRole) -> Result<User, AppError> {
        let user = self
            .user_repo
            .set_role(&self.pool, user_id, role)
            .await?
            .ok_or(AppError::NotFound("user_not_found"))?;

        tracing::info!(user_id = %user.id, role = ?user.role, "Papel do usuário alterado");
        Ok(user)
    }

    fn role_for(&self, email: &str) -> UserRole {
        if self.admin_emails.iter().any(|admin| admin == email) {
            UserRole::Admin
        } else {
            UserRole::User
        }
    }

    fn decode_token(&self, token: &str) -> Result<Uuid, AppError> {
        let token_data = decode::<Claims>(
            token,
            &DecodingKey::from_secret(self.jwt_secret.as_ref()),
            &Validation::default(),
        )
        .map_err(|_| AppError::InvalidToken)?;

        Ok(token_data.claims.sub)
    }

    fn create_token(&self, user_id: Uuid) -> Result<String, AppError> {
        let now = Utc::now();
        let expires_at = now + chrono::Duration::days(TOKEN_TTL_DAYS);

        let claims = Claims {
            sub: user_id,
            exp: expires_at.timestamp() as usize,
            iat: now.timestamp() as usize,
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.jwt_secret.as_ref()),
        )?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    // Pool preguiçoso: nenhum teste aqui chega a abrir conexão
    fn service(admins: &[&str]) -> AuthService {
        let pool = PgPoolOptions::new()
            .connect_lazy("postgres://localhost/mfc_test")
            .unwrap();
        AuthService::new(
            UserRepository::new(pool.clone()),
            "segredo-de-teste".into(),
            admins.iter().map(|e| e.to_string()).collect(),
            pool,
        )
    }

    #[tokio::test]
    async fn token_round_trip_keeps_subject() {
        let service = service(&[]);
        let id = Uuid::new_v4();
        let token = service.create_token(id).unwrap();
        assert_eq!(service.decode_token(&token).unwrap(), id);
    }

    #[tokio::test]
    async fn token_signed_with_other_secret_is_rejected() {
        let token = service(&[]).create_token(Uuid::new_v4()).unwrap();

        let mut other = service(&[]);
        other.jwt_secret = "outro-segredo".into();
        assert!(matches!(other.decode_token(&token), Err(AppError::InvalidToken)));
        assert!(matches!(other.decode_token("lixo"), Err(AppError::InvalidToken)));
    }

    #[tokio::test]
    async fn configured_emails_register_as_admin() {
        let service = service(&["chief@mfc.ru"]);
        assert_eq!(service.role_for("chief@mfc.ru"), UserRole::Admin);
        assert_eq!(service.role_for("citizen@mail.ru"), UserRole::User);
    }
}
