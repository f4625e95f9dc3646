// src/config.rs

use std::{env, path::PathBuf, time::Duration};

use anyhow::Context;
use sqlx::{postgres::PgPoolOptions, PgPool};

use crate::{
    db::{AppointmentRepository, CatalogRepository, DocumentRepository, RequestRepository, UserRepository},
    services::{
        appointment_service::AppointmentService, auth::AuthService, catalog_service::CatalogService,
        document_service::DocumentService, request_service::RequestService,
    },
};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MEDIA_ROOT: &str = "media";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

// Configuração lida das variáveis de ambiente (e do .env, se existir)
#[derive(Debug, Clone)]
pub struct Settings {
    pub database_url: String,
    pub jwt_secret: String,
    pub bind_addr: String,
    pub db_max_connections: u32,
    pub media_root: PathBuf,
    pub max_upload_bytes: usize,
    pub admin_emails: Vec<String>,
}

impl Settings {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("{} deve ser definida", key))
        };

        let db_max_connections = match lookup("DB_MAX_CONNECTIONS") {
            Some(v) => v.trim().parse().context("DB_MAX_CONNECTIONS deve ser um número")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };
        let max_upload_bytes = match lookup("MAX_UPLOAD_BYTES") {
            Some(v) => v.trim().parse().context("MAX_UPLOAD_BYTES deve ser um número")?,
            None => DEFAULT_MAX_UPLOAD_BYTES,
        };
        let admin_emails = lookup("ADMIN_EMAILS")
            .map(|v| {
                v.split(',')
                    .map(|e| e.trim().to_lowercase())
                    .filter(|e| !e.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            db_max_connections,
            media_root: PathBuf::from(lookup("MEDIA_ROOT").unwrap_or_else(|| DEFAULT_MEDIA_ROOT.to_string())),
            max_upload_bytes,
            admin_emails,
        })
    }
}

// O estado compartilhado que será acessível em toda a aplicação
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub settings: Settings,
    pub auth_service: AuthService,
    pub catalog_service: CatalogService,
    pub request_service: RequestService,
    pub document_service: DocumentService,
    pub appointment_service: AppointmentService,
}

impl AppState {
    pub async fn new(settings: Settings) -> anyhow::Result<Self> {
        let db_pool = PgPoolOptions::new()
            .max_connections(settings.db_max_connections)
            .acquire_timeout(Duration::from_secs(3))
            .connect(&settings.database_url)
            .await
            .context("Falha ao conectar ao banco de dados")?;

        tracing::info!("✅ Conexão com o banco de dados estabelecida com sucesso!");

        Ok(Self::with_pool(db_pool, settings))
    }

    // --- Monta o gráfico de dependências ---
    pub fn with_pool(db_pool: PgPool, settings: Settings) -> Self {
        let auth_service = AuthService::new(
            UserRepository::new(db_pool.clone()),
            settings.jwt_secret.clone(),
            settings.admin_emails.clone(),
            db_pool.clone(),
        );
        let catalog_service = CatalogService::new(CatalogRepository::new(db_pool.clone()), db_pool.clone());
        let request_service = RequestService::new(RequestRepository::new(db_pool.clone()), db_pool.clone());
        let document_service = DocumentService::new(
            DocumentRepository::new(db_pool.clone()),
            request_service.clone(),
            settings.media_root.clone(),
            db_pool.clone(),
        );
        let appointment_service =
            AppointmentService::new(AppointmentRepository::new(db_pool.clone()), db_pool.clone());

        Self {
            db_pool,
            settings,
            auth_service,
            catalog_service,
            request_service,
            document_service,
            appointment_service,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> anyhow::Result<Settings> {
        let vars: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn applies_defaults() {
        let s = load(&[("DATABASE_URL", "postgres://db/mfc"), ("JWT_SECRET", "s")]).unwrap();
        assert_eq!(s.bind_addr, "0.0.0.0:3000");
        assert_eq!(s.db_max_connections, 5);
        assert_eq!(s.media_root, PathBuf::from("media"));
        assert_eq!(s.max_upload_bytes, 10 * 1024 * 1024);
        assert!(s.admin_emails.is_empty());
    }

    #[test]
    fn missing_required_values_fail() {
        let err = load(&[("JWT_SECRET", "s")]).unwrap_err();
        assert!(err.to_string().contains("DATABASE_URL"));
        assert!(load(&[("DATABASE_URL", "postgres://db/mfc"), ("JWT_SECRET", "  ")]).is_err());
    }

    #[test]
    fn parses_admin_emails_and_numbers() {
        let s = load(&[
            ("DATABASE_URL", "postgres://db/mfc"),
            ("JWT_SECRET", "s"),
            ("ADMIN_EMAILS", " Chief@MFC.ru, ,ops@mfc.ru"),
            ("DB_MAX_CONNECTIONS", "12"),
        ])
        .unwrap();
        assert_eq!(s.admin_emails, vec!["chief@mfc.ru", "ops@mfc.ru"]);
        assert_eq!(s.db_max_connections, 12);

        assert!(load(&[("DATABASE_URL", "x"), ("JWT_SECRET", "s"), ("MAX_UPLOAD_BYTES", "muito")]).is_err());
    }
}
