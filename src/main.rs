//src/main.rs

use anyhow::Context;
use axum::{
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

mod common;
mod config;
mod db;
mod docs;
mod filters;
mod handlers;
mod middleware;
mod models;
mod services;

use crate::config::{AppState, Settings};
use crate::docs::ApiDoc;
use crate::middleware::auth::identify;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env()?;

    // RUST_LOG controla o filtro; sem ele, "info"
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    let app_state = AppState::new(settings)
        .await
        .context("Falha ao inicializar o estado da aplicação.")?;

    sqlx::migrate!()
        .run(&app_state.db_pool)
        .await
        .context("Falha ao rodar as migrações do banco de dados.")?;

    tracing::info!("✅ Migrações do banco de dados executadas com sucesso!");

    let bind_addr = app_state.settings.bind_addr.clone();
    let app = router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Falha ao iniciar o listener TCP em {}", bind_addr))?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);

    axum::serve(listener, app).await.context("Erro no servidor Axum")?;
    Ok(())
}

fn router(app_state: AppState) -> Router {
    // Rotas de autenticação (públicas)
    let auth_routes = Router::new()
        .route("/register", post(handlers::auth::register))
        .route("/login", post(handlers::auth::login));

    let user_routes = Router::new()
        .route("/", get(handlers::auth::list_users))
        .route("/me", get(handlers::auth::get_me))
        .route("/{id}/role", put(handlers::auth::set_role));

    // Leitura pública, escrita só para staff (checado pelo extrator StaffUser)
    let category_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_categories).post(handlers::catalog::create_category),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_category)
                .put(handlers::catalog::update_category)
                .delete(handlers::catalog::delete_category),
        );

    let office_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_offices).post(handlers::catalog::create_office),
        )
        .route(
            "/{id}",
            get(handlers::catalog::get_office)
                .put(handlers::catalog::update_office)
                .delete(handlers::catalog::delete_office),
        )
        .route("/{id}/services", get(handlers::catalog::list_office_services));

    let service_routes = Router::new()
        .route(
            "/",
            get(handlers::catalog::list_services).post(handlers::catalog::create_service),
        )
        .route("/statistics", get(handlers::catalog::get_statistics))
        .route(
            "/{id}",
            get(handlers::catalog::get_service)
                .put(handlers::catalog::update_service)
                .delete(handlers::catalog::delete_service),
        )
        .route("/{id}/duplicate", post(handlers::catalog::duplicate_service));

    // Tudo aqui exige autenticação
    let request_routes = Router::new()
        .route(
            "/",
            get(handlers::requests::list_requests).post(handlers::requests::create_request),
        )
        .route("/my_requests", get(handlers::requests::my_requests))
        .route(
            "/{id}",
            get(handlers::requests::get_request)
                .patch(handlers::requests::update_request)
                .delete(handlers::requests::delete_request),
        )
        .route("/{id}/change_status", post(handlers::requests::change_status))
        .route(
            "/{id}/documents",
            get(handlers::documents::list_documents)
                .post(handlers::documents::upload_document)
                .layer(DefaultBodyLimit::max(app_state.settings.max_upload_bytes)),
        );

    let document_routes = Router::new().route(
        "/{id}",
        get(handlers::documents::download_document).delete(handlers::documents::delete_document),
    );

    let appointment_routes = Router::new()
        .route(
            "/",
            get(handlers::appointments::list_appointments).post(handlers::appointments::create_appointment),
        )
        .route("/{id}", axum::routing::delete(handlers::appointments::delete_appointment));

    Router::new()
        .route("/api/health", get(|| async { "OK" }))
        .nest("/api/auth", auth_routes)
        .nest("/api/users", user_routes)
        .nest("/api/categories", category_routes)
        .nest("/api/offices", office_routes)
        .nest("/api/services", service_routes)
        .nest("/api/requests", request_routes)
        .nest("/api/documents", document_routes)
        .nest("/api/appointments", appointment_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Identifica o usuário (se houver token) antes de qualquer handler
        .layer(axum_middleware::from_fn_with_state(app_state.clone(), identify))
        .layer(TraceLayer::new_for_http())
        .with_state(app_state)
}
