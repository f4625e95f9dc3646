// src/handlers/auth.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;
use validator::Validate;

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    filters::{params::text, PageRequest, Paginated, Params},
    middleware::{
        auth::{AuthenticatedUser, StaffUser},
        i18n::Locale,
    },
    models::auth::{AuthResponse, LoginUserPayload, RegisterUserPayload, SetRolePayload, User},
};

// POST /api/auth/register
#[utoipa::path(
    post,
    path = "/api/auth/register",
    tag = "Auth",
    request_body = RegisterUserPayload,
    responses(
        (status = 201, description = "Usuário registrado", body = AuthResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "E-mail já cadastrado")
    )
)]
pub async fn register(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<RegisterUserPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .register_user(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(AuthResponse { token })))
}

// POST /api/auth/login
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = "Auth",
    request_body = LoginUserPayload,
    responses(
        (status = 200, description = "Login realizado", body = AuthResponse),
        (status = 401, description = "Credenciais inválidas")
    )
)]
pub async fn login(
    State(app_state): State<AppState>,
    locale: Locale,
    Json(payload): Json<LoginUserPayload>,
) -> Result<Json<AuthResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let token = app_state
        .auth_service
        .login_user(&payload.email, &payload.password)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(AuthResponse { token }))
}

// GET /api/users/me
#[utoipa::path(
    get,
    path = "/api/users/me",
    tag = "Users",
    responses(
        (status = 200, description = "Usuário autenticado", body = User),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_me(AuthenticatedUser(user): AuthenticatedUser) -> Json<User> {
    Json(user)
}

// GET /api/users
#[utoipa::path(
    get,
    path = "/api/users",
    tag = "Users",
    params(
        ("search" = Option<String>, Query, description = "Nome, e-mail ou telefone"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Usuários", body = Paginated<User>),
        (status = 403, description = "Apenas staff")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_users(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Query(params): Query<Params>,
) -> Result<Json<Paginated<User>>, ApiError> {
    let users = app_state
        .auth_service
        .list_users(text(&params, "search"), PageRequest::from_params(&params))
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(users))
}

// PUT /api/users/{id}/role
#[utoipa::path(
    put,
    path = "/api/users/{id}/role",
    tag = "Users",
    params(("id" = Uuid, Path, description = "ID do usuário")),
    request_body = SetRolePayload,
    responses(
        (status = 200, description = "Papel alterado", body = User),
        (status = 403, description = "Apenas staff"),
        (status = 404, description = "Usuário não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn set_role(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetRolePayload>,
) -> Result<Json<User>, ApiError> {
    let user = app_state
        .auth_service
        .set_role(id, payload.role)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(user))
}
