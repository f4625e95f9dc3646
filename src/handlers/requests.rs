// src/handlers/requests.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::{
    common::error::ApiError,
    config::AppState,
    filters::{Paginated, Params},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::requests::{ChangeStatusPayload, CreateRequestPayload, RequestDetail, UpdateRequestPayload},
};

// GET /api/requests
#[utoipa::path(
    get,
    path = "/api/requests",
    tag = "Requests",
    params(
        ("status" = Option<String>, Query, description = "new, in_progress, completed, rejected"),
        ("user" = Option<Uuid>, Query, description = "ID do usuário"),
        ("service" = Option<Uuid>, Query, description = "ID do serviço"),
        ("service_name" = Option<String>, Query, description = "Parte do nome do serviço"),
        ("office" = Option<Uuid>, Query, description = "ID da agência"),
        ("office_address" = Option<String>, Query, description = "Parte do endereço da agência"),
        ("date_from" = Option<String>, Query, description = "Criadas a partir de (data ou data/hora)"),
        ("date_to" = Option<String>, Query, description = "Criadas até (data inteira ou data/hora)"),
        ("active_status" = Option<bool>, Query, description = "Apenas new e in_progress"),
        ("search" = Option<String>, Query, description = "Serviço, nome do usuário ou status"),
        ("complex_filter" = Option<bool>, Query, description = "Ativas de outros usuários"),
        ("ordering" = Option<String>, Query, description = "created_at, updated_at, status; '-' inverte"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Solicitações visíveis para quem chama", body = Paginated<RequestDetail>),
        (status = 400, description = "Status desconhecido"),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<Params>,
) -> Result<Json<Paginated<RequestDetail>>, ApiError> {
    let requests = app_state
        .request_service
        .list(&params, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(requests))
}

// GET /api/requests/my_requests
#[utoipa::path(
    get,
    path = "/api/requests/my_requests",
    tag = "Requests",
    responses(
        (status = 200, description = "Solicitações do próprio usuário", body = Vec<RequestDetail>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn my_requests(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
) -> Result<Json<Vec<RequestDetail>>, ApiError> {
    let requests = app_state
        .request_service
        .my_requests(&caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(requests))
}

// GET /api/requests/{id}
#[utoipa::path(
    get,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 200, description = "Solicitação", body = RequestDetail),
        (status = 404, description = "Não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn get_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<Json<RequestDetail>, ApiError> {
    let request = app_state
        .request_service
        .get(id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(request))
}

// POST /api/requests
#[utoipa::path(
    post,
    path = "/api/requests",
    tag = "Requests",
    request_body = CreateRequestPayload,
    responses(
        (status = 201, description = "Solicitação criada", body = RequestDetail),
        (status = 400, description = "Status ou referência inválida"),
        (status = 403, description = "Solicitação em nome de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(payload): Json<CreateRequestPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let request = app_state
        .request_service
        .create(&payload, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok((StatusCode::CREATED, Json(request)))
}

// PATCH /api/requests/{id}
#[utoipa::path(
    patch,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = UpdateRequestPayload,
    responses(
        (status = 200, description = "Solicitação atualizada", body = RequestDetail),
        (status = 400, description = "Status ou referência inválida"),
        (status = 404, description = "Não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateRequestPayload>,
) -> Result<Json<RequestDetail>, ApiError> {
    let request = app_state
        .request_service
        .update(id, &payload, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(request))
}

// DELETE /api/requests/{id}
#[utoipa::path(
    delete,
    path = "/api/requests/{id}",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_request(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .request_service
        .delete(id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/requests/{id}/change_status
#[utoipa::path(
    post,
    path = "/api/requests/{id}/change_status",
    tag = "Requests",
    params(("id" = Uuid, Path, description = "ID da solicitação")),
    request_body = ChangeStatusPayload,
    responses(
        (status = 200, description = "Status alterado", body = RequestDetail),
        (status = 400, description = "Status ausente ou fora da lista"),
        (status = 404, description = "Não encontrada ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn change_status(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ChangeStatusPayload>,
) -> Result<Json<RequestDetail>, ApiError> {
    let request = app_state
        .request_service
        .change_status(id, payload.status.as_deref(), &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(request))
}
