// src/handlers/appointments.rs

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
    filters::{PageRequest, Paginated, Params},
    middleware::{auth::AuthenticatedUser, i18n::Locale},
    models::appointments::{Appointment, CreateAppointmentPayload},
};

// GET /api/appointments
#[utoipa::path(
    get,
    path = "/api/appointments",
    tag = "Appointments",
    params(
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (1..=100)")
    ),
    responses(
        (status = 200, description = "Agendamentos visíveis para quem chama", body = Paginated<Appointment>),
        (status = 401, description = "Não autenticado")
    ),
    security(("api_jwt" = []))
)]
pub async fn list_appointments(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Query(params): Query<Params>,
) -> Result<Json<Paginated<Appointment>>, ApiError> {
    let appointments = app_state
        .appointment_service
        .list(&caller, PageRequest::from_params(&params))
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(appointments))
}

// POST /api/appointments
#[utoipa::path(
    post,
    path = "/api/appointments",
    tag = "Appointments",
    request_body = CreateAppointmentPayload,
    responses(
        (status = 201, description = "Agendamento criado", body = Appointment),
        (status = 400, description = "Referência inválida"),
        (status = 403, description = "Agendamento em nome de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(payload): Json<CreateAppointmentPayload>,
) -> Result<impl IntoResponse, ApiError> {
    let appointment = app_state
        .appointment_service
        .create(&payload, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok((StatusCode::CREATED, Json(appointment)))
}

// DELETE /api/appointments/{id}
#[utoipa::path(
    delete,
    path = "/api/appointments/{id}",
    tag = "Appointments",
    params(("id" = Uuid, Path, description = "ID do agendamento")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado ou de outro usuário")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_appointment(
    State(app_state): State<AppState>,
    locale: Locale,
    AuthenticatedUser(caller): AuthenticatedUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .appointment_service
        .delete(id, &caller)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}
