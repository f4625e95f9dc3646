// src/handlers/catalog.rs

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
    filters::{Paginated, Params, ServiceQuery},
    middleware::{auth::StaffUser, i18n::Locale},
    models::catalog::{
        CategoryPayload, MfcOffice, OfficePayload, Service, ServiceCategory, ServiceCategoryWithCount,
        ServicePayload, ServiceStatistics,
    },
};

// =============================================================================
//  ÁREA 1: CATEGORIAS
// =============================================================================

// GET /api/categories
#[utoipa::path(
    get,
    path = "/api/categories",
    tag = "Categories",
    responses((status = 200, description = "Categorias com total de serviços", body = Vec<ServiceCategoryWithCount>))
)]
pub async fn list_categories(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<ServiceCategoryWithCount>>, ApiError> {
    let categories = app_state
        .catalog_service
        .list_categories()
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(categories))
}

// GET /api/categories/{id}
#[utoipa::path(
    get,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 200, description = "Categoria", body = ServiceCategory),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_category(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<ServiceCategory>, ApiError> {
    let category = app_state
        .catalog_service
        .get_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(category))
}

// POST /api/categories
#[utoipa::path(
    post,
    path = "/api/categories",
    tag = "Categories",
    request_body = CategoryPayload,
    responses(
        (status = 201, description = "Categoria criada", body = ServiceCategory),
        (status = 400, description = "Dados inválidos"),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_category(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Json(payload): Json<CategoryPayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .create_category(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(category)))
}

// PUT /api/categories/{id}
#[utoipa::path(
    put,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    request_body = CategoryPayload,
    responses(
        (status = 200, description = "Categoria atualizada", body = ServiceCategory),
        (status = 404, description = "Não encontrada"),
        (status = 409, description = "Nome já existe")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_category(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<CategoryPayload>,
) -> Result<Json<ServiceCategory>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let category = app_state
        .catalog_service
        .update_category(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(category))
}

// DELETE /api/categories/{id}
#[utoipa::path(
    delete,
    path = "/api/categories/{id}",
    tag = "Categories",
    params(("id" = Uuid, Path, description = "ID da categoria")),
    responses(
        (status = 204, description = "Removida (junto com os serviços)"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_category(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_category(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 2: AGÊNCIAS
// =============================================================================

// GET /api/offices
#[utoipa::path(
    get,
    path = "/api/offices",
    tag = "Offices",
    responses((status = 200, description = "Agências por distrito e endereço", body = Vec<MfcOffice>))
)]
pub async fn list_offices(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<Vec<MfcOffice>>, ApiError> {
    let offices = app_state
        .catalog_service
        .list_offices()
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(offices))
}

// GET /api/offices/{id}
#[utoipa::path(
    get,
    path = "/api/offices/{id}",
    tag = "Offices",
    params(("id" = Uuid, Path, description = "ID da agência")),
    responses(
        (status = 200, description = "Agência", body = MfcOffice),
        (status = 404, description = "Não encontrada")
    )
)]
pub async fn get_office(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<MfcOffice>, ApiError> {
    let office = app_state
        .catalog_service
        .get_office(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(office))
}

// GET /api/offices/{id}/services
#[utoipa::path(
    get,
    path = "/api/offices/{id}/services",
    tag = "Offices",
    params(("id" = Uuid, Path, description = "ID da agência")),
    responses(
        (status = 200, description = "Serviços prestados na agência", body = Vec<Service>),
        (status = 404, description = "Agência não encontrada")
    )
)]
pub async fn list_office_services(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<Service>>, ApiError> {
    let services = app_state
        .catalog_service
        .list_office_services(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(services))
}

// POST /api/offices
#[utoipa::path(
    post,
    path = "/api/offices",
    tag = "Offices",
    request_body = OfficePayload,
    responses(
        (status = 201, description = "Agência criada", body = MfcOffice),
        (status = 400, description = "Dados inválidos")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_office(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Json(payload): Json<OfficePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let office = app_state
        .catalog_service
        .create_office(&payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(office)))
}

// PUT /api/offices/{id}
#[utoipa::path(
    put,
    path = "/api/offices/{id}",
    tag = "Offices",
    params(("id" = Uuid, Path, description = "ID da agência")),
    request_body = OfficePayload,
    responses(
        (status = 200, description = "Agência atualizada", body = MfcOffice),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_office(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<OfficePayload>,
) -> Result<Json<MfcOffice>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let office = app_state
        .catalog_service
        .update_office(id, &payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(office))
}

// DELETE /api/offices/{id}
#[utoipa::path(
    delete,
    path = "/api/offices/{id}",
    tag = "Offices",
    params(("id" = Uuid, Path, description = "ID da agência")),
    responses(
        (status = 204, description = "Removida"),
        (status = 404, description = "Não encontrada")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_office(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_office(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
//  ÁREA 3: SERVIÇOS
// =============================================================================

// GET /api/services
#[utoipa::path(
    get,
    path = "/api/services",
    tag = "Services",
    params(
        ("search" = Option<String>, Query, description = "Nome, descrição ou categoria"),
        ("name" = Option<String>, Query, description = "Parte do nome"),
        ("category" = Option<Uuid>, Query, description = "ID da categoria"),
        ("category_name" = Option<String>, Query, description = "Parte do nome da categoria"),
        ("duration_min" = Option<i32>, Query, description = "Prazo mínimo (dias)"),
        ("duration_max" = Option<i32>, Query, description = "Prazo máximo (dias)"),
        ("short_duration" = Option<bool>, Query, description = "Prazo de até 7 dias"),
        ("popular" = Option<bool>, Query, description = "Com ao menos uma solicitação"),
        ("complex_filter" = Option<bool>, Query, description = "Longos e (com solicitação ou descrição)"),
        ("complex_filter2" = Option<bool>, Query, description = "Longos sem descrição"),
        ("ordering" = Option<String>, Query, description = "name, duration_days, category_name; '-' inverte"),
        ("page" = Option<u32>, Query, description = "Página (1..)"),
        ("page_size" = Option<u32>, Query, description = "Itens por página (1..=100)")
    ),
    responses((status = 200, description = "Serviços filtrados", body = Paginated<Service>))
)]
pub async fn list_services(
    State(app_state): State<AppState>,
    locale: Locale,
    Query(params): Query<Params>,
) -> Result<Json<Paginated<Service>>, ApiError> {
    let query = ServiceQuery::from_params(&params);
    let services = app_state
        .catalog_service
        .list_services(&query)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(services))
}

// GET /api/services/statistics
#[utoipa::path(
    get,
    path = "/api/services/statistics",
    tag = "Services",
    responses((status = 200, description = "Totais por categoria e prazo médio", body = ServiceStatistics))
)]
pub async fn get_statistics(
    State(app_state): State<AppState>,
    locale: Locale,
) -> Result<Json<ServiceStatistics>, ApiError> {
    let statistics = app_state
        .catalog_service
        .statistics()
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(statistics))
}

// GET /api/services/{id}
#[utoipa::path(
    get,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 200, description = "Serviço", body = Service),
        (status = 404, description = "Não encontrado")
    )
)]
pub async fn get_service(
    State(app_state): State<AppState>,
    locale: Locale,
    Path(id): Path<Uuid>,
) -> Result<Json<Service>, ApiError> {
    let service = app_state
        .catalog_service
        .get_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(Json(service))
}

// POST /api/services
#[utoipa::path(
    post,
    path = "/api/services",
    tag = "Services",
    request_body = ServicePayload,
    responses(
        (status = 201, description = "Serviço criado", body = Service),
        (status = 400, description = "Dados inválidos ou categoria inexistente")
    ),
    security(("api_jwt" = []))
)]
pub async fn create_service(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Json(payload): Json<ServicePayload>,
) -> Result<impl IntoResponse, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .create_service(payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(service)))
}

// PUT /api/services/{id}
#[utoipa::path(
    put,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    request_body = ServicePayload,
    responses(
        (status = 200, description = "Serviço atualizado", body = Service),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn update_service(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
    Json(payload): Json<ServicePayload>,
) -> Result<Json<Service>, ApiError> {
    payload
        .validate()
        .map_err(|e| AppError::ValidationError(e).to_api_error(&locale))?;

    let service = app_state
        .catalog_service
        .update_service(id, payload)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok(Json(service))
}

// DELETE /api/services/{id}
#[utoipa::path(
    delete,
    path = "/api/services/{id}",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço")),
    responses(
        (status = 204, description = "Removido"),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn delete_service(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
    app_state
        .catalog_service
        .delete_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;
    Ok(StatusCode::NO_CONTENT)
}

// POST /api/services/{id}/duplicate
#[utoipa::path(
    post,
    path = "/api/services/{id}/duplicate",
    tag = "Services",
    params(("id" = Uuid, Path, description = "ID do serviço original")),
    responses(
        (status = 201, description = "Cópia criada com o sufixo \" (копия)\"", body = Service),
        (status = 404, description = "Não encontrado")
    ),
    security(("api_jwt" = []))
)]
pub async fn duplicate_service(
    State(app_state): State<AppState>,
    locale: Locale,
    StaffUser(_staff): StaffUser,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    let copy = app_state
        .catalog_service
        .duplicate_service(id)
        .await
        .map_err(|e| e.to_api_error(&locale))?;

    Ok((StatusCode::CREATED, Json(copy)))
}
