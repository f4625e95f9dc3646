// src/docs.rs

use utoipa::OpenApi;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use crate::handlers;
use crate::models;
use crate::filters::Paginated;

#[derive(OpenApi)]
#[openapi(
    paths(
        // --- Auth ---
        handlers::auth::register,
        handlers::auth::login,

        // --- Users ---
        handlers::auth::get_me,
        handlers::auth::list_users,
        handlers::auth::set_role,

        // --- Categories ---
        handlers::catalog::list_categories,
        handlers::catalog::get_category,
        handlers::catalog::create_category,
        handlers::catalog::update_category,
        handlers::catalog::delete_category,

        // --- Offices ---
        handlers::catalog::list_offices,
        handlers::catalog::get_office,
        handlers::catalog::list_office_services,
        handlers::catalog::create_office,
        handlers::catalog::update_office,
        handlers::catalog::delete_office,

        // --- Services ---
        handlers::catalog::list_services,
        handlers::catalog::get_statistics,
        handlers::catalog::get_service,
        handlers::catalog::create_service,
        handlers::catalog::update_service,
        handlers::catalog::delete_service,
        handlers::catalog::duplicate_service,

        // --- Requests ---
        handlers::requests::list_requests,
        handlers::requests::my_requests,
        handlers::requests::get_request,
        handlers::requests::create_request,
        handlers::requests::update_request,
        handlers::requests::delete_request,
        handlers::requests::change_status,

        // --- Documents ---
        handlers::documents::list_documents,
        handlers::documents::upload_document,
        handlers::documents::download_document,
        handlers::documents::delete_document,

        // --- Appointments ---
        handlers::appointments::list_appointments,
        handlers::appointments::create_appointment,
        handlers::appointments::delete_appointment,
    ),
    components(
        schemas(
            // --- Auth ---
            models::auth::UserRole,
            models::auth::User,
            models::auth::RegisterUserPayload,
            models::auth::LoginUserPayload,
            models::auth::SetRolePayload,
            models::auth::AuthResponse,

            // --- Catalog ---
            models::catalog::ServiceCategory,
            models::catalog::ServiceCategoryWithCount,
            models::catalog::CategoryPayload,
            models::catalog::Service,
            models::catalog::ServicePayload,
            models::catalog::CategoryServiceCount,
            models::catalog::ServiceStatistics,
            models::catalog::MfcOffice,
            models::catalog::OfficePayload,

            // --- Requests ---
            models::requests::RequestStatus,
            models::requests::RequestDetail,
            models::requests::CreateRequestPayload,
            models::requests::UpdateRequestPayload,
            models::requests::ChangeStatusPayload,
            models::requests::FileType,
            models::requests::Document,
            handlers::documents::DocumentUploadForm,

            // --- Appointments ---
            models::appointments::AppointmentStatus,
            models::appointments::Appointment,
            models::appointments::CreateAppointmentPayload,

            // --- Listagens ---
            Paginated<models::catalog::Service>,
            Paginated<models::requests::RequestDetail>,
            Paginated<models::appointments::Appointment>,
            Paginated<models::auth::User>,
        )
    ),
    tags(
        (name = "Auth", description = "Autenticação e Registro"),
        (name = "Users", description = "Dados do Usuário e Papéis"),
        (name = "Categories", description = "Categorias de Serviços"),
        (name = "Offices", description = "Agências do MFC"),
        (name = "Services", description = "Catálogo de Serviços, Estatísticas e Cópia"),
        (name = "Requests", description = "Solicitações e Ciclo de Status"),
        (name = "Documents", description = "Documentos anexados às Solicitações"),
        (name = "Appointments", description = "Agendamentos de Atendimento")
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "api_jwt",
            SecurityScheme::Http(
                Http::new(HttpAuthScheme::Bearer)
            ),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn documents_every_route_group() {
        let doc = ApiDoc::openapi();
        for path in [
            "/api/services/{id}/duplicate",
            "/api/services/statistics",
            "/api/requests/{id}/change_status",
            "/api/requests/my_requests",
            "/api/documents/{id}",
            "/api/appointments",
        ] {
            assert!(doc.paths.paths.contains_key(path), "faltando {}", path);
        }
    }
}
