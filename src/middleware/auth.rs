// src/middleware/auth.rs

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::headers::{authorization::Bearer, Authorization, HeaderMapExt};

use crate::{
    common::error::{ApiError, AppError},
    config::AppState,
    middleware::i18n::Locale,
    models::auth::User,
};

// Identifica quem chama, sem exigir autenticação:
// token válido -> User nos extensions; token inválido -> 401; sem token -> segue anônimo.
pub async fn identify(
    State(app_state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    if let Some(Authorization(bearer)) = request.headers().typed_get::<Authorization<Bearer>>() {
        let user = app_state
            .auth_service
            .validate_token(bearer.token())
            .await
            .map_err(|e| e.to_api_error(&Locale::from_headers(request.headers())))?;

        tracing::debug!(user_id = %user.id, "Requisição autenticada");
        request.extensions_mut().insert(user);
    }

    Ok(next.run(request).await)
}

fn caller(parts: &Parts) -> Result<User, ApiError> {
    parts
        .extensions
        .get::<User>()
        .cloned()
        .ok_or_else(|| AppError::AuthenticationRequired.to_api_error(&Locale::from_headers(&parts.headers)))
}

// Extrator para obter o usuário autenticado diretamente nos handlers
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub User);

impl<S> FromRequestParts<S> for AuthenticatedUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        caller(parts).map(AuthenticatedUser)
    }
}

// Como o anterior, mas só para staff (403 para os demais)
#[derive(Debug, Clone)]
pub struct StaffUser(pub User);

impl<S> FromRequestParts<S> for StaffUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let user = caller(parts)?;
        if !user.is_staff() {
            tracing::warn!(user_id = %user.id, "Acesso de staff negado");
            return Err(AppError::Forbidden.to_api_error(&Locale::from_headers(&parts.headers)));
        }
        Ok(StaffUser(user))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use axum::http::{header, Request as HttpRequest, StatusCode};
    use chrono::Utc;
    use uuid::Uuid;

    fn parts(user: Option<User>, lang: &str) -> Parts {
        let (mut parts, _) = HttpRequest::builder()
            .header(header::ACCEPT_LANGUAGE, lang)
            .body(())
            .unwrap()
            .into_parts();
        if let Some(user) = user {
            parts.extensions.insert(user);
        }
        parts
    }

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Сидорова Мария".into(),
            email: "maria@mfc.ru".into(),
            phone: None,
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn anonymous_caller_is_rejected_with_401() {
        let err = AuthenticatedUser::from_request_parts(&mut parts(None, "ru"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
        assert_eq!(err.error, "Требуется аутентификация");
    }

    #[tokio::test]
    async fn authenticated_caller_is_extracted() {
        let u = user(UserRole::User);
        let AuthenticatedUser(found) = AuthenticatedUser::from_request_parts(&mut parts(Some(u.clone()), "en"), &())
            .await
            .unwrap();
        assert_eq!(found.id, u.id);
    }

    #[tokio::test]
    async fn staff_extractor_distinguishes_401_and_403() {
        let err = StaffUser::from_request_parts(&mut parts(None, "en"), &()).await.unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);

        let err = StaffUser::from_request_parts(&mut parts(Some(user(UserRole::User)), "en"), &())
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::FORBIDDEN);

        assert!(StaffUser::from_request_parts(&mut parts(Some(user(UserRole::Admin)), "en"), &())
            .await
            .is_ok());
    }
}
