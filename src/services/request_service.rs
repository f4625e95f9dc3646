// src/services/request_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::RequestRepository,
    filters::{
        request_filter::{owned_by, visible_by_id},
        Paginated, Params, RequestQuery,
    },
    models::{
        auth::User,
        requests::{CreateRequestPayload, RequestDetail, RequestStatus, UpdateRequestPayload},
    },
};

#[derive(Clone)]
pub struct RequestService {
    repo: RequestRepository,
    pool: PgPool,
}

impl RequestService {
    pub fn new(repo: RequestRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, params: &Params, caller: &User) -> Result<Paginated<RequestDetail>, AppError> {
        let query = RequestQuery::from_params(params, caller)?;
        let (count, requests) = self.repo.list(&query).await?;
        Ok(Paginated::new(query.page, count, requests))
    }

    /// Solicitações do próprio usuário (pelo e-mail), mesmo para staff.
    pub async fn my_requests(&self, caller: &User) -> Result<Vec<RequestDetail>, AppError> {
        self.repo.list_matching(&owned_by(caller)).await
    }

    /// Linha invisível para quem chama é tratada como inexistente.
    pub async fn get(&self, id: Uuid, caller: &User) -> Result<RequestDetail, AppError> {
        self.repo
            .find_one(&self.pool, &visible_by_id(id, caller))
            .await?
            .ok_or(AppError::NotFound("request_not_found"))
    }

    pub async fn create(&self, payload: &CreateRequestPayload, caller: &User) -> Result<RequestDetail, AppError> {
        let user_id = match payload.user_id {
            Some(user_id) if user_id != caller.id && !caller.is_staff() => return Err(AppError::Forbidden),
            Some(user_id) => user_id,
            None => caller.id,
        };
        let status = match payload.status.as_deref() {
            Some(value) => RequestStatus::parse_required(Some(value))?,
            None => RequestStatus::New,
        };

        let mut tx = self.pool.begin().await?;
        let id = self
            .repo
            .insert(&mut *tx, user_id, payload.service_id, payload.office_id, status)
            .await?;
        let request = self
            .repo
            .find_one(&mut *tx, &visible_by_id(id, caller))
            .await?
            .ok_or(AppError::NotFound("request_not_found"))?;
        tx.commit().await?;

        tracing::info!(request_id = %request.id, user_id = %request.user_id, "Solicitação criada");
        Ok(request)
    }

    /// PATCH: só os campos presentes são alterados.
    pub async fn update(
        &self,
        id: Uuid,
        payload: &UpdateRequestPayload,
        caller: &User,
    ) -> Result<RequestDetail, AppError> {
        self.get(id, caller).await?;

        let status = payload
            .status
            .as_deref()
            .map(|value| RequestStatus::parse_required(Some(value)))
            .transpose()?;

        self.repo
            .update(&self.pool, id, payload.service_id, payload.office_id, status)
            .await?;
        self.get(id, caller).await
    }

    pub async fn delete(&self, id: Uuid, caller: &User) -> Result<(), AppError> {
        self.get(id, caller).await?;
        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("request_not_found"));
        }
        tracing::info!(request_id = %id, "Solicitação removida");
        Ok(())
    }

    /// Troca de status sem máquina de estados: qualquer status válido sobrescreve o atual.
    /// A visibilidade é checada antes do valor, então um id alheio dá 404 mesmo com status inválido.
    pub async fn change_status(
        &self,
        id: Uuid,
        new_status: Option<&str>,
        caller: &User,
    ) -> Result<RequestDetail, AppError> {
        let current = self.get(id, caller).await?;
        let status = RequestStatus::parse_required(new_status)?;

        if !self.repo.set_status(&self.pool, id, status).await? {
            return Err(AppError::NotFound("request_not_found"));
        }

        tracing::info!(
            request_id = %id,
            from = %current.status,
            to = %status,
            changed_by = %caller.id,
            "Status da solicitação alterado"
        );
        self.get(id, caller).await
    }
}
