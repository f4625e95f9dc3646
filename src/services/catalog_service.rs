// src/services/catalog_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::CatalogRepository,
    filters::{Paginated, ServiceQuery},
    models::catalog::{
        round_average, CategoryPayload, MfcOffice, OfficePayload, Service, ServiceCategory,
        ServiceCategoryWithCount, ServicePayload, ServiceStatistics,
    },
};

// Categorias, agências e serviços: o catálogo público do MFC
#[derive(Clone)]
pub struct CatalogService {
    repo: CatalogRepository,
    pool: PgPool,
}

impl CatalogService {
    pub fn new(repo: CatalogRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    // =========================================================================
    //  CATEGORIAS
    // =========================================================================

    pub async fn list_categories(&self) -> Result<Vec<ServiceCategoryWithCount>, AppError> {
        self.repo.list_categories().await
    }

    pub async fn get_category(&self, id: Uuid) -> Result<ServiceCategory, AppError> {
        self.repo
            .find_category(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("category_not_found"))
    }

    pub async fn create_category(&self, payload: &CategoryPayload) -> Result<ServiceCategory, AppError> {
        let category = self.repo.create_category(&self.pool, payload).await?;
        tracing::info!(category_id = %category.id, "Categoria criada");
        Ok(category)
    }

    pub async fn update_category(&self, id: Uuid, payload: &CategoryPayload) -> Result<ServiceCategory, AppError> {
        self.repo
            .update_category(&self.pool, id, payload)
            .await?
            .ok_or(AppError::NotFound("category_not_found"))
    }

    pub async fn delete_category(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_category(&self.pool, id).await? {
            return Err(AppError::NotFound("category_not_found"));
        }
        tracing::info!(category_id = %id, "Categoria removida");
        Ok(())
    }

    // =========================================================================
    //  AGÊNCIAS
    // =========================================================================

    pub async fn list_offices(&self) -> Result<Vec<MfcOffice>, AppError> {
        self.repo.list_offices().await
    }

    pub async fn get_office(&self, id: Uuid) -> Result<MfcOffice, AppError> {
        self.repo
            .find_office(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("office_not_found"))
    }

    pub async fn create_office(&self, payload: &OfficePayload) -> Result<MfcOffice, AppError> {
        let office = self.repo.create_office(&self.pool, payload).await?;
        tracing::info!(office_id = %office.id, "Agência criada");
        Ok(office)
    }

    pub async fn update_office(&self, id: Uuid, payload: &OfficePayload) -> Result<MfcOffice, AppError> {
        self.repo
            .update_office(&self.pool, id, payload)
            .await?
            .ok_or(AppError::NotFound("office_not_found"))
    }

    pub async fn delete_office(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_office(&self.pool, id).await? {
            return Err(AppError::NotFound("office_not_found"));
        }
        tracing::info!(office_id = %id, "Agência removida");
        Ok(())
    }

    pub async fn list_office_services(&self, office_id: Uuid) -> Result<Vec<Service>, AppError> {
        // 404 para agência inexistente, em vez de lista vazia
        self.get_office(office_id).await?;
        self.repo.list_office_services(office_id).await
    }

    // =========================================================================
    //  SERVIÇOS
    // =========================================================================

    pub async fn list_services(&self, query: &ServiceQuery) -> Result<Paginated<Service>, AppError> {
        let (count, services) = self.repo.list_services(query).await?;
        Ok(Paginated::new(query.page, count, services))
    }

    pub async fn get_service(&self, id: Uuid) -> Result<Service, AppError> {
        self.repo
            .find_service(&self.pool, id)
            .await?
            .ok_or(AppError::NotFound("service_not_found"))
    }

    /// Serviço e vínculos com agências na mesma transação.
    pub async fn create_service(&self, payload: ServicePayload) -> Result<Service, AppError> {
        let payload = payload.normalized();
        let mut tx = self.pool.begin().await?;

        let id = self.repo.insert_service(&mut *tx, &payload).await?;
        self.repo.link_service_offices(&mut *tx, id, &payload.office_ids).await?;
        let service = self
            .repo
            .find_service(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("service_not_found"))?;

        tx.commit().await?;

        tracing::info!(service_id = %service.id, "Serviço criado");
        Ok(service)
    }

    /// Substitui todos os campos e o conjunto de agências.
    pub async fn update_service(&self, id: Uuid, payload: ServicePayload) -> Result<Service, AppError> {
        let payload = payload.normalized();
        let mut tx = self.pool.begin().await?;

        if !self.repo.update_service(&mut *tx, id, &payload).await? {
            return Err(AppError::NotFound("service_not_found"));
        }
        self.repo.clear_service_offices(&mut *tx, id).await?;
        self.repo.link_service_offices(&mut *tx, id, &payload.office_ids).await?;
        let service = self
            .repo
            .find_service(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("service_not_found"))?;

        tx.commit().await?;
        Ok(service)
    }

    pub async fn delete_service(&self, id: Uuid) -> Result<(), AppError> {
        if !self.repo.delete_service(&self.pool, id).await? {
            return Err(AppError::NotFound("service_not_found"));
        }
        tracing::info!(service_id = %id, "Serviço removido");
        Ok(())
    }

    pub async fn duplicate_service(&self, id: Uuid) -> Result<Service, AppError> {
        let mut tx = self.pool.begin().await?;

        let original = self
            .repo
            .find_service(&mut *tx, id)
            .await?
            .ok_or(AppError::NotFound("service_not_found"))?;
        let payload = ServicePayload::copy_of(&original);

        let new_id = self.repo.insert_service(&mut *tx, &payload).await?;
        let copy = self
            .repo
            .find_service(&mut *tx, new_id)
            .await?
            .ok_or(AppError::NotFound("service_not_found"))?;

        tx.commit().await?;

        tracing::info!(original_id = %id, copy_id = %copy.id, "Serviço duplicado");
        Ok(copy)
    }

    pub async fn statistics(&self) -> Result<ServiceStatistics, AppError> {
        let total_services = self.repo.count_services().await?;
        let services_by_category = self.repo.count_services_by_category().await?;
        let average = self.repo.average_duration().await?;

        Ok(ServiceStatistics {
            total_services,
            services_by_category,
            average_duration_days: round_average(average),
        })
    }
}
