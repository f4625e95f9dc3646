// src/services/appointment_service.rs

use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::AppointmentRepository,
    filters::{PageRequest, Paginated},
    models::{
        appointments::{Appointment, AppointmentStatus, CreateAppointmentPayload},
        auth::User,
    },
};

#[derive(Clone)]
pub struct AppointmentService {
    repo: AppointmentRepository,
    pool: PgPool,
}

// Mesmo escopo das solicitações: staff vê tudo, os demais só o que é seu (por e-mail)
fn owner_scope(caller: &User) -> Option<&str> {
    if caller.is_staff() { None } else { Some(caller.email.as_str()) }
}

impl AppointmentService {
    pub fn new(repo: AppointmentRepository, pool: PgPool) -> Self {
        Self { repo, pool }
    }

    pub async fn list(&self, caller: &User, page: PageRequest) -> Result<Paginated<Appointment>, AppError> {
        let (count, appointments) = self.repo.list(owner_scope(caller), page).await?;
        Ok(Paginated::new(page, count, appointments))
    }

    pub async fn create(&self, payload: &CreateAppointmentPayload, caller: &User) -> Result<Appointment, AppError> {
        let user_id = match payload.user_id {
            Some(user_id) if user_id != caller.id && !caller.is_staff() => return Err(AppError::Forbidden),
            Some(user_id) => user_id,
            None => caller.id,
        };

        let mut tx = self.pool.begin().await?;
        let id = self
            .repo
            .insert(
                &mut *tx,
                user_id,
                payload.service_id,
                payload.office_id,
                payload.appointment_datetime,
                payload.status.unwrap_or(AppointmentStatus::Pending),
            )
            .await?;
        let appointment = self
            .repo
            .find(&mut *tx, id, owner_scope(caller))
            .await?
            .ok_or(AppError::NotFound("appointment_not_found"))?;
        tx.commit().await?;

        tracing::info!(appointment_id = %appointment.id, user_id = %appointment.user_id, "Agendamento criado");
        Ok(appointment)
    }

    pub async fn delete(&self, id: Uuid, caller: &User) -> Result<(), AppError> {
        self.repo
            .find(&self.pool, id, owner_scope(caller))
            .await?
            .ok_or(AppError::NotFound("appointment_not_found"))?;

        if !self.repo.delete(&self.pool, id).await? {
            return Err(AppError::NotFound("appointment_not_found"));
        }
        tracing::info!(appointment_id = %id, "Agendamento removido");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use chrono::Utc;

    fn user(role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Петров Пётр".into(),
            email: "petrov@mfc.ru".into(),
            phone: None,
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn staff_has_no_owner_scope() {
        assert_eq!(owner_scope(&user(UserRole::Admin)), None);
        assert_eq!(owner_scope(&user(UserRole::User)), Some("petrov@mfc.ru"));
    }
}
