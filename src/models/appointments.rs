// src/models/appointments.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "appointment_status", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum AppointmentStatus {
    Pending,
    Confirmed,
    Completed,
    Cancelled,
}

// Agendamento com os nomes das entidades relacionadas
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Appointment {
    pub id: Uuid,
    pub user_id: Uuid,
    pub user_full_name: String,
    pub service_id: Uuid,
    pub service_name: String,
    pub office_id: Uuid,
    pub office_address: String,
    pub appointment_datetime: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateAppointmentPayload {
    pub service_id: Uuid,
    pub office_id: Uuid,
    pub appointment_datetime: DateTime<Utc>,
    pub user_id: Option<Uuid>,
    pub status: Option<AppointmentStatus>,
}
