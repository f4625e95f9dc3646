// src/models/catalog.rs

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const MIN_DURATION_DAYS: i32 = 1;
pub const SHORT_DURATION_DAYS: i32 = 7;
/// Limite da coluna `services.name`.
pub const MAX_SERVICE_NAME_CHARS: usize = 200;

/// Sufixo aplicado ao nome do serviço duplicado.
pub const COPY_SUFFIX: &str = " (копия)";

// --- 1. Categorias ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct ServiceCategory {
    pub id: Uuid,
    #[schema(example = "Документы и удостоверения")]
    pub name: String,
    pub description: Option<String>,
}

// Categoria na listagem, com o total de serviços
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct ServiceCategoryWithCount {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub services_count: i64,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CategoryPayload {
    #[validate(custom(function = "validate_category_name"))]
    #[schema(example = "Регистрация")]
    pub name: String,
    pub description: Option<String>,
}

// --- 2. Serviços ---

// Linha completa do serviço, já com o nome da categoria e as agências
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Service {
    pub id: Uuid,
    #[schema(example = "Выдача паспорта РФ")]
    pub name: String,
    pub description: Option<String>,
    pub category_id: Uuid,
    #[schema(example = "Документы и удостоверения")]
    pub category_name: String,
    #[schema(example = 10)]
    pub duration_days: i32,
    pub office_ids: Vec<Uuid>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct ServicePayload {
    #[validate(custom(function = "validate_service_name"))]
    #[schema(example = "Замена паспорта")]
    pub name: String,

    pub description: Option<String>,

    pub category_id: Uuid,

    #[serde(default = "default_duration")]
    #[validate(range(min = 1, max = 365, message = "duration_out_of_range"))]
    #[schema(example = 10)]
    pub duration_days: i32,

    // Agências onde o serviço é prestado (N:M)
    #[serde(default)]
    pub office_ids: Vec<Uuid>,
}

fn default_duration() -> i32 {
    MIN_DURATION_DAYS
}

// Comprimento contado depois do trim, que é como o valor é gravado
fn trimmed_length(
    value: &str,
    min: usize,
    max: usize,
    too_short: &'static str,
    too_long: &'static str,
) -> Result<(), ValidationError> {
    let count = value.trim().chars().count();
    if count < min {
        let mut err = ValidationError::new("length");
        err.message = Some(too_short.into());
        return Err(err);
    }
    if count > max {
        let mut err = ValidationError::new("length");
        err.message = Some(too_long.into());
        return Err(err);
    }
    Ok(())
}

fn validate_service_name(name: &str) -> Result<(), ValidationError> {
    trimmed_length(name, 3, MAX_SERVICE_NAME_CHARS, "name_too_short", "name_too_long")
}

fn validate_category_name(name: &str) -> Result<(), ValidationError> {
    trimmed_length(name, 1, 200, "required", "name_too_long")
}

fn validate_office_address(address: &str) -> Result<(), ValidationError> {
    trimmed_length(address, 1, 500, "address_required", "field_too_long")
}

impl ServicePayload {
    /// O nome é gravado sem espaços nas pontas; descrição vazia vira NULL.
    pub fn normalized(mut self) -> Self {
        self.name = self.name.trim().to_string();
        self.description = self
            .description
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());
        self.office_ids.sort();
        self.office_ids.dedup();
        self
    }
}

/// Nome usado pela cópia de um serviço. A base é cortada para o
/// resultado caber em `MAX_SERVICE_NAME_CHARS`.
pub fn copy_name(original: &str) -> String {
    let room = MAX_SERVICE_NAME_CHARS - COPY_SUFFIX.chars().count();
    let base: String = original.chars().take(room).collect();
    format!("{}{}", base.trim_end(), COPY_SUFFIX)
}

impl ServicePayload {
    /// Payload da cópia: mesmos campos, nome com sufixo e sem agências.
    pub fn copy_of(service: &Service) -> Self {
        Self {
            name: copy_name(&service.name),
            description: service.description.clone(),
            category_id: service.category_id,
            duration_days: service.duration_days,
            office_ids: Vec::new(),
        }
    }
}

// --- 3. Estatísticas ---
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CategoryServiceCount {
    pub category_name: String,
    pub count: i64,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ServiceStatistics {
    pub total_services: i64,
    pub services_by_category: Vec<CategoryServiceCount>,
    #[schema(example = 12.5)]
    pub average_duration_days: f64,
}

/// Arredonda a média para duas casas; sem serviços a média é 0.
pub fn round_average(avg: Option<f64>) -> f64 {
    (avg.unwrap_or(0.0) * 100.0).round() / 100.0
}

// --- 4. Agências (MFC) ---
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct MfcOffice {
    pub id: Uuid,
    #[schema(example = "ул. Ленина, д. 1")]
    pub address: String,
    #[schema(example = "Центральный")]
    pub district: Option<String>,
    #[schema(example = "Пн-Пт 9:00-20:00")]
    pub working_hours: Option<String>,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct OfficePayload {
    #[validate(custom(function = "validate_office_address"))]
    pub address: String,
    #[validate(length(max = 200, message = "field_too_long"))]
    pub district: Option<String>,
    #[validate(length(max = 200, message = "field_too_long"))]
    pub working_hours: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, duration_days: i32) -> ServicePayload {
        ServicePayload {
            name: name.to_string(),
            description: None,
            category_id: Uuid::new_v4(),
            duration_days,
            office_ids: vec![],
        }
    }

    #[test]
    fn accepts_duration_bounds() {
        assert!(payload("Замена паспорта", 1).validate().is_ok());
        assert!(payload("Замена паспорта", 365).validate().is_ok());
    }

    #[test]
    fn rejects_duration_outside_range() {
        for days in [0, -3, 366, 1000] {
            let errors = payload("Замена паспорта", days).validate().unwrap_err();
            assert!(errors.field_errors().contains_key("duration_days"), "days = {}", days);
        }
    }

    #[test]
    fn name_is_checked_after_trimming() {
        let errors = payload("  аб  ", 5).validate().unwrap_err();
        assert!(errors.field_errors().contains_key("name"));
        assert!(payload("  абв  ", 5).validate().is_ok());
    }

    #[test]
    fn normalized_trims_and_dedups() {
        let office = Uuid::new_v4();
        let mut p = payload("  Регистрация по месту жительства ", 3);
        p.description = Some("   ".into());
        p.office_ids = vec![office, office];
        let p = p.normalized();
        assert_eq!(p.name, "Регистрация по месту жительства");
        assert_eq!(p.description, None);
        assert_eq!(p.office_ids, vec![office]);
    }

    #[test]
    fn duration_defaults_to_one_day() {
        let json = serde_json::json!({
            "name": "Выдача справки",
            "category_id": Uuid::new_v4(),
        });
        let p: ServicePayload = serde_json::from_value(json).unwrap();
        assert_eq!(p.duration_days, 1);
        assert!(p.office_ids.is_empty());
    }

    fn service(name: &str) -> Service {
        Service {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: Some("Подача заявления".into()),
            category_id: Uuid::new_v4(),
            category_name: "Документы".into(),
            duration_days: 10,
            office_ids: vec![Uuid::new_v4()],
        }
    }

    #[test]
    fn copy_keeps_fields_and_appends_suffix() {
        let original = service("X");
        let copy = ServicePayload::copy_of(&original);
        assert_eq!(copy.name, "X (копия)");
        assert_eq!(copy.description, original.description);
        assert_eq!(copy.category_id, original.category_id);
        assert_eq!(copy.duration_days, 10);
        assert!(copy.office_ids.is_empty());
        assert!(copy.validate().is_ok());
    }

    #[test]
    fn copy_of_longest_name_fits_column() {
        for len in [192, 193, 200] {
            let name = "а".repeat(len);
            assert!(payload(&name, 5).validate().is_ok());
            let copy = ServicePayload::copy_of(&service(&name));
            assert_eq!(copy.name.chars().count(), MAX_SERVICE_NAME_CHARS, "len = {}", len);
            assert!(copy.name.ends_with(COPY_SUFFIX));
            assert!(copy.validate().is_ok());
        }
        assert_eq!(copy_name(&"а".repeat(100)).chars().count(), 108);
    }

    #[test]
    fn blank_category_name_is_rejected() {
        for name in ["", "   ", "\t\n"] {
            let p = CategoryPayload { name: name.into(), description: None };
            let errors = p.validate().unwrap_err();
            assert!(errors.field_errors().contains_key("name"), "name = {:?}", name);
        }
        assert!(CategoryPayload { name: " Регистрация ".into(), description: None }.validate().is_ok());
    }

    #[test]
    fn blank_office_address_is_rejected() {
        let office = |address: &str| OfficePayload {
            address: address.into(),
            district: None,
            working_hours: None,
        };
        let errors = office("    ").validate().unwrap_err();
        assert!(errors.field_errors().contains_key("address"));
        assert!(office("ул. Ленина, д. 1").validate().is_ok());
        assert!(office(&"д".repeat(501)).validate().is_err());
    }

    #[test]
    fn average_is_rounded_to_two_places() {
        assert_eq!(round_average(Some(10.0 / 3.0)), 3.33);
        assert_eq!(round_average(None), 0.0);
    }
}
