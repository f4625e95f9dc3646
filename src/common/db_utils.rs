// src/common/db_utils.rs

use crate::common::error::AppError;

// ---
// Helper: traduz violações de constraint do Postgres em erros de domínio
// ---
/// `unique` é devolvido em violação de UNIQUE. Em violação de FK, o campo é o
/// primeiro de `references` que aparece no nome da constraint (ex: "requests_service_id_fkey").
/// Qualquer outro erro continua sendo `DatabaseError`.
pub(crate) fn map_constraint_error(
    e: sqlx::Error,
    unique: Option<AppError>,
    references: &[&'static str],
) -> AppError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            if let Some(err) = unique {
                return err;
            }
        }
        if db_err.is_foreign_key_violation() {
            if let Some(first) = references.first() {
                let constraint = db_err.constraint().unwrap_or_default();
                let field = references
                    .iter()
                    .copied()
                    .find(|field| constraint.contains(*field))
                    .unwrap_or(*first);
                return AppError::InvalidReference(field);
            }
        }
    }
    AppError::DatabaseError(e)
}

/// Padrão ILIKE de "contém", escapando os curingas do próprio termo.
pub(crate) fn contains_pattern(term: &str) -> String {
    let escaped = term
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{}%", escaped)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("паспорт"), "%паспорт%");
        assert_eq!(contains_pattern("50%_off"), "%50\\%\\_off%");
    }

    #[test]
    fn non_constraint_errors_stay_database_errors() {
        let err = map_constraint_error(sqlx::Error::RowNotFound, Some(AppError::EmailAlreadyExists), &["user_id"]);
        assert!(matches!(err, AppError::DatabaseError(_)));
    }
}
