// src/filters/request_filter.rs

// Filtros da listagem de solicitações.
// Aliases usados no SQL: `r` = requests, `u` = users, `s` = services, `o` = mfc_offices.

use chrono::{DateTime, Utc};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    expr::{push_where, Expr, SqlPredicate},
    ordering::{SortField, SortKey, SortOrder},
    pagination::PageRequest,
    params::{flag, parsed, text, timestamp_param, DayBound, Params},
};
use crate::{
    common::{db_utils::contains_pattern, error::AppError},
    models::{auth::User, requests::RequestStatus},
};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestPredicate {
    Id(Uuid),
    Status(RequestStatus),
    UserId(Uuid),
    UserEmail(String),
    ServiceId(Uuid),
    ServiceNameContains(String),
    OfficeId(Uuid),
    OfficeAddressContains(String),
    CreatedFrom(DateTime<Utc>),
    CreatedTo(DateTime<Utc>),
    /// Nome do serviço, nome do usuário ou status
    Search(String),
}

impl SqlPredicate for RequestPredicate {
    fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        match self {
            RequestPredicate::Id(id) => {
                qb.push("r.id = ").push_bind(*id);
            }
            RequestPredicate::Status(status) => {
                qb.push("r.status = ").push_bind(*status);
            }
            RequestPredicate::UserId(id) => {
                qb.push("r.user_id = ").push_bind(*id);
            }
            RequestPredicate::UserEmail(email) => {
                qb.push("u.email = ").push_bind(email.clone());
            }
            RequestPredicate::ServiceId(id) => {
                qb.push("r.service_id = ").push_bind(*id);
            }
            RequestPredicate::ServiceNameContains(term) => {
                qb.push("s.name ILIKE ").push_bind(contains_pattern(term));
            }
            RequestPredicate::OfficeId(id) => {
                qb.push("r.office_id = ").push_bind(*id);
            }
            RequestPredicate::OfficeAddressContains(term) => {
                qb.push("o.address ILIKE ").push_bind(contains_pattern(term));
            }
            RequestPredicate::CreatedFrom(ts) => {
                qb.push("r.created_at >= ").push_bind(*ts);
            }
            RequestPredicate::CreatedTo(ts) => {
                qb.push("r.created_at <= ").push_bind(*ts);
            }
            RequestPredicate::Search(term) => {
                let pattern = contains_pattern(term);
                qb.push("(s.name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR u.full_name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR r.status::text ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestSortField {
    CreatedAt,
    UpdatedAt,
    Status,
}

impl SortField for RequestSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "created_at" => Some(RequestSortField::CreatedAt),
            "updated_at" => Some(RequestSortField::UpdatedAt),
            "status" => Some(RequestSortField::Status),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            RequestSortField::CreatedAt => "r.created_at",
            RequestSortField::UpdatedAt => "r.updated_at",
            RequestSortField::Status => "r.status",
        }
    }
}

/// Restrição de visibilidade: quem não é staff só enxerga as próprias solicitações.
pub fn caller_scope(caller: &User) -> Option<Expr<RequestPredicate>> {
    if caller.is_staff() {
        None
    } else {
        Some(owned_by(caller))
    }
}

/// Solicitações cujo usuário tem o mesmo e-mail de quem chama.
pub fn owned_by(caller: &User) -> Expr<RequestPredicate> {
    Expr::leaf(RequestPredicate::UserEmail(caller.email.clone()))
}

/// status IN (new, in_progress)
pub fn active_status() -> Expr<RequestPredicate> {
    Expr::Or(
        RequestStatus::ACTIVE
            .into_iter()
            .map(|status| Expr::leaf(RequestPredicate::Status(status)))
            .collect(),
    )
}

/// Uma solicitação específica, respeitando a visibilidade de quem chama.
pub fn visible_by_id(id: Uuid, caller: &User) -> Expr<RequestPredicate> {
    let by_id = Expr::leaf(RequestPredicate::Id(id));
    match caller_scope(caller) {
        Some(scope) => by_id.and(scope),
        None => by_id,
    }
}

/// Solicitações ativas de OUTROS usuários: NOT(dono = caller) AND status ativo.
pub fn others_active(caller: &User) -> Expr<RequestPredicate> {
    owned_by(caller).negate().and(active_status())
}

#[derive(Debug, Clone, PartialEq)]
pub struct RequestQuery {
    pub filter: Option<Expr<RequestPredicate>>,
    pub order: SortOrder<RequestSortField>,
    pub page: PageRequest,
}

impl RequestQuery {
    /// Ids e datas malformados são ignorados; um `status` desconhecido é erro de validação.
    pub fn from_params(params: &Params, caller: &User) -> Result<Self, AppError> {
        let mut conditions = Vec::new();

        if let Some(scope) = caller_scope(caller) {
            conditions.push(scope);
        }
        if let Some(value) = text(params, "status") {
            conditions.push(Expr::leaf(RequestPredicate::Status(value.parse()?)));
        }
        if let Some(id) = parsed::<Uuid>(params, "user") {
            conditions.push(Expr::leaf(RequestPredicate::UserId(id)));
        }
        if let Some(id) = parsed::<Uuid>(params, "service") {
            conditions.push(Expr::leaf(RequestPredicate::ServiceId(id)));
        }
        if let Some(term) = text(params, "service_name") {
            conditions.push(Expr::leaf(RequestPredicate::ServiceNameContains(term.to_string())));
        }
        if let Some(id) = parsed::<Uuid>(params, "office") {
            conditions.push(Expr::leaf(RequestPredicate::OfficeId(id)));
        }
        if let Some(term) = text(params, "office_address") {
            conditions.push(Expr::leaf(RequestPredicate::OfficeAddressContains(term.to_string())));
        }
        if let Some(term) = text(params, "search") {
            conditions.push(Expr::leaf(RequestPredicate::Search(term.to_string())));
        }
        if flag(params, "active_status") {
            conditions.push(active_status());
        }

        let date_from = timestamp_param(params, &["date_from", "created_after"], DayBound::Start);
        let date_to = timestamp_param(params, &["date_to", "created_before"], DayBound::End);
        let mut range = Vec::new();
        if let Some(ts) = date_from {
            range.push(Expr::leaf(RequestPredicate::CreatedFrom(ts)));
        }
        if let Some(ts) = date_to {
            range.push(Expr::leaf(RequestPredicate::CreatedTo(ts)));
        }
        if let Some(expr) = Expr::all(range) {
            conditions.push(expr);
        }

        if flag(params, "complex_filter") {
            conditions.push(others_active(caller));
        }

        Ok(Self {
            filter: Expr::all(conditions),
            order: SortOrder::parse(text(params, "ordering"), vec![SortKey::desc(RequestSortField::CreatedAt)]),
            page: PageRequest::from_params(params),
        })
    }

    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        push_where(qb, self.filter.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::UserRole;
    use chrono::TimeZone;

    struct Row {
        id: u8,
        user_email: &'static str,
        user_name: &'static str,
        service_name: &'static str,
        status: RequestStatus,
        created_at: DateTime<Utc>,
    }

    fn user(email: &str, role: UserRole) -> User {
        User {
            id: Uuid::new_v4(),
            full_name: "Тест".into(),
            email: email.into(),
            phone: None,
            role,
            password_hash: String::new(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn matches(row: &Row, p: &RequestPredicate) -> bool {
        let has = |h: &str, n: &str| h.to_lowercase().contains(&n.to_lowercase());
        match p {
            RequestPredicate::Status(s) => row.status == *s,
            RequestPredicate::UserEmail(e) => row.user_email == e.as_str(),
            RequestPredicate::ServiceNameContains(t) => has(row.service_name, t),
            RequestPredicate::CreatedFrom(ts) => row.created_at >= *ts,
            RequestPredicate::CreatedTo(ts) => row.created_at <= *ts,
            RequestPredicate::Search(t) => {
                has(row.service_name, t) || has(row.user_name, t) || has(row.status.as_str(), t)
            }
            RequestPredicate::Id(_)
            | RequestPredicate::UserId(_)
            | RequestPredicate::ServiceId(_)
            | RequestPredicate::OfficeId(_)
            | RequestPredicate::OfficeAddressContains(_) => true,
        }
    }

    fn rows() -> Vec<Row> {
        let day = |d: u32| Utc.with_ymd_and_hms(2025, 3, d, 12, 0, 0).unwrap();
        vec![
            Row { id: 1, user_email: "anna@mfc.ru", user_name: "Анна", service_name: "Паспорт", status: RequestStatus::New, created_at: day(1) },
            Row { id: 2, user_email: "anna@mfc.ru", user_name: "Анна", service_name: "Регистрация", status: RequestStatus::Completed, created_at: day(5) },
            Row { id: 3, user_email: "boris@mfc.ru", user_name: "Борис", service_name: "Паспорт", status: RequestStatus::InProgress, created_at: day(10) },
            Row { id: 4, user_email: "boris@mfc.ru", user_name: "Борис", service_name: "Справка", status: RequestStatus::Rejected, created_at: day(10) },
        ]
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn select(caller: &User, pairs: &[(&str, &str)]) -> Vec<u8> {
        let query = RequestQuery::from_params(&params(pairs), caller).unwrap();
        rows()
            .iter()
            .filter(|r| match &query.filter {
                Some(expr) => expr.evaluate(&|p: &RequestPredicate| matches(r, p)),
                None => true,
            })
            .map(|r| r.id)
            .collect()
    }

    #[test]
    fn non_staff_only_sees_own_requests() {
        let anna = user("anna@mfc.ru", UserRole::User);
        assert_eq!(select(&anna, &[]), vec![1, 2]);
        assert_eq!(select(&anna, &[("service_name", "паспорт")]), vec![1]);
    }

    #[test]
    fn staff_sees_everything() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        assert_eq!(select(&admin, &[]), vec![1, 2, 3, 4]);
    }

    #[test]
    fn active_status_keeps_new_and_in_progress() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        assert_eq!(select(&admin, &[("active_status", "true")]), vec![1, 3]);
    }

    #[test]
    fn date_bounds_are_inclusive_and_date_to_covers_the_day() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        assert_eq!(select(&admin, &[("date_from", "2025-03-05"), ("date_to", "2025-03-10")]), vec![2, 3, 4]);
        assert_eq!(select(&admin, &[("date_to", "2025-03-01T12:00:00Z")]), vec![1]);
        assert_eq!(select(&admin, &[("date_from", "amanhã")]).len(), 4);
    }

    #[test]
    fn complex_filter_returns_other_users_active_requests() {
        let admin = user("anna@mfc.ru", UserRole::Admin);
        assert_eq!(select(&admin, &[("complex_filter", "true")]), vec![3]);

        // Para quem não é staff, o escopo anula o resultado
        let anna = user("anna@mfc.ru", UserRole::User);
        assert!(select(&anna, &[("complex_filter", "true")]).is_empty());
    }

    #[test]
    fn search_matches_status_text() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        assert_eq!(select(&admin, &[("search", "reject")]), vec![4]);
        assert_eq!(select(&admin, &[("search", "борис")]), vec![3, 4]);
    }

    #[test]
    fn unknown_status_filter_is_rejected() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        let err = RequestQuery::from_params(&params(&[("status", "archived")]), &admin).unwrap_err();
        assert!(matches!(err, AppError::InvalidStatus(_)));
        assert_eq!(select(&admin, &[("status", "completed")]), vec![2]);
    }

    #[test]
    fn visible_by_id_adds_scope_only_for_non_staff() {
        let id = Uuid::new_v4();
        let admin = user("admin@mfc.ru", UserRole::Admin);
        assert_eq!(visible_by_id(id, &admin), Expr::leaf(RequestPredicate::Id(id)));

        let anna = user("anna@mfc.ru", UserRole::User);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        push_where(&mut qb, Some(&visible_by_id(id, &anna)));
        assert_eq!(qb.sql(), "SELECT 1 WHERE (r.id = $1 AND u.email = $2)");
    }

    #[test]
    fn default_ordering_is_newest_first() {
        let admin = user("admin@mfc.ru", UserRole::Admin);
        let q = RequestQuery::from_params(&params(&[]), &admin).unwrap();
        assert_eq!(q.order.keys(), &[SortKey::desc(RequestSortField::CreatedAt)]);
    }

    #[test]
    fn renders_scope_and_flags_as_sql() {
        let anna = user("anna@mfc.ru", UserRole::User);
        let q = RequestQuery::from_params(&params(&[("active_status", "true")]), &anna).unwrap();
        let mut qb = QueryBuilder::<Postgres>::new("SELECT r.id FROM requests r");
        q.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT r.id FROM requests r WHERE (u.email = $1 AND (r.status = $2 OR r.status = $3))"
        );
    }
}
