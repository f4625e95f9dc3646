// src/filters/service_filter.rs

// Filtros da listagem de serviços.
// Aliases usados no SQL: `s` = services, `c` = service_categories.

use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    expr::{push_where, Expr, SqlPredicate},
    ordering::{SortField, SortKey, SortOrder},
    pagination::PageRequest,
    params::{flag, parsed, text, Params},
};
use crate::{common::db_utils::contains_pattern, models::catalog::SHORT_DURATION_DAYS};

#[derive(Debug, Clone, PartialEq)]
pub enum ServicePredicate {
    /// Nome, descrição ou nome da categoria
    Search(String),
    NameContains(String),
    CategoryId(Uuid),
    CategoryNameContains(String),
    DurationAtLeast(i32),
    DurationAtMost(i32),
    DurationAbove(i32),
    /// Existe ao menos uma solicitação para o serviço
    HasRequests,
    HasDescription,
    /// Descrição nula ou vazia
    BlankDescription,
}

impl SqlPredicate for ServicePredicate {
    fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        match self {
            ServicePredicate::Search(term) => {
                let pattern = contains_pattern(term);
                qb.push("(s.name ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR s.description ILIKE ")
                    .push_bind(pattern.clone())
                    .push(" OR c.name ILIKE ")
                    .push_bind(pattern)
                    .push(")");
            }
            ServicePredicate::NameContains(term) => {
                qb.push("s.name ILIKE ").push_bind(contains_pattern(term));
            }
            ServicePredicate::CategoryId(id) => {
                qb.push("s.category_id = ").push_bind(*id);
            }
            ServicePredicate::CategoryNameContains(term) => {
                qb.push("c.name ILIKE ").push_bind(contains_pattern(term));
            }
            ServicePredicate::DurationAtLeast(days) => {
                qb.push("s.duration_days >= ").push_bind(*days);
            }
            ServicePredicate::DurationAtMost(days) => {
                qb.push("s.duration_days <= ").push_bind(*days);
            }
            ServicePredicate::DurationAbove(days) => {
                qb.push("s.duration_days > ").push_bind(*days);
            }
            ServicePredicate::HasRequests => {
                qb.push("EXISTS (SELECT 1 FROM requests rq WHERE rq.service_id = s.id)");
            }
            ServicePredicate::HasDescription => {
                qb.push("s.description IS NOT NULL");
            }
            ServicePredicate::BlankDescription => {
                qb.push("(s.description IS NULL OR s.description = '')");
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceSortField {
    Name,
    DurationDays,
    CategoryName,
}

impl SortField for ServiceSortField {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "name" => Some(ServiceSortField::Name),
            "duration_days" => Some(ServiceSortField::DurationDays),
            "category_name" | "category__name" => Some(ServiceSortField::CategoryName),
            _ => None,
        }
    }

    fn column(&self) -> &'static str {
        match self {
            ServiceSortField::Name => "s.name",
            ServiceSortField::DurationDays => "s.duration_days",
            ServiceSortField::CategoryName => "c.name",
        }
    }
}

/// Serviços "curtos" (até 7 dias) OU "populares"; só um deles quando só um foi pedido.
pub fn short_or_popular(short_duration: bool, popular: bool) -> Option<Expr<ServicePredicate>> {
    let mut either = Vec::new();
    if short_duration {
        either.push(Expr::leaf(ServicePredicate::DurationAtMost(SHORT_DURATION_DAYS)));
    }
    if popular {
        either.push(Expr::leaf(ServicePredicate::HasRequests));
    }
    Expr::any(either)
}

/// NOT(duração <= 7) AND (tem solicitação OR tem descrição)
pub fn long_and_requested_or_described() -> Expr<ServicePredicate> {
    Expr::leaf(ServicePredicate::DurationAtMost(SHORT_DURATION_DAYS))
        .negate()
        .and(Expr::leaf(ServicePredicate::HasRequests).or(Expr::leaf(ServicePredicate::HasDescription)))
}

/// duração > 7 AND (sem descrição OR descrição vazia)
pub fn long_without_description() -> Expr<ServicePredicate> {
    Expr::leaf(ServicePredicate::DurationAbove(SHORT_DURATION_DAYS))
        .and(Expr::leaf(ServicePredicate::BlankDescription))
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServiceQuery {
    pub filter: Option<Expr<ServicePredicate>>,
    pub order: SortOrder<ServiceSortField>,
    pub page: PageRequest,
}

impl ServiceQuery {
    pub fn from_params(params: &Params) -> Self {
        let mut conditions = Vec::new();

        if let Some(term) = text(params, "search") {
            conditions.push(Expr::leaf(ServicePredicate::Search(term.to_string())));
        }
        if let Some(term) = text(params, "name") {
            conditions.push(Expr::leaf(ServicePredicate::NameContains(term.to_string())));
        }
        if let Some(id) = parsed::<Uuid>(params, "category") {
            conditions.push(Expr::leaf(ServicePredicate::CategoryId(id)));
        }
        if let Some(term) = text(params, "category_name") {
            conditions.push(Expr::leaf(ServicePredicate::CategoryNameContains(term.to_string())));
        }
        if let Some(days) = parsed::<i32>(params, "duration_min") {
            conditions.push(Expr::leaf(ServicePredicate::DurationAtLeast(days)));
        }
        if let Some(days) = parsed::<i32>(params, "duration_max") {
            conditions.push(Expr::leaf(ServicePredicate::DurationAtMost(days)));
        }
        if let Some(expr) = short_or_popular(flag(params, "short_duration"), flag(params, "popular")) {
            conditions.push(expr);
        }
        if flag(params, "complex_filter") {
            conditions.push(long_and_requested_or_described());
        }
        if flag(params, "complex_filter2") {
            conditions.push(long_without_description());
        }

        Self {
            filter: Expr::all(conditions),
            order: SortOrder::parse(text(params, "ordering"), vec![SortKey::asc(ServiceSortField::Name)]),
            page: PageRequest::from_params(params),
        }
    }

    pub fn push_where<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        push_where(qb, self.filter.as_ref());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Linha "achatada" de serviço para avaliar os filtros em memória
    struct Row {
        name: &'static str,
        description: Option<&'static str>,
        category_id: Uuid,
        category_name: &'static str,
        duration_days: i32,
        requests: usize,
    }

    fn contains(haystack: &str, needle: &str) -> bool {
        haystack.to_lowercase().contains(&needle.to_lowercase())
    }

    fn matches(row: &Row, p: &ServicePredicate) -> bool {
        match p {
            ServicePredicate::Search(t) => {
                contains(row.name, t)
                    || row.description.map(|d| contains(d, t)).unwrap_or(false)
                    || contains(row.category_name, t)
            }
            ServicePredicate::NameContains(t) => contains(row.name, t),
            ServicePredicate::CategoryId(id) => row.category_id == *id,
            ServicePredicate::CategoryNameContains(t) => contains(row.category_name, t),
            ServicePredicate::DurationAtLeast(d) => row.duration_days >= *d,
            ServicePredicate::DurationAtMost(d) => row.duration_days <= *d,
            ServicePredicate::DurationAbove(d) => row.duration_days > *d,
            ServicePredicate::HasRequests => row.requests > 0,
            ServicePredicate::HasDescription => row.description.is_some(),
            ServicePredicate::BlankDescription => row.description.map(str::is_empty).unwrap_or(true),
        }
    }

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    fn row(name: &'static str, duration_days: i32, requests: usize, description: Option<&'static str>) -> Row {
        Row {
            name,
            description,
            category_id: Uuid::nil(),
            category_name: "Документы",
            duration_days,
            requests,
        }
    }

    fn select<'a>(rows: &'a [Row], pairs: &[(&str, &str)]) -> Vec<&'a str> {
        let query = ServiceQuery::from_params(&params(pairs));
        rows.iter()
            .filter(|r| match &query.filter {
                Some(expr) => expr.evaluate(&|p: &ServicePredicate| matches(r, p)),
                None => true,
            })
            .map(|r| r.name)
            .collect()
    }

    fn catalog() -> Vec<Row> {
        vec![
            row("d1", 1, 0, Some("справка")),
            row("d5", 5, 2, None),
            row("d10", 10, 1, Some("")),
            row("d15", 15, 0, None),
        ]
    }

    #[test]
    fn duration_range_is_inclusive() {
        assert_eq!(select(&catalog(), &[("duration_min", "2"), ("duration_max", "10")]), vec!["d5", "d10"]);
    }

    #[test]
    fn malformed_duration_is_ignored() {
        assert_eq!(
            select(&catalog(), &[("duration_min", "dois"), ("duration_max", "10")]),
            vec!["d1", "d5", "d10"]
        );
        assert_eq!(select(&catalog(), &[("duration_max", "")]).len(), 4);
    }

    #[test]
    fn short_duration_alone() {
        assert_eq!(select(&catalog(), &[("short_duration", "true")]), vec!["d1", "d5"]);
        assert_eq!(select(&catalog(), &[("short_duration", "on")]), vec!["d1", "d5"]);
        assert_eq!(select(&catalog(), &[("short_duration", "false")]).len(), 4);
    }

    #[test]
    fn popular_alone() {
        assert_eq!(select(&catalog(), &[("popular", "true")]), vec!["d5", "d10"]);
    }

    #[test]
    fn short_and_popular_is_union() {
        assert_eq!(
            select(&catalog(), &[("short_duration", "true"), ("popular", "on")]),
            vec!["d1", "d5", "d10"]
        );
    }

    #[test]
    fn complex_filter_requires_long_and_requested_or_described() {
        // d10: longo e com solicitação; d15: longo, sem nada
        assert_eq!(select(&catalog(), &[("complex_filter", "true")]), vec!["d10"]);
    }

    #[test]
    fn complex_filter2_finds_long_services_without_description() {
        assert_eq!(select(&catalog(), &[("complex_filter2", "on")]), vec!["d10", "d15"]);
    }

    #[test]
    fn search_is_case_insensitive_across_fields() {
        assert_eq!(select(&catalog(), &[("search", "СПРАВ")]), vec!["d1"]);
        assert_eq!(select(&catalog(), &[("search", "документ")]).len(), 4);
    }

    #[test]
    fn category_id_must_be_a_uuid() {
        let q = ServiceQuery::from_params(&params(&[("category", "7")]));
        assert_eq!(q.filter, None);

        let id = Uuid::new_v4();
        let q = ServiceQuery::from_params(&params(&[("category", &id.to_string())]));
        assert_eq!(q.filter, Some(Expr::leaf(ServicePredicate::CategoryId(id))));
    }

    #[test]
    fn default_ordering_is_name_ascending() {
        let q = ServiceQuery::from_params(&params(&[]));
        assert_eq!(q.order.keys(), &[SortKey::asc(ServiceSortField::Name)]);
        let q = ServiceQuery::from_params(&params(&[("ordering", "-category__name")]));
        assert_eq!(q.order.keys(), &[SortKey::desc(ServiceSortField::CategoryName)]);
    }

    #[test]
    fn renders_sql_with_bound_values() {
        let q = ServiceQuery::from_params(&params(&[
            ("search", "паспорт"),
            ("short_duration", "true"),
            ("popular", "true"),
        ]));
        let mut qb = QueryBuilder::<Postgres>::new("SELECT s.id FROM services s");
        q.push_where(&mut qb);
        assert_eq!(
            qb.sql(),
            "SELECT s.id FROM services s WHERE ((s.name ILIKE $1 OR s.description ILIKE $2 OR c.name ILIKE $3) \
             AND (s.duration_days <= $4 OR EXISTS (SELECT 1 FROM requests rq WHERE rq.service_id = s.id)))"
        );
    }
}
