// src/filters/pagination.rs

use serde::Serialize;
use sqlx::{Postgres, QueryBuilder};
use utoipa::ToSchema;

use super::params::{parsed, Params};

pub const DEFAULT_PAGE_SIZE: u32 = 20;
pub const MAX_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self { page: 1, page_size: DEFAULT_PAGE_SIZE }
    }
}

impl PageRequest {
    /// `page` começa em 1; `page_size` é limitado a MAX_PAGE_SIZE.
    pub fn from_params(params: &Params) -> Self {
        let page = parsed::<u32>(params, "page").filter(|p| *p >= 1).unwrap_or(1);
        let page_size = parsed::<u32>(params, "page_size")
            .filter(|s| *s >= 1)
            .map(|s| s.min(MAX_PAGE_SIZE))
            .unwrap_or(DEFAULT_PAGE_SIZE);
        Self { page, page_size }
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.page_size)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.page - 1) * i64::from(self.page_size)
    }

    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        qb.push(" LIMIT ")
            .push_bind(self.limit())
            .push(" OFFSET ")
            .push_bind(self.offset());
    }
}

// Envelope das listagens paginadas
#[derive(Debug, Serialize, ToSchema)]
pub struct Paginated<T> {
    pub count: i64,
    pub page: u32,
    pub page_size: u32,
    pub results: Vec<T>,
}

impl<T> Paginated<T> {
    pub fn new(page: PageRequest, count: i64, results: Vec<T>) -> Self {
        Self {
            count,
            page: page.page,
            page_size: page.page_size,
            results,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(pairs: &[(&str, &str)]) -> Params {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn defaults_when_absent_or_malformed() {
        assert_eq!(PageRequest::from_params(&params(&[])), PageRequest::default());
        assert_eq!(
            PageRequest::from_params(&params(&[("page", "0"), ("page_size", "abc")])),
            PageRequest::default()
        );
    }

    #[test]
    fn clamps_page_size_and_computes_offset() {
        let page = PageRequest::from_params(&params(&[("page", "3"), ("page_size", "500")]));
        assert_eq!(page.page_size, MAX_PAGE_SIZE);
        assert_eq!(page.limit(), 100);
        assert_eq!(page.offset(), 200);
    }

    #[test]
    fn renders_limit_offset() {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1");
        PageRequest::default().push_sql(&mut qb);
        assert_eq!(qb.sql(), "SELECT 1 LIMIT $1 OFFSET $2");
    }
}
