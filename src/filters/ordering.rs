// src/filters/ordering.rs

use sqlx::{Postgres, QueryBuilder};

/// Campo ordenável: a lista branca é o próprio enum.
pub trait SortField: Sized + Copy {
    fn parse(name: &str) -> Option<Self>;
    fn column(&self) -> &'static str;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey<F> {
    pub field: F,
    pub descending: bool,
}

impl<F> SortKey<F> {
    pub fn asc(field: F) -> Self {
        Self { field, descending: false }
    }

    pub fn desc(field: F) -> Self {
        Self { field, descending: true }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder<F> {
    keys: Vec<SortKey<F>>,
}

impl<F: SortField> SortOrder<F> {
    /// "name,-duration_days" -> [name ASC, duration_days DESC].
    /// Campos desconhecidos são ignorados; se nada sobrar, vale o padrão.
    pub fn parse(value: Option<&str>, default: Vec<SortKey<F>>) -> Self {
        let mut keys: Vec<SortKey<F>> = Vec::new();

        for raw in value.unwrap_or_default().split(',') {
            let raw = raw.trim();
            let (name, descending) = match raw.strip_prefix('-') {
                Some(rest) => (rest, true),
                None => (raw, false),
            };
            if let Some(field) = F::parse(name) {
                if !keys.iter().any(|k| k.field.column() == field.column()) {
                    keys.push(SortKey { field, descending });
                }
            }
        }

        if keys.is_empty() {
            keys = default;
        }
        Self { keys }
    }

    #[cfg(test)]
    pub fn keys(&self) -> &[SortKey<F>] {
        &self.keys
    }

    /// ORDER BY com desempate pela chave primária, para a paginação ser estável.
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>, tiebreaker: &'static str) {
        qb.push(" ORDER BY ");
        for key in &self.keys {
            qb.push(key.field.column());
            qb.push(if key.descending { " DESC, " } else { " ASC, " });
        }
        qb.push(tiebreaker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Field {
        Name,
        Duration,
    }

    impl SortField for Field {
        fn parse(name: &str) -> Option<Self> {
            match name {
                "name" => Some(Field::Name),
                "duration_days" => Some(Field::Duration),
                _ => None,
            }
        }

        fn column(&self) -> &'static str {
            match self {
                Field::Name => "s.name",
                Field::Duration => "s.duration_days",
            }
        }
    }

    #[test]
    fn parses_directions_and_skips_unknown_fields() {
        let order = SortOrder::parse(Some("-duration_days, bogus ,name"), vec![SortKey::asc(Field::Name)]);
        assert_eq!(order.keys(), &[SortKey::desc(Field::Duration), SortKey::asc(Field::Name)]);
    }

    #[test]
    fn falls_back_to_default() {
        let order = SortOrder::parse(Some("bogus"), vec![SortKey::asc(Field::Name)]);
        assert_eq!(order.keys(), &[SortKey::asc(Field::Name)]);
        let order = SortOrder::parse(None, vec![SortKey::desc(Field::Duration)]);
        assert_eq!(order.keys(), &[SortKey::desc(Field::Duration)]);
    }

    #[test]
    fn renders_order_by_with_tiebreaker() {
        let order: SortOrder<Field> = SortOrder::parse(Some("-name,name"), vec![]);
        let mut qb = QueryBuilder::<Postgres>::new("SELECT * FROM services s");
        order.push_sql(&mut qb, "s.id");
        assert_eq!(qb.sql(), "SELECT * FROM services s ORDER BY s.name DESC, s.id");
    }
}
