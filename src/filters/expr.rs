// src/filters/expr.rs

use sqlx::{Postgres, QueryBuilder};

/// Predicado folha que sabe se escrever como SQL.
/// Todo valor vindo do cliente deve entrar via `push_bind`.
pub trait SqlPredicate {
    fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>);
}

// Árvore booleana de predicados: AND / OR / NOT sobre folhas tipadas
#[derive(Debug, Clone, PartialEq)]
pub enum Expr<P> {
    Leaf(P),
    Not(Box<Expr<P>>),
    And(Vec<Expr<P>>),
    Or(Vec<Expr<P>>),
}

impl<P> Expr<P> {
    pub fn leaf(predicate: P) -> Self {
        Expr::Leaf(predicate)
    }

    pub fn negate(self) -> Self {
        Expr::Not(Box::new(self))
    }

    pub fn and(self, other: Self) -> Self {
        match self {
            Expr::And(mut items) => {
                items.push(other);
                Expr::And(items)
            }
            first => Expr::And(vec![first, other]),
        }
    }

    pub fn or(self, other: Self) -> Self {
        match self {
            Expr::Or(mut items) => {
                items.push(other);
                Expr::Or(items)
            }
            first => Expr::Or(vec![first, other]),
        }
    }

    /// Junta as condições com AND. Sem condições não há filtro.
    pub fn all(mut exprs: Vec<Self>) -> Option<Self> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::And(exprs)),
        }
    }

    /// Junta as condições com OR. Sem condições não há filtro.
    pub fn any(mut exprs: Vec<Self>) -> Option<Self> {
        match exprs.len() {
            0 => None,
            1 => exprs.pop(),
            _ => Some(Expr::Or(exprs)),
        }
    }
}

impl<P: SqlPredicate> Expr<P> {
    pub fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
        match self {
            Expr::Leaf(predicate) => predicate.push_sql(qb),
            Expr::Not(inner) => {
                qb.push("NOT (");
                inner.push_sql(qb);
                qb.push(")");
            }
            Expr::And(items) => push_joined(qb, items, " AND ", "TRUE"),
            Expr::Or(items) => push_joined(qb, items, " OR ", "FALSE"),
        }
    }
}

fn push_joined<'args, P: SqlPredicate>(
    qb: &mut QueryBuilder<'args, Postgres>,
    items: &[Expr<P>],
    separator: &str,
    empty: &str,
) {
    if items.is_empty() {
        qb.push(empty);
        return;
    }
    qb.push("(");
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            qb.push(separator);
        }
        item.push_sql(qb);
    }
    qb.push(")");
}

/// Acrescenta " WHERE ..." quando existe filtro.
pub fn push_where<'args, P: SqlPredicate>(qb: &mut QueryBuilder<'args, Postgres>, filter: Option<&Expr<P>>) {
    if let Some(expr) = filter {
        qb.push(" WHERE ");
        expr.push_sql(qb);
    }
}

// Avaliação em memória, usada pelos testes para conferir a semântica das árvores
#[cfg(test)]
impl<P> Expr<P> {
    pub fn evaluate<F: Fn(&P) -> bool>(&self, leaf: &F) -> bool {
        match self {
            Expr::Leaf(p) => leaf(p),
            Expr::Not(inner) => !inner.evaluate(leaf),
            Expr::And(items) => items.iter().all(|e| e.evaluate(leaf)),
            Expr::Or(items) => items.iter().any(|e| e.evaluate(leaf)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    enum Toy {
        Eq(&'static str, i32),
    }

    impl SqlPredicate for Toy {
        fn push_sql<'args>(&self, qb: &mut QueryBuilder<'args, Postgres>) {
            let Toy::Eq(column, value) = self;
            qb.push(*column).push(" = ").push_bind(*value);
        }
    }

    fn render(expr: Option<&Expr<Toy>>) -> String {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT 1 FROM t");
        push_where(&mut qb, expr);
        qb.sql().to_string()
    }

    #[test]
    fn renders_nested_tree_with_placeholders() {
        let expr = Expr::leaf(Toy::Eq("a", 1))
            .negate()
            .and(Expr::leaf(Toy::Eq("b", 2)).or(Expr::leaf(Toy::Eq("c", 3))));
        assert_eq!(
            render(Some(&expr)),
            "SELECT 1 FROM t WHERE (NOT (a = $1) AND (b = $2 OR c = $3))"
        );
    }

    #[test]
    fn no_filter_means_no_where() {
        assert_eq!(render(None), "SELECT 1 FROM t");
    }

    #[test]
    fn empty_groups_render_as_constants() {
        assert_eq!(render(Some(&Expr::And(vec![]))), "SELECT 1 FROM t WHERE TRUE");
        assert_eq!(render(Some(&Expr::Or(vec![]))), "SELECT 1 FROM t WHERE FALSE");
    }

    #[test]
    fn all_and_any_collapse_single_items() {
        assert_eq!(Expr::<Toy>::all(vec![]), None);
        assert_eq!(
            Expr::all(vec![Expr::leaf(Toy::Eq("a", 1))]),
            Some(Expr::leaf(Toy::Eq("a", 1)))
        );
        assert!(matches!(
            Expr::any(vec![Expr::leaf(Toy::Eq("a", 1)), Expr::leaf(Toy::Eq("b", 2))]),
            Some(Expr::Or(items)) if items.len() == 2
        ));
    }

    #[test]
    fn chained_and_flattens() {
        let expr = Expr::leaf(Toy::Eq("a", 1))
            .and(Expr::leaf(Toy::Eq("b", 2)))
            .and(Expr::leaf(Toy::Eq("c", 3)));
        assert!(matches!(expr, Expr::And(ref items) if items.len() == 3));
    }

    #[test]
    fn evaluates_boolean_algebra() {
        let expr = Expr::leaf(Toy::Eq("a", 1))
            .negate()
            .and(Expr::leaf(Toy::Eq("b", 2)).or(Expr::leaf(Toy::Eq("c", 3))));
        let truthy = |set: &'static [&'static str]| move |p: &Toy| {
            let Toy::Eq(col, _) = p;
            set.contains(col)
        };
        assert!(expr.evaluate(&truthy(&["b"])));
        assert!(!expr.evaluate(&truthy(&["a", "b"])));
        assert!(!expr.evaluate(&truthy(&[])));
    }
}
