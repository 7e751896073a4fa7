//! Query-building helpers shared by the stores.

use sea_orm::sea_query::{Expr, Func, LikeExpr, SimpleExpr};

const LIKE_ESCAPE: char = '\\';

/// Builds `LOWER(expr) LIKE '%term%'`, with `term` lower-cased and its
/// wildcard characters escaped.
///
/// Portable across PostgreSQL and SQLite, unlike `ILIKE`.
pub fn contains_ignore_case<E>(expr: E, term: &str) -> SimpleExpr
where
    E: Into<SimpleExpr>,
{
    let pattern = format!("%{}%", escape_like(&term.to_lowercase()));
    Expr::expr(Func::lower(expr)).like(LikeExpr::new(pattern).escape(LIKE_ESCAPE))
}

fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '%' | '_' | LIKE_ESCAPE) {
            escaped.push(LIKE_ESCAPE);
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_like_wildcards() {
        assert_eq!(escape_like("100%_done\\"), "100\\%\\_done\\\\");
        assert_eq!(escape_like("Test Task 2"), "Test Task 2");
    }
}
