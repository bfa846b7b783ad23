//! Project-specific utilities live here.

use sea_orm::{
    sea_query::{Expr, LikeExpr, SimpleExpr},
    ColumnTrait,
};

const LIKE_ESCAPE: char = '\\';

/// Split a `search` query into terms on whitespace and commas.
///
/// Every term must match for a row to be returned.
pub fn search_terms(raw: Option<&str>) -> Vec<String> {
    raw.unwrap_or_default()
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|term| !term.is_empty())
        .map(str::to_string)
        .collect()
}

/// `%term%` with LIKE wildcards in `term` escaped.
pub fn substring_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_') || c == LIKE_ESCAPE {
            pattern.push(LIKE_ESCAPE);
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Case-insensitive substring match on `column` (SQLite `LIKE`), treating
/// `%` and `_` in `term` literally.
pub fn icontains<C: ColumnTrait>(column: C, term: &str) -> SimpleExpr {
    Expr::col((column.entity_name(), column))
        .like(LikeExpr::new(substring_pattern(term)).escape(LIKE_ESCAPE))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_whitespace_and_commas() {
        assert_eq!(
            search_terms(Some("  orwell  1984,farm ")),
            vec!["orwell", "1984", "farm"]
        );
    }

    #[test]
    fn blank_search_has_no_terms() {
        assert!(search_terms(Some("   ")).is_empty());
        assert!(search_terms(Some(",,")).is_empty());
        assert!(search_terms(None).is_empty());
    }

    #[test]
    fn wildcards_are_escaped() {
        assert_eq!(substring_pattern("farm"), "%farm%");
        assert_eq!(substring_pattern("50%"), "%50\\%%");
        assert_eq!(substring_pattern("a_b"), "%a\\_b%");
        assert_eq!(substring_pattern("c:\\"), "%c:\\\\%");
    }
}
