//! Query-string filtering, search and ordering for the book list.

use agora_http::{AppError, FieldErrors};
use sea_orm::{
    ColumnTrait, Condition, JoinType, Order, QueryFilter, QueryOrder, QuerySelect, RelationTrait,
    Select,
};
use serde::Deserialize;

use super::entities::{author, book};
use crate::utils::{icontains, search_terms};

/// Raw `?title=&author=&publication_year=&search=&ordering=` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookQuery {
    pub title: Option<String>,
    pub author: Option<String>,
    pub publication_year: Option<String>,
    pub search: Option<String>,
    pub ordering: Option<String>,
}

/// Parsed and validated book query.
#[derive(Debug, Clone, PartialEq)]
pub struct BookFilter {
    pub title: Option<String>,
    pub author: Option<i64>,
    pub publication_year: Option<i32>,
    pub search_terms: Vec<String>,
    pub ordering: Vec<(SortKey, Order)>,
}

/// Fields the book list can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Title,
    PublicationYear,
    Id,
}

impl SortKey {
    fn column(self) -> book::Column {
        match self {
            SortKey::Title => book::Column::Title,
            SortKey::PublicationYear => book::Column::PublicationYear,
            SortKey::Id => book::Column::Id,
        }
    }
}

impl BookQuery {
    pub fn parse(self) -> Result<BookFilter, AppError> {
        let mut errors = FieldErrors::new();

        let author = non_empty(self.author).and_then(|raw| match raw.parse::<i64>() {
            Ok(id) => Some(id),
            Err(_) => {
                errors.add("author", "Select a valid choice. That choice is not one of the available choices.");
                None
            }
        });
        let publication_year =
            non_empty(self.publication_year).and_then(|raw| match raw.parse::<i32>() {
                Ok(year) => Some(year),
                Err(_) => {
                    errors.add("publication_year", "Enter a number.");
                    None
                }
            });
        errors.into_result()?;

        Ok(BookFilter {
            title: non_empty(self.title),
            author,
            publication_year,
            search_terms: search_terms(self.search.as_deref()),
            ordering: parse_ordering(self.ordering.as_deref()),
        })
    }
}

impl BookFilter {
    pub fn apply(&self, mut select: Select<book::Entity>) -> Select<book::Entity> {
        if let Some(title) = &self.title {
            select = select.filter(book::Column::Title.eq(title.as_str()));
        }
        if let Some(author_id) = self.author {
            select = select.filter(book::Column::AuthorId.eq(author_id));
        }
        if let Some(year) = self.publication_year {
            select = select.filter(book::Column::PublicationYear.eq(year));
        }

        if !self.search_terms.is_empty() {
            select = select.join(JoinType::LeftJoin, book::Relation::Author.def());
            for term in &self.search_terms {
                select = select.filter(
                    Condition::any()
                        .add(icontains(book::Column::Title, term))
                        .add(icontains(author::Column::Name, term)),
                );
            }
        }

        for (key, order) in &self.ordering {
            select = select.order_by(key.column(), order.clone());
        }
        if !self.ordering.iter().any(|(key, _)| *key == SortKey::Id) {
            select = select.order_by_asc(book::Column::Id);
        }

        select
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Parse `ordering=-publication_year,title`. Unknown keys are ignored; an
/// empty result falls back to ordering by title.
pub fn parse_ordering(raw: Option<&str>) -> Vec<(SortKey, Order)> {
    let mut ordering = Vec::new();

    for key in raw.unwrap_or_default().split(',').map(str::trim) {
        let (name, order) = match key.strip_prefix('-') {
            Some(name) => (name, Order::Desc),
            None => (key, Order::Asc),
        };
        let key = match name {
            "title" => SortKey::Title,
            "publication_year" => SortKey::PublicationYear,
            "id" => SortKey::Id,
            _ => continue,
        };
        if !ordering.iter().any(|(k, _)| *k == key) {
            ordering.push((key, order));
        }
    }

    if ordering.is_empty() {
        ordering.push((SortKey::Title, Order::Asc));
    }
    ordering
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ordering_defaults_to_title() {
        assert_eq!(
            parse_ordering(None),
            vec![(SortKey::Title, Order::Asc)]
        );
        assert_eq!(
            parse_ordering(Some("shoe_size")),
            vec![(SortKey::Title, Order::Asc)]
        );
    }

    #[test]
    fn ordering_reads_direction_and_skips_unknown_keys() {
        assert_eq!(
            parse_ordering(Some("-publication_year, bogus ,title")),
            vec![
                (SortKey::PublicationYear, Order::Desc),
                (SortKey::Title, Order::Asc),
            ]
        );
    }

    #[test]
    fn bad_year_filter_is_a_field_error() {
        let query = BookQuery {
            publication_year: Some("nineteen".into()),
            ..Default::default()
        };
        let err = query.parse().unwrap_err();
        assert!(matches!(err, AppError::Validation { ref fields, .. } if fields.contains("publication_year")));
    }

    #[test]
    fn blank_filters_are_ignored() {
        let query = BookQuery {
            title: Some(String::new()),
            author: Some(" ".into()),
            ..Default::default()
        };
        let filter = query.parse().unwrap();
        assert_eq!(filter.title, None);
        assert_eq!(filter.author, None);
    }
}
