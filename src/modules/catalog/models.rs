//! Request and response shapes for the catalog.

use agora_http::FieldErrors;
use chrono::Datelike;
use serde::{Deserialize, Serialize};
use validator::Validate;

use super::entities::{author, book, librarian, library};

/// Book payload. On PATCH every field is optional; otherwise all are required.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct BookInput {
    #[validate(length(min = 1, max = 300))]
    pub title: Option<String>,
    pub publication_year: Option<i32>,
    /// Author id
    pub author: Option<i64>,
}

impl BookInput {
    /// Check field rules. `partial` skips the required-field checks.
    pub fn field_errors(&self, partial: bool) -> FieldErrors {
        let mut errors: FieldErrors = self.validate().err().map(Into::into).unwrap_or_default();

        if !partial {
            for (field, present) in [
                ("title", self.title.is_some()),
                ("publication_year", self.publication_year.is_some()),
                ("author", self.author.is_some()),
            ] {
                if !present {
                    errors.add(field, "This field is required.");
                }
            }
        }

        if let Some(year) = self.publication_year {
            if let Err(message) = check_publication_year(year) {
                errors.add("publication_year", message);
            }
        }

        errors
    }
}

/// A publication year may not be later than the current UTC year.
pub fn check_publication_year(year: i32) -> Result<(), String> {
    let current_year = chrono::Utc::now().year();
    if year > current_year {
        return Err(format!(
            "Publication year cannot be in the future. Current year is {current_year}."
        ));
    }
    Ok(())
}

#[derive(Debug, Clone, Serialize)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub publication_year: i32,
    pub author: i64,
}

impl From<book::Model> for Book {
    fn from(model: book::Model) -> Self {
        Self {
            id: model.id,
            title: model.title,
            publication_year: model.publication_year,
            author: model.author_id,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct NameInput {
    #[validate(required, length(min = 1, max = 200))]
    pub name: Option<String>,
}

impl NameInput {
    pub fn into_name(self) -> Result<String, FieldErrors> {
        self.validate().map_err(FieldErrors::from)?;
        Ok(self.name.unwrap_or_default())
    }
}

/// Author with their books nested.
#[derive(Debug, Clone, Serialize)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub books: Vec<Book>,
}

impl Author {
    pub fn new(model: author::Model, mut books: Vec<book::Model>) -> Self {
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Self {
            id: model.id,
            name: model.name,
            books: books.into_iter().map(Book::from).collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Librarian {
    pub id: i64,
    pub name: String,
    pub library: i64,
}

impl From<librarian::Model> for Librarian {
    fn from(model: librarian::Model) -> Self {
        Self {
            id: model.id,
            name: model.name,
            library: model.library_id,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Library {
    pub id: i64,
    pub name: String,
    pub books: Vec<Book>,
    pub librarian: Option<Librarian>,
}

impl Library {
    pub fn new(
        model: library::Model,
        mut books: Vec<book::Model>,
        librarian: Option<librarian::Model>,
    ) -> Self {
        books.sort_by(|a, b| a.title.cmp(&b.title).then(a.id.cmp(&b.id)));
        Self {
            id: model.id,
            name: model.name,
            books: books.into_iter().map(Book::from).collect(),
            librarian: librarian.map(Librarian::from),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn future_year_is_rejected() {
        let next_year = chrono::Utc::now().year() + 1;
        assert!(check_publication_year(next_year).is_err());
        assert!(check_publication_year(1949).is_ok());
        assert!(check_publication_year(chrono::Utc::now().year()).is_ok());
    }

    #[test]
    fn full_update_requires_every_field() {
        let errors = BookInput::default().field_errors(false);
        assert!(errors.contains("title"));
        assert!(errors.contains("publication_year"));
        assert!(errors.contains("author"));

        assert!(BookInput::default().field_errors(true).is_empty());
    }

    #[test]
    fn partial_update_still_checks_supplied_fields() {
        let input = BookInput {
            title: Some(String::new()),
            publication_year: Some(chrono::Utc::now().year() + 5),
            author: None,
        };
        let errors = input.field_errors(true);
        assert!(errors.contains("title"));
        assert!(errors.contains("publication_year"));
        assert!(!errors.contains("author"));
    }
}
