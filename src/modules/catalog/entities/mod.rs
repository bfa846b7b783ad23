//! Catalog tables: authors own books, libraries hold books and have one
//! librarian.

pub mod author;
pub mod book;
pub mod librarian;
pub mod library;
pub mod library_book;

pub use author::Entity as Author;
pub use book::Entity as Book;
pub use librarian::Entity as Librarian;
pub use library::Entity as Library;
pub use library_book::Entity as LibraryBook;
