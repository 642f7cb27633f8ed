//! Repository layer for database operations

pub mod authors;
pub mod books;

use crate::db::Database;

/// Main repository struct holding the store handle and per-table repositories
#[derive(Clone)]
pub struct Repository {
    pub db: Database,
    pub authors: authors::AuthorsRepository,
    pub books: books::BooksRepository,
}

impl Repository {
    /// Create a new repository over an initialized store
    pub fn new(db: Database) -> Self {
        Self {
            authors: authors::AuthorsRepository::new(db.pool().clone()),
            books: books::BooksRepository::new(db.pool().clone()),
            db,
        }
    }
}
