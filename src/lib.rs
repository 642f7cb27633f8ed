//! Bookshelf catalogue
//!
//! A REST JSON API for managing books and their authors over SQLite, plus the
//! HTTP client and headless view models used by the catalogue front end.

use std::sync::Arc;

pub mod api;
pub mod client;
pub mod config;
pub mod db;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod ui;

pub use config::AppConfig;
pub use error::{AppError, AppResult};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub services: Arc<services::Services>,
}

impl AppState {
    /// Wire repositories and services over an initialized store
    pub fn new(db: db::Database) -> Self {
        let repository = repository::Repository::new(db);
        Self {
            services: Arc::new(services::Services::new(repository)),
        }
    }
}
