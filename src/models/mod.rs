//! Data models for Bookshelf

pub mod author;
pub mod book;

// Re-export commonly used types
pub use author::{Author, AuthorInput};
pub use book::{Book, BookFields, BookInput, BookQuery, BookSearchResult};

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Body returned by delete endpoints
#[derive(Debug, Clone, Copy, Serialize, Deserialize, ToSchema)]
pub struct DeleteResponse {
    pub success: bool,
}
