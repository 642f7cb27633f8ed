//! Book model, search query and paginated result

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::{IntoParams, ToSchema};

use super::author::Author;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

/// Book with its authors
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub isbn: String,
    /// Associated authors, in store order
    #[sqlx(skip)]
    #[serde(default)]
    pub authors: Vec<Author>,
}

impl Book {
    pub fn author_ids(&self) -> Vec<i64> {
        self.authors.iter().map(|a| a.id).collect()
    }
}

/// Create / update book request
#[derive(Debug, Clone, Default, Serialize, Deserialize, ToSchema)]
pub struct BookInput {
    pub title: Option<String>,
    pub isbn: Option<String>,
    /// Author ids; the association set is replaced on update
    pub authors: Option<Vec<i64>>,
}

impl BookInput {
    pub fn new(title: impl Into<String>, isbn: impl Into<String>, authors: Vec<i64>) -> Self {
        Self {
            title: Some(title.into()),
            isbn: Some(isbn.into()),
            authors: Some(authors),
        }
    }
}

/// Validated book fields handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookFields {
    pub title: String,
    pub isbn: String,
}

/// Book search query
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring matched against title, ISBN and author names
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    /// Page number, 1-based (default: 1)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<i64>,
    /// Books per page (default: 10, max: 100)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<i64>,
}

impl BookQuery {
    pub fn page(&self) -> i64 {
        self.page.unwrap_or(DEFAULT_PAGE)
    }

    pub fn limit(&self) -> i64 {
        self.limit.unwrap_or(DEFAULT_LIMIT)
    }

    /// Search term, `None` when absent or blank
    pub fn term(&self) -> Option<&str> {
        self.search.as_deref().filter(|s| !s.trim().is_empty())
    }
}

/// One page of search results
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BookSearchResult {
    pub data: Vec<Book>,
    /// Total number of matching books
    pub total: i64,
    /// Requested page, echoed back
    pub page: i64,
    /// `ceil(total / limit)`
    pub pages: i64,
}

impl BookSearchResult {
    pub fn new(data: Vec<Book>, total: i64, page: i64, limit: i64) -> Self {
        Self {
            data,
            total,
            page,
            pages: page_count(total, limit),
        }
    }
}

pub fn page_count(total: i64, limit: i64) -> i64 {
    if limit <= 0 {
        return 0;
    }
    (total + limit - 1) / limit
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_count_rounds_up() {
        assert_eq!(page_count(0, 10), 0);
        assert_eq!(page_count(1, 10), 1);
        assert_eq!(page_count(10, 10), 1);
        assert_eq!(page_count(11, 10), 2);
        assert_eq!(page_count(25, 10), 3);
    }

    #[test]
    fn blank_search_is_no_search() {
        let query = BookQuery {
            search: Some("   ".into()),
            ..Default::default()
        };
        assert_eq!(query.term(), None);
        assert_eq!(query.page(), 1);
        assert_eq!(query.limit(), 10);
    }

    #[test]
    fn book_without_authors_field_deserializes() {
        let book: Book = serde_json::from_str(r#"{"id":3,"title":"T","isbn":"I"}"#).unwrap();
        assert!(book.authors.is_empty());
    }
}
