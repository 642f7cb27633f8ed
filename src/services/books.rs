//! Books service

use crate::{
    error::{AppError, AppResult},
    models::book::{Book, BookFields, BookInput, BookQuery, BookSearchResult, MAX_LIMIT},
    repository::Repository,
};

const FIELDS_REQUIRED: &str = "Title and ISBN are required";
const NOT_FOUND: &str = "Book not found";

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

/// Split a request body into validated fields and the author id list
fn parse_input(data: &BookInput) -> AppResult<(BookFields, &[i64])> {
    let (Some(title), Some(isbn)) = (non_blank(&data.title), non_blank(&data.isbn)) else {
        return Err(AppError::Validation(FIELDS_REQUIRED.to_string()));
    };
    let fields = BookFields {
        title: title.to_string(),
        isbn: isbn.to_string(),
    };
    Ok((fields, data.authors.as_deref().unwrap_or_default()))
}

#[derive(Clone)]
pub struct BooksService {
    repository: Repository,
}

impl BooksService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Search books with pagination; `limit` is capped at [`MAX_LIMIT`]
    pub async fn search(&self, query: &BookQuery) -> AppResult<BookSearchResult> {
        let page = query.page();
        let limit = query.limit();
        if page < 1 || limit < 1 {
            return Err(AppError::BadRequest(
                "page and limit must be positive integers".to_string(),
            ));
        }

        self.repository
            .books
            .search(query.term(), page, limit.min(MAX_LIMIT))
            .await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Book> {
        self.repository
            .books
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(&self, data: &BookInput) -> AppResult<Book> {
        let (fields, author_ids) = parse_input(data)?;
        let book = self.repository.books.create(&fields, author_ids).await?;
        tracing::info!(id = book.id, authors = author_ids.len(), "Book created");
        Ok(book)
    }

    /// Overwrite a book and replace its author set
    pub async fn update(&self, id: i64, data: &BookInput) -> AppResult<Book> {
        let (fields, author_ids) = parse_input(data)?;
        self.repository
            .books
            .update(id, &fields, author_ids)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Delete a book. Unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.books.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn setup() -> (Repository, BooksService) {
        let db = Database::in_memory().await.unwrap();
        let repository = Repository::new(db);
        (repository.clone(), BooksService::new(repository))
    }

    fn assert_validation(err: AppError) {
        assert!(matches!(err, AppError::Validation(ref msg) if msg == "Title and ISBN are required"));
    }

    #[tokio::test]
    async fn create_requires_title_and_isbn() {
        let (_, service) = setup().await;

        let no_isbn = BookInput {
            title: Some("Dune".into()),
            ..Default::default()
        };
        assert_validation(service.create(&no_isbn).await.unwrap_err());

        let blank_title = BookInput::new(" ", "ISBN", vec![]);
        assert_validation(service.create(&blank_title).await.unwrap_err());
    }

    #[tokio::test]
    async fn missing_author_list_means_no_authors() {
        let (_, service) = setup().await;
        let input = BookInput {
            title: Some("Dune".into()),
            isbn: Some("978-0441013593".into()),
            authors: None,
        };
        let book = service.create(&input).await.unwrap();
        assert!(book.authors.is_empty());
    }

    #[tokio::test]
    async fn update_unknown_book_is_not_found() {
        let (_, service) = setup().await;
        let err = service.update(12, &BookInput::new("T", "I", vec![])).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Book not found"));
    }

    #[tokio::test]
    async fn search_rejects_non_positive_paging() {
        let (_, service) = setup().await;
        for (page, limit) in [(0, 10), (-1, 10), (1, 0)] {
            let query = BookQuery {
                search: None,
                page: Some(page),
                limit: Some(limit),
            };
            assert!(matches!(service.search(&query).await, Err(AppError::BadRequest(_))));
        }
    }

    #[tokio::test]
    async fn search_caps_the_page_size() {
        let (repository, service) = setup().await;
        for i in 0..3 {
            repository
                .books
                .create(&BookFields { title: format!("T{i}"), isbn: format!("I{i}") }, &[])
                .await
                .unwrap();
        }

        let query = BookQuery {
            search: None,
            page: None,
            limit: Some(10_000),
        };
        let result = service.search(&query).await.unwrap();
        assert_eq!(result.data.len(), 3);
        assert_eq!(result.pages, 1);
    }

    #[tokio::test]
    async fn author_only_match_is_found_once() {
        let (repository, service) = setup().await;
        let author = repository.authors.create("Frank Herbert").await.unwrap();
        service
            .create(&BookInput::new("Dune", "978-0441013593", vec![author.id]))
            .await
            .unwrap();

        let query = BookQuery {
            search: Some("herbert".into()),
            ..Default::default()
        };
        let result = service.search(&query).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.data.len(), 1);
        assert_eq!(result.data[0].title, "Dune");
    }
}
