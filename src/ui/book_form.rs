//! Create / edit form for a single book

use std::time::Duration;

use crate::{
    client::{CatalogApi, ClientError},
    models::book::{Book, BookInput},
};

use super::{author_picker::AuthorPicker, with_min_duration, MIN_ACTION_DURATION};

#[derive(Debug, Clone)]
pub struct BookForm {
    book_id: Option<i64>,
    pub title: String,
    pub isbn: String,
    pub authors: AuthorPicker,
    submitting: bool,
    min_duration: Duration,
}

impl Default for BookForm {
    fn default() -> Self {
        Self::new()
    }
}

impl BookForm {
    /// Empty form creating a new book
    pub fn new() -> Self {
        Self {
            book_id: None,
            title: String::new(),
            isbn: String::new(),
            authors: AuthorPicker::default(),
            submitting: false,
            min_duration: MIN_ACTION_DURATION,
        }
    }

    /// Form pre-filled from an existing book
    pub fn edit(book: &Book) -> Self {
        Self {
            book_id: Some(book.id),
            title: book.title.clone(),
            isbn: book.isbn.clone(),
            authors: AuthorPicker::new(book.authors.clone()),
            ..Self::new()
        }
    }

    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn book_id(&self) -> Option<i64> {
        self.book_id
    }

    pub fn is_editing(&self) -> bool {
        self.book_id.is_some()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.submitting {
            "Saving..."
        } else if self.is_editing() {
            "Update Book"
        } else {
            "Create Book"
        }
    }

    /// Request body for the current field values
    pub fn input(&self) -> BookInput {
        BookInput::new(self.title.clone(), self.isbn.clone(), self.authors.selected_ids())
    }

    /// Load the author list for the picker
    pub async fn mount<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Result<(), ClientError> {
        self.authors.load(api).await
    }

    /// Create or update the book, padded to the minimum visible duration
    pub async fn submit<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Result<Book, ClientError> {
        self.submitting = true;
        let book_id = self.book_id;
        let input = self.input();

        let result = with_min_duration(self.min_duration, async {
            match book_id {
                Some(id) => api.update_book(id, &input).await,
                None => api.create_book(&input).await,
            }
        })
        .await;

        self.submitting = false;
        if let Err(ref e) = result {
            tracing::warn!(?book_id, "Book save failed: {}", e);
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{client::MockCatalogApi, models::author::Author};
    use reqwest::StatusCode;

    fn book() -> Book {
        Book {
            id: 4,
            title: "Dune".to_string(),
            isbn: "978-0441013593".to_string(),
            authors: vec![Author {
                id: 2,
                name: "Frank Herbert".to_string(),
            }],
        }
    }

    #[test]
    fn edit_prefills_fields() {
        let form = BookForm::edit(&book());
        assert!(form.is_editing());
        assert_eq!(form.title, "Dune");
        assert_eq!(form.authors.selected_ids(), vec![2]);
        assert_eq!(form.submit_label(), "Update Book");
        assert_eq!(BookForm::new().submit_label(), "Create Book");
    }

    #[tokio::test]
    async fn new_form_submits_a_create() {
        let mut api = MockCatalogApi::new();
        api.expect_create_book()
            .withf(|input: &BookInput| {
                input.title.as_deref() == Some("Neuromancer") && input.authors.as_deref() == Some(&[][..])
            })
            .times(1)
            .returning(|_| {
                Ok(Book {
                    id: 1,
                    title: "Neuromancer".to_string(),
                    isbn: "X".to_string(),
                    authors: vec![],
                })
            });

        let mut form = BookForm::new().with_min_duration(Duration::ZERO);
        form.title = "Neuromancer".to_string();
        form.isbn = "X".to_string();

        let saved = form.submit(&api).await.unwrap();
        assert_eq!(saved.id, 1);
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn edit_form_submits_an_update_with_author_ids() {
        let mut api = MockCatalogApi::new();
        api.expect_update_book()
            .withf(|id: &i64, input: &BookInput| *id == 4 && input.authors.as_deref() == Some(&[2][..]))
            .times(1)
            .returning(|_, _| Ok(book()));

        let mut form = BookForm::edit(&book()).with_min_duration(Duration::ZERO);
        let saved = form.submit(&api).await.unwrap();
        assert_eq!(saved, book());
    }

    #[tokio::test]
    async fn failed_submit_clears_the_submitting_flag() {
        let mut api = MockCatalogApi::new();
        api.expect_create_book().returning(|_| {
            Err(ClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "Title and ISBN are required".to_string(),
            })
        });

        let mut form = BookForm::new().with_min_duration(Duration::ZERO);
        let err = form.submit(&api).await.unwrap_err();
        assert_eq!(err.user_message(), "Title and ISBN are required");
        assert!(!form.is_submitting());
    }

    #[tokio::test]
    async fn mount_loads_authors() {
        let mut api = MockCatalogApi::new();
        api.expect_list_authors().returning(|| Ok(book().authors));

        let mut form = BookForm::new();
        form.mount(&api).await.unwrap();
        assert_eq!(form.authors.known().len(), 1);
    }
}
