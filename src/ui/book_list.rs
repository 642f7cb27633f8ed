//! Paginated, searchable book table with inline editing and guarded deletes

use std::time::Duration;

use crate::{
    client::{CatalogApi, ClientError},
    models::book::{Book, BookQuery, DEFAULT_LIMIT},
};

use super::{book_form::BookForm, with_min_duration, Notice, MIN_ACTION_DURATION};

pub const CREATED_MESSAGE: &str = "Book created successfully";
pub const UPDATED_MESSAGE: &str = "Book updated successfully";
pub const DELETED_MESSAGE: &str = "Book deleted successfully";

#[derive(Debug, Clone)]
pub struct BookList {
    books: Vec<Book>,
    page: i64,
    pages: i64,
    search: String,
    loading: bool,
    busy: bool,
    create_form: Option<BookForm>,
    editing: Option<BookForm>,
    pending_delete: Option<Book>,
    notice: Option<Notice>,
    min_duration: Duration,
}

impl Default for BookList {
    fn default() -> Self {
        Self::new()
    }
}

impl BookList {
    pub fn new() -> Self {
        Self {
            books: Vec::new(),
            page: 1,
            pages: 1,
            search: String::new(),
            loading: true,
            busy: false,
            create_form: None,
            editing: None,
            pending_delete: None,
            notice: None,
            min_duration: MIN_ACTION_DURATION,
        }
    }

    pub fn with_min_duration(mut self, min_duration: Duration) -> Self {
        self.min_duration = min_duration;
        self
    }

    pub fn books(&self) -> &[Book] {
        &self.books
    }

    pub fn page(&self) -> i64 {
        self.page
    }

    pub fn pages(&self) -> i64 {
        self.pages
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// True until the first fetch settles
    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// True while a delete is in flight
    pub fn is_busy(&self) -> bool {
        self.busy
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) {
        self.notice = None;
    }

    fn report(&mut self, error: &ClientError) {
        tracing::warn!("Catalogue request failed: {}", error);
        self.notice = Some(Notice::error(error.user_message()));
    }

    /// Page links to render, `1..=pages`
    pub fn page_numbers(&self) -> Vec<i64> {
        (1..=self.pages.max(1)).collect()
    }

    fn query(&self) -> BookQuery {
        BookQuery {
            search: Some(self.search.clone()),
            page: Some(self.page),
            limit: Some(DEFAULT_LIMIT),
        }
    }

    // =========================================================================
    // FETCHING
    // =========================================================================

    /// Re-fetch the current page for the current search term
    pub async fn refresh<A: CatalogApi + ?Sized>(&mut self, api: &A) {
        let query = self.query();
        match api.search_books(&query).await {
            Ok(result) => {
                self.books = result.data;
                self.pages = result.pages;
                self.page = result.page;
            }
            Err(e) => self.report(&e),
        }
        self.loading = false;
    }

    /// Apply a keystroke in the search box: back to page 1, fetch again
    pub async fn set_search<A: CatalogApi + ?Sized>(&mut self, api: &A, term: impl Into<String>) {
        self.search = term.into();
        self.page = 1;
        self.refresh(api).await;
    }

    pub async fn clear_search<A: CatalogApi + ?Sized>(&mut self, api: &A) {
        self.set_search(api, String::new()).await;
    }

    /// Jump to a page; out-of-range pages are ignored
    pub async fn go_to_page<A: CatalogApi + ?Sized>(&mut self, api: &A, page: i64) {
        if page < 1 || page > self.pages.max(1) || page == self.page {
            return;
        }
        self.page = page;
        self.refresh(api).await;
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    pub fn create_form(&mut self) -> Option<&mut BookForm> {
        self.create_form.as_mut()
    }

    pub async fn open_create_form<A: CatalogApi + ?Sized>(&mut self, api: &A) {
        let mut form = BookForm::new().with_min_duration(self.min_duration);
        if let Err(e) = form.mount(api).await {
            self.report(&e);
        }
        self.create_form = Some(form);
    }

    pub fn close_create_form(&mut self) {
        self.create_form = None;
    }

    /// Submit the create form; on success close it and reload the page
    pub async fn submit_create<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Option<Book> {
        let mut form = self.create_form.take()?;
        match form.submit(api).await {
            Ok(book) => {
                self.refresh(api).await;
                self.notice = Some(Notice::success(CREATED_MESSAGE));
                Some(book)
            }
            Err(e) => {
                self.report(&e);
                self.create_form = Some(form);
                None
            }
        }
    }

    // =========================================================================
    // EDIT IN PLACE
    // =========================================================================

    /// Id of the row currently replaced by a form
    pub fn editing_id(&self) -> Option<i64> {
        self.editing.as_ref().and_then(|f| f.book_id())
    }

    pub fn edit_form(&mut self) -> Option<&mut BookForm> {
        self.editing.as_mut()
    }

    /// Turn one row into an edit form; any other row being edited is dropped
    pub async fn start_edit<A: CatalogApi + ?Sized>(&mut self, api: &A, book_id: i64) {
        let Some(book) = self.books.iter().find(|b| b.id == book_id) else {
            return;
        };
        let mut form = BookForm::edit(book).with_min_duration(self.min_duration);
        if let Err(e) = form.mount(api).await {
            self.report(&e);
        }
        self.editing = Some(form);
    }

    pub fn cancel_edit(&mut self) {
        self.editing = None;
    }

    pub async fn submit_edit<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Option<Book> {
        let mut form = self.editing.take()?;
        match form.submit(api).await {
            Ok(book) => {
                self.refresh(api).await;
                self.notice = Some(Notice::success(UPDATED_MESSAGE));
                Some(book)
            }
            Err(e) => {
                self.report(&e);
                self.editing = Some(form);
                None
            }
        }
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Book awaiting delete confirmation
    pub fn pending_delete(&self) -> Option<&Book> {
        self.pending_delete.as_ref()
    }

    /// Open the confirmation dialog for a row
    pub fn request_delete(&mut self, book_id: i64) {
        self.pending_delete = self.books.iter().find(|b| b.id == book_id).cloned();
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the book awaiting confirmation, then reload the page
    pub async fn confirm_delete<A: CatalogApi + ?Sized>(&mut self, api: &A) -> bool {
        let Some(book) = self.pending_delete.take() else {
            return false;
        };

        self.busy = true;
        let result = with_min_duration(self.min_duration, api.delete_book(book.id)).await;
        self.busy = false;

        let deleted = match result {
            Ok(()) => {
                self.notice = Some(Notice::success(DELETED_MESSAGE));
                true
            }
            Err(e) => {
                self.report(&e);
                false
            }
        };
        self.refresh(api).await;
        deleted
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        client::MockCatalogApi,
        models::{book::BookSearchResult, BookInput},
        ui::NoticeKind,
    };
    use mockall::Sequence;
    use reqwest::StatusCode;

    fn book(id: i64, title: &str) -> Book {
        Book {
            id,
            title: title.to_string(),
            isbn: format!("ISBN-{id}"),
            authors: vec![],
        }
    }

    fn page_of(books: Vec<Book>, total: i64, page: i64) -> BookSearchResult {
        BookSearchResult::new(books, total, page, DEFAULT_LIMIT)
    }

    fn list() -> BookList {
        BookList::new().with_min_duration(Duration::ZERO)
    }

    #[tokio::test]
    async fn refresh_loads_the_first_page() {
        let mut api = MockCatalogApi::new();
        api.expect_search_books()
            .withf(|q: &BookQuery| q.page == Some(1) && q.limit == Some(10))
            .times(1)
            .returning(|_| Ok(page_of(vec![book(1, "A"), book(2, "B")], 12, 1)));

        let mut list = list();
        assert!(list.is_loading());
        list.refresh(&api).await;

        assert!(!list.is_loading());
        assert_eq!(list.books().len(), 2);
        assert_eq!(list.pages(), 2);
        assert_eq!(list.page_numbers(), vec![1, 2]);
    }

    #[tokio::test]
    async fn each_keystroke_resets_to_page_one_and_fetches() {
        let mut api = MockCatalogApi::new();
        let mut seq = Sequence::new();
        api.expect_search_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(1, "A")], 30, 1)));
        api.expect_search_books()
            .withf(|q: &BookQuery| q.page == Some(3))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(21, "U")], 30, 3)));
        api.expect_search_books()
            .withf(|q: &BookQuery| q.page == Some(1) && q.search.as_deref() == Some("d"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(4, "Dune")], 1, 1)));
        api.expect_search_books()
            .withf(|q: &BookQuery| q.page == Some(1) && q.search.as_deref() == Some("du"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(4, "Dune")], 1, 1)));

        let mut list = list();
        list.refresh(&api).await;
        list.go_to_page(&api, 3).await;
        assert_eq!(list.page(), 3);

        list.set_search(&api, "d").await;
        list.set_search(&api, "du").await;
        assert_eq!(list.page(), 1);
        assert_eq!(list.search(), "du");
        assert_eq!(list.books()[0].title, "Dune");
    }

    #[tokio::test]
    async fn out_of_range_pages_are_ignored() {
        let api = MockCatalogApi::new();
        let mut list = list();
        list.go_to_page(&api, 0).await;
        list.go_to_page(&api, 5).await;
        assert_eq!(list.page(), 1);
    }

    #[tokio::test]
    async fn fetch_failure_shows_the_server_message() {
        let mut api = MockCatalogApi::new();
        api.expect_search_books().returning(|_| {
            Err(ClientError::Api {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                message: "database is locked".to_string(),
            })
        });

        let mut list = list();
        list.refresh(&api).await;
        assert!(!list.is_loading());
        assert_eq!(list.notice(), Some(&Notice::error("database is locked")));

        list.dismiss_notice();
        assert_eq!(list.notice(), None);
    }

    #[tokio::test]
    async fn delete_requires_confirmation() {
        let mut api = MockCatalogApi::new();
        api.expect_search_books()
            .times(1)
            .returning(|_| Ok(page_of(vec![book(1, "A"), book(2, "B")], 2, 1)));
        api.expect_delete_book().never();

        let mut list = list();
        list.refresh(&api).await;

        list.request_delete(2);
        assert_eq!(list.pending_delete().map(|b| b.id), Some(2));
        list.cancel_delete();
        assert!(!list.confirm_delete(&api).await);
    }

    #[tokio::test]
    async fn confirmed_delete_reloads_and_notifies() {
        let mut api = MockCatalogApi::new();
        let mut seq = Sequence::new();
        api.expect_search_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(1, "A"), book(2, "B")], 2, 1)));
        api.expect_delete_book()
            .withf(|id: &i64| *id == 2)
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));
        api.expect_search_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(1, "A")], 1, 1)));

        let mut list = list();
        list.refresh(&api).await;
        list.request_delete(2);
        assert!(list.confirm_delete(&api).await);

        assert!(!list.is_busy());
        assert_eq!(list.books().len(), 1);
        assert_eq!(list.notice().map(|n| n.kind), Some(NoticeKind::Success));
        assert_eq!(list.pending_delete(), None);
    }

    #[tokio::test]
    async fn edit_in_place_round_trip() {
        let mut api = MockCatalogApi::new();
        let mut seq = Sequence::new();
        api.expect_search_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(1, "Old")], 1, 1)));
        api.expect_list_authors()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|| Ok(vec![]));
        api.expect_update_book()
            .withf(|id: &i64, input: &BookInput| *id == 1 && input.title.as_deref() == Some("New"))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|id, _| Ok(book(id, "New")));
        api.expect_search_books()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(page_of(vec![book(1, "New")], 1, 1)));

        let mut list = list();
        list.refresh(&api).await;
        list.start_edit(&api, 1).await;
        assert_eq!(list.editing_id(), Some(1));

        list.edit_form().unwrap().title = "New".to_string();
        let saved = list.submit_edit(&api).await.unwrap();

        assert_eq!(saved.title, "New");
        assert_eq!(list.editing_id(), None);
        assert_eq!(list.books()[0].title, "New");
        assert_eq!(list.notice(), Some(&Notice::success(UPDATED_MESSAGE)));
    }

    #[tokio::test]
    async fn failed_create_keeps_the_form_open() {
        let mut api = MockCatalogApi::new();
        api.expect_list_authors().returning(|| Ok(vec![]));
        api.expect_create_book().returning(|_| {
            Err(ClientError::Api {
                status: StatusCode::BAD_REQUEST,
                message: "Title and ISBN are required".to_string(),
            })
        });
        api.expect_search_books().never();

        let mut list = list();
        list.open_create_form(&api).await;
        assert!(list.submit_create(&api).await.is_none());

        assert!(list.create_form().is_some());
        assert_eq!(list.notice(), Some(&Notice::error("Title and ISBN are required")));
    }
}
