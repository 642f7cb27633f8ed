//! Books repository: CRUD, author links and paginated search.
//!
//! Multi-statement writes (book row + `book_authors` rows) run inside one
//! transaction; any failure drops the transaction, which rolls it back.

use std::collections::HashMap;

use sqlx::{Executor, Pool, QueryBuilder, Sqlite, SqliteConnection};

use crate::{
    error::AppResult,
    models::{
        author::Author,
        book::{Book, BookFields, BookSearchResult},
    },
};

/// Matches a LIKE pattern against title, ISBN or any linked author name
const SEARCH_FILTER: &str = r#"
    WHERE b.title LIKE ? ESCAPE '\'
       OR b.isbn LIKE ? ESCAPE '\'
       OR EXISTS (
           SELECT 1 FROM book_authors ba
           JOIN authors a ON a.id = ba.author_id
           WHERE ba.book_id = b.id AND a.name LIKE ? ESCAPE '\'
       )
"#;

/// Build a substring LIKE pattern, escaping the wildcards in `term`
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Authors linked to one book
async fn fetch_book_authors<'e, E>(executor: E, book_id: i64) -> AppResult<Vec<Author>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let authors = sqlx::query_as::<_, Author>(
        r#"
        SELECT a.id, a.name
        FROM authors a
        JOIN book_authors ba ON a.id = ba.author_id
        WHERE ba.book_id = ?
        ORDER BY a.id
        "#,
    )
    .bind(book_id)
    .fetch_all(executor)
    .await?;
    Ok(authors)
}

/// Insert one link row per author id
async fn link_authors(conn: &mut SqliteConnection, book_id: i64, author_ids: &[i64]) -> AppResult<()> {
    for author_id in author_ids {
        sqlx::query("INSERT INTO book_authors (book_id, author_id) VALUES (?, ?)")
            .bind(book_id)
            .bind(*author_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

#[derive(Clone)]
pub struct BooksRepository {
    pool: Pool<Sqlite>,
}

impl BooksRepository {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    // =========================================================================
    // READ
    // =========================================================================

    /// Get a book with its authors
    pub async fn get_by_id(&self, id: i64) -> AppResult<Option<Book>> {
        let book = sqlx::query_as::<_, Book>("SELECT id, title, isbn FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        let Some(mut book) = book else {
            return Ok(None);
        };
        book.authors = fetch_book_authors(&self.pool, id).await?;
        Ok(Some(book))
    }

    /// Load the authors of several books in one query, grouped by book id
    async fn authors_by_book(&self, book_ids: &[i64]) -> AppResult<HashMap<i64, Vec<Author>>> {
        let mut grouped: HashMap<i64, Vec<Author>> = HashMap::new();
        if book_ids.is_empty() {
            return Ok(grouped);
        }

        let mut builder = QueryBuilder::<Sqlite>::new(
            "SELECT ba.book_id, a.id, a.name FROM book_authors ba \
             JOIN authors a ON a.id = ba.author_id WHERE ba.book_id IN (",
        );
        let mut ids = builder.separated(", ");
        for id in book_ids {
            ids.push_bind(*id);
        }
        ids.push_unseparated(") ORDER BY ba.book_id, a.id");

        let rows: Vec<(i64, i64, String)> = builder.build_query_as().fetch_all(&self.pool).await?;
        for (book_id, id, name) in rows {
            grouped.entry(book_id).or_default().push(Author { id, name });
        }
        Ok(grouped)
    }

    // =========================================================================
    // SEARCH
    // =========================================================================

    /// Search books by title, ISBN or author name, with pagination.
    ///
    /// `page` is 1-based; callers validate `page >= 1` and `limit >= 1`.
    pub async fn search(&self, term: Option<&str>, page: i64, limit: i64) -> AppResult<BookSearchResult> {
        let pattern = term.map(like_pattern);
        let filter = if pattern.is_some() { SEARCH_FILTER } else { "" };

        let count_query = format!("SELECT COUNT(*) FROM books b {}", filter);
        let mut count = sqlx::query_scalar::<_, i64>(&count_query);
        if let Some(ref p) = pattern {
            count = count.bind(p.as_str()).bind(p.as_str()).bind(p.as_str());
        }
        let total = count.fetch_one(&self.pool).await?;

        // An offset past i64::MAX is past every row
        let Some(offset) = (page - 1).checked_mul(limit) else {
            tracing::debug!(?term, page, limit, total, "Book search page out of range");
            return Ok(BookSearchResult::new(vec![], total, page, limit));
        };

        let select_query = format!(
            "SELECT b.id, b.title, b.isbn FROM books b {} ORDER BY b.id LIMIT ? OFFSET ?",
            filter
        );
        let mut select = sqlx::query_as::<_, Book>(&select_query);
        if let Some(ref p) = pattern {
            select = select.bind(p.as_str()).bind(p.as_str()).bind(p.as_str());
        }
        let mut books = select.bind(limit).bind(offset).fetch_all(&self.pool).await?;

        let ids: Vec<i64> = books.iter().map(|b| b.id).collect();
        let mut authors = self.authors_by_book(&ids).await?;
        for book in &mut books {
            book.authors = authors.remove(&book.id).unwrap_or_default();
        }

        tracing::debug!(?term, page, limit, total, returned = books.len(), "Book search");

        Ok(BookSearchResult::new(books, total, page, limit))
    }

    // =========================================================================
    // CREATE
    // =========================================================================

    /// Create a book linked to `author_ids`.
    ///
    /// Duplicate or unknown author ids fail the whole insert.
    pub async fn create(&self, fields: &BookFields, author_ids: &[i64]) -> AppResult<Book> {
        let mut tx = self.pool.begin().await?;

        let mut book = sqlx::query_as::<_, Book>(
            "INSERT INTO books (title, isbn) VALUES (?, ?) RETURNING id, title, isbn",
        )
        .bind(&fields.title)
        .bind(&fields.isbn)
        .fetch_one(&mut *tx)
        .await?;

        link_authors(&mut tx, book.id, author_ids).await?;
        book.authors = fetch_book_authors(&mut *tx, book.id).await?;

        tx.commit().await?;
        Ok(book)
    }

    // =========================================================================
    // UPDATE
    // =========================================================================

    /// Overwrite title/ISBN and replace the whole author set.
    ///
    /// Returns `None`, leaving the store untouched, when no book has this id.
    pub async fn update(&self, id: i64, fields: &BookFields, author_ids: &[i64]) -> AppResult<Option<Book>> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query_as::<_, Book>(
            "UPDATE books SET title = ?, isbn = ? WHERE id = ? RETURNING id, title, isbn",
        )
        .bind(&fields.title)
        .bind(&fields.isbn)
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(mut book) = updated else {
            tx.rollback().await?;
            return Ok(None);
        };

        sqlx::query("DELETE FROM book_authors WHERE book_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        link_authors(&mut tx, id, author_ids).await?;
        book.authors = fetch_book_authors(&mut *tx, id).await?;

        tx.commit().await?;
        Ok(Some(book))
    }

    // =========================================================================
    // DELETE
    // =========================================================================

    /// Delete a book; its author links cascade. Succeeds for unknown ids too.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM books WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        tracing::debug!(id, rows = result.rows_affected(), "Book delete");
        Ok(())
    }
}
