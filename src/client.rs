//! HTTP client for the catalogue API.
//!
//! [`CatalogApi`] is the seam the view models in [`crate::ui`] talk to;
//! [`CatalogClient`] implements it over `reqwest`.

use async_trait::async_trait;
use reqwest::{Response, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::{
    error::ErrorResponse,
    models::{
        author::{Author, AuthorInput},
        book::{Book, BookInput, BookQuery, BookSearchResult},
        DeleteResponse,
    },
};

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{message}")]
    Api { status: StatusCode, message: String },
}

impl ClientError {
    /// Message to show the user: the server's `error` field, or empty
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Api { message, .. } => message.clone(),
            ClientError::Http(_) => String::new(),
        }
    }

    pub fn status(&self) -> Option<StatusCode> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status(),
        }
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// Catalogue operations, one per REST endpoint
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list_authors(&self) -> ClientResult<Vec<Author>>;
    async fn get_author(&self, id: i64) -> ClientResult<Author>;
    async fn create_author(&self, name: &str) -> ClientResult<Author>;
    async fn update_author(&self, id: i64, name: &str) -> ClientResult<Author>;
    async fn delete_author(&self, id: i64) -> ClientResult<()>;

    async fn search_books(&self, query: &BookQuery) -> ClientResult<BookSearchResult>;
    async fn get_book(&self, id: i64) -> ClientResult<Book>;
    async fn create_book(&self, input: &BookInput) -> ClientResult<Book>;
    async fn update_book(&self, id: i64, input: &BookInput) -> ClientResult<Book>;
    async fn delete_book(&self, id: i64) -> ClientResult<()>;
}

/// `reqwest` implementation of [`CatalogApi`]
#[derive(Clone, Debug)]
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: String,
}

impl CatalogClient {
    /// `base_url` is the API root, e.g. `http://localhost:4000/api`
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(http: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { http, base_url }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse<T: DeserializeOwned>(response: Response) -> ClientResult<T> {
        let status = response.status();
        if status.is_success() {
            return Ok(response.json().await?);
        }

        let message = response
            .json::<ErrorResponse>()
            .await
            .map(|body| body.error)
            .unwrap_or_default();
        tracing::debug!(%status, %message, "API call failed");
        Err(ClientError::Api { status, message })
    }

    async fn delete(&self, path: &str) -> ClientResult<()> {
        let response = self.http.delete(self.url(path)).send().await?;
        Self::parse::<DeleteResponse>(response).await?;
        Ok(())
    }
}

#[async_trait]
impl CatalogApi for CatalogClient {
    async fn list_authors(&self) -> ClientResult<Vec<Author>> {
        let response = self.http.get(self.url("/authors")).send().await?;
        Self::parse(response).await
    }

    async fn get_author(&self, id: i64) -> ClientResult<Author> {
        let response = self.http.get(self.url(&format!("/authors/{}", id))).send().await?;
        Self::parse(response).await
    }

    async fn create_author(&self, name: &str) -> ClientResult<Author> {
        let response = self
            .http
            .post(self.url("/authors"))
            .json(&AuthorInput::named(name))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn update_author(&self, id: i64, name: &str) -> ClientResult<Author> {
        let response = self
            .http
            .put(self.url(&format!("/authors/{}", id)))
            .json(&AuthorInput::named(name))
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn delete_author(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/authors/{}", id)).await
    }

    async fn search_books(&self, query: &BookQuery) -> ClientResult<BookSearchResult> {
        let response = self.http.get(self.url("/books")).query(query).send().await?;
        Self::parse(response).await
    }

    async fn get_book(&self, id: i64) -> ClientResult<Book> {
        let response = self.http.get(self.url(&format!("/books/{}", id))).send().await?;
        Self::parse(response).await
    }

    async fn create_book(&self, input: &BookInput) -> ClientResult<Book> {
        let response = self.http.post(self.url("/books")).json(input).send().await?;
        Self::parse(response).await
    }

    async fn update_book(&self, id: i64, input: &BookInput) -> ClientResult<Book> {
        let response = self
            .http
            .put(self.url(&format!("/books/{}", id)))
            .json(input)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn delete_book(&self, id: i64) -> ClientResult<()> {
        self.delete(&format!("/books/{}", id)).await
    }
}
