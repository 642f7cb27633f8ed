//! Authors service

use crate::{
    error::{AppError, AppResult},
    models::author::{Author, AuthorInput},
    repository::Repository,
};

const NAME_REQUIRED: &str = "Name is required";
const NOT_FOUND: &str = "Author not found";

/// Extract a non-blank name from the request body
fn required_name(data: &AuthorInput) -> AppResult<&str> {
    data.name
        .as_deref()
        .filter(|name| !name.trim().is_empty())
        .ok_or_else(|| AppError::Validation(NAME_REQUIRED.to_string()))
}

#[derive(Clone)]
pub struct AuthorsService {
    repository: Repository,
}

impl AuthorsService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    pub async fn list(&self) -> AppResult<Vec<Author>> {
        self.repository.authors.list_all().await
    }

    pub async fn get_by_id(&self, id: i64) -> AppResult<Author> {
        self.repository
            .authors
            .get_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    pub async fn create(&self, data: &AuthorInput) -> AppResult<Author> {
        let name = required_name(data)?;
        let author = self.repository.authors.create(name).await?;
        tracing::info!(id = author.id, "Author created");
        Ok(author)
    }

    pub async fn update(&self, id: i64, data: &AuthorInput) -> AppResult<Author> {
        let name = required_name(data)?;
        self.repository
            .authors
            .update(id, name)
            .await?
            .ok_or_else(|| AppError::NotFound(NOT_FOUND.to_string()))
    }

    /// Delete an author. Unknown ids are not an error.
    pub async fn delete(&self, id: i64) -> AppResult<()> {
        self.repository.authors.delete(id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Database;

    async fn service() -> AuthorsService {
        let db = Database::in_memory().await.unwrap();
        AuthorsService::new(Repository::new(db))
    }

    #[tokio::test]
    async fn create_requires_a_name() {
        let service = service().await;
        for input in [AuthorInput::default(), AuthorInput::named(""), AuthorInput::named("  ")] {
            let err = service.create(&input).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(ref msg) if msg == "Name is required"));
        }
    }

    #[tokio::test]
    async fn name_is_stored_exactly() {
        let service = service().await;
        let author = service.create(&AuthorInput::named(" Ursula K. Le Guin")).await.unwrap();
        assert_eq!(service.get_by_id(author.id).await.unwrap().name, " Ursula K. Le Guin");
    }

    #[tokio::test]
    async fn missing_author_is_not_found() {
        let service = service().await;
        let err = service.get_by_id(1).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(ref msg) if msg == "Author not found"));

        let err = service.update(1, &AuthorInput::named("X")).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn update_validates_before_lookup() {
        let service = service().await;
        let err = service.update(1, &AuthorInput::default()).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let service = service().await;
        let author = service.create(&AuthorInput::named("Temp")).await.unwrap();
        service.delete(author.id).await.unwrap();
        assert!(matches!(service.get_by_id(author.id).await, Err(AppError::NotFound(_))));
    }
}
