//! Author multi-select with inline author creation

use crate::{
    client::{CatalogApi, ClientError},
    models::author::Author,
};

/// One entry of the picker's dropdown
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorOption {
    Existing(Author),
    /// Synthetic entry that creates an author with this name when chosen
    Create(String),
}

impl AuthorOption {
    pub fn label(&self) -> String {
        match self {
            AuthorOption::Existing(author) => author.name.clone(),
            AuthorOption::Create(name) => format!("Create Author \"{}\"", name),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthorPicker {
    known: Vec<Author>,
    selected: Vec<Author>,
}

impl AuthorPicker {
    pub fn new(selected: Vec<Author>) -> Self {
        Self {
            known: Vec::new(),
            selected,
        }
    }

    /// Fetch the known author list (done once when the form mounts)
    pub async fn load<A: CatalogApi + ?Sized>(&mut self, api: &A) -> Result<(), ClientError> {
        self.known = api.list_authors().await?;
        Ok(())
    }

    pub fn known(&self) -> &[Author] {
        &self.known
    }

    pub fn selected(&self) -> &[Author] {
        &self.selected
    }

    pub fn selected_ids(&self) -> Vec<i64> {
        self.selected.iter().map(|a| a.id).collect()
    }

    /// Dropdown entries for the text typed so far.
    ///
    /// Known authors whose name contains `input` (ignoring case), followed by a
    /// create entry unless some known author already has exactly that name.
    pub fn options(&self, input: &str) -> Vec<AuthorOption> {
        let needle = input.to_lowercase();
        let mut options: Vec<AuthorOption> = self
            .known
            .iter()
            .filter(|a| a.name.to_lowercase().contains(&needle))
            .cloned()
            .map(AuthorOption::Existing)
            .collect();

        let exists = self.known.iter().any(|a| a.name.to_lowercase() == needle);
        if !input.is_empty() && !exists {
            options.push(AuthorOption::Create(input.to_string()));
        }
        options
    }

    /// Add an option to the selection, creating the author first if needed.
    ///
    /// When creation fails the selection is left as it was.
    pub async fn choose<A: CatalogApi + ?Sized>(
        &mut self,
        api: &A,
        option: AuthorOption,
    ) -> Result<(), ClientError> {
        let author = match option {
            AuthorOption::Existing(author) => author,
            AuthorOption::Create(name) => {
                let created = api.create_author(&name).await?;
                tracing::debug!(id = created.id, "Author created inline");
                self.known.push(created.clone());
                created
            }
        };

        if !self.selected.iter().any(|a| a.id == author.id) {
            self.selected.push(author);
        }
        Ok(())
    }

    pub fn remove(&mut self, author_id: i64) {
        self.selected.retain(|a| a.id != author_id);
    }
}
