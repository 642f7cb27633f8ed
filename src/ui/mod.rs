//! Headless view models for the catalogue front end.
//!
//! Each model owns its form/list state and drives a [`CatalogApi`] for the
//! network side, so rendering stays a thin layer on top.
//!
//! [`CatalogApi`]: crate::client::CatalogApi

pub mod author_picker;
pub mod book_form;
pub mod book_list;

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;

pub use author_picker::{AuthorOption, AuthorPicker};
pub use book_form::BookForm;
pub use book_list::BookList;

/// Shortest time a mutating action keeps its loading indicator up
pub const MIN_ACTION_DURATION: Duration = Duration::from_millis(500);

/// Await `fut`, then sleep until at least `min` has elapsed since the start
pub async fn with_min_duration<F: Future>(min: Duration, fut: F) -> F::Output {
    let started = Instant::now();
    let output = fut.await;
    let elapsed = started.elapsed();
    if elapsed < min {
        tokio::time::sleep(min - elapsed).await;
    }
    output
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Transient notification shown after an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            kind: NoticeKind::Error,
            message: message.into(),
        }
    }
}
