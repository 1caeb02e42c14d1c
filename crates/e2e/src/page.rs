//! Browser page collaborator
//!
//! Step handlers talk to the browser only through [`PageSession`]. A
//! [`SessionLauncher`] opens one session per scenario.

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use formcheck_steps::StepError;

use crate::error::E2eResult;

/// Failures reported by a page session
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PageError {
    #[error("Element not found: {selector}")]
    ElementNotFound { selector: String },

    #[error("Cannot interact with {selector}: {reason}")]
    Interaction { selector: String, reason: String },

    #[error("Navigation to {url} failed: {reason}")]
    Navigation { url: String, reason: String },

    #[error("Timeout after {ms}ms: {operation}")]
    Timeout { operation: String, ms: u64 },

    #[error("Driver error: {0}")]
    Driver(String),

    #[error("Page session is closed")]
    Closed,
}

pub type PageResult<T> = Result<T, PageError>;

impl From<PageError> for StepError {
    fn from(err: PageError) -> Self {
        match err {
            PageError::ElementNotFound { selector } => StepError::ElementNotFound { selector },
            PageError::Interaction { selector, reason } => StepError::Interaction { selector, reason },
            PageError::Navigation { url, reason } => StepError::Navigation { url, reason },
            PageError::Timeout { operation, ms } => StepError::Timeout { operation, ms },
            other => StepError::Session(other.to_string()),
        }
    }
}

/// Handle to one browser page, shared by every step of a scenario
#[async_trait]
pub trait PageSession: Send {
    async fn goto(&mut self, url: &str) -> PageResult<()>;

    async fn fill(&mut self, selector: &str, value: &str) -> PageResult<()>;

    async fn click(&mut self, selector: &str) -> PageResult<()>;

    /// Text content of the first element matching `selector`; `None` when the
    /// element has no text node.
    async fn text_content(&mut self, selector: &str) -> PageResult<Option<String>>;

    /// Release the page. Further calls fail with [`PageError::Closed`].
    async fn close(&mut self) -> PageResult<()>;
}

/// Opens a fresh page session for each scenario
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> E2eResult<Box<dyn PageSession>>;

    fn describe(&self) -> String;
}

#[async_trait]
impl<L: SessionLauncher + ?Sized> SessionLauncher for Arc<L> {
    async fn launch(&self) -> E2eResult<Box<dyn PageSession>> {
        (**self).launch().await
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
