//! Error types for the NeuroArc E2E harness

use thiserror::Error;

/// Result type alias using the harness Error
pub type Result<T> = std::result::Result<T, Error>;

/// Harness error types.
///
/// The taxonomy splits into environment problems (driver/session
/// unobtainable, reported as skips) and business/UI-mismatch failures
/// (reported as test failures). `is_environmental` encodes the split.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Provisioning failed: {0}")]
    Provisioning(String),

    #[error("Driver unavailable: {0}")]
    DriverUnavailable(String),

    #[error("Operation timed out after {seconds}s: {what}")]
    Timeout { what: String, seconds: u64 },

    #[error("Authentication failed for user '{username}'")]
    AuthenticationFailed { username: String },

    #[error("Operation requires an authenticated principal")]
    Unauthenticated,

    #[error("Name '{name}' already exists under {scope}")]
    DuplicateName { scope: String, name: String },

    #[error("No such entity: {scope}")]
    NotFound { scope: String },

    #[error("Input rejected: {0}")]
    Validation(String),

    #[error("Element not found: {selector} (page: {page})")]
    ElementNotFound { selector: String, page: String },

    #[error("Navigation failed: {0}")]
    Navigation(String),

    #[error("WebDriver error: {0}")]
    WebDriver(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Whether this error is an environment problem rather than a
    /// regression. Environmental errors are reported as skipped
    /// scenarios, never as failures.
    pub fn is_environmental(&self) -> bool {
        matches!(
            self,
            Error::Provisioning(_) | Error::DriverUnavailable(_) | Error::Timeout { .. }
        )
    }

    pub fn element_not_found(selector: impl Into<String>, page: impl Into<String>) -> Self {
        Error::ElementNotFound {
            selector: selector.into(),
            page: page.into(),
        }
    }

    pub fn duplicate(scope: impl std::fmt::Display, name: impl Into<String>) -> Self {
        Error::DuplicateName {
            scope: scope.to_string(),
            name: name.into(),
        }
    }

    pub fn not_found(scope: impl std::fmt::Display) -> Self {
        Error::NotFound {
            scope: scope.to_string(),
        }
    }
}
