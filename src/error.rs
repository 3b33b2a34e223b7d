use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Shown when no failing source carries a usable message.
pub const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred while loading data.";

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Error: {0}")]
    Anyhow(#[from] anyhow::Error),

    #[error("Session error: {0}")]
    Session(String),

    #[error("Source error: {0}")]
    Source(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Operation failed: {0}")]
    OperationFailed(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    pub fn session<S: Into<String>>(msg: S) -> Self {
        Self::Session(msg.into())
    }

    pub fn source<S: Into<String>>(msg: S) -> Self {
        Self::Source(msg.into())
    }

    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Self::InvalidInput(msg.into())
    }

    pub fn config<S: Into<String>>(msg: S) -> Self {
        Self::Config(msg.into())
    }

    pub fn operation_failed<S: Into<String>>(msg: S) -> Self {
        Self::OperationFailed(msg.into())
    }

    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn is_pii_safe(&self) -> bool {
        match self {
            Self::Database(_) | Self::Anyhow(_) => false,
            Self::Session(_)
            | Self::Source(_)
            | Self::InvalidInput(_)
            | Self::Config(_)
            | Self::OperationFailed(_)
            | Self::NotFound(_) => true,
        }
    }

    /// The text a user should see: the collaborator's own words for the
    /// PII-safe variants, the masked string otherwise.
    pub fn user_text(&self) -> String {
        match self {
            Self::Session(msg)
            | Self::Source(msg)
            | Self::InvalidInput(msg)
            | Self::Config(msg)
            | Self::OperationFailed(msg)
            | Self::NotFound(msg) => msg.clone(),
            Self::Database(_) | Self::Anyhow(_) => self.to_safe_string(),
        }
    }

    pub fn to_safe_string(&self) -> String {
        if self.is_pii_safe() {
            self.to_string()
        } else {
            match self {
                Self::Database(_) => "Database operation failed".to_string(),
                Self::Anyhow(_) => "Operation failed".to_string(),
                _ => self.to_string(),
            }
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;

/// Coarse classification of a failed fetch, used for the fallback text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    /// The session resolver failed.
    Session,
    /// The session resolver answered, but there is no current user.
    NoSession,
    Database,
    NotFound,
    InvalidInput,
    Unknown,
}

impl ErrorKind {
    pub fn fallback_message(&self) -> &'static str {
        match self {
            ErrorKind::Session => "Could not load user data.",
            ErrorKind::NoSession => "No active user session was found.",
            ErrorKind::Database => "Could not reach the meeting database.",
            ErrorKind::NotFound => "The requested data could not be found.",
            ErrorKind::InvalidInput => "The request was not valid.",
            ErrorKind::Unknown => GENERIC_ERROR_MESSAGE,
        }
    }
}

/// A fetch failure as held by the dashboard: a kind plus whatever text the
/// collaborator supplied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchError {
    pub kind: ErrorKind,
    pub message: Option<String>,
}

impl FetchError {
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: Some(message.into()),
        }
    }

    pub fn bare(kind: ErrorKind) -> Self {
        Self {
            kind,
            message: None,
        }
    }

    pub fn no_session() -> Self {
        Self::bare(ErrorKind::NoSession)
    }

    /// The collaborator's text, if it supplied a non-blank one.
    pub fn text(&self) -> Option<&str> {
        self.message
            .as_deref()
            .filter(|message| !message.trim().is_empty())
    }

    pub fn user_message(&self) -> &str {
        self.text().unwrap_or_else(|| self.kind.fallback_message())
    }
}

impl std::fmt::Display for FetchError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}: {}", self.kind, self.user_message())
    }
}

impl From<&AppError> for FetchError {
    fn from(error: &AppError) -> Self {
        let kind = match error {
            AppError::Session(_) => ErrorKind::Session,
            AppError::Database(_) => ErrorKind::Database,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::InvalidInput(_) => ErrorKind::InvalidInput,
            AppError::Anyhow(_)
            | AppError::Source(_)
            | AppError::Config(_)
            | AppError::OperationFailed(_) => ErrorKind::Unknown,
        };
        Self::new(kind, error.user_text())
    }
}

impl From<AppError> for FetchError {
    fn from(error: AppError) -> Self {
        FetchError::from(&error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_database_errors_are_masked() {
        let error = AppError::Database(sqlx::Error::RowNotFound);
        assert!(!error.is_pii_safe());
        assert_eq!(error.to_safe_string(), "Database operation failed");
    }

    #[test]
    fn test_fetch_error_from_app_error() {
        let fetch = FetchError::from(AppError::not_found("meeting 4"));
        assert_eq!(fetch.kind, ErrorKind::NotFound);
        assert_eq!(fetch.user_message(), "meeting 4");

        let fetch = FetchError::from(AppError::source("roster down"));
        assert_eq!(fetch.kind, ErrorKind::Unknown);
        assert_eq!(fetch.user_message(), "roster down");

        // Blank collaborator text still falls back per kind.
        let fetch = FetchError::from(AppError::session(" "));
        assert_eq!(fetch.user_message(), ErrorKind::Session.fallback_message());

        let fetch = FetchError::from(AppError::Database(sqlx::Error::PoolClosed));
        assert_eq!(fetch.kind, ErrorKind::Database);
        assert_eq!(fetch.user_message(), "Database operation failed");
    }

    #[test]
    fn test_user_message_falls_back_on_blank_text() {
        let blank = FetchError::new(ErrorKind::Unknown, "   ");
        assert_eq!(blank.user_message(), GENERIC_ERROR_MESSAGE);

        let bare = FetchError::bare(ErrorKind::Session);
        assert_eq!(bare.user_message(), "Could not load user data.");
        assert!(bare.text().is_none());
    }

    #[test]
    fn test_every_kind_has_fallback_text() {
        let kinds = [
            ErrorKind::Session,
            ErrorKind::NoSession,
            ErrorKind::Database,
            ErrorKind::NotFound,
            ErrorKind::InvalidInput,
            ErrorKind::Unknown,
        ];
        for kind in kinds {
            assert!(!kind.fallback_message().is_empty());
        }
    }
}
