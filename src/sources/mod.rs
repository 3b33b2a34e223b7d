//! Collaborator interfaces
//!
//! The dashboard never talks to a backend directly. Everything it reads
//! comes through these traits, so a database, an HTTP client or a test
//! double can stand behind them.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::error::{AppError, AppResult};
use crate::models::{Meeting, Session, Student};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionResolver: Send + Sync {
    /// Returns the acting user, or `None` when nobody is signed in.
    async fn current_session(&self) -> AppResult<Option<Session>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MeetingStore: Send + Sync {
    /// Every meeting owned by a tutor
    async fn meetings_by_owner(&self, owner_id: i64) -> AppResult<Vec<Meeting>>;
    /// Meetings visible to the session's role on one date
    async fn meetings_by_role_and_date(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> AppResult<Vec<Meeting>>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StudentRoster: Send + Sync {
    async fn students_for_role(&self, session: &Session) -> AppResult<Vec<Student>>;
}

/// Client-local key/value slot used for cross-navigation convenience.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get(&self, key: &str) -> AppResult<Option<String>>;
    async fn set(&self, key: &str, value: &str) -> AppResult<()>;
}

/// The three remote collaborators a dashboard reads from.
#[derive(Clone)]
pub struct Sources {
    pub sessions: Arc<dyn SessionResolver>,
    pub meetings: Arc<dyn MeetingStore>,
    pub students: Arc<dyn StudentRoster>,
}

impl Sources {
    pub fn new(
        sessions: Arc<dyn SessionResolver>,
        meetings: Arc<dyn MeetingStore>,
        students: Arc<dyn StudentRoster>,
    ) -> Self {
        Self {
            sessions,
            meetings,
            students,
        }
    }

    /// One backend serving every role.
    pub fn from_backend<B>(backend: Arc<B>) -> Self
    where
        B: SessionResolver + MeetingStore + StudentRoster + 'static,
    {
        Self {
            sessions: backend.clone(),
            meetings: backend.clone(),
            students: backend,
        }
    }
}

/// In-memory `LocalStore`.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        let values = self
            .values
            .lock()
            .map_err(|_| AppError::operation_failed("local store lock poisoned"))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| AppError::operation_failed("local store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
