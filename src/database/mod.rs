// file: src/database.rs

use std::path::Path;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::NaiveDate;
use log::info;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{migrate::MigrateDatabase, sqlite::SqlitePool, Sqlite};

use crate::error::{AppError, AppResult};
use crate::models::{Meeting, Session, Student, User};
use crate::routing;
use crate::sources::{LocalStore, MeetingStore, SessionResolver, StudentRoster};
use crate::utils::logging::log_error_with_context;

// Declare submodules
pub mod meetings;
pub mod settings;
pub mod students;
pub mod users;

/// User acted as when no demo user has been picked.
pub const DEFAULT_USER_ID: i64 = 1;

#[derive(Clone)]
pub struct Database {
    pub pool: SqlitePool,
    default_user_id: i64,
}

impl Database {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create {}", parent.display()))?;
            }
        }
        let db_url = format!("sqlite:{}?mode=rwc", path.display());

        // Create database if it doesn't exist
        let db_exists = Sqlite::database_exists(&db_url)
            .await
            .context("Failed to check if database exists")?;
        if !db_exists {
            info!("Creating database at {}", path.display());
            Sqlite::create_database(&db_url)
                .await
                .context("Failed to create database")?;
        }

        let pool = SqlitePool::connect(&db_url)
            .await
            .context("Failed to connect to database")?;

        Self::from_pool(pool).await
    }

    /// A private database that lives as long as the pool.
    pub async fn in_memory() -> Result<Self> {
        // Every connection to :memory: is a separate database.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("Failed to open in-memory database")?;

        Self::from_pool(pool).await
    }

    pub async fn from_pool(pool: SqlitePool) -> Result<Self> {
        run_schema(&pool).await.context("Failed to run database schema")?;
        info!("Database initialized successfully");

        Ok(Database {
            pool,
            default_user_id: DEFAULT_USER_ID,
        })
    }

    pub fn with_default_user(mut self, user_id: i64) -> Self {
        self.default_user_id = user_id;
        self
    }

    // --- User Delegates ---

    pub async fn add_user(&self, user: &User) -> Result<i64> {
        users::add(&self.pool, user).await
    }

    pub async fn get_users(&self) -> Result<Vec<User>> {
        users::get_all(&self.pool).await
    }

    // --- Student Delegates ---

    pub async fn add_student(&self, student: &Student) -> Result<i64> {
        students::add(&self.pool, student).await
    }

    // --- Meeting Delegates ---

    pub async fn create_meeting(&self, meeting: &Meeting) -> Result<i64> {
        meetings::create(&self.pool, meeting).await
    }
}

/// Maps a storage failure to the crate error, keeping database errors
/// recognizable for the fetch error kind.
fn storage_error(error: anyhow::Error, context: &str) -> AppError {
    log_error_with_context(&error, context);
    match error.downcast::<sqlx::Error>() {
        Ok(db_error) => AppError::Database(db_error),
        Err(other) => AppError::Anyhow(other),
    }
}

#[async_trait]
impl SessionResolver for Database {
    async fn current_session(&self) -> AppResult<Option<Session>> {
        let user_id = routing::demo_user_id(self, self.default_user_id).await;
        let user = users::get(&self.pool, user_id)
            .await
            .map_err(|e| storage_error(e, "session"))?;

        match user {
            Some(user) => Session::from_user(&user).map(Some).map_err(AppError::session),
            None => {
                info!("No user with id {}", user_id);
                Ok(None)
            }
        }
    }
}

#[async_trait]
impl MeetingStore for Database {
    async fn meetings_by_owner(&self, owner_id: i64) -> AppResult<Vec<Meeting>> {
        meetings::get_by_owner(&self.pool, owner_id)
            .await
            .map_err(|e| storage_error(e, "meetings_by_owner"))
    }

    async fn meetings_by_role_and_date(
        &self,
        session: &Session,
        date: NaiveDate,
    ) -> AppResult<Vec<Meeting>> {
        meetings::get_by_role_and_date(&self.pool, session, date)
            .await
            .map_err(|e| storage_error(e, "meetings_by_role_and_date"))
    }
}

#[async_trait]
impl StudentRoster for Database {
    async fn students_for_role(&self, session: &Session) -> AppResult<Vec<Student>> {
        students::for_role(&self.pool, session)
            .await
            .map_err(|e| storage_error(e, "students_for_role"))
    }
}

#[async_trait]
impl LocalStore for Database {
    async fn get(&self, key: &str) -> AppResult<Option<String>> {
        settings::get(&self.pool, key)
            .await
            .map_err(|e| storage_error(e, "settings"))
    }

    async fn set(&self, key: &str, value: &str) -> AppResult<()> {
        settings::set(&self.pool, key, value)
            .await
            .map_err(|e| storage_error(e, "settings"))
    }
}

async fn run_schema(pool: &SqlitePool) -> Result<()> {
    let schema = include_str!("schema.sql");

    let mut current_statement = String::new();
    for line in schema.lines() {
        let trimmed = line.trim();
        if trimmed.starts_with("--") || trimmed.is_empty() {
            continue;
        }

        current_statement.push_str(line);
        current_statement.push('\n');

        if trimmed.ends_with(';') {
            sqlx::query(&current_statement).execute(pool).await?;
            current_statement.clear();
        }
    }
    Ok(())
}
