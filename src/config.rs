//! Runtime configuration
//!
//! Everything has a default; environment variables override it.

use std::env;
use std::path::PathBuf;

use log::info;

use crate::calendar::DEFAULT_MONTHS_IN_VIEW;
use crate::database::DEFAULT_USER_ID;
use crate::error::{AppError, AppResult};

pub const DB_PATH_VAR: &str = "MEETBOARD_DB_PATH";
pub const DEMO_USER_ID_VAR: &str = "MEETBOARD_DEMO_USER_ID";
pub const CALENDAR_MONTHS_VAR: &str = "MEETBOARD_CALENDAR_MONTHS";

pub const MAX_MONTHS_IN_VIEW: u32 = 12;

#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub db_path: PathBuf,
    pub default_user_id: i64,
    pub months_in_view: u32,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            default_user_id: DEFAULT_USER_ID,
            months_in_view: DEFAULT_MONTHS_IN_VIEW,
        }
    }
}

fn default_db_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("meetboard")
        .join("meetboard.db")
}

impl DashboardConfig {
    /// Defaults overridden by `MEETBOARD_*` variables.
    pub fn from_env() -> AppResult<Self> {
        let mut config = Self::default();

        if let Ok(path) = env::var(DB_PATH_VAR) {
            config.db_path = PathBuf::from(path);
        }
        if let Ok(value) = env::var(DEMO_USER_ID_VAR) {
            config.default_user_id = value.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be an integer, got '{}'", DEMO_USER_ID_VAR, value))
            })?;
        }
        if let Ok(value) = env::var(CALENDAR_MONTHS_VAR) {
            config.months_in_view = value.trim().parse().map_err(|_| {
                AppError::config(format!("{} must be an integer, got '{}'", CALENDAR_MONTHS_VAR, value))
            })?;
        }

        config.validate()?;
        info!(
            "Configuration loaded (db: {}, months in view: {})",
            config.db_path.display(),
            config.months_in_view
        );
        Ok(config)
    }

    pub fn validate(&self) -> AppResult<()> {
        if self.db_path.as_os_str().is_empty() {
            return Err(AppError::config("database path must not be empty"));
        }
        if self.default_user_id <= 0 {
            return Err(AppError::config(format!(
                "default user id must be positive, got {}",
                self.default_user_id
            )));
        }
        if !(1..=MAX_MONTHS_IN_VIEW).contains(&self.months_in_view) {
            return Err(AppError::config(format!(
                "months in view must be between 1 and {}, got {}",
                MAX_MONTHS_IN_VIEW, self.months_in_view
            )));
        }
        Ok(())
    }
}
