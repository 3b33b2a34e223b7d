// Meetboard Library
// Scheduling dashboard core: state aggregation, fetch orchestration and storage

pub mod calendar;
pub mod command_handlers;
pub mod config;
pub mod dashboard;
pub mod database;
pub mod error;
pub mod messages;
pub mod models;
pub mod routing;
pub mod sources;
pub mod ui_state;
pub mod utils;

// Re-export commonly used types
pub use calendar::{Direction, ViewWindow};
pub use command_handlers::{DashboardController, FetchHandlers};
pub use config::DashboardConfig;
pub use dashboard::{Dashboard, RefreshToken, SessionState};
pub use database::Database;
pub use error::{AppError, AppResult, ErrorKind, FetchError};
pub use messages::{FetchRequest, Message, SourceKind};
pub use models::*;
pub use sources::{LocalStore, MeetingStore, SessionResolver, Sources, StudentRoster};
pub use ui_state::{DashboardView, Panel, ReadyView};
