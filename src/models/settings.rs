// file: src/settings.rs
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Key of the persisted route slot.
pub const CURRENT_ROUTE_KEY: &str = "currentRoute";
/// Key of the persisted demo user slot.
pub const DEMO_USER_ID_KEY: &str = "demoUserId";

/// One key/value row of the client-local store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Setting {
    pub key: String,
    pub value: String,
}
