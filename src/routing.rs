//! Route and demo-user persistence
//!
//! Both live in the client-local store and are conveniences only: a missing
//! or unreadable slot falls back to a default instead of failing.

use std::sync::Arc;

use log::{info, warn};

use crate::error::{AppError, AppResult};
use crate::models::{CURRENT_ROUTE_KEY, DEMO_USER_ID_KEY};
use crate::sources::LocalStore;

pub const DEFAULT_ROUTE: &str = "meetings";

pub struct Router {
    store: Arc<dyn LocalStore>,
    current_route: String,
}

impl Router {
    /// Restores the last route, or starts on the meetings page.
    pub async fn load(store: Arc<dyn LocalStore>) -> Self {
        let current_route = match store.get(CURRENT_ROUTE_KEY).await {
            Ok(Some(route)) if !route.trim().is_empty() => route,
            Ok(_) => DEFAULT_ROUTE.to_string(),
            Err(e) => {
                warn!("Could not read stored route, using default: {}", e);
                DEFAULT_ROUTE.to_string()
            }
        };

        Self {
            store,
            current_route,
        }
    }

    pub fn current_route(&self) -> &str {
        &self.current_route
    }

    pub async fn set_route(&mut self, route: &str) -> AppResult<()> {
        let route = route.trim();
        if route.is_empty() {
            return Err(AppError::invalid_input("route must not be empty"));
        }
        self.current_route = route.to_string();
        self.store.set(CURRENT_ROUTE_KEY, route).await
    }
}

/// The user to act as, or `default` when none was picked.
pub async fn demo_user_id(store: &dyn LocalStore, default: i64) -> i64 {
    match store.get(DEMO_USER_ID_KEY).await {
        Ok(Some(value)) => value.trim().parse().unwrap_or_else(|_| {
            warn!("Ignoring unparsable demo user id '{}'", value);
            default
        }),
        Ok(None) => default,
        Err(e) => {
            warn!("Could not read demo user id, using {}: {}", default, e);
            default
        }
    }
}

pub async fn select_demo_user(store: &dyn LocalStore, user_id: i64) -> AppResult<()> {
    if user_id <= 0 {
        return Err(AppError::invalid_input(format!("invalid user id {}", user_id)));
    }
    info!("Acting as user {}", user_id);
    store.set(DEMO_USER_ID_KEY, &user_id.to_string()).await
}
