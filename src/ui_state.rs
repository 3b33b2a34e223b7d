//! Render state handed to presentation consumers
//!
//! A `DashboardView` is a complete snapshot: consumers render it as-is and
//! never patch it, so a calendar grid and a meeting list built from the same
//! snapshot always agree.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use serde::Serialize;

use crate::calendar::ViewWindow;
use crate::dashboard::RefreshToken;
use crate::error::FetchError;
use crate::messages::SourceKind;
use crate::models::{Meeting, Session, Student};

pub const LOADING_USER_MESSAGE: &str = "Loading user data...";
pub const LOADING_CALENDAR_MESSAGE: &str = "Loading calendar...";
pub const LOADING_FORM_MESSAGE: &str = "Loading meeting form...";
pub const LOADING_MEETINGS_MESSAGE: &str = "Loading meetings...";
pub const ERROR_TITLE: &str = "Error Loading Data";

/// Top-level phase. Exactly one applies at a time.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case")]
pub enum DashboardView {
    /// Session still pending: blocking placeholder only
    InitialLoading { message: String },
    /// Some source failed: one consolidated message replaces the data area
    Error {
        title: String,
        message: String,
        errors: BTreeMap<SourceKind, FetchError>,
    },
    Ready(ReadyView),
}

impl DashboardView {
    pub fn is_initial_loading(&self) -> bool {
        matches!(self, DashboardView::InitialLoading { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, DashboardView::Error { .. })
    }

    pub fn ready(&self) -> Option<&ReadyView> {
        match self {
            DashboardView::Ready(ready) => Some(ready),
            _ => None,
        }
    }

    pub fn error_message(&self) -> Option<&str> {
        match self {
            DashboardView::Error { message, .. } => Some(message),
            _ => None,
        }
    }
}

/// A panel is either a skeleton placeholder or its content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "state", content = "data", rename_all = "snake_case")]
pub enum Panel<T> {
    Loading { message: String },
    Ready(T),
}

impl<T> Panel<T> {
    pub fn loading(message: &str) -> Self {
        Panel::Loading {
            message: message.to_string(),
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Panel::Loading { .. })
    }

    pub fn content(&self) -> Option<&T> {
        match self {
            Panel::Ready(content) => Some(content),
            Panel::Loading { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReadyView {
    pub session: Session,
    pub calendar: Panel<CalendarPanel>,
    pub form: Panel<FormPanel>,
    pub list: Panel<ListPanel>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CalendarPanel {
    pub meetings: Vec<Meeting>,
    pub selected_date: NaiveDate,
    pub view_window: ViewWindow,
    /// Remount key for the grid
    pub refresh_token: RefreshToken,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormPanel {
    pub selected_date: NaiveDate,
    pub students: Vec<Student>,
    pub dated_meetings: Vec<Meeting>,
    pub selected_meetings: BTreeSet<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ListPanel {
    pub selected_date: NaiveDate,
    pub meetings: Vec<Meeting>,
    pub students: Vec<Student>,
    pub selected_meetings: BTreeSet<i64>,
}
