// file: src/meeting.rs
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A student's participation record on one meeting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Attendee {
    pub id: Option<i64>,
    pub meeting_id: i64,
    pub student_id: i64,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Meeting {
    pub id: Option<i64>,
    pub name: String,
    pub meeting_date: DateTime<Utc>,
    pub tutor_id: i64,
    pub program: String,
    pub level_lesson: String,
    pub notes: Option<String>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
}

impl Meeting {
    pub fn new(name: String, meeting_date: DateTime<Utc>, tutor_id: i64) -> Self {
        Self {
            id: None,
            name,
            meeting_date,
            tutor_id,
            program: String::new(),
            level_lesson: String::new(),
            notes: None,
            attendees: Vec::new(),
        }
    }

    pub fn date(&self) -> NaiveDate {
        self.meeting_date.date_naive()
    }

    pub fn is_on(&self, date: NaiveDate) -> bool {
        self.date() == date
    }
}

/// Meeting row without its attendees, as stored in `meetings`.
#[derive(Debug, Clone, FromRow)]
pub struct MeetingRow {
    pub id: i64,
    pub name: String,
    pub meeting_date: DateTime<Utc>,
    pub tutor_id: i64,
    pub program: String,
    pub level_lesson: String,
    pub notes: Option<String>,
}

impl MeetingRow {
    pub fn into_meeting(self, attendees: Vec<Attendee>) -> Meeting {
        Meeting {
            id: Some(self.id),
            name: self.name,
            meeting_date: self.meeting_date,
            tutor_id: self.tutor_id,
            program: self.program,
            level_lesson: self.level_lesson,
            notes: self.notes,
            attendees,
        }
    }
}
