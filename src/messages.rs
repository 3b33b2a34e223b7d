use chrono::NaiveDate;

use crate::calendar::Direction;
use crate::error::FetchError;
use crate::models::{Meeting, Session, Student};

/// Per-source request sequence number.
pub type RequestSeq = u64;

/// The four remote sources, in error priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize)]
pub enum SourceKind {
    Session,
    AllMeetings,
    DatedMeetings,
    Students,
}

impl SourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SourceKind::Session => "session",
            SourceKind::AllMeetings => "all_meetings",
            SourceKind::DatedMeetings => "dated_meetings",
            SourceKind::Students => "students",
        }
    }
}

/// A fetch the dashboard wants issued. The driver runs it and answers with
/// the matching `Message` carrying the same sequence number.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchRequest {
    Session {
        seq: RequestSeq,
    },
    AllMeetings {
        seq: RequestSeq,
        owner_id: i64,
    },
    DatedMeetings {
        seq: RequestSeq,
        session: Session,
        date: NaiveDate,
    },
    Students {
        seq: RequestSeq,
        session: Session,
    },
}

impl FetchRequest {
    pub fn source(&self) -> SourceKind {
        match self {
            FetchRequest::Session { .. } => SourceKind::Session,
            FetchRequest::AllMeetings { .. } => SourceKind::AllMeetings,
            FetchRequest::DatedMeetings { .. } => SourceKind::DatedMeetings,
            FetchRequest::Students { .. } => SourceKind::Students,
        }
    }

    pub fn seq(&self) -> RequestSeq {
        match self {
            FetchRequest::Session { seq }
            | FetchRequest::AllMeetings { seq, .. }
            | FetchRequest::DatedMeetings { seq, .. }
            | FetchRequest::Students { seq, .. } => *seq,
        }
    }
}

/// Everything that can change dashboard state.
#[derive(Debug, Clone)]
pub enum Message {
    // ===== Fetch results =====
    /// Session lookup finished
    SessionLoaded {
        seq: RequestSeq,
        result: Result<Option<Session>, FetchError>,
    },
    /// Tutor's full meeting set finished
    AllMeetingsLoaded {
        seq: RequestSeq,
        result: Result<Vec<Meeting>, FetchError>,
    },
    /// Meetings for one date finished
    DatedMeetingsLoaded {
        seq: RequestSeq,
        date: NaiveDate,
        result: Result<Vec<Meeting>, FetchError>,
    },
    /// Student roster finished
    StudentsLoaded {
        seq: RequestSeq,
        result: Result<Vec<Student>, FetchError>,
    },

    // ===== Consumer callbacks =====
    /// A date was picked in the calendar or list
    SelectDate(NaiveDate),
    /// Calendar arrows
    Navigate(Direction),
    /// Title bar "today" action
    GoToToday,
    /// Force the calendar grid to remount
    BumpRefresh,
    /// The form persisted a meeting
    MeetingSaved(Meeting),
    /// Re-issue every dependent fetch
    Refresh,
    /// Select or unselect a meeting in the list
    ToggleMeetingSelection(i64),
    ClearMeetingSelection,
}
