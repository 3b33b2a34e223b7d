use crate::models::{Attendee, Meeting};

pub mod logging;

/// Keeps a non-empty name as-is, anything else becomes `None`.
pub fn normalize_attendee_name(name: Option<String>) -> Option<String> {
    name.filter(|name| !name.is_empty())
}

pub fn normalize_attendee(attendee: Attendee) -> Attendee {
    Attendee {
        name: normalize_attendee_name(attendee.name),
        ..attendee
    }
}

pub fn normalize_meeting(meeting: Meeting) -> Meeting {
    let attendees = meeting
        .attendees
        .into_iter()
        .map(normalize_attendee)
        .collect();

    Meeting {
        attendees,
        ..meeting
    }
}

pub fn normalize_meetings(meetings: Vec<Meeting>) -> Vec<Meeting> {
    meetings.into_iter().map(normalize_meeting).collect()
}
