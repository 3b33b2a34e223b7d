//! View-state aggregation
//!
//! `Dashboard` merges the session, the tutor's meetings, the meetings of the
//! selected date and the student roster into one view model. It performs no
//! I/O: `update` applies one `Message` and returns the fetches that must be
//! issued next, which keeps every transition synchronous and testable.

use std::collections::{BTreeMap, BTreeSet};

use chrono::NaiveDate;
use log::{debug, error, info};
use serde::Serialize;

use crate::calendar::{Direction, ViewWindow, DEFAULT_MONTHS_IN_VIEW};
use crate::error::FetchError;
use crate::messages::{FetchRequest, Message, RequestSeq, SourceKind};
use crate::models::{Meeting, Session, Student};
use crate::ui_state::{
    CalendarPanel, DashboardView, FormPanel, ListPanel, Panel, ReadyView, ERROR_TITLE,
    LOADING_CALENDAR_MESSAGE, LOADING_FORM_MESSAGE, LOADING_MEETINGS_MESSAGE,
    LOADING_USER_MESSAGE,
};
use crate::utils::logging::{log_discarded_response, log_fetch_outcome};
use crate::utils::normalize_meetings;

/// Opaque remount counter. Only ever increases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct RefreshToken(u64);

impl RefreshToken {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub fn bump(&mut self) -> RefreshToken {
        self.0 += 1;
        *self
    }
}

impl Default for RefreshToken {
    fn default() -> Self {
        RefreshToken(1)
    }
}

/// Hands out sequence numbers for one source and remembers which one is
/// still awaited.
#[derive(Debug, Default, Clone)]
pub struct RequestTracker {
    issued: RequestSeq,
    in_flight: Option<RequestSeq>,
}

impl RequestTracker {
    pub fn issue(&mut self) -> RequestSeq {
        self.issued += 1;
        self.in_flight = Some(self.issued);
        self.issued
    }

    pub fn is_latest(&self, seq: RequestSeq) -> bool {
        self.in_flight == Some(seq)
    }

    /// Marks `seq` answered. Returns false for anything but the latest
    /// outstanding request.
    pub fn complete(&mut self, seq: RequestSeq) -> bool {
        if !self.is_latest(seq) {
            return false;
        }
        self.in_flight = None;
        true
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.is_some()
    }
}

/// Data of one source with its loading and error state.
#[derive(Debug, Default, Clone)]
struct Loadable<T> {
    data: T,
    error: Option<FetchError>,
    tracker: RequestTracker,
}

impl<T> Loadable<T> {
    /// Replaces the data wholesale on success. A failure keeps the last
    /// good data around but records the error.
    fn resolve(&mut self, result: Result<T, FetchError>) {
        match result {
            Ok(data) => {
                self.data = data;
                self.error = None;
            }
            Err(error) => self.error = Some(error),
        }
    }

    fn is_loading(&self) -> bool {
        self.tracker.is_loading()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionState {
    Pending,
    Ready(Session),
    Failed(FetchError),
}

pub struct Dashboard {
    today: NaiveDate,
    months_in_view: u32,
    session: SessionState,
    session_tracker: RequestTracker,
    all_meetings: Loadable<Vec<Meeting>>,
    dated_meetings: Loadable<Vec<Meeting>>,
    students: Loadable<Vec<Student>>,
    selected_date: NaiveDate,
    view_window: ViewWindow,
    refresh_token: RefreshToken,
    selected_meetings: BTreeSet<i64>,
}

impl Dashboard {
    /// Creates a dashboard whose "now" is `today`. Both the selected date
    /// and the view window derive from it.
    pub fn new(today: NaiveDate) -> Self {
        Self::with_months_in_view(today, DEFAULT_MONTHS_IN_VIEW)
    }

    pub fn with_months_in_view(today: NaiveDate, months_in_view: u32) -> Self {
        Self {
            today,
            months_in_view,
            session: SessionState::Pending,
            session_tracker: RequestTracker::default(),
            all_meetings: Loadable::default(),
            dated_meetings: Loadable::default(),
            students: Loadable::default(),
            selected_date: today,
            view_window: ViewWindow::around(today, months_in_view),
            refresh_token: RefreshToken::default(),
            selected_meetings: BTreeSet::new(),
        }
    }

    /// Requests the session. Dependent fetches wait for its answer.
    pub fn start(&mut self) -> Vec<FetchRequest> {
        if self.session_tracker.is_loading() || self.session != SessionState::Pending {
            return Vec::new();
        }
        info!("Dashboard starting, requesting current session");
        vec![FetchRequest::Session {
            seq: self.session_tracker.issue(),
        }]
    }

    pub fn update(&mut self, message: Message) -> Vec<FetchRequest> {
        match message {
            Message::SessionLoaded { seq, result } => self.on_session_loaded(seq, result),
            Message::AllMeetingsLoaded { seq, result } => {
                if !self.all_meetings.tracker.complete(seq) {
                    log_discarded_response(SourceKind::AllMeetings.as_str(), seq, "superseded");
                    return Vec::new();
                }
                log_fetch_outcome(
                    SourceKind::AllMeetings.as_str(),
                    seq,
                    result.as_ref().map(Vec::len),
                );
                self.all_meetings.resolve(result.map(normalize_meetings));
                Vec::new()
            }
            Message::DatedMeetingsLoaded { seq, date, result } => {
                if date != self.selected_date {
                    log_discarded_response(SourceKind::DatedMeetings.as_str(), seq, "date changed");
                    return Vec::new();
                }
                if !self.dated_meetings.tracker.complete(seq) {
                    log_discarded_response(SourceKind::DatedMeetings.as_str(), seq, "superseded");
                    return Vec::new();
                }
                log_fetch_outcome(
                    SourceKind::DatedMeetings.as_str(),
                    seq,
                    result.as_ref().map(Vec::len),
                );
                self.dated_meetings.resolve(result.map(normalize_meetings));
                self.prune_selection();
                Vec::new()
            }
            Message::StudentsLoaded { seq, result } => {
                if !self.students.tracker.complete(seq) {
                    log_discarded_response(SourceKind::Students.as_str(), seq, "superseded");
                    return Vec::new();
                }
                log_fetch_outcome(
                    SourceKind::Students.as_str(),
                    seq,
                    result.as_ref().map(Vec::len),
                );
                self.students.resolve(result);
                Vec::new()
            }
            Message::SelectDate(date) => self.select_date(date),
            Message::Navigate(direction) => {
                self.navigate(direction);
                Vec::new()
            }
            Message::GoToToday => {
                self.view_window = ViewWindow::around(self.today, self.months_in_view);
                self.refresh_token.bump();
                self.select_date(self.today)
            }
            Message::BumpRefresh => {
                self.refresh_token.bump();
                Vec::new()
            }
            Message::MeetingSaved(meeting) => {
                info!("Meeting '{}' saved, refreshing meetings", meeting.name);
                self.refresh_token.bump();
                match self.session.clone() {
                    SessionState::Ready(session) => vec![
                        self.all_meetings_request(&session),
                        self.dated_meetings_request(&session),
                    ],
                    _ => Vec::new(),
                }
            }
            Message::Refresh => match self.session.clone() {
                SessionState::Ready(session) => self.dependent_requests(&session),
                _ => Vec::new(),
            },
            Message::ToggleMeetingSelection(meeting_id) => {
                if !self.selected_meetings.remove(&meeting_id) {
                    self.selected_meetings.insert(meeting_id);
                }
                Vec::new()
            }
            Message::ClearMeetingSelection => {
                self.selected_meetings.clear();
                Vec::new()
            }
        }
    }

    fn on_session_loaded(
        &mut self,
        seq: RequestSeq,
        result: Result<Option<Session>, FetchError>,
    ) -> Vec<FetchRequest> {
        if !self.session_tracker.complete(seq) {
            log_discarded_response(SourceKind::Session.as_str(), seq, "superseded");
            return Vec::new();
        }

        match result {
            Ok(Some(session)) => {
                info!(
                    "Session resolved for {} ({})",
                    session.display_name,
                    session.role.as_str()
                );
                let requests = self.dependent_requests(&session);
                self.session = SessionState::Ready(session);
                requests
            }
            Ok(None) => {
                error!("Session resolved without a current user");
                self.session = SessionState::Failed(FetchError::no_session());
                Vec::new()
            }
            Err(fetch_error) => {
                error!("Failed to resolve session: {}", fetch_error);
                self.session = SessionState::Failed(fetch_error);
                Vec::new()
            }
        }
    }

    fn select_date(&mut self, date: NaiveDate) -> Vec<FetchRequest> {
        if date == self.selected_date {
            return Vec::new();
        }
        debug!("Selected date {} -> {}", self.selected_date, date);
        self.selected_date = date;

        match self.session.clone() {
            SessionState::Ready(session) => vec![self.dated_meetings_request(&session)],
            _ => Vec::new(),
        }
    }

    pub fn navigate(&mut self, direction: Direction) {
        self.view_window = self.view_window.navigate(direction);
        debug!("View window now starts {}", self.view_window.start);
    }

    fn dependent_requests(&mut self, session: &Session) -> Vec<FetchRequest> {
        vec![
            self.all_meetings_request(session),
            self.dated_meetings_request(session),
            self.students_request(session),
        ]
    }

    fn all_meetings_request(&mut self, session: &Session) -> FetchRequest {
        FetchRequest::AllMeetings {
            seq: self.all_meetings.tracker.issue(),
            owner_id: session.user_id,
        }
    }

    fn dated_meetings_request(&mut self, session: &Session) -> FetchRequest {
        FetchRequest::DatedMeetings {
            seq: self.dated_meetings.tracker.issue(),
            session: session.clone(),
            date: self.selected_date,
        }
    }

    fn students_request(&mut self, session: &Session) -> FetchRequest {
        FetchRequest::Students {
            seq: self.students.tracker.issue(),
            session: session.clone(),
        }
    }

    fn prune_selection(&mut self) {
        let present: BTreeSet<i64> = self
            .dated_meetings
            .data
            .iter()
            .filter_map(|meeting| meeting.id)
            .collect();
        self.selected_meetings.retain(|id| present.contains(id));
    }

    // --- Accessors ---

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session
    }

    pub fn session(&self) -> Option<&Session> {
        match &self.session {
            SessionState::Ready(session) => Some(session),
            _ => None,
        }
    }

    pub fn selected_date(&self) -> NaiveDate {
        self.selected_date
    }

    pub fn view_window(&self) -> ViewWindow {
        self.view_window
    }

    pub fn refresh_token(&self) -> RefreshToken {
        self.refresh_token
    }

    pub fn selected_meetings(&self) -> &BTreeSet<i64> {
        &self.selected_meetings
    }

    pub fn all_meetings(&self) -> &[Meeting] {
        &self.all_meetings.data
    }

    pub fn dated_meetings(&self) -> &[Meeting] {
        &self.dated_meetings.data
    }

    pub fn students(&self) -> &[Student] {
        &self.students.data
    }

    pub fn is_loading(&self, source: SourceKind) -> bool {
        match source {
            SourceKind::Session => self.session == SessionState::Pending,
            SourceKind::AllMeetings => self.all_meetings.is_loading(),
            SourceKind::DatedMeetings => self.dated_meetings.is_loading(),
            SourceKind::Students => self.students.is_loading(),
        }
    }

    /// True while any fetch is outstanding.
    pub fn has_pending_fetches(&self) -> bool {
        self.session_tracker.is_loading()
            || self.all_meetings.is_loading()
            || self.dated_meetings.is_loading()
            || self.students.is_loading()
    }

    /// Every current error, keyed by source.
    pub fn errors(&self) -> BTreeMap<SourceKind, FetchError> {
        let mut errors = BTreeMap::new();
        if let SessionState::Failed(error) = &self.session {
            errors.insert(SourceKind::Session, error.clone());
        }
        let sources = [
            (SourceKind::AllMeetings, &self.all_meetings.error),
            (SourceKind::DatedMeetings, &self.dated_meetings.error),
            (SourceKind::Students, &self.students.error),
        ];
        for (source, error) in sources {
            if let Some(error) = error {
                errors.insert(source, error.clone());
            }
        }
        errors
    }

    /// The first error text in source priority order. When no failing source
    /// supplied text, the highest-priority error's fallback is used.
    pub fn error_message(&self) -> Option<String> {
        // BTreeMap iterates in SourceKind order, which is the priority order.
        let errors = self.errors();
        let message = errors
            .values()
            .find_map(FetchError::text)
            .or_else(|| errors.values().next().map(|error| error.kind.fallback_message()))
            .map(str::to_string);
        message
    }

    pub fn view(&self) -> DashboardView {
        // Dependent sources are never fetched before the session resolves,
        // so a pending session cannot coexist with an error.
        if let Some(message) = self.error_message() {
            return DashboardView::Error {
                title: ERROR_TITLE.to_string(),
                message,
                errors: self.errors(),
            };
        }

        let session = match &self.session {
            SessionState::Ready(session) => session.clone(),
            SessionState::Pending | SessionState::Failed(_) => {
                return DashboardView::InitialLoading {
                    message: LOADING_USER_MESSAGE.to_string(),
                }
            }
        };

        let calendar = if self.all_meetings.is_loading() {
            Panel::loading(LOADING_CALENDAR_MESSAGE)
        } else {
            Panel::Ready(CalendarPanel {
                meetings: self.all_meetings.data.clone(),
                selected_date: self.selected_date,
                view_window: self.view_window,
                refresh_token: self.refresh_token,
            })
        };

        let data_loading = self.all_meetings.is_loading()
            || self.dated_meetings.is_loading()
            || self.students.is_loading();

        let (form, list) = if data_loading {
            (
                Panel::loading(LOADING_FORM_MESSAGE),
                Panel::loading(LOADING_MEETINGS_MESSAGE),
            )
        } else {
            (
                Panel::Ready(FormPanel {
                    selected_date: self.selected_date,
                    students: self.students.data.clone(),
                    dated_meetings: self.dated_meetings.data.clone(),
                    selected_meetings: self.selected_meetings.clone(),
                }),
                Panel::Ready(ListPanel {
                    selected_date: self.selected_date,
                    meetings: self.dated_meetings.data.clone(),
                    students: self.students.data.clone(),
                    selected_meetings: self.selected_meetings.clone(),
                }),
            )
        };

        DashboardView::Ready(ReadyView {
            session,
            calendar,
            form,
            list,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ErrorKind, GENERIC_ERROR_MESSAGE};
    use crate::models::{Attendee, Role};
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2024, 5, 15)
    }

    fn tutor() -> Session {
        Session {
            user_id: 4,
            role: Role::Tutor,
            school: "North".to_string(),
            display_name: "Ada Byron".to_string(),
            email: None,
        }
    }

    fn meeting(id: i64, on: NaiveDate, names: &[Option<&str>]) -> Meeting {
        let at = Utc
            .from_utc_datetime(&on.and_hms_opt(15, 0, 0).unwrap());
        let mut meeting = Meeting::new(format!("Meeting {}", id), at, 4);
        meeting.id = Some(id);
        meeting.attendees = names
            .iter()
            .enumerate()
            .map(|(i, name)| Attendee {
                id: Some(i as i64 + 1),
                meeting_id: id,
                student_id: i as i64 + 100,
                name: name.map(str::to_string),
            })
            .collect();
        meeting
    }

    fn student(id: i64) -> Student {
        let mut student = Student::new(format!("S{}", id), "Lee".to_string(), "North".to_string());
        student.id = Some(id);
        student
    }

    /// Starts a dashboard and resolves its session, returning the three
    /// dependent requests.
    fn ready_dashboard() -> (Dashboard, Vec<FetchRequest>) {
        let mut dashboard = Dashboard::new(today());
        let start = dashboard.start();
        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Ok(Some(tutor())),
        });
        (dashboard, requests)
    }

    fn seq_of(requests: &[FetchRequest], source: SourceKind) -> RequestSeq {
        requests
            .iter()
            .find(|request| request.source() == source)
            .map(FetchRequest::seq)
            .unwrap()
    }

    fn resolve_all(dashboard: &mut Dashboard, requests: &[FetchRequest]) {
        for request in requests {
            let message = match request {
                FetchRequest::Session { seq } => Message::SessionLoaded {
                    seq: *seq,
                    result: Ok(Some(tutor())),
                },
                FetchRequest::AllMeetings { seq, .. } => Message::AllMeetingsLoaded {
                    seq: *seq,
                    result: Ok(vec![meeting(1, today(), &[Some("Kim")])]),
                },
                FetchRequest::DatedMeetings { seq, date, .. } => Message::DatedMeetingsLoaded {
                    seq: *seq,
                    date: *date,
                    result: Ok(vec![meeting(1, *date, &[Some("Kim")])]),
                },
                FetchRequest::Students { seq, .. } => Message::StudentsLoaded {
                    seq: *seq,
                    result: Ok(vec![student(100)]),
                },
            };
            dashboard.update(message);
        }
    }

    #[test]
    fn test_start_requests_only_the_session() {
        let mut dashboard = Dashboard::new(today());
        let requests = dashboard.start();

        assert_eq!(requests, vec![FetchRequest::Session { seq: 1 }]);
        assert!(dashboard.view().is_initial_loading());
        assert!(dashboard.start().is_empty());
    }

    #[test]
    fn test_dependent_fetches_wait_for_the_session() {
        let mut dashboard = Dashboard::new(today());
        dashboard.start();

        assert!(dashboard.update(Message::SelectDate(date(2024, 5, 20))).is_empty());
        assert!(dashboard.update(Message::Refresh).is_empty());
        assert!(dashboard
            .update(Message::MeetingSaved(meeting(9, today(), &[])))
            .is_empty());
        assert!(dashboard.view().is_initial_loading());
    }

    #[test]
    fn test_failed_session_never_issues_dependent_fetches() {
        let mut dashboard = Dashboard::new(today());
        let start = dashboard.start();

        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Err(FetchError::new(ErrorKind::Session, "user service down")),
        });
        assert!(requests.is_empty());
        assert!(dashboard.update(Message::Refresh).is_empty());
        assert!(dashboard.update(Message::SelectDate(date(2024, 6, 1))).is_empty());

        let view = dashboard.view();
        assert!(view.is_error());
        assert_eq!(view.error_message(), Some("user service down"));
        assert!(!dashboard.has_pending_fetches());
    }

    #[test]
    fn test_missing_session_is_an_error() {
        let mut dashboard = Dashboard::new(today());
        let start = dashboard.start();

        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Ok(None),
        });

        assert!(requests.is_empty());
        assert_eq!(
            dashboard.errors().get(&SourceKind::Session).map(|e| e.kind),
            Some(ErrorKind::NoSession)
        );
        assert_eq!(
            dashboard.error_message().as_deref(),
            Some(ErrorKind::NoSession.fallback_message())
        );
    }

    #[test]
    fn test_session_issues_three_dependent_fetches() {
        let mut dashboard = Dashboard::new(today());
        let start = dashboard.start();
        dashboard.update(Message::SelectDate(date(2024, 5, 20)));

        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Ok(Some(tutor())),
        });

        assert_eq!(requests.len(), 3);
        assert!(requests.contains(&FetchRequest::AllMeetings { seq: 1, owner_id: 4 }));
        assert!(requests.contains(&FetchRequest::DatedMeetings {
            seq: 1,
            session: tutor(),
            date: date(2024, 5, 20),
        }));
        assert!(requests.contains(&FetchRequest::Students {
            seq: 1,
            session: tutor()
        }));
        assert!(dashboard.is_loading(SourceKind::AllMeetings));
        assert!(dashboard.is_loading(SourceKind::DatedMeetings));
        assert!(dashboard.is_loading(SourceKind::Students));
        assert!(!dashboard.is_loading(SourceKind::Session));
    }

    #[test]
    fn test_all_meetings_are_normalized() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Ok(vec![
                meeting(1, today(), &[Some("Kim"), Some("")]),
                meeting(2, today(), &[None]),
                meeting(3, date(2024, 5, 16), &[Some("Lee")]),
            ]),
        });

        let meetings = dashboard.all_meetings();
        assert_eq!(meetings.len(), 3);
        assert_eq!(meetings[0].attendees[0].name.as_deref(), Some("Kim"));
        assert_eq!(meetings[0].attendees[1].name, None);
        assert_eq!(meetings[0].attendees[1].student_id, 101);
        assert!(!dashboard.is_loading(SourceKind::AllMeetings));
    }

    #[test]
    fn test_dated_meetings_are_normalized() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::DatedMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::DatedMeetings),
            date: today(),
            result: Ok(vec![meeting(1, today(), &[Some("")])]),
        });

        assert_eq!(dashboard.dated_meetings().len(), 1);
        assert_eq!(dashboard.dated_meetings()[0].attendees[0].name, None);
    }

    #[test]
    fn test_select_date_reissues_only_the_dated_fetch() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);

        let d2 = date(2024, 5, 22);
        let requests = dashboard.update(Message::SelectDate(d2));

        assert_eq!(
            requests,
            vec![FetchRequest::DatedMeetings {
                seq: 2,
                session: tutor(),
                date: d2,
            }]
        );
        assert!(dashboard.update(Message::SelectDate(d2)).is_empty());
        assert!(!dashboard.is_loading(SourceKind::AllMeetings));
        assert!(!dashboard.is_loading(SourceKind::Students));
    }

    #[test]
    fn test_stale_dated_response_is_discarded() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);

        let d1 = date(2024, 5, 20);
        let d2 = date(2024, 5, 21);
        let first = dashboard.update(Message::SelectDate(d1));
        let second = dashboard.update(Message::SelectDate(d2));

        dashboard.update(Message::DatedMeetingsLoaded {
            seq: second[0].seq(),
            date: d2,
            result: Ok(vec![meeting(22, d2, &[])]),
        });
        dashboard.update(Message::DatedMeetingsLoaded {
            seq: first[0].seq(),
            date: d1,
            result: Ok(vec![meeting(11, d1, &[])]),
        });

        assert_eq!(dashboard.selected_date(), d2);
        assert_eq!(dashboard.dated_meetings().len(), 1);
        assert_eq!(dashboard.dated_meetings()[0].id, Some(22));
        assert!(!dashboard.is_loading(SourceKind::DatedMeetings));
    }

    #[test]
    fn test_superseded_response_keeps_loading_until_latest_arrives() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);

        let d1 = date(2024, 5, 20);
        let first = dashboard.update(Message::SelectDate(d1));
        dashboard.update(Message::SelectDate(date(2024, 5, 21)));
        let back = dashboard.update(Message::SelectDate(d1));

        // Same date as the newest request, but an older sequence number.
        dashboard.update(Message::DatedMeetingsLoaded {
            seq: first[0].seq(),
            date: d1,
            result: Ok(vec![meeting(1, d1, &[])]),
        });
        assert!(dashboard.is_loading(SourceKind::DatedMeetings));

        dashboard.update(Message::DatedMeetingsLoaded {
            seq: back[0].seq(),
            date: d1,
            result: Ok(vec![meeting(2, d1, &[]), meeting(3, d1, &[])]),
        });
        assert!(!dashboard.is_loading(SourceKind::DatedMeetings));
        assert_eq!(dashboard.dated_meetings().len(), 2);
    }

    #[test]
    fn test_stale_all_meetings_response_is_discarded() {
        let (mut dashboard, requests) = ready_dashboard();
        let refresh = dashboard.update(Message::Refresh);

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&refresh, SourceKind::AllMeetings),
            result: Ok(vec![meeting(2, today(), &[]), meeting(3, today(), &[])]),
        });
        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Ok(vec![meeting(1, today(), &[])]),
        });

        assert_eq!(dashboard.all_meetings().len(), 2);
    }

    #[test]
    fn test_students_error_blocks_the_data_area() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Ok(vec![meeting(1, today(), &[])]),
        });
        dashboard.update(Message::DatedMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::DatedMeetings),
            date: today(),
            result: Ok(vec![]),
        });
        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::new(ErrorKind::Database, "roster unavailable")),
        });

        match dashboard.view() {
            DashboardView::Error {
                title,
                message,
                errors,
            } => {
                assert_eq!(title, ERROR_TITLE);
                assert_eq!(message, "roster unavailable");
                assert_eq!(errors.len(), 1);
                assert!(errors.contains_key(&SourceKind::Students));
            }
            other => panic!("expected error view, got {:?}", other),
        }
        assert_eq!(dashboard.all_meetings().len(), 1);
    }

    #[test]
    fn test_error_priority_order() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::new(ErrorKind::Database, "students failed")),
        });
        dashboard.update(Message::DatedMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::DatedMeetings),
            date: today(),
            result: Err(FetchError::new(ErrorKind::Database, "dated failed")),
        });
        assert_eq!(dashboard.error_message().as_deref(), Some("dated failed"));

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Err(FetchError::new(ErrorKind::Database, "all failed")),
        });
        assert_eq!(dashboard.error_message().as_deref(), Some("all failed"));
        assert_eq!(dashboard.errors().len(), 3);
    }

    #[test]
    fn test_error_without_text_uses_fallback() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::bare(ErrorKind::Unknown)),
        });

        assert_eq!(dashboard.error_message().as_deref(), Some(GENERIC_ERROR_MESSAGE));
    }

    #[test]
    fn test_error_message_skips_errors_without_text() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Err(FetchError::bare(ErrorKind::Unknown)),
        });
        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::new(ErrorKind::Database, "roster down")),
        });

        assert_eq!(dashboard.error_message().as_deref(), Some("roster down"));
        assert_eq!(dashboard.view().error_message(), Some("roster down"));
        assert_eq!(dashboard.errors().len(), 2);
    }

    #[test]
    fn test_fallback_comes_from_the_highest_priority_error() {
        let (mut dashboard, requests) = ready_dashboard();

        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::bare(ErrorKind::Unknown)),
        });
        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Err(FetchError::new(ErrorKind::Database, "  ")),
        });

        assert_eq!(
            dashboard.error_message().as_deref(),
            Some(ErrorKind::Database.fallback_message())
        );
    }

    #[test]
    fn test_stale_students_response_is_discarded() {
        let (mut dashboard, requests) = ready_dashboard();
        let refresh = dashboard.update(Message::Refresh);

        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&refresh, SourceKind::Students),
            result: Ok(vec![student(100), student(101)]),
        });
        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::new(ErrorKind::Database, "old")),
        });

        assert!(dashboard.errors().is_empty());
        assert_eq!(dashboard.students().len(), 2);
        assert!(!dashboard.is_loading(SourceKind::Students));
    }

    #[test]
    fn test_session_response_with_unknown_seq_is_discarded() {
        let mut dashboard = Dashboard::new(today());
        let start = dashboard.start();

        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq() + 7,
            result: Err(FetchError::new(ErrorKind::Session, "not ours")),
        });
        assert!(requests.is_empty());
        assert_eq!(dashboard.session_state(), &SessionState::Pending);
        assert!(dashboard.view().is_initial_loading());

        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Ok(Some(tutor())),
        });
        assert_eq!(requests.len(), 3);
        assert_eq!(dashboard.session_state(), &SessionState::Ready(tutor()));

        // A duplicate answer after the session resolved changes nothing.
        let requests = dashboard.update(Message::SessionLoaded {
            seq: start[0].seq(),
            result: Err(FetchError::new(ErrorKind::Session, "late")),
        });
        assert!(requests.is_empty());
        assert_eq!(dashboard.session(), Some(&tutor()));
    }

    #[test]
    fn test_refresh_clears_a_recovered_error() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);

        let requests = dashboard.update(Message::Refresh);
        assert_eq!(requests.len(), 3);
        dashboard.update(Message::StudentsLoaded {
            seq: seq_of(&requests, SourceKind::Students),
            result: Err(FetchError::new(ErrorKind::Database, "timeout")),
        });
        assert!(dashboard.view().is_error());
        // Last good roster is kept while the error is shown.
        assert_eq!(dashboard.students().len(), 1);

        let retry = dashboard.update(Message::Refresh);
        resolve_all(&mut dashboard, &retry);
        assert!(dashboard.errors().is_empty());
        assert!(dashboard.view().ready().is_some());
    }

    #[test]
    fn test_panels_degrade_independently() {
        let (mut dashboard, requests) = ready_dashboard();

        let ready = dashboard.view();
        let ready = ready.ready().unwrap();
        assert!(ready.calendar.is_loading());
        assert!(ready.form.is_loading());
        assert!(ready.list.is_loading());

        dashboard.update(Message::AllMeetingsLoaded {
            seq: seq_of(&requests, SourceKind::AllMeetings),
            result: Ok(vec![meeting(1, today(), &[])]),
        });
        let view = dashboard.view();
        let ready = view.ready().unwrap();
        assert_eq!(ready.calendar.content().unwrap().meetings.len(), 1);
        assert!(ready.form.is_loading());
        assert!(ready.list.is_loading());

        resolve_all(
            &mut dashboard,
            &requests
                .iter()
                .filter(|r| r.source() != SourceKind::AllMeetings)
                .cloned()
                .collect::<Vec<_>>(),
        );
        let view = dashboard.view();
        let ready = view.ready().unwrap();
        assert_eq!(ready.session, tutor());
        assert_eq!(ready.list.content().unwrap().meetings.len(), 1);
        assert_eq!(ready.form.content().unwrap().students.len(), 1);
    }

    #[test]
    fn test_refresh_token_is_monotonic() {
        let (mut dashboard, _) = ready_dashboard();
        let mut last = dashboard.refresh_token();

        for _ in 0..5 {
            dashboard.update(Message::BumpRefresh);
            assert!(dashboard.refresh_token() > last);
            last = dashboard.refresh_token();
        }

        let requests = dashboard.update(Message::MeetingSaved(meeting(7, today(), &[])));
        assert!(dashboard.refresh_token() > last);
        assert_eq!(requests.len(), 2);
        assert!(requests.iter().any(|r| r.source() == SourceKind::AllMeetings));
        assert!(requests.iter().any(|r| r.source() == SourceKind::DatedMeetings));
    }

    #[test]
    fn test_view_window_is_independent_of_selected_date() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);
        let initial = dashboard.view_window();
        assert_eq!(initial.start, date(2024, 4, 1));

        dashboard.update(Message::SelectDate(date(2024, 9, 3)));
        assert_eq!(dashboard.view_window(), initial);

        dashboard.update(Message::Navigate(Direction::Forward));
        assert_eq!(dashboard.view_window().start, date(2024, 5, 1));
        dashboard.update(Message::Navigate(Direction::Backward));
        dashboard.update(Message::Navigate(Direction::Backward));
        assert_eq!(dashboard.view_window().start, date(2024, 3, 1));
    }

    #[test]
    fn test_go_to_today_resets_date_and_window() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);
        dashboard.update(Message::SelectDate(date(2024, 9, 3)));
        dashboard.update(Message::Navigate(Direction::Forward));
        let token = dashboard.refresh_token();

        let requests = dashboard.update(Message::GoToToday);

        assert_eq!(dashboard.selected_date(), today());
        assert_eq!(dashboard.view_window().start, date(2024, 4, 1));
        assert!(dashboard.refresh_token() > token);
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].source(), SourceKind::DatedMeetings);
    }

    #[test]
    fn test_selection_is_pruned_to_dated_meetings() {
        let (mut dashboard, requests) = ready_dashboard();
        resolve_all(&mut dashboard, &requests);

        dashboard.update(Message::ToggleMeetingSelection(1));
        dashboard.update(Message::ToggleMeetingSelection(5));
        dashboard.update(Message::ToggleMeetingSelection(5));
        assert_eq!(dashboard.selected_meetings().len(), 1);

        let d2 = date(2024, 5, 16);
        let requests = dashboard.update(Message::SelectDate(d2));
        dashboard.update(Message::DatedMeetingsLoaded {
            seq: requests[0].seq(),
            date: d2,
            result: Ok(vec![meeting(2, d2, &[])]),
        });
        assert!(dashboard.selected_meetings().is_empty());

        dashboard.update(Message::ToggleMeetingSelection(2));
        dashboard.update(Message::ClearMeetingSelection);
        assert!(dashboard.selected_meetings().is_empty());
    }
}
