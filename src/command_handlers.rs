//! Command handlers module
//!
//! Runs the fetches a `Dashboard` asks for against the collaborators and
//! feeds each answer back as a `Message`. The dashboard itself is only ever
//! touched from the controller, so every state change happens on one task
//! while any number of fetches are outstanding.

use log::{debug, info};
use tokio::sync::{mpsc, watch};
use tokio_util::sync::CancellationToken;

use crate::dashboard::Dashboard;
use crate::error::FetchError;
use crate::messages::{FetchRequest, Message};
use crate::sources::Sources;
use crate::ui_state::DashboardView;

/// Turns fetch requests into collaborator calls
#[derive(Clone)]
pub struct FetchHandlers {
    pub sources: Sources,
}

impl FetchHandlers {
    pub fn new(sources: Sources) -> Self {
        Self { sources }
    }

    /// Performs one request. Collaborator errors are captured in the
    /// returned message, never propagated.
    pub async fn execute(&self, request: FetchRequest) -> Message {
        match request {
            FetchRequest::Session { seq } => {
                debug!("Resolving current session (#{})", seq);
                let result = self
                    .sources
                    .sessions
                    .current_session()
                    .await
                    .map_err(FetchError::from);
                Message::SessionLoaded { seq, result }
            }
            FetchRequest::AllMeetings { seq, owner_id } => {
                debug!("Loading meetings for owner {} (#{})", owner_id, seq);
                let result = self
                    .sources
                    .meetings
                    .meetings_by_owner(owner_id)
                    .await
                    .map_err(FetchError::from);
                Message::AllMeetingsLoaded { seq, result }
            }
            FetchRequest::DatedMeetings { seq, session, date } => {
                debug!("Loading meetings on {} for {} (#{})", date, session.role.as_str(), seq);
                let result = self
                    .sources
                    .meetings
                    .meetings_by_role_and_date(&session, date)
                    .await
                    .map_err(FetchError::from);
                Message::DatedMeetingsLoaded { seq, date, result }
            }
            FetchRequest::Students { seq, session } => {
                debug!("Loading students for {} (#{})", session.role.as_str(), seq);
                let result = self
                    .sources
                    .students
                    .students_for_role(&session)
                    .await
                    .map_err(FetchError::from);
                Message::StudentsLoaded { seq, result }
            }
        }
    }
}

/// Owns a `Dashboard` and drives it from fetch completions and consumer
/// callbacks.
pub struct DashboardController {
    dashboard: Dashboard,
    handlers: FetchHandlers,
    sender: mpsc::UnboundedSender<Message>,
    receiver: mpsc::UnboundedReceiver<Message>,
    view_tx: watch::Sender<DashboardView>,
}

impl DashboardController {
    pub fn new(dashboard: Dashboard, sources: Sources) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let (view_tx, _) = watch::channel(dashboard.view());
        Self {
            dashboard,
            handlers: FetchHandlers::new(sources),
            sender,
            receiver,
            view_tx,
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn view(&self) -> DashboardView {
        self.dashboard.view()
    }

    /// Snapshot stream for presentation consumers. Each value reflects a
    /// fully applied message.
    pub fn subscribe(&self) -> watch::Receiver<DashboardView> {
        self.view_tx.subscribe()
    }

    /// Handle consumers use to send callbacks (date selection, mutations).
    pub fn sender(&self) -> mpsc::UnboundedSender<Message> {
        self.sender.clone()
    }

    pub fn start(&mut self) {
        let requests = self.dashboard.start();
        self.issue(requests);
        self.publish();
    }

    /// Applies a message right away and issues whatever it triggers.
    pub fn dispatch(&mut self, message: Message) {
        let requests = self.dashboard.update(message);
        self.issue(requests);
        self.publish();
    }

    /// Waits for the next fetch result or callback and applies it.
    /// Returns false once the channel is closed.
    pub async fn process_next(&mut self) -> bool {
        match self.receiver.recv().await {
            Some(message) => {
                self.dispatch(message);
                true
            }
            None => false,
        }
    }

    /// Processes messages until no fetch the dashboard cares about is
    /// outstanding. A collaborator that never answers keeps this waiting.
    pub async fn run_until_idle(&mut self) {
        while self.dashboard.has_pending_fetches() {
            if !self.process_next().await {
                break;
            }
        }
    }

    /// Processes messages until `shutdown` fires.
    pub async fn run(&mut self, shutdown: CancellationToken) {
        info!("Dashboard controller running");
        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    info!("Shutdown signal received, stopping dashboard controller");
                    break;
                }
                processed = self.process_next() => {
                    if !processed {
                        break;
                    }
                }
            }
        }
    }

    fn issue(&self, requests: Vec<FetchRequest>) {
        for request in requests {
            debug!("Issuing {} fetch #{}", request.source().as_str(), request.seq());
            let handlers = self.handlers.clone();
            let sender = self.sender.clone();
            tokio::spawn(async move {
                let message = handlers.execute(request).await;
                // The controller may already be gone; nothing left to update.
                let _ = sender.send(message);
            });
        }
    }

    fn publish(&self) {
        self.view_tx.send_replace(self.dashboard.view());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, ErrorKind};
    use crate::messages::SourceKind;
    use crate::models::{Meeting, Role, Session};
    use crate::sources::{MockMeetingStore, MockSessionResolver, MockStudentRoster};
    use chrono::{NaiveDate, Utc};
    use std::sync::Arc;

    fn tutor() -> Session {
        Session {
            user_id: 12,
            role: Role::Tutor,
            school: "North".to_string(),
            display_name: "Ada Byron".to_string(),
            email: None,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 10, 2).unwrap()
    }

    #[tokio::test]
    async fn test_failed_session_issues_no_dependent_calls() {
        let mut sessions = MockSessionResolver::new();
        sessions
            .expect_current_session()
            .times(1)
            .returning(|| Err(AppError::session("directory offline")));
        let mut meetings = MockMeetingStore::new();
        meetings.expect_meetings_by_owner().never();
        meetings.expect_meetings_by_role_and_date().never();
        let mut students = MockStudentRoster::new();
        students.expect_students_for_role().never();

        let sources = Sources::new(Arc::new(sessions), Arc::new(meetings), Arc::new(students));
        let mut controller = DashboardController::new(Dashboard::new(today()), sources);
        controller.start();
        controller.run_until_idle().await;

        let view = controller.view();
        assert!(view.is_error());
        assert_eq!(view.error_message(), Some("directory offline"));
    }

    #[tokio::test]
    async fn test_dependent_calls_use_the_session() {
        let mut sessions = MockSessionResolver::new();
        sessions
            .expect_current_session()
            .times(1)
            .returning(|| Ok(Some(tutor())));
        let mut meetings = MockMeetingStore::new();
        meetings
            .expect_meetings_by_owner()
            .withf(|owner_id| *owner_id == 12)
            .times(1)
            .returning(|_| Ok(vec![Meeting::new("Reading".to_string(), Utc::now(), 12)]));
        meetings
            .expect_meetings_by_role_and_date()
            .withf(|session, date| session.user_id == 12 && *date == today())
            .times(1)
            .returning(|_, _| Ok(Vec::new()));
        let mut students = MockStudentRoster::new();
        students
            .expect_students_for_role()
            .times(1)
            .returning(|_| Err(AppError::Database(sqlx::Error::PoolTimedOut)));

        let sources = Sources::new(Arc::new(sessions), Arc::new(meetings), Arc::new(students));
        let mut controller = DashboardController::new(Dashboard::new(today()), sources);
        let views = controller.subscribe();
        controller.start();
        controller.run_until_idle().await;

        let dashboard = controller.dashboard();
        assert_eq!(dashboard.all_meetings().len(), 1);
        assert_eq!(
            dashboard.errors().get(&SourceKind::Students).map(|e| e.kind),
            Some(ErrorKind::Database)
        );
        assert_eq!(*views.borrow(), controller.view());
    }
}
