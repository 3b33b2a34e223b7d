// Declare modules
pub mod meeting;
pub mod session;
pub mod settings;
pub mod student;

// Flattened so callers can write `crate::models::Meeting`.
pub use meeting::{Attendee, Meeting, MeetingRow};
pub use session::{Role, Session, User};
pub use settings::{Setting, CURRENT_ROUTE_KEY, DEMO_USER_ID_KEY};
pub use student::Student;
