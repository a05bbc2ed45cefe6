pub mod config;
pub mod course;
pub mod session;

pub use config::{ConfigFields, MonitorConfig, TimeRange};
pub use course::{Course, CourseStatus, RegisterState, is_valid_uid, upsert_course};
pub use session::{Credentials, Session, SessionPayload, SessionPhase};
