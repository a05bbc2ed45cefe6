pub mod config_sync;
pub mod course_sync;
pub mod debounce;
pub mod scheduler;
pub mod session;

pub use config_sync::ConfigEngine;
pub use course_sync::CourseEngine;
pub use debounce::Debouncer;
pub use scheduler::RosterPoller;
pub use session::SessionEngine;
