pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;
pub mod services;
pub mod state;
pub mod time_window;

pub use engine::{Engine, EngineOptions};
pub use error::AppError;
pub use state::{AppState, Event, Store};
