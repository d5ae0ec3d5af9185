//! API module for the Lecture Tutor service
//!
//! REST endpoints for the browser extension and external integrations.

pub mod models;
pub mod server;

pub use server::{start_http_server, AppState};
