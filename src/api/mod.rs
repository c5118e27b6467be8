//! HTTP API module.
//!
//! This module provides the HTTP server and HTML rendering for the dashboard.

pub mod render;
pub mod server;

pub use render::render_dashboard;
pub use server::{start_server, AppState};
