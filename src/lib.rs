//! # rentdash - Rental-arbitrage operations dashboard
//!
//! rentdash pulls property-management records from two Google Sheets
//! worksheets, derives the business metrics the operations team works from
//! (lease expirations, pending deposit returns, lead funnel by month), and
//! renders them as an HTML page.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────┐     ┌────────────┐     ┌────────────┐     ┌────────────┐
//! │ Credential │────▶│   Sheets   │────▶│  Pipeline  │────▶│   Views    │
//! │  (token)   │     │  (fetch)   │     │ (enrich)   │     │ (HTML/JSON)│
//! └────────────┘     └────────────┘     └────────────┘     └────────────┘
//! ```
//!
//! Everything is request-scoped: each dashboard request fetches both tables
//! fresh, transforms them, and renders. Nothing is cached or persisted; the
//! spreadsheet is the system of record.
//!
//! ## Modules
//!
//! - [`error`] - Hierarchical error types
//! - [`models`] - Domain models (BookingRecord, LeadRecord, ReportRow)
//! - [`auth`] - Credential provider (token store + refresh)
//! - [`sheets`] - Tabular data source over the Sheets/Drive APIs
//! - [`pipeline`] - Record transformation pipeline and report views
//! - [`api`] - HTTP server and HTML rendering

// Core modules
pub mod error;
pub mod models;

// Collaborators
pub mod auth;
pub mod sheets;

// Transformation
pub mod pipeline;

// HTTP API
pub mod api;

// =============================================================================
// Re-exports - Error types
// =============================================================================

pub use error::{AuthError, PipelineError, ServerError, SheetsError, ValidationError};

// =============================================================================
// Re-exports - Models
// =============================================================================

pub use models::{BookingRecord, LeadRecord, ReportRow, YearMonth};

// =============================================================================
// Re-exports - Collaborators
// =============================================================================

pub use auth::{Authenticator, FileTokenStore, StoredToken, TokenStore, SCOPES};
pub use sheets::{http_client, rows_from_values, SheetsClient};

// =============================================================================
// Re-exports - Pipeline
// =============================================================================

pub use pipeline::{
    build_bookings, build_leads, fetch_dashboard_data, lead_counts_by_month, DashboardData,
    LEAD_CUTOFF,
};
pub use pipeline::views::{expiring_soon, pending_rsd};

// =============================================================================
// Re-exports - API
// =============================================================================

pub use api::{render_dashboard, AppState};

// Server
pub mod server {
    pub use crate::api::server::start_server;
}
