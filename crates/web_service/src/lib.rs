//! web_service - HTTP surface of the Verdi chat proxy
//!
//! Routes (all under `/v1`):
//! - `POST /sessions/{session_id}/messages` - blocking exchange
//! - `POST /sessions/{session_id}/messages/stream` - SSE exchange
//! - `GET /sessions/{session_id}/messages` - stored history
//! - `DELETE /sessions/{session_id}` - clear a session
//! - `GET /health`

pub mod controllers;
pub mod error;
pub mod models;
pub mod server;
pub mod services;
pub mod sse;

pub use error::{AppError, Result};
pub use server::{app_config, run, AppState};
