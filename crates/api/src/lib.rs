//! HTTP server for the imagen generation service.
//!
//! Request flow: `POST /api/v1/generate` records a task and detaches a
//! dispatch to the external worker; the worker reports back through
//! `POST /api/v1/webhook/result`; clients poll `GET /api/v1/status/{id}`
//! until a terminal status.

pub mod auth;
pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod state;
