//! Roofdesk API server library.
//!
//! Exposes config, state, error handling, routes and the background
//! notification dispatcher so integration tests and the binary entrypoint
//! can both access them.

pub mod auth;
pub mod config;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod notifications;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
