//! Coursehub API server library.
//!
//! Exposes the core building blocks (config, state, error handling, auth,
//! the enrollment lifecycle, routes) so integration tests and the binary
//! entrypoints can all access them.

pub mod auth;
pub mod config;
pub mod enrollment;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod query;
pub mod response;
pub mod router;
pub mod routes;
pub mod state;
