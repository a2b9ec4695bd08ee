//! Domain logic for the course-enrollment platform.
//!
//! Everything in this crate is pure: no database, no HTTP. The `db` and
//! `api` crates build on these types and rules.

pub mod actor;
pub mod error;
pub mod pagination;
pub mod pricing;
pub mod roles;
pub mod types;
pub mod validation;
