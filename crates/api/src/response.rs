//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "data": ... }` envelope, optionally with a
//! human-readable `message`.

use coursehub_core::pagination::Pagination;
use serde::Serialize;

/// Standard `{ "data": T }` response envelope.
#[derive(Debug, Serialize)]
pub struct DataResponse<T: Serialize> {
    pub data: T,
}

/// `{ "message": ..., "data": T }` for mutations that report what happened.
#[derive(Debug, Serialize)]
pub struct MessageResponse<T: Serialize> {
    pub message: String,
    pub data: T,
}

/// A page of items plus pagination metadata.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}
