//! HTTP route handlers grouped by resource domain.
//!
//! Each submodule corresponds to one resource of the API (candidates,
//! volunteers, events, etc.) and exposes typed Rocket handlers annotated
//! with `#[openapi]` so `rocket_okapi` can derive an OpenAPI document
//! automatically. Handlers validate required fields before any store
//! access, read through the response cache on GETs, and invalidate the
//! affected keys after writes.

pub mod attendances;
pub mod campaigns;
pub mod candidates;
pub mod catchers;
pub mod events;
pub mod health;
pub mod params;
pub mod roles;
pub mod volunteers;

use crate::error::ApiError;

/// Build the 400 response for payloads whose required fields are absent.
pub(crate) fn missing_fields(fields: Vec<&'static str>) -> ApiError {
    ApiError::BadRequest(format!("Missing required fields: {}", fields.join(", ")))
}
