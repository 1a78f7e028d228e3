//! Attendance CRUD endpoints.

use crate::cache::{ApiCache, keys};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Attendance, AttendancePayload};
use crate::routes::missing_fields;
use crate::store::{attendances, events};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Create an attendance record, optionally linking it to an existing
/// event.
#[openapi(tag = "Attendances")]
#[post("/attendances", data = "<payload>")]
pub async fn create_attendance(
    payload: Json<AttendancePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Attendance>>, ApiError> {
    let new = payload.validated().map_err(missing_fields)?;

    if let Some(event_id) = payload.event_id {
        events::find(pool.inner(), event_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Event with id {event_id} not found")))?;
    }

    let attendance = attendances::insert(pool.inner(), &new).await?;

    if let Some(event_id) = payload.event_id {
        attendances::link_event(pool.inner(), attendance.id, event_id).await?;
        // The linked event's responses embed attendance ids.
        cache.invalidate(&[&keys::event(event_id)]);
        cache.invalidate_prefix(keys::EVENTS);
    }

    cache.invalidate_prefix(keys::ATTENDANCES);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(status::Created::new(format!("/v1/attendances/{}", attendance.id)).body(Json(attendance)))
}

/// List all attendance records ordered by name.
#[openapi(tag = "Attendances")]
#[get("/attendances")]
pub async fn list_attendances(
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<Attendance>>, ApiError> {
    if let Some(cached) = cache.lookup::<Vec<Attendance>>(keys::ATTENDANCES) {
        return Ok(Json(cached));
    }

    let rows = attendances::list(pool.inner()).await?;

    cache.store(keys::ATTENDANCES, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Get an attendance record by id.
#[openapi(tag = "Attendances")]
#[get("/attendances/<id>")]
pub async fn get_attendance(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Attendance>, ApiError> {
    let key = keys::attendance(id);

    if let Some(cached) = cache.lookup::<Attendance>(&key) {
        return Ok(Json(cached));
    }

    let attendance = attendances::find(pool.inner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attendance record with id {id} not found")))?;

    cache.store(&key, &attendance, config.item_ttl);
    Ok(Json(attendance))
}

/// Partially update an attendance record; absent fields keep their stored
/// values.
#[openapi(tag = "Attendances")]
#[patch("/attendances/<id>", data = "<changes>")]
pub async fn update_attendance(
    id: i32,
    changes: Json<AttendancePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<Attendance>, ApiError> {
    let updated = attendances::update(pool.inner(), id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Attendance record with id {id} not found")))?;

    cache.invalidate(&[&keys::attendance(id)]);
    cache.invalidate_prefix(keys::ATTENDANCES);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(Json(updated))
}
