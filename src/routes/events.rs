//! Event CRUD endpoints.

use crate::cache::{ApiCache, keys};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Event, EventPayload, EventWithLinks};
use crate::routes::missing_fields;
use crate::store::events;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Create an event, optionally recording volunteers as staff. Staff ids
/// without a matching volunteer are skipped.
#[openapi(tag = "Events")]
#[post("/events", data = "<payload>")]
pub async fn create_event(
    payload: Json<EventPayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Event>>, ApiError> {
    let new = payload.validated().map_err(missing_fields)?;

    let event = events::insert(pool.inner(), &new).await?;

    if let Some(staff) = &payload.staff {
        let linked = events::link_staff(pool.inner(), event.id, staff).await?;
        if (linked as usize) < staff.len() {
            log::debug!(
                "event {}: linked {} of {} submitted staff ids",
                event.id,
                linked,
                staff.len()
            );
        }
    }

    cache.invalidate_prefix(keys::EVENTS);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(status::Created::new(format!("/v1/events/{}", event.id)).body(Json(event)))
}

/// List all events with their linked volunteer and attendance ids.
#[openapi(tag = "Events")]
#[get("/events")]
pub async fn list_events(
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<EventWithLinks>>, ApiError> {
    if let Some(cached) = cache.lookup::<Vec<EventWithLinks>>(keys::EVENTS) {
        return Ok(Json(cached));
    }

    let rows = events::list_with_links(pool.inner()).await?;

    cache.store(keys::EVENTS, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Get an event by id with its linked volunteer and attendance ids.
#[openapi(tag = "Events")]
#[get("/events/<id>")]
pub async fn get_event(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<EventWithLinks>, ApiError> {
    let key = keys::event(id);

    if let Some(cached) = cache.lookup::<EventWithLinks>(&key) {
        return Ok(Json(cached));
    }

    let event = events::find_with_links(pool.inner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event with id {id} not found")))?;

    cache.store(&key, &event, config.item_ttl);
    Ok(Json(event))
}

/// Partially update an event; absent fields keep their stored values.
#[openapi(tag = "Events")]
#[patch("/events/<id>", data = "<changes>")]
pub async fn update_event(
    id: i32,
    changes: Json<EventPayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<Event>, ApiError> {
    let updated = events::update(pool.inner(), id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Event with id {id} not found")))?;

    if let Some(staff) = &changes.staff {
        events::link_staff(pool.inner(), id, staff).await?;
    }

    cache.invalidate(&[&keys::event(id)]);
    cache.invalidate_prefix(keys::EVENTS);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(Json(updated))
}
