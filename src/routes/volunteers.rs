//! Volunteer CRUD endpoints, including bulk insertion.

use crate::cache::{ApiCache, keys};
use crate::config::{ApiConfig, BatchPolicy};
use crate::error::ApiError;
use crate::models::{MessageResponse, Volunteer, VolunteerDetail, VolunteerPayload};
use crate::routes::missing_fields;
use crate::routes::params::SortOrder;
use crate::store::{candidates, roles, volunteers};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use rocket_okapi::okapi::schemars::{self, JsonSchema};
use rocket_okapi::openapi;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

/// One failed element of a batch insert.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchFailure {
    /// Zero-based position of the element in the submitted list.
    pub index: usize,
    pub error: String,
}

/// Aggregate result of a batch insert.
#[derive(Debug, Serialize, Deserialize, JsonSchema)]
pub struct BatchPostOutcome {
    pub message: String,
    /// Ids of the volunteers that were inserted, in submission order.
    pub inserted: Vec<i32>,
    pub failed: Vec<BatchFailure>,
}

/// Create a volunteer, optionally linking an existing candidate and role.
#[openapi(tag = "Volunteers")]
#[post("/volunteers", data = "<payload>")]
pub async fn create_volunteer(
    payload: Json<VolunteerPayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Volunteer>>, ApiError> {
    let new = payload.validated().map_err(missing_fields)?;

    if let Some(candidate_id) = payload.candidate_id {
        candidates::find(pool.inner(), candidate_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Candidate with id {candidate_id} not found"))
            })?;
    }
    if let Some(role_id) = payload.role_id {
        roles::find(pool.inner(), role_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("Role with id {role_id} not found")))?;
    }

    let volunteer = volunteers::insert(pool.inner(), &new).await?;

    if let Some(candidate_id) = payload.candidate_id {
        volunteers::link_candidate(pool.inner(), volunteer.id, candidate_id).await?;
    }
    if let Some(role_id) = payload.role_id {
        volunteers::link_role(pool.inner(), volunteer.id, role_id).await?;
    }

    cache.invalidate_prefix(keys::VOLUNTEERS);

    Ok(status::Created::new(format!("/v1/volunteers/{}", volunteer.id)).body(Json(volunteer)))
}

/// List volunteers with an optional exact name filter, ordered by name.
#[openapi(tag = "Volunteers")]
#[get("/volunteers?<name>&<order>")]
pub async fn list_volunteers(
    name: Option<String>,
    order: Option<SortOrder>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<Volunteer>>, ApiError> {
    let order = order.unwrap_or(SortOrder::Asc);
    let key = keys::volunteers(name.as_deref(), order.query_value());

    if let Some(cached) = cache.lookup::<Vec<Volunteer>>(&key) {
        return Ok(Json(cached));
    }

    let rows = volunteers::list(pool.inner(), name.as_deref(), order.sql_keyword()).await?;

    cache.store(&key, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Get a volunteer by id together with the roles and candidates linked
/// through the association tables.
#[openapi(tag = "Volunteers")]
#[get("/volunteers/<id>")]
pub async fn get_volunteer(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<VolunteerDetail>, ApiError> {
    let key = keys::volunteer(id);

    if let Some(cached) = cache.lookup::<VolunteerDetail>(&key) {
        return Ok(Json(cached));
    }

    let volunteer = volunteers::find(pool.inner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Volunteer with id {id} not found")))?;
    let roles = volunteers::roles_for(pool.inner(), id).await?;
    let candidates = volunteers::candidates_for(pool.inner(), id).await?;

    let detail = VolunteerDetail {
        volunteer,
        roles,
        candidates,
    };

    cache.store(&key, &detail, config.item_ttl);
    Ok(Json(detail))
}

/// Partially update a volunteer. Supplying `candidateId` records an
/// additional candidate link.
#[openapi(tag = "Volunteers")]
#[patch("/volunteers/<id>", data = "<changes>")]
pub async fn update_volunteer(
    id: i32,
    changes: Json<VolunteerPayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<Volunteer>, ApiError> {
    if let Some(candidate_id) = changes.candidate_id {
        candidates::find(pool.inner(), candidate_id)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Candidate with id {candidate_id} not found"))
            })?;
    }

    let updated = volunteers::update(pool.inner(), id, &changes)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Volunteer with id {id} not found")))?;

    if let Some(candidate_id) = changes.candidate_id {
        volunteers::link_candidate(pool.inner(), id, candidate_id).await?;
    }

    cache.invalidate(&[&keys::volunteer(id)]);
    cache.invalidate_prefix(keys::VOLUNTEERS);

    Ok(Json(updated))
}

/// Delete a volunteer and its association rows.
#[openapi(tag = "Volunteers")]
#[delete("/volunteers/<id>")]
pub async fn delete_volunteer(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = volunteers::delete(pool.inner(), id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "Volunteer with id {id} not found"
        )));
    }

    cache.invalidate(&[&keys::volunteer(id)]);
    cache.invalidate_prefix(keys::VOLUNTEERS);
    // Cascades remove event staff links, which event responses embed.
    cache.invalidate_prefix(keys::EVENTS);
    cache.invalidate_prefix(keys::EVENT_ITEMS);

    Ok(Json(MessageResponse {
        message: format!("Volunteer with id {id} deleted successfully"),
    }))
}

/// Insert a list of volunteers sequentially.
///
/// Elements succeed or fail independently. Under the default
/// continue-on-error policy every element is attempted and failures are
/// reported per element; under abort-on-error processing stops at the
/// first failure and later elements are left unprocessed.
#[openapi(tag = "Volunteers")]
#[post("/volunteers/batch-post", data = "<payloads>")]
pub async fn batch_post_volunteers(
    payloads: Json<Vec<VolunteerPayload>>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<status::Created<Json<BatchPostOutcome>>, ApiError> {
    let mut inserted = Vec::new();
    let mut failed = Vec::new();
    let mut aborted_at = None;

    for (index, payload) in payloads.iter().enumerate() {
        let outcome = match payload.validated() {
            Ok(new) => volunteers::insert(pool.inner(), &new)
                .await
                .map_err(|e| e.to_string()),
            Err(fields) => Err(format!("missing required fields: {}", fields.join(", "))),
        };

        match outcome {
            Ok(volunteer) => inserted.push(volunteer.id),
            Err(error) => {
                log::warn!("batch volunteer insert failed at element {}: {}", index, error);
                failed.push(BatchFailure { index, error });
                if config.batch_policy == BatchPolicy::AbortOnError {
                    aborted_at = Some(index);
                    break;
                }
            }
        }
    }

    if !inserted.is_empty() {
        cache.invalidate_prefix(keys::VOLUNTEERS);
    }

    let message = match aborted_at {
        Some(index) => format!(
            "Added {} volunteers before aborting at element {index}",
            inserted.len()
        ),
        None => format!(
            "Added {} volunteers ({} failed)",
            inserted.len(),
            failed.len()
        ),
    };

    Ok(status::Created::new("/v1/volunteers").body(Json(BatchPostOutcome {
        message,
        inserted,
        failed,
    })))
}
