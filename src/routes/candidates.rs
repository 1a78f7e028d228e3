//! Candidate CRUD endpoints.

use crate::cache::{ApiCache, keys};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Candidate, CandidatePayload, MessageResponse};
use crate::routes::missing_fields;
use crate::routes::params::SortOrder;
use crate::store::candidates;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Create a candidate. The (firstName, lastName, district, office) tuple
/// must be unique.
#[openapi(tag = "Candidates")]
#[post("/candidates", data = "<payload>")]
pub async fn create_candidate(
    payload: Json<CandidatePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Candidate>>, ApiError> {
    let new = payload.validated().map_err(missing_fields)?;

    let candidate = candidates::insert(pool.inner(), &new)
        .await
        .map_err(|e| ApiError::conflict(e, "Candidate"))?;

    cache.invalidate_prefix(keys::CANDIDATES);

    Ok(status::Created::new(format!("/v1/candidates/{}", candidate.id)).body(Json(candidate)))
}

/// List candidates with optional exact-match filters on office and
/// district. Default order is office then district ascending.
#[openapi(tag = "Candidates")]
#[get("/candidates?<office>&<district>&<order>")]
pub async fn list_candidates(
    office: Option<String>,
    district: Option<String>,
    order: Option<SortOrder>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let order = order.unwrap_or(SortOrder::Asc);
    let key = keys::candidates(office.as_deref(), district.as_deref(), order.query_value());

    if let Some(cached) = cache.lookup::<Vec<Candidate>>(&key) {
        return Ok(Json(cached));
    }

    let rows = candidates::list(
        pool.inner(),
        office.as_deref(),
        district.as_deref(),
        order.sql_keyword(),
    )
    .await?;

    cache.store(&key, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Get a candidate by id.
#[openapi(tag = "Candidates")]
#[get("/candidates/<id>")]
pub async fn get_candidate(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Candidate>, ApiError> {
    let key = keys::candidate(id);

    if let Some(cached) = cache.lookup::<Candidate>(&key) {
        return Ok(Json(cached));
    }

    let candidate = candidates::find(pool.inner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Candidate with id {id} not found")))?;

    cache.store(&key, &candidate, config.item_ttl);
    Ok(Json(candidate))
}

/// Partially update a candidate; absent fields keep their stored values.
#[openapi(tag = "Candidates")]
#[patch("/candidates/<id>", data = "<changes>")]
pub async fn update_candidate(
    id: i32,
    changes: Json<CandidatePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<Candidate>, ApiError> {
    let updated = candidates::update(pool.inner(), id, &changes)
        .await
        .map_err(|e| ApiError::conflict(e, "Candidate"))?
        .ok_or_else(|| ApiError::NotFound(format!("Candidate with id {id} not found")))?;

    cache.invalidate(&[&keys::candidate(id)]);
    cache.invalidate_prefix(keys::CANDIDATES);
    // Candidate fields are embedded in volunteer details and report rows.
    cache.invalidate_prefix(keys::VOLUNTEER_ITEMS);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(Json(updated))
}

/// Delete a candidate. Link rows and campaigns referencing the candidate
/// are removed with it.
#[openapi(tag = "Candidates")]
#[delete("/candidates/<id>")]
pub async fn delete_candidate(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<MessageResponse>, ApiError> {
    let removed = candidates::delete(pool.inner(), id).await?;
    if !removed {
        return Err(ApiError::NotFound(format!(
            "Candidate with id {id} not found"
        )));
    }

    cache.invalidate(&[&keys::candidate(id)]);
    cache.invalidate_prefix(keys::CANDIDATES);
    // Cascades remove campaigns and volunteer links referencing the
    // candidate.
    cache.invalidate_prefix(keys::VOLUNTEER_ITEMS);
    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(Json(MessageResponse {
        message: format!("Candidate with id {id} deleted successfully"),
    }))
}

/// Fetch the candidates for a list of ids. Ids without a matching record
/// are skipped rather than failing the batch.
#[openapi(tag = "Candidates")]
#[post("/candidates/batch-fetch", data = "<ids>")]
pub async fn batch_fetch_candidates(
    ids: Json<Vec<i32>>,
    pool: &State<PgPool>,
) -> Result<Json<Vec<Candidate>>, ApiError> {
    let rows = candidates::fetch_batch(pool.inner(), &ids).await?;
    Ok(Json(rows))
}
