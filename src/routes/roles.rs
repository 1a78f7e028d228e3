//! Role CRUD endpoints.

use crate::cache::{ApiCache, keys};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{Role, RolePayload};
use crate::routes::missing_fields;
use crate::store::roles;
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, patch, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// Create a role. Role names are unique.
#[openapi(tag = "Roles")]
#[post("/roles", data = "<payload>")]
pub async fn create_role(
    payload: Json<RolePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Role>>, ApiError> {
    let new = payload.validated().map_err(missing_fields)?;

    let role = roles::insert(pool.inner(), &new)
        .await
        .map_err(|e| ApiError::conflict(e, "Role"))?;

    cache.invalidate(&[keys::ROLES]);

    Ok(status::Created::new(format!("/v1/roles/{}", role.id)).body(Json(role)))
}

/// List all roles ordered by name.
#[openapi(tag = "Roles")]
#[get("/roles")]
pub async fn list_roles(
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<Role>>, ApiError> {
    if let Some(cached) = cache.lookup::<Vec<Role>>(keys::ROLES) {
        return Ok(Json(cached));
    }

    let rows = roles::list(pool.inner()).await?;

    cache.store(keys::ROLES, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Get a role by id.
#[openapi(tag = "Roles")]
#[get("/roles/<id>")]
pub async fn get_role(
    id: i32,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Role>, ApiError> {
    let key = keys::role(id);

    if let Some(cached) = cache.lookup::<Role>(&key) {
        return Ok(Json(cached));
    }

    let role = roles::find(pool.inner(), id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Role with id {id} not found")))?;

    cache.store(&key, &role, config.item_ttl);
    Ok(Json(role))
}

/// Partially update a role; absent fields keep their stored values.
#[openapi(tag = "Roles")]
#[patch("/roles/<id>", data = "<changes>")]
pub async fn update_role(
    id: i32,
    changes: Json<RolePayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<Json<Role>, ApiError> {
    let updated = roles::update(pool.inner(), id, &changes)
        .await
        .map_err(|e| ApiError::conflict(e, "Role"))?
        .ok_or_else(|| ApiError::NotFound(format!("Role with id {id} not found")))?;

    cache.invalidate(&[&keys::role(id), keys::ROLES]);
    // Role rows are embedded in volunteer details.
    cache.invalidate_prefix(keys::VOLUNTEER_ITEMS);

    Ok(Json(updated))
}
