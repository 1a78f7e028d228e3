//! Campaign endpoints: listing, creation, and the aggregate reports.

use crate::cache::{ApiCache, keys};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::models::{
    Campaign, CampaignAttendees, CampaignDonations, CampaignMoneyRaised, CampaignPayload,
    CampaignWithEvents,
};
use crate::routes::missing_fields;
use crate::routes::params::SortOrder;
use crate::store::{campaigns, candidates, reports};
use rocket::response::status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// List all campaigns with their linked event ids.
#[openapi(tag = "Campaigns")]
#[get("/campaigns")]
pub async fn list_campaigns(
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<CampaignWithEvents>>, ApiError> {
    if let Some(cached) = cache.lookup::<Vec<CampaignWithEvents>>(keys::CAMPAIGNS) {
        return Ok(Json(cached));
    }

    let rows = campaigns::list_with_events(pool.inner()).await?;

    cache.store(keys::CAMPAIGNS, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Create a campaign for an existing candidate, optionally linking events.
/// Event ids without a matching event are skipped.
#[openapi(tag = "Campaigns")]
#[post("/campaigns", data = "<payload>")]
pub async fn create_campaign(
    payload: Json<CampaignPayload>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
) -> Result<status::Created<Json<Campaign>>, ApiError> {
    let candidate_id = payload.validated().map_err(missing_fields)?;

    candidates::find(pool.inner(), candidate_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Candidate with id {candidate_id} not found")))?;

    let campaign = campaigns::insert(pool.inner(), candidate_id).await?;

    if let Some(event_ids) = &payload.event_ids {
        campaigns::link_events(pool.inner(), campaign.id, event_ids).await?;
    }

    cache.invalidate_prefix(keys::CAMPAIGNS);

    Ok(status::Created::new(format!("/v1/campaigns/{}", campaign.id)).body(Json(campaign)))
}

/// Money raised per campaign, summed over the campaign's linked events.
/// Campaigns with no events report zero.
#[openapi(tag = "Campaigns")]
#[get("/campaigns/money-raised?<sort>")]
pub async fn money_raised(
    sort: Option<SortOrder>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<CampaignMoneyRaised>>, ApiError> {
    let sort = sort.unwrap_or(SortOrder::Desc);
    let key = keys::report("money-raised", sort.query_value());

    if let Some(cached) = cache.lookup::<Vec<CampaignMoneyRaised>>(&key) {
        return Ok(Json(cached));
    }

    let rows = reports::money_raised(pool.inner(), sort.sql_keyword()).await?;

    cache.store(&key, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Donations collected per campaign across attendances of its linked
/// events.
#[openapi(tag = "Campaigns")]
#[get("/campaigns/donations?<sort>")]
pub async fn donations(
    sort: Option<SortOrder>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<CampaignDonations>>, ApiError> {
    let sort = sort.unwrap_or(SortOrder::Desc);
    let key = keys::report("donations", sort.query_value());

    if let Some(cached) = cache.lookup::<Vec<CampaignDonations>>(&key) {
        return Ok(Json(cached));
    }

    let rows = reports::donations(pool.inner(), sort.sql_keyword()).await?;

    cache.store(&key, &rows, config.list_ttl);
    Ok(Json(rows))
}

/// Distinct attendee count per campaign across its linked events.
#[openapi(tag = "Campaigns")]
#[get("/campaigns/attendees?<sort>")]
pub async fn attendees(
    sort: Option<SortOrder>,
    pool: &State<PgPool>,
    cache: &State<ApiCache>,
    config: &State<ApiConfig>,
) -> Result<Json<Vec<CampaignAttendees>>, ApiError> {
    let sort = sort.unwrap_or(SortOrder::Desc);
    let key = keys::report("attendees", sort.query_value());

    if let Some(cached) = cache.lookup::<Vec<CampaignAttendees>>(&key) {
        return Ok(Json(cached));
    }

    let rows = reports::attendees(pool.inner(), sort.sql_keyword()).await?;

    cache.store(&key, &rows, config.list_ttl);
    Ok(Json(rows))
}
