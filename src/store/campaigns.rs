//! Campaign persistence operations, including the event association table.

use super::StoreError;
use crate::models::{Campaign, CampaignWithEvents};
use sqlx::PgPool;

pub async fn insert(pool: &PgPool, candidate_id: i32) -> Result<Campaign, StoreError> {
    let campaign = sqlx::query_as::<_, Campaign>(
        r#"INSERT INTO campaigns (candidate_id)
           VALUES ($1)
           RETURNING id, candidate_id, created_at"#,
    )
    .bind(candidate_id)
    .fetch_one(pool)
    .await?;

    Ok(campaign)
}

pub async fn list_with_events(pool: &PgPool) -> Result<Vec<CampaignWithEvents>, StoreError> {
    let campaigns = sqlx::query_as::<_, CampaignWithEvents>(
        r#"SELECT cp.id, cp.candidate_id, cp.created_at,
                  COALESCE((SELECT array_agg(ce.event_id ORDER BY ce.event_id)
                            FROM campaign_events ce WHERE ce.campaign_id = cp.id),
                           ARRAY[]::INTEGER[]) AS event_ids
           FROM campaigns cp
           ORDER BY cp.id ASC"#,
    )
    .fetch_all(pool)
    .await?;

    Ok(campaigns)
}

/// Link the given events to a campaign. Ids without an event row are
/// skipped, and already-linked pairs stay linked.
pub async fn link_events(
    pool: &PgPool,
    campaign_id: i32,
    event_ids: &[i32],
) -> Result<u64, StoreError> {
    let result = sqlx::query(
        r#"INSERT INTO campaign_events (campaign_id, event_id)
           SELECT $1, e.id FROM events e WHERE e.id = ANY($2)
           ON CONFLICT DO NOTHING"#,
    )
    .bind(campaign_id)
    .bind(event_ids)
    .execute(pool)
    .await?;

    Ok(result.rows_affected())
}
