//! Aggregate reporting queries joining campaigns to events and attendances.
//!
//! All three reports use LEFT JOIN semantics: a campaign with no linked
//! events still appears with an aggregate of zero. Ordering follows the
//! caller-supplied direction on the aggregate with campaign id ascending as
//! the tie-break.

use super::StoreError;
use crate::models::{CampaignAttendees, CampaignDonations, CampaignMoneyRaised};
use sqlx::PgPool;

/// Total `money_raised` across each campaign's linked events.
pub async fn money_raised(pool: &PgPool, dir: &str) -> Result<Vec<CampaignMoneyRaised>, StoreError> {
    let query = format!(
        r#"SELECT cp.id AS campaign_id,
                  cd.id AS candidate_id,
                  cd.first_name,
                  cd.last_name,
                  COALESCE(SUM(e.money_raised), 0) AS total_money_raised
           FROM campaigns cp
           JOIN candidates cd ON cp.candidate_id = cd.id
           LEFT JOIN campaign_events ce ON ce.campaign_id = cp.id
           LEFT JOIN events e ON e.id = ce.event_id
           GROUP BY cp.id, cd.id
           ORDER BY total_money_raised {dir}, cp.id ASC"#
    );

    let rows = sqlx::query_as::<_, CampaignMoneyRaised>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Total donations collected from attendances across each campaign's
/// linked events. An attendance linked to two of the campaign's events
/// counts once per link.
pub async fn donations(pool: &PgPool, dir: &str) -> Result<Vec<CampaignDonations>, StoreError> {
    let query = format!(
        r#"SELECT cp.id AS campaign_id,
                  cp.candidate_id,
                  COALESCE(SUM(a.donation_amount), 0) AS total_donations
           FROM campaigns cp
           LEFT JOIN campaign_events ce ON ce.campaign_id = cp.id
           LEFT JOIN event_attendances ea ON ea.event_id = ce.event_id
           LEFT JOIN attendances a ON a.id = ea.attendance_id
           GROUP BY cp.id
           ORDER BY total_donations {dir}, cp.id ASC"#
    );

    let rows = sqlx::query_as::<_, CampaignDonations>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}

/// Distinct attendee count across each campaign's linked events.
pub async fn attendees(pool: &PgPool, dir: &str) -> Result<Vec<CampaignAttendees>, StoreError> {
    let query = format!(
        r#"SELECT cp.id AS campaign_id,
                  cd.id AS candidate_id,
                  cd.first_name,
                  cd.last_name,
                  COUNT(DISTINCT ea.attendance_id) AS total_attendees
           FROM campaigns cp
           JOIN candidates cd ON cp.candidate_id = cd.id
           LEFT JOIN campaign_events ce ON ce.campaign_id = cp.id
           LEFT JOIN event_attendances ea ON ea.event_id = ce.event_id
           GROUP BY cp.id, cd.id
           ORDER BY total_attendees {dir}, cp.id ASC"#
    );

    let rows = sqlx::query_as::<_, CampaignAttendees>(&query)
        .fetch_all(pool)
        .await?;

    Ok(rows)
}
